//! Server-side relay to the upstream API
//!
//! Browsers cannot call the upstream API directly (CORS) and the hosting
//! layer should not leak the upstream base URL, so the client talks to
//! `GET <relay-prefix>/<upstream-path>?<query>` instead. The relay
//! reconstructs the upstream URL, forwards the request, and mirrors the
//! upstream status and body back. Only GET traffic is in scope.

use crate::app_state::AppState;
use crate::metrics::track_request;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

/// Rebuild the upstream URL from the wildcard tail and the original query
/// string, both forwarded unmodified.
pub fn build_upstream_url(base: &str, tail: &str, query: &str) -> String {
    let base = base.trim_end_matches('/');
    let tail = tail.trim_start_matches('/');
    if query.is_empty() {
        format!("{}/{}", base, tail)
    } else {
        format!("{}/{}?{}", base, tail, query)
    }
}

/// GET handler mounted under the relay prefix with a `{tail:.*}` segment.
pub async fn relay(
    req: HttpRequest,
    tail: web::Path<String>,
    data: web::Data<AppState>,
) -> HttpResponse {
    let target = build_upstream_url(
        &data.config.upstream.api_base_url,
        &tail,
        req.query_string(),
    );
    log::info!("relaying GET {}", target);

    let forwarded = track_request(&data.metrics, "relay", forward(&data.client, &target)).await;

    match forwarded {
        Ok(response) => response,
        Err(e) => {
            log::error!("relay transport failure for {}: {}", target, e);
            HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error while proxying request",
                "error": e.to_string(),
            }))
        }
    }
}

/// Forward one GET and mirror the upstream status, content type and body.
/// A non-JSON upstream body passes through as raw text rather than being
/// forced into a parse failure.
async fn forward(client: &reqwest::Client, target: &str) -> Result<HttpResponse, reqwest::Error> {
    let upstream = client
        .get(target)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .send()
        .await?;

    let status = upstream.status();
    let content_type = upstream
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/json")
        .to_string();
    let body = upstream.text().await?;

    if !status.is_success() {
        log::warn!("upstream answered {} for {}", status, target);
    }

    // reqwest and actix-web sit on different `http` versions; carry the
    // status across by value.
    let mirrored =
        StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    Ok(HttpResponse::build(mirrored)
        .content_type(content_type)
        .body(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_tail_and_query() {
        assert_eq!(
            build_upstream_url("https://api.example.org", "manga", "limit=24&offset=0"),
            "https://api.example.org/manga?limit=24&offset=0"
        );
    }

    #[test]
    fn url_without_query_has_no_question_mark() {
        assert_eq!(
            build_upstream_url("https://api.example.org", "at-home/server/abc", ""),
            "https://api.example.org/at-home/server/abc"
        );
    }

    #[test]
    fn url_tolerates_slash_duplication() {
        assert_eq!(
            build_upstream_url("https://api.example.org/", "/manga/id/feed", "limit=50"),
            "https://api.example.org/manga/id/feed?limit=50"
        );
    }
}
