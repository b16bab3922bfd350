use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};
use log::info;

use yomidex::app_state::AppState;
use yomidex::config::Config;
use yomidex::metrics::MetricsTracker;
use yomidex::proxy;

#[get("/metrics")]
async fn get_metrics(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(data.metrics.get_all_metrics())
}

#[get("/metrics/summary")]
async fn get_metrics_summary(data: web::Data<AppState>) -> impl Responder {
    let all = data.metrics.get_all_metrics();
    let summary: Vec<serde_json::Value> = all
        .iter()
        .map(|m| {
            serde_json::json!({
                "endpoint": m.endpoint,
                "total_requests": m.total_requests,
                "success_rate": format!("{:.2}%", m.success_rate()),
                "avg_response_time_ms": m.average_response_time_ms,
                "last_error": m.last_error,
            })
        })
        .collect();
    HttpResponse::Ok().json(summary)
}

#[get("/healthz")]
async fn healthz() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    log4rs::init_file("log4rs.yml", Default::default()).unwrap();

    let cfg = Config::load();

    let client = reqwest::Client::builder()
        .user_agent(cfg.http.user_agent.clone())
        .timeout(std::time::Duration::from_secs(cfg.http.timeout_secs))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .expect("failed to build relay HTTP client");

    let metrics = MetricsTracker::new();

    info!("relay target: {}", cfg.upstream.api_base_url);
    info!("relay prefix: {}", cfg.upstream.relay_prefix);
    info!("upstream timeout: {}s", cfg.http.timeout_secs);

    let relay_prefix = cfg.upstream.relay_prefix.trim_end_matches('/').to_string();
    let data = web::Data::new(AppState {
        client,
        config: cfg,
        metrics,
    });

    // Try to bind to an available port starting at 8080
    let mut last_err: Option<std::io::Error> = None;
    for port in 8080..=8090 {
        let data_clone = data.clone();
        let prefix = relay_prefix.clone();
        let addr = format!("127.0.0.1:{}", port);
        match HttpServer::new(move || {
            App::new()
                .app_data(data_clone.clone())
                .service(healthz)
                .service(get_metrics)
                .service(get_metrics_summary)
                .service(
                    web::scope(&prefix).route("/{tail:.*}", web::get().to(proxy::relay)),
                )
        })
        .bind(&addr)
        {
            Ok(server) => {
                info!("Listening on {}", addr);
                return server.run().await;
            }
            Err(e) => {
                last_err = Some(e);
                continue;
            }
        }
    }
    Err(last_err.unwrap_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::AddrInUse,
            "No available ports 8080-8090",
        )
    }))
}
