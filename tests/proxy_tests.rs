use actix_web::{test, web, App};
use yomidex::app_state::AppState;
use yomidex::config::Config;
use yomidex::metrics::MetricsTracker;
use yomidex::proxy;

fn state_with_upstream(base_url: &str) -> web::Data<AppState> {
    let mut config = Config::default();
    config.upstream.api_base_url = base_url.to_string();

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(2))
        .build()
        .unwrap();

    web::Data::new(AppState {
        client,
        config,
        metrics: MetricsTracker::new(),
    })
}

#[actix_web::test]
async fn transport_failure_yields_structured_500() {
    // Nothing listens on port 9 of localhost; the connection is refused
    // immediately, which exercises the transport-failure branch.
    let data = state_with_upstream("http://127.0.0.1:9");
    let app = test::init_service(
        App::new().app_data(data.clone()).service(
            web::scope("/api/md-proxy").route("/{tail:.*}", web::get().to(proxy::relay)),
        ),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/md-proxy/manga?limit=24")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 500);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(
        body["message"],
        "Internal Server Error while proxying request"
    );
    assert!(body["error"].as_str().is_some());
}

#[actix_web::test]
async fn transport_failure_is_recorded_in_metrics() {
    let data = state_with_upstream("http://127.0.0.1:9");
    let app = test::init_service(
        App::new().app_data(data.clone()).service(
            web::scope("/api/md-proxy").route("/{tail:.*}", web::get().to(proxy::relay)),
        ),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/md-proxy/manga")
        .to_request();
    let _ = test::call_service(&app, req).await;

    let relay_metrics = data.metrics.get_metrics("relay").expect("relay tracked");
    assert_eq!(relay_metrics.total_requests, 1);
    assert_eq!(relay_metrics.failed_requests, 1);
}
