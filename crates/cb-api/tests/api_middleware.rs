#[macro_use]
mod common;

use actix_web::http::header;
use actix_web::http::StatusCode;
use actix_web::test;
use cb_api::middleware::{cors_policy, security_headers};
use common::{Harness, TOKEN};

const SITE: &str = "https://chamber.example.test";

/// The production middleware stack around the API routes.
macro_rules! wrapped_app {
    ($state:expr, $origin:expr) => {
        test::init_service(
            actix_web::App::new()
                .app_data($state)
                .app_data(cb_api::middleware::json_config())
                .wrap(cors_policy($origin))
                .wrap(security_headers())
                .configure(cb_api::configure_routes),
        )
        .await
    };
}

fn preflight(origin: &str) -> test::TestRequest {
    test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/api/jobs")
        .insert_header((header::ORIGIN, origin))
        .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
}

#[actix_web::test]
async fn api_responses_carry_security_headers() {
    let harness = Harness::new();
    let app = wrapped_app!(harness.state(Some(TOKEN), None), None);

    let req = test::TestRequest::get().uri("/api/jobs").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let headers = resp.headers();
    assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
    assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "SAMEORIGIN");
    assert_eq!(headers.get(header::REFERRER_POLICY).unwrap(), "no-referrer");
    assert_eq!(headers.get("cross-origin-opener-policy").unwrap(), "same-origin");
}

#[actix_web::test]
async fn error_responses_carry_security_headers_too() {
    let harness = Harness::new();
    let app = wrapped_app!(harness.state(Some(TOKEN), None), None);

    let req = test::TestRequest::get().uri("/api/events/nope").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
}

#[actix_web::test]
async fn preflight_from_the_configured_origin_is_allowed() {
    let harness = Harness::new();
    let app = wrapped_app!(harness.state(Some(TOKEN), None), Some(SITE));

    let resp = test::call_service(&app, preflight(SITE).to_request()).await;
    assert!(resp.status().is_success(), "{}", resp.status());
    assert_eq!(
        resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        SITE
    );
}

#[actix_web::test]
async fn preflight_from_another_origin_is_refused() {
    let harness = Harness::new();
    let app = wrapped_app!(harness.state(Some(TOKEN), None), Some(SITE));

    let resp = test::call_service(&app, preflight("https://elsewhere.test").to_request()).await;
    assert!(!resp.status().is_success(), "{}", resp.status());
    assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[actix_web::test]
async fn no_cors_headers_without_an_allowed_origin() {
    let harness = Harness::new();
    let app = wrapped_app!(harness.state(Some(TOKEN), None), None);

    let req = test::TestRequest::get()
        .uri("/api/jobs")
        .insert_header((header::ORIGIN, SITE))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());

    let resp = test::call_service(&app, preflight(SITE).to_request()).await;
    assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
