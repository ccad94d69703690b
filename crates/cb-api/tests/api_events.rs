#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use cb_core::mail::OutgoingMail;
use cb_core::traits::MockMailer;
use chrono::{Duration, Local};
use common::{bearer, Harness, TOKEN};
use serde_json::{json, Value};

fn day_offset(days: i64) -> String {
    (Local::now().date_naive() + Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

fn seed_events(harness: &Harness) {
    harness.seed_events(json!([
        { "id": 1, "title": "Last Year's Gala", "date": day_offset(-3) },
        { "id": 2, "title": "Breakfast Mixer", "date": day_offset(0), "time": "08:00" },
        {
            "id": 3,
            "title": "Export Workshop",
            "date": day_offset(14),
            "posterEmail": "trade@chamber.test",
            "paymentRequired": true,
            "cost": 25,
            "mandatoryFields": ["company", "role"]
        }
    ]));
}

#[actix_web::test]
async fn listing_drops_past_events_but_keeps_today() {
    let harness = Harness::new();
    seed_events(&harness);
    let app = test_app!(harness.state(Some(TOKEN), None));

    let req = test::TestRequest::get().uri("/api/events").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let titles: Vec<&str> = body
        .as_array()
        .expect("array")
        .iter()
        .map(|event| event["title"].as_str().expect("title"))
        .collect();
    assert_eq!(titles, vec!["Breakfast Mixer", "Export Workshop"]);
    assert_eq!(harness.events_on_disk().len(), 2);
}

#[actix_web::test]
async fn expired_event_is_not_found_by_id() {
    let harness = Harness::new();
    seed_events(&harness);
    let app = test_app!(harness.state(Some(TOKEN), None));

    let req = test::TestRequest::get().uri("/api/events/1").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Event not found with ID 1");
}

#[actix_web::test]
async fn create_fills_event_defaults() {
    let harness = Harness::new();
    seed_events(&harness);
    let app = test_app!(harness.state(Some(TOKEN), None));

    let req = test::TestRequest::post()
        .uri("/api/events")
        .insert_header(bearer())
        .set_json(json!({
            "title": "Networking Lunch",
            "date": day_offset(30),
            "cost": 40
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let event: Value = test::read_body_json(resp).await;
    assert_eq!(event["id"], 4);
    assert_eq!(event["time"], "10:00");
    assert_eq!(event["paymentRequired"], false);
    assert!(event["cost"].is_null());
}

#[actix_web::test]
async fn create_without_date_is_rejected() {
    let harness = Harness::new();
    let app = test_app!(harness.state(Some(TOKEN), None));

    let req = test::TestRequest::post()
        .uri("/api/events")
        .insert_header(bearer())
        .set_json(json!({ "title": "Networking Lunch" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(harness.raw_events().is_none());
}

#[actix_web::test]
async fn update_changes_only_the_given_fields() {
    let harness = Harness::new();
    seed_events(&harness);
    let app = test_app!(harness.state(Some(TOKEN), None));

    let req = test::TestRequest::put()
        .uri("/api/events/2")
        .insert_header(bearer())
        .set_json(json!({
            "location": "Town Hall",
            "title": "",
            "paymentRequired": true,
            "cost": "12.5",
            "mandatoryFields": ["company"]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let event: Value = test::read_body_json(resp).await;
    assert_eq!(event["title"], "Breakfast Mixer");
    assert_eq!(event["time"], "08:00");
    assert_eq!(event["location"], "Town Hall");
    assert_eq!(event["paymentRequired"], true);
    assert_eq!(event["cost"], 12.5);
    assert_eq!(event["mandatoryFields"], json!(["company"]));

    let stored = harness
        .events_on_disk()
        .into_iter()
        .find(|e| e.id == 2)
        .expect("event 2");
    assert_eq!(stored.location, "Town Hall");
}

#[actix_web::test]
async fn update_of_an_unknown_event_is_not_found() {
    let harness = Harness::new();
    seed_events(&harness);
    let app = test_app!(harness.state(Some(TOKEN), None));

    let req = test::TestRequest::put()
        .uri("/api/events/42")
        .insert_header(bearer())
        .set_json(json!({ "title": "Ghost" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn participation_requires_contact_info() {
    let harness = Harness::new();
    seed_events(&harness);
    let app = test_app!(harness.state(Some(TOKEN), None));

    let req = test::TestRequest::post()
        .uri("/api/events/2/participate")
        .set_json(json!({ "name": "Ada", "email": "ada@example.test" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Missing required contact info");
    assert!(harness.submissions("event-2.json").is_empty());
}

#[actix_web::test]
async fn participation_enforces_mandatory_fields_then_payment() {
    let harness = Harness::new();
    seed_events(&harness);
    let app = test_app!(harness.state(Some(TOKEN), None));

    let contact = json!({
        "name": "Ada",
        "email": "ada@example.test",
        "contact": "555-0100",
        "company": "Analytical Engines"
    });

    let req = test::TestRequest::post()
        .uri("/api/events/3/participate")
        .set_json(&contact)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["error"], "role is required");

    let mut with_role = contact.clone();
    with_role["role"] = json!("Founder");
    let req = test::TestRequest::post()
        .uri("/api/events/3/participate")
        .set_json(&with_role)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["error"], "Payment reference required for this event");

    assert!(harness.submissions("event-3.json").is_empty());
}

#[actix_web::test]
async fn participation_is_recorded_without_a_mailer() {
    let harness = Harness::new();
    seed_events(&harness);
    let app = test_app!(harness.state(Some(TOKEN), None));

    let req = test::TestRequest::post()
        .uri("/api/events/3/participate")
        .set_json(json!({
            "name": "Ada",
            "email": "ada@example.test",
            "contact": "555-0100",
            "company": "Analytical Engines",
            "role": "Founder",
            "paymentRef": "TX-991"
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "ok": true, "sent": false }));

    let lines = harness.submissions("event-3.json");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["participantName"], "Ada");
    assert_eq!(lines[0]["paymentRef"], "TX-991");
    assert_eq!(lines[0]["eventTitle"], "Export Workshop");
}

#[actix_web::test]
async fn participation_notifies_the_poster() {
    let harness = Harness::new();
    seed_events(&harness);

    let mut mailer = MockMailer::new();
    mailer
        .expect_send()
        .withf(|mail: &OutgoingMail| {
            mail.to == "trade@chamber.test"
                && mail.subject == "New Event Registration: Export Workshop"
                && mail.body.contains("TX-991")
        })
        .times(1)
        .returning(|_| Ok(()));
    let app = test_app!(harness.state(Some(TOKEN), Some(Box::new(mailer))));

    let req = test::TestRequest::post()
        .uri("/api/events/3/participate")
        .set_json(json!({
            "name": "Ada",
            "email": "ada@example.test",
            "contact": "555-0100",
            "company": "Analytical Engines",
            "role": "Founder",
            "paymentRef": "TX-991"
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "ok": true, "sent": true }));
}

#[actix_web::test]
async fn participation_without_poster_email_skips_mail() {
    let harness = Harness::new();
    seed_events(&harness);

    let mut mailer = MockMailer::new();
    mailer.expect_send().never();
    let app = test_app!(harness.state(Some(TOKEN), Some(Box::new(mailer))));

    let req = test::TestRequest::post()
        .uri("/api/events/2/participate")
        .set_json(json!({
            "name": "Grace",
            "email": "grace@example.test",
            "contact": "555-0101"
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "ok": true, "sent": false }));
    assert_eq!(harness.submissions("event-2.json").len(), 1);
}
