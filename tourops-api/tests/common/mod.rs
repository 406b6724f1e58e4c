#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use tourops_alerts::AlertRules;
use tourops_api::{app, AppState, Backend};
use tourops_core::InMemoryKeyValueStore;
use tourops_store::{InMemoryBackend, Seed};

/// Package "Sajek Valley Escape" (code SV), three departures:
///
/// - `d1`: in 5 days, 8 seats, 3 booked, run by `op-1`
/// - `d2`: in 12 hours, 40 seats, 30 booked, no operator, no itinerary
/// - `d3`: cancelled, in 20 days
///
/// `b0` (on d2) is the package's oldest booking, so d1's bookings are SV0002 and SV0003.
pub fn seed() -> Seed {
    let now = Utc::now();
    let at = |offset: Duration| (now + offset).to_rfc3339();

    serde_json::from_value(json!({
        "packages": [{ "_id": "p1", "title": "Sajek Valley Escape", "code": "sv" }],
        "departures": [
            {
                "_id": "d1",
                "packageId": "p1",
                "startDate": at(Duration::days(5)),
                "totalSeats": 8,
                "bookedSeats": 3,
                "operators": ["op-1"],
                "itinerary": [{ "day": 1, "title": "Khagrachari" }]
            },
            {
                "_id": "d2",
                "packageId": "p1",
                "startDate": at(Duration::hours(12)),
                "totalSeats": 40,
                "bookedSeats": 30
            },
            {
                "_id": "d3",
                "packageId": "p1",
                "startDate": at(Duration::days(20)),
                "totalSeats": 20,
                "bookedSeats": 6,
                "status": "CANCELLED",
                "operators": ["op-1"],
                "itinerary": [{ "day": 1 }]
            }
        ],
        "bookings": [
            {
                "_id": "b0",
                "packageId": "p1",
                "groupDepartureId": "d2",
                "createdAt": at(-Duration::days(10)),
                "status": "CONFIRMED",
                "travelers": [{ "name": "Tanvir" , "phone": "01700000000" }]
            },
            {
                "_id": "b1",
                "packageId": "p1",
                "groupDepartureId": "d1",
                "createdAt": at(-Duration::days(9)),
                "status": "CONFIRMED",
                "travelers": [
                    { "fullName": "Ayesha Rahman", "phone": "01711111111", "emergencyContact": "01811111111" },
                    { "full_name": "Karim Rahman", "phoneNumber": "01722222222" }
                ],
                "reservedSeats": [1, 2],
                "payments": [{ "amount": 9000.0, "status": "SUCCESS" }]
            },
            {
                "_id": "b2",
                "packageId": "p1",
                "groupDepartureId": "d1",
                "createdAt": at(-Duration::days(8)),
                "status": "CONFIRMED",
                "travelers": [{ "fullName": "Nusrat Jahan", "mobile": "01733333333" }],
                "payments": [{ "amount": 4500.0, "status": "PENDING" }]
            },
            {
                "_id": "b3",
                "packageId": "p1",
                "groupDepartureId": "d2",
                "createdAt": at(-Duration::days(2)),
                "status": "PENDING",
                "customerName": "Sadia Islam",
                "travelers": [{ "fullName": "Sadia Islam", "phone": "01744444444" }]
            }
        ],
        "contacts": [
            { "_id": "c1", "name": "Mahmud", "subject": "Group discount", "read": false, "createdAt": at(-Duration::hours(1)) },
            { "_id": "c2", "name": "Rumana", "subject": "Invoice", "read": true, "createdAt": at(-Duration::hours(2)) }
        ],
        "kyc": [
            { "_id": "k1", "userName": "Jamal", "status": "PENDING", "createdAt": at(-Duration::hours(5)) }
        ],
        "reviews": []
    }))
    .unwrap()
}

pub fn build_test_app() -> (Router, Arc<InMemoryBackend>) {
    let backend = Arc::new(InMemoryBackend::new(seed()));
    let state = AppState::new(
        Backend::from_shared(backend.clone()),
        Arc::new(InMemoryKeyValueStore::new()),
        AlertRules::default(),
    );
    (app(state), backend)
}

pub async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
