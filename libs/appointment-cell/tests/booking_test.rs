use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{Duration, Timelike, Utc};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::{start_of_hour, BookAppointmentRequest, BookingError};
use appointment_cell::services::booking::AppointmentBookingService;
use notification_cell::NotificationStore;
use shared_database::PostgrestClient;
use shared_utils::test_utils::{MockStoreResponses, TestConfig};

const CLIENT_ID: i64 = 1;
const PROVIDER_ID: i64 = 2;

fn service_for(uri: &str) -> AppointmentBookingService {
    let config = TestConfig::with_mock_server(uri).to_app_config();
    AppointmentBookingService::new(
        Arc::new(PostgrestClient::new(&config)),
        Arc::new(NotificationStore::new(&config)),
        None,
    )
}

fn booking_request(provider_id: i64, date: &str) -> BookAppointmentRequest {
    BookAppointmentRequest {
        provider_id: Some(provider_id),
        date: Some(date.to_string()),
    }
}

fn parties_row(
    id: i64,
    user_id: i64,
    provider_id: i64,
    date: &str,
    canceled_at: Option<&str>,
) -> Value {
    json!({
        "id": id,
        "user_id": user_id,
        "provider_id": provider_id,
        "date": date,
        "canceled_at": canceled_at,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z",
        "client": { "id": user_id, "name": "Demo User", "email": "demo@example.com" },
        "provider": { "id": provider_id, "name": "Demo Provider", "email": "provider@example.com" }
    })
}

async fn mock_provider_lookup(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", format!("eq.{}", PROVIDER_ID)))
        .and(query_param("provider", "is.true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::account_response(
                PROVIDER_ID,
                "Demo Provider",
                "provider@example.com",
                true,
            )
        ])))
        .mount(mock_server)
        .await;
}

async fn mock_free_slot(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("provider_id", format!("eq.{}", PROVIDER_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(mock_server)
        .await;
}

// ==============================================================================
// BOOKING
// ==============================================================================

#[tokio::test]
async fn booking_stores_slot_truncated_to_start_of_hour() {
    let mock_server = MockServer::start().await;

    let requested = start_of_hour(Utc::now() + Duration::days(2)) + Duration::minutes(37);
    let expected_slot = start_of_hour(requested);

    mock_provider_lookup(&mock_server).await;
    mock_free_slot(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreResponses::appointment_response(
                11,
                CLIENT_ID,
                PROVIDER_ID,
                &expected_slot.to_rfc3339(),
            )
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Client lookup for the notification message.
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", format!("eq.{}", CLIENT_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::account_response(CLIENT_ID, "Demo User", "demo@example.com", false)
        ])))
        .mount(&mock_server)
        .await;

    // Provider notification is written as a side effect of booking.
    Mock::given(method("POST"))
        .and(path("/notifications"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server.uri());
    let appointment = service
        .book_appointment(CLIENT_ID, booking_request(PROVIDER_ID, &requested.to_rfc3339()))
        .await
        .unwrap();

    assert_eq!(appointment.date, expected_slot);
    assert_eq!(appointment.date.minute(), 0);
    assert_eq!(appointment.provider_id, PROVIDER_ID);
}

#[tokio::test]
async fn booking_requires_provider_id_and_date() {
    let mock_server = MockServer::start().await;
    let service = service_for(&mock_server.uri());

    let missing_provider = service
        .book_appointment(
            CLIENT_ID,
            BookAppointmentRequest {
                provider_id: None,
                date: Some(Utc::now().to_rfc3339()),
            },
        )
        .await;
    assert_matches!(missing_provider, Err(BookingError::InvalidInput(_)));

    let missing_date = service
        .book_appointment(
            CLIENT_ID,
            BookAppointmentRequest {
                provider_id: Some(PROVIDER_ID),
                date: None,
            },
        )
        .await;
    assert_matches!(missing_date, Err(BookingError::InvalidInput(_)));

    let garbled_date = service
        .book_appointment(CLIENT_ID, booking_request(PROVIDER_ID, "next tuesday"))
        .await;
    assert_matches!(garbled_date, Err(BookingError::InvalidInput(_)));
}

#[tokio::test]
async fn booking_rejects_self_booking_regardless_of_date() {
    let mock_server = MockServer::start().await;
    let service = service_for(&mock_server.uri());

    let result = service
        .book_appointment(
            CLIENT_ID,
            booking_request(CLIENT_ID, &(Utc::now() + Duration::days(1)).to_rfc3339()),
        )
        .await;

    assert_matches!(result, Err(BookingError::SelfBookingNotAllowed));
}

#[tokio::test]
async fn booking_rejects_accounts_without_provider_flag() {
    let mock_server = MockServer::start().await;

    // The flag-filtered lookup returns nothing for plain accounts.
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server.uri());
    let result = service
        .book_appointment(
            CLIENT_ID,
            booking_request(PROVIDER_ID, &(Utc::now() + Duration::days(1)).to_rfc3339()),
        )
        .await;

    assert_matches!(result, Err(BookingError::NotAProvider));
}

#[tokio::test]
async fn booking_rejects_past_slots() {
    let mock_server = MockServer::start().await;
    mock_provider_lookup(&mock_server).await;

    let service = service_for(&mock_server.uri());
    let result = service
        .book_appointment(
            CLIENT_ID,
            booking_request(PROVIDER_ID, &(Utc::now() - Duration::hours(3)).to_rfc3339()),
        )
        .await;

    assert_matches!(result, Err(BookingError::PastDateNotAllowed));
}

#[tokio::test]
async fn booking_rejects_occupied_slots() {
    let mock_server = MockServer::start().await;
    mock_provider_lookup(&mock_server).await;

    let slot = start_of_hour(Utc::now() + Duration::days(1));
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("provider_id", format!("eq.{}", PROVIDER_ID)))
        .and(query_param("canceled_at", "is.null"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::appointment_response(5, 42, PROVIDER_ID, &slot.to_rfc3339())
        ])))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server.uri());
    let result = service
        .book_appointment(CLIENT_ID, booking_request(PROVIDER_ID, &slot.to_rfc3339()))
        .await;

    assert_matches!(result, Err(BookingError::SlotUnavailable));
}

#[tokio::test]
async fn booking_maps_insert_conflict_to_slot_unavailable() {
    let mock_server = MockServer::start().await;
    mock_provider_lookup(&mock_server).await;
    mock_free_slot(&mock_server).await;

    // A concurrent booking slipped between the guard and the insert; the
    // store's unique index answers with a conflict.
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "duplicate key value violates unique constraint"
        })))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server.uri());
    let result = service
        .book_appointment(
            CLIENT_ID,
            booking_request(PROVIDER_ID, &(Utc::now() + Duration::days(1)).to_rfc3339()),
        )
        .await;

    assert_matches!(result, Err(BookingError::SlotUnavailable));
}

// ==============================================================================
// CANCELLATION
// ==============================================================================

#[tokio::test]
async fn cancel_succeeds_with_enough_lead_time() {
    let mock_server = MockServer::start().await;

    let slot = start_of_hour(Utc::now() + Duration::hours(4));
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            parties_row(10, CLIENT_ID, PROVIDER_ID, &slot.to_rfc3339(), None)
        ])))
        .mount(&mock_server)
        .await;

    let canceled_at = Utc::now().to_rfc3339();
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 10,
            "user_id": CLIENT_ID,
            "provider_id": PROVIDER_ID,
            "date": slot.to_rfc3339(),
            "canceled_at": canceled_at,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server.uri());
    let appointment = service.cancel_appointment(CLIENT_ID, 10).await.unwrap();

    assert!(appointment.canceled_at.is_some());
}

#[tokio::test]
async fn cancel_rejects_requests_from_non_owners() {
    let mock_server = MockServer::start().await;

    let slot = start_of_hour(Utc::now() + Duration::hours(4));
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            parties_row(10, CLIENT_ID, PROVIDER_ID, &slot.to_rfc3339(), None)
        ])))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server.uri());
    let result = service.cancel_appointment(99, 10).await;

    assert_matches!(result, Err(BookingError::NotOwner));
}

#[tokio::test]
async fn cancel_rejects_slots_less_than_two_hours_away() {
    let mock_server = MockServer::start().await;

    let slot = Utc::now() + Duration::minutes(90);
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            parties_row(10, CLIENT_ID, PROVIDER_ID, &slot.to_rfc3339(), None)
        ])))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server.uri());
    let result = service.cancel_appointment(CLIENT_ID, 10).await;

    assert_matches!(result, Err(BookingError::CancellationWindowExpired));
}

#[tokio::test]
async fn cancel_of_missing_appointment_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server.uri());
    let result = service.cancel_appointment(CLIENT_ID, 10).await;

    assert_matches!(result, Err(BookingError::NotFound));
}

#[tokio::test]
async fn cancel_of_cancelled_appointment_is_idempotent() {
    let mock_server = MockServer::start().await;

    let slot = start_of_hour(Utc::now() + Duration::hours(4));
    let canceled_at = (Utc::now() - Duration::hours(1)).to_rfc3339();
    // No PATCH mock is mounted: a second store write would fail the test.
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([parties_row(
            10,
            CLIENT_ID,
            PROVIDER_ID,
            &slot.to_rfc3339(),
            Some(&canceled_at),
        )])))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server.uri());
    let appointment = service.cancel_appointment(CLIENT_ID, 10).await.unwrap();

    assert_eq!(
        appointment.canceled_at.map(|t| t.to_rfc3339()),
        Some(canceled_at)
    );
}

// ==============================================================================
// LISTING
// ==============================================================================

#[tokio::test]
async fn listing_maps_rows_and_derives_flags() {
    let mock_server = MockServer::start().await;

    let upcoming = start_of_hour(Utc::now() + Duration::hours(5));
    let elapsed = start_of_hour(Utc::now() - Duration::hours(5));
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("user_id", format!("eq.{}", CLIENT_ID)))
        .and(query_param("canceled_at", "is.null"))
        .and(query_param("order", "date.asc"))
        .and(query_param("limit", "20"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 3,
                "date": elapsed.to_rfc3339(),
                "provider": { "id": PROVIDER_ID, "name": "Demo Provider", "avatar_url": null }
            },
            {
                "id": 4,
                "date": upcoming.to_rfc3339(),
                "provider": { "id": PROVIDER_ID, "name": "Demo Provider", "avatar_url": "avatars/2.png" }
            }
        ])))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server.uri());
    let appointments = service.list_appointments(CLIENT_ID, 1).await.unwrap();

    assert_eq!(appointments.len(), 2);
    assert!(appointments[0].past);
    assert!(!appointments[0].cancelable);
    assert!(!appointments[1].past);
    assert!(appointments[1].cancelable);
    assert_eq!(
        appointments[1].provider.avatar_url.as_deref(),
        Some("avatars/2.png")
    );
}
