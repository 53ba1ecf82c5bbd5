//! API integration tests
//!
//! These run against a live server with a seeded admin account
//! (admin@levspace.it / admin).

use chrono::{Datelike, Duration, Local, Weekday};
use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:3000/api/v1";

/// Helper to get an admin token
async fn get_admin_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@levspace.it",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// An open weekday far enough out to clear the reschedule lock window
fn future_weekday() -> String {
    let mut day = Local::now().date_naive() + Duration::days(30);
    while matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
        day += Duration::days(1);
    }
    day.format("%Y-%m-%d").to_string()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@levspace.it",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["is_admin"], true);
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@levspace.it",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_get_current_user() {
    let client = Client::new();
    let token = get_admin_token(&client).await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["email"], "admin@levspace.it");
    assert_eq!(body["is_admin"], true);
}

#[tokio::test]
#[ignore]
async fn test_slots_for_open_day() {
    let client = Client::new();

    let response = client
        .get(format!("{}/slots/{}", BASE_URL, future_weekday()))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let slots = body["slots"].as_array().expect("slots is not an array");
    // Anonymous callers see the eleven base weekday slots
    assert_eq!(slots.len(), 11);
    assert_eq!(slots[0]["time"], "08:30");
    assert!(slots[0]["available"].is_boolean());
}

#[tokio::test]
#[ignore]
async fn test_slots_closed_on_sunday() {
    let client = Client::new();

    let mut day = Local::now().date_naive() + Duration::days(30);
    while day.weekday() != Weekday::Sun {
        day += Duration::days(1);
    }

    let response = client
        .get(format!("{}/slots/{}", BASE_URL, day.format("%Y-%m-%d")))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["slots"].as_array().map(|s| s.len()), Some(0));
}

#[tokio::test]
#[ignore]
async fn test_slots_malformed_date() {
    let client = Client::new();

    let response = client
        .get(format!("{}/slots/not-a-date", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_guest_booking_lifecycle() {
    let client = Client::new();
    let giorno = future_weekday();

    // Book as a guest
    let response = client
        .post(format!("{}/bookings/guest", BASE_URL))
        .json(&json!({
            "nome": "Mario",
            "cognome": "Rossi",
            "email": "mario.rossi@example.com",
            "giorno": giorno,
            "ora": "10:00"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let token = body["booking"]["token"]
        .as_str()
        .expect("No booking token")
        .to_string();
    assert_eq!(token.len(), 32);

    // The same slot is now refused
    let response = client
        .post(format!("{}/bookings/guest", BASE_URL))
        .json(&json!({
            "nome": "Luigi",
            "cognome": "Verdi",
            "email": "luigi.verdi@example.com",
            "giorno": giorno,
            "ora": "10:00"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);

    // Token lookup
    let response = client
        .get(format!("{}/bookings/manage/{}", BASE_URL, token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["ora"], "10:00");

    // Reschedule within the same day
    let response = client
        .put(format!("{}/bookings/manage/{}", BASE_URL, token))
        .json(&json!({ "new_ora": "11:30" }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["ora"], "11:30");

    // Cancel; far enough out to clear the lock window
    let response = client
        .delete(format!("{}/bookings/manage/{}", BASE_URL, token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    // The token is gone
    let response = client
        .get(format!("{}/bookings/manage/{}", BASE_URL, token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_group_booking_occupies_consecutive_slots() {
    let client = Client::new();
    let giorno = future_weekday();

    let response = client
        .post(format!("{}/bookings/guest", BASE_URL))
        .json(&json!({
            "nome": "Anna",
            "cognome": "Bianchi",
            "email": "anna.bianchi@example.com",
            "giorno": giorno,
            "ora": "14:00",
            "group_size": 3
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let token = body["booking"]["token"]
        .as_str()
        .expect("No booking token")
        .to_string();

    // All three afternoon slots show as taken
    let response = client
        .get(format!("{}/slots/{}", BASE_URL, giorno))
        .send()
        .await
        .expect("Failed to send request");

    let slots: Value = response.json().await.expect("Failed to parse response");
    for ora in ["14:00", "14:45", "15:30"] {
        let slot = slots["slots"]
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["time"] == ora)
            .expect("slot missing");
        assert_eq!(slot["available"], false, "slot {} should be taken", ora);
    }

    // Cleanup
    let _ = client
        .delete(format!("{}/bookings/manage/{}", BASE_URL, token))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_admin_booking_and_move() {
    let client = Client::new();
    let token = get_admin_token(&client).await;
    let giorno = future_weekday();

    let response = client
        .post(format!("{}/admin/bookings", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "cognome": "Esposito",
            "giorno": giorno,
            "ora": "16:15"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    // Move it to another slot
    let response = client
        .put(format!("{}/admin/bookings", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "old_giorno": giorno,
            "old_ora": "16:15",
            "new_giorno": giorno,
            "new_ora": "17:00"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    // Cleanup
    let response = client
        .delete(format!("{}/admin/bookings", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "giorno": giorno, "ora": "17:00" }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_holiday_blocks_booking() {
    let client = Client::new();
    let token = get_admin_token(&client).await;
    let giorno = future_weekday();

    let response = client
        .post(format!("{}/admin/holidays", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "slots": [{ "giorno": giorno, "ora": "09:15" }]
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let response = client
        .post(format!("{}/bookings/guest", BASE_URL))
        .json(&json!({
            "nome": "Carla",
            "cognome": "Russo",
            "email": "carla.russo@example.com",
            "giorno": giorno,
            "ora": "09:15"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);

    // Cleanup
    let _ = client
        .delete(format!("{}/admin/holidays", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "slots": [{ "giorno": giorno, "ora": "09:15" }]
        }))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_admin_list_users() {
    let client = Client::new();
    let token = get_admin_token(&client).await;

    let response = client
        .get(format!("{}/admin/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body.is_array());
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/bookings", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);

    let response = client
        .get(format!("{}/admin/bookings", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}
