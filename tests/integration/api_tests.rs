//! API integration tests
//!
//! Run against a live server with the default bootstrap admin:
//! `cargo test -- --ignored`

use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";
const ADMIN_EMAIL: &str = "admin@quartermaster.local";
const ADMIN_PASSWORD: &str = "Admin123!";
const PASSWORD: &str = "Secret123!";

fn unique() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos() as u64
}

async fn login(client: &Client, email: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");

    assert!(response.status().is_success(), "login failed for {}", email);
    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Registers a fresh account and returns (user id, token)
async fn register(client: &Client, first_name: &str, seed: u64) -> (i64, String) {
    let email = format!("{}{}@example.com", first_name.to_lowercase(), seed);
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "email": email,
            "phone": format!("{:010}", seed % 10_000_000_000),
            "first_name": first_name,
            "last_name": "Tester",
            "password": PASSWORD,
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse register response");
    let id = body["id"].as_i64().expect("No id in response");
    (id, login(client, &email, PASSWORD).await)
}

async fn call(client: &Client, method: reqwest::Method, token: &str, path: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = client
        .request(method, format!("{}{}", BASE_URL, path))
        .bearer_auth(token);
    if let Some(body) = body {
        request = request.json(&body);
    }
    let response = request.send().await.expect("Failed to send request");
    let status = response.status();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
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
async fn test_readiness_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": ADMIN_EMAIL, "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/requests/mine", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_register_rejects_bad_phone() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "email": format!("bad{}@example.com", unique()),
            "phone": "123",
            "first_name": "Bad",
            "last_name": "Phone",
            "password": PASSWORD,
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_only_admin_sees_stats() {
    let client = Client::new();
    let admin = login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (_, user) = register(&client, "Stats", unique()).await;

    let (status, body) = call(&client, reqwest::Method::GET, &admin, "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["items"]["total"].is_i64());

    let (status, _) = call(&client, reqwest::Method::GET, &user, "/stats", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_checkout_lifecycle() {
    use reqwest::Method;

    let client = Client::new();
    let seed = unique();
    let admin = login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (chief_id, _) = register(&client, "Chief", seed).await;
    let (manager_id, _) = register(&client, "Manager", seed + 1).await;
    let (alice_id, alice) = register(&client, "Alice", seed + 2).await;
    let (_, bob) = register(&client, "Bob", seed + 3).await;

    // Admin makes the chief, the chief makes the manager
    let (status, _) = call(&client, Method::PUT, &admin, &format!("/users/{}", chief_id), Some(json!({ "role": "chief" }))).await;
    assert_eq!(status, StatusCode::OK);
    let chief = login(&client, &format!("chief{}@example.com", seed), PASSWORD).await;

    let (status, responsibility) = call(
        &client,
        Method::PUT,
        &chief,
        &format!("/users/{}/responsibility", manager_id),
        Some(json!({ "responsibility_name": format!("Tents {}", seed) })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rid = responsibility["id"].as_i64().unwrap();
    let manager = login(&client, &format!("manager{}@example.com", seed + 1), PASSWORD).await;

    let (status, item) = call(&client, Method::POST, &manager, &format!("/responsibilities/{}/items", rid), Some(json!({ "name": "Tent 1" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item["status"], "Available");
    let item_id = item["id"].as_i64().unwrap();

    // No event yet: claims are closed
    let claim = json!({ "item_id": item_id, "request_type": "request" });
    let (status, _) = call(&client, Method::POST, &alice, "/requests", Some(claim.clone())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, event) = call(&client, Method::POST, &chief, "/events", Some(json!({ "name": format!("Camp {}", seed) }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let event_id = event["id"].as_i64().unwrap();

    let (status, _) = call(&client, Method::POST, &chief, &format!("/events/{}/activate", event_id), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = call(&client, Method::POST, &chief, &format!("/events/{}/responsibilities/{}", event_id, rid), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, event) = call(&client, Method::POST, &chief, &format!("/events/{}/activate", event_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(event["status"], "active");

    // Alice and Bob compete for the same tent
    let (status, alice_request) = call(&client, Method::POST, &alice, "/requests", Some(claim.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = call(&client, Method::POST, &alice, "/requests", Some(claim.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = call(&client, Method::POST, &bob, "/requests", Some(claim.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, pending) = call(&client, Method::GET, &manager, &format!("/responsibilities/{}/requests?type=request", rid), None).await;
    assert_eq!(pending.as_array().unwrap().len(), 2);

    let (_, listing) = call(&client, Method::GET, &alice, &format!("/responsibilities/{}/items", rid), None).await;
    assert_eq!(listing["items"][0]["request_hint"], "Item being requested");

    // Chiefs cannot decide requests
    let approve_path = format!("/requests/{}/approve", alice_request["id"]);
    let (status, _) = call(&client, Method::POST, &chief, &approve_path, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, item) = call(&client, Method::POST, &manager, &approve_path, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["status"], "In Use");
    assert_eq!(item["owner_id"].as_i64(), Some(alice_id));

    let (_, pending) = call(&client, Method::GET, &manager, &format!("/responsibilities/{}/requests", rid), None).await;
    assert!(pending.as_array().unwrap().is_empty());

    let (status, _) = call(&client, Method::POST, &bob, "/requests", Some(claim.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let give_back = json!({ "item_id": item_id, "request_type": "return" });
    let (status, _) = call(&client, Method::POST, &bob, "/requests", Some(give_back.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Return phase
    let (status, _) = call(&client, Method::POST, &chief, &format!("/events/{}/switch-to-return", event_id), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = call(&client, Method::POST, &chief, &format!("/events/{}/complete", event_id), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["message"].as_str().unwrap().contains("1 item(s) still in use"));

    let (status, return_request) = call(&client, Method::POST, &alice, "/requests", Some(give_back)).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, item) = call(&client, Method::POST, &manager, &format!("/requests/{}/approve", return_request["id"]), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["status"], "Available");
    assert!(item["owner_id"].is_null());

    let (status, event) = call(&client, Method::POST, &chief, &format!("/events/{}/complete", event_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(event["status"], "not-active");

    // Last manager removed: responsibility gone, item kept
    let (status, _) = call(&client, Method::DELETE, &chief, &format!("/users/{}/responsibility", manager_id), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&client, Method::GET, &alice, &format!("/responsibilities/{}", rid), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, listing) = call(&client, Method::GET, &alice, &format!("/responsibilities/{}/items", rid), None).await;
    assert_eq!(listing["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
#[ignore]
async fn test_deny_leaves_item_available() {
    use reqwest::Method;

    let client = Client::new();
    let seed = unique();
    let admin = login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (chief_id, _) = register(&client, "Chief", seed).await;
    let (manager_id, _) = register(&client, "Manager", seed + 1).await;
    let (_, user) = register(&client, "User", seed + 2).await;

    call(&client, Method::PUT, &admin, &format!("/users/{}", chief_id), Some(json!({ "role": "chief" }))).await;
    let chief = login(&client, &format!("chief{}@example.com", seed), PASSWORD).await;
    let (_, responsibility) = call(
        &client,
        Method::PUT,
        &chief,
        &format!("/users/{}/responsibility", manager_id),
        Some(json!({ "responsibility_name": format!("Radios {}", seed) })),
    )
    .await;
    let rid = responsibility["id"].as_i64().unwrap();
    let manager = login(&client, &format!("manager{}@example.com", seed + 1), PASSWORD).await;

    let (_, item) = call(&client, Method::POST, &manager, &format!("/responsibilities/{}/items", rid), Some(json!({ "name": "Radio 1" }))).await;
    let (_, event) = call(&client, Method::POST, &chief, "/events", Some(json!({ "name": format!("Drill {}", seed) }))).await;
    call(&client, Method::POST, &chief, &format!("/events/{}/responsibilities/{}", event["id"], rid), None).await;
    call(&client, Method::POST, &chief, &format!("/events/{}/activate", event["id"]), None).await;

    let (status, request) = call(&client, Method::POST, &user, "/requests", Some(json!({ "item_id": item["id"], "request_type": "request" }))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(&client, Method::POST, &manager, &format!("/requests/{}/deny", request["id"]), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let (_, listing) = call(&client, Method::GET, &user, &format!("/responsibilities/{}/items", rid), None).await;
    assert_eq!(listing["items"][0]["status"], "Available");
    assert!(listing["items"][0]["request_hint"].is_null());

    let (status, _) = call(&client, Method::POST, &manager, &format!("/requests/{}/deny", request["id"]), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
