//! API integration tests
//!
//! These run against a live server with a clean database:
//! `cargo test -- --ignored`

use reqwest::Client;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn unique(name: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{}_{}", name, nanos)
}

/// Register a fresh user and return (token, user_id)
async fn register_and_login(client: &Client, name: &str) -> (String, i64) {
    let username = unique(name);

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "correct-horse-battery"
        }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": username,
            "password": "correct-horse-battery"
        }))
        .send()
        .await
        .expect("Failed to send login request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse login response");
    let token = body["token"].as_str().expect("No token in response").to_string();
    let user_id = body["user"]["id"].as_i64().expect("No user id in response");
    (token, user_id)
}

/// Create a give-away item and return its id
async fn create_item(client: &Client, token: &str, title: &str) -> i64 {
    let response = client
        .post(format!("{}/items", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": title,
            "description": "Integration test item",
            "item_type": "Share"
        }))
        .send()
        .await
        .expect("Failed to send create item request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse item response");
    body["id"].as_i64().expect("No item id")
}

async fn submit_request(client: &Client, token: &str, item_id: i64) -> (u16, Value) {
    let response = client
        .post(format!("{}/items/{}/requests", BASE_URL, item_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send submit request");
    let status = response.status().as_u16();
    let body: Value = response.json().await.expect("Failed to parse submit response");
    (status, body)
}

#[tokio::test]
#[ignore]
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
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/requests", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_first_submit_creates_second_returns_existing() {
    let client = Client::new();
    let (owner_token, _) = register_and_login(&client, "owner").await;
    let (requester_token, _) = register_and_login(&client, "requester").await;
    let item_id = create_item(&client, &owner_token, "Ladder").await;

    let (status, body) = submit_request(&client, &requester_token, item_id).await;
    assert_eq!(status, 201);
    assert_eq!(body["created"], true);
    assert_eq!(body["request"]["status"], "Pending");
    let first_id = body["request"]["id"].as_i64().unwrap();

    // Second submission is a no-op surfacing the same record
    let (status, body) = submit_request(&client, &requester_token, item_id).await;
    assert_eq!(status, 200);
    assert_eq!(body["created"], false);
    assert_eq!(body["request"]["id"].as_i64().unwrap(), first_id);

    // Ledger still holds a single request for the pair
    let response = client
        .get(format!("{}/requests/mine", BASE_URL))
        .header("Authorization", format!("Bearer {}", requester_token))
        .send()
        .await
        .expect("Failed to list sent requests");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["total"].as_i64().unwrap(), 1);
}

#[tokio::test]
#[ignore]
async fn test_cannot_request_own_item() {
    let client = Client::new();
    let (owner_token, _) = register_and_login(&client, "owner").await;
    let item_id = create_item(&client, &owner_token, "Drill").await;

    let (status, _body) = submit_request(&client, &owner_token, item_id).await;
    assert_eq!(status, 422);

    let response = client
        .get(format!("{}/requests/mine", BASE_URL))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await
        .expect("Failed to list sent requests");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["total"].as_i64().unwrap(), 0);
}

#[tokio::test]
#[ignore]
async fn test_accept_cascades_to_siblings_and_item_status() {
    let client = Client::new();
    let (alice_token, _) = register_and_login(&client, "alice").await;
    let (bob_token, bob_id) = register_and_login(&client, "bob").await;
    let (carol_token, _) = register_and_login(&client, "carol").await;
    let item_id = create_item(&client, &alice_token, "Tent").await;

    let (_, bob_body) = submit_request(&client, &bob_token, item_id).await;
    let bob_request_id = bob_body["request"]["id"].as_i64().unwrap();
    let (_, carol_body) = submit_request(&client, &carol_token, item_id).await;
    let carol_request_id = carol_body["request"]["id"].as_i64().unwrap();

    // Alice accepts Bob's request
    let response = client
        .post(format!("{}/requests/{}/accept", BASE_URL, bob_request_id))
        .header("Authorization", format!("Bearer {}", alice_token))
        .send()
        .await
        .expect("Failed to accept request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["request"]["status"], "Accepted");
    assert_eq!(body["request"]["requested_by_id"].as_i64().unwrap(), bob_id);

    // Carol's sibling request was rejected by the cascade
    let response = client
        .get(format!("{}/requests/{}", BASE_URL, carol_request_id))
        .header("Authorization", format!("Bearer {}", carol_token))
        .send()
        .await
        .expect("Failed to get request detail");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "Rejected");

    // Item marketplace status flipped to requested
    let response = client
        .get(format!("{}/items/{}", BASE_URL, item_id))
        .send()
        .await
        .expect("Failed to get item");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["item"]["status"], "requested");

    // Carol retries: her rejected record still blocks a new submission
    let (status, body) = submit_request(&client, &carol_token, item_id).await;
    assert_eq!(status, 200);
    assert_eq!(body["created"], false);
    assert_eq!(body["request"]["id"].as_i64().unwrap(), carol_request_id);
    assert_eq!(body["request"]["status"], "Rejected");
}

#[tokio::test]
#[ignore]
async fn test_new_request_allowed_after_acceptance() {
    let client = Client::new();
    let (owner_token, _) = register_and_login(&client, "owner").await;
    let (bob_token, _) = register_and_login(&client, "bob").await;
    let item_id = create_item(&client, &owner_token, "Bike").await;

    let (_, body) = submit_request(&client, &bob_token, item_id).await;
    let first_id = body["request"]["id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/requests/{}/accept", BASE_URL, first_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await
        .expect("Failed to accept request");
    assert!(response.status().is_success());

    // Accepted record frees the pair for a new cycle
    let (status, body) = submit_request(&client, &bob_token, item_id).await;
    assert_eq!(status, 201);
    assert_eq!(body["created"], true);
    assert_eq!(body["request"]["status"], "Pending");
    assert_ne!(body["request"]["id"].as_i64().unwrap(), first_id);
}

#[tokio::test]
#[ignore]
async fn test_only_owner_can_accept_or_reject() {
    let client = Client::new();
    let (owner_token, _) = register_and_login(&client, "owner").await;
    let (bob_token, _) = register_and_login(&client, "bob").await;
    let (mallory_token, _) = register_and_login(&client, "mallory").await;
    let item_id = create_item(&client, &owner_token, "Kayak").await;

    let (_, body) = submit_request(&client, &bob_token, item_id).await;
    let request_id = body["request"]["id"].as_i64().unwrap();

    for action in ["accept", "reject"] {
        let response = client
            .post(format!("{}/requests/{}/{}", BASE_URL, request_id, action))
            .header("Authorization", format!("Bearer {}", mallory_token))
            .send()
            .await
            .expect("Failed to send action");
        assert_eq!(response.status(), 403);
    }

    // Request is untouched
    let response = client
        .get(format!("{}/requests/{}", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", bob_token))
        .send()
        .await
        .expect("Failed to get request detail");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "Pending");
}

#[tokio::test]
#[ignore]
async fn test_accept_requires_pending_status() {
    let client = Client::new();
    let (owner_token, _) = register_and_login(&client, "owner").await;
    let (bob_token, _) = register_and_login(&client, "bob").await;
    let item_id = create_item(&client, &owner_token, "Chair").await;

    let (_, body) = submit_request(&client, &bob_token, item_id).await;
    let request_id = body["request"]["id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/requests/{}/reject", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await
        .expect("Failed to reject request");
    assert!(response.status().is_success());

    // A settled request cannot be accepted afterwards
    let response = client
        .post(format!("{}/requests/{}/accept", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await
        .expect("Failed to send accept");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_status_filter_and_unknown_filter_ignored() {
    let client = Client::new();
    let (owner_token, _) = register_and_login(&client, "owner").await;
    let (bob_token, _) = register_and_login(&client, "bob").await;
    let item_a = create_item(&client, &owner_token, "Lamp").await;
    let item_b = create_item(&client, &owner_token, "Desk").await;

    let (_, body) = submit_request(&client, &bob_token, item_a).await;
    let request_a = body["request"]["id"].as_i64().unwrap();
    submit_request(&client, &bob_token, item_b).await;

    let response = client
        .post(format!("{}/requests/{}/reject", BASE_URL, request_a))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await
        .expect("Failed to reject request");
    assert!(response.status().is_success());

    // Exact status match
    let response = client
        .get(format!("{}/requests?status=Pending", BASE_URL))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await
        .expect("Failed to list requests");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["total"].as_i64().unwrap(), 1);
    assert_eq!(body["items"][0]["status"], "Pending");

    // Unknown filter values are treated as no filter
    let response = client
        .get(format!("{}/requests?status=bogus", BASE_URL))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await
        .expect("Failed to list requests");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["total"].as_i64().unwrap(), 2);
}

#[tokio::test]
#[ignore]
async fn test_request_detail_hidden_from_third_parties() {
    let client = Client::new();
    let (owner_token, _) = register_and_login(&client, "owner").await;
    let (bob_token, _) = register_and_login(&client, "bob").await;
    let (eve_token, _) = register_and_login(&client, "eve").await;
    let item_id = create_item(&client, &owner_token, "Tools").await;

    let (_, body) = submit_request(&client, &bob_token, item_id).await;
    let request_id = body["request"]["id"].as_i64().unwrap();

    for token in [&owner_token, &bob_token] {
        let response = client
            .get(format!("{}/requests/{}", BASE_URL, request_id))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .expect("Failed to get detail");
        assert!(response.status().is_success());
    }

    let response = client
        .get(format!("{}/requests/{}", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", eve_token))
        .send()
        .await
        .expect("Failed to get detail");
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_pending_count_tracks_owner_items() {
    let client = Client::new();
    let (owner_token, _) = register_and_login(&client, "owner").await;
    let (bob_token, _) = register_and_login(&client, "bob").await;
    let item_id = create_item(&client, &owner_token, "Books").await;

    submit_request(&client, &bob_token, item_id).await;

    let response = client
        .get(format!("{}/requests/pending-count", BASE_URL))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await
        .expect("Failed to get pending count");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["pending_count"].as_i64().unwrap(), 1);
}

#[tokio::test]
#[ignore]
async fn test_price_rules_enforced() {
    let client = Client::new();
    let (owner_token, _) = register_and_login(&client, "owner").await;

    // Give-away with a price is rejected
    let response = client
        .post(format!("{}/items", BASE_URL))
        .header("Authorization", format!("Bearer {}", owner_token))
        .json(&json!({
            "title": "Free sofa",
            "description": "Slightly used",
            "item_type": "Share",
            "price": 10.0
        }))
        .send()
        .await
        .expect("Failed to send create item");
    assert_eq!(response.status(), 400);

    // Selling without a price is rejected
    let response = client
        .post(format!("{}/items", BASE_URL))
        .header("Authorization", format!("Bearer {}", owner_token))
        .json(&json!({
            "title": "Priced sofa",
            "description": "Slightly used",
            "item_type": "Sell"
        }))
        .send()
        .await
        .expect("Failed to send create item");
    assert_eq!(response.status(), 400);
}
