//! End-to-end API integration tests
//!
//! Each test boots the full axum router over a fresh in-memory ledger and
//! drives it through axum-test, asserting the response envelope, the stable
//! status codes, and the balance effects visible through the API itself:
//!
//! - Happy path payment and request/accept flows
//! - Decline flows and terminal-state enforcement
//! - Error conditions (insufficient funds, unknown ids, bad passwords)
//! - Friendship symmetry and user deletion

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use peerpay::api;
use peerpay::core::{LedgerEngine, LedgerStore};
use peerpay::notify::LogNotifier;

/// Boot the full router over a fresh in-memory ledger
fn server() -> TestServer {
    let store = LedgerStore::open_in_memory().expect("in-memory store");
    let engine = Arc::new(LedgerEngine::new(store, Box::new(LogNotifier::new())));
    TestServer::new(api::router(engine)).expect("test server")
}

/// Create a user through the API and return its assigned id
///
/// Every test user shares the password "pw" so later lookups can verify it.
async fn create_user(server: &TestServer, username: &str, balance: &str) -> i64 {
    let response = server
        .post("/api/users")
        .json(&json!({
            "name": username,
            "username": username,
            "email": format!("{}@example.com", username),
            "balance": balance,
            "password": "pw"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["success"], json!(true));
    body["data"]["id"].as_i64().expect("assigned user id")
}

/// Read a user's balance back through the get-user endpoint
async fn balance_of(server: &TestServer, id: i64) -> String {
    let response = server
        .get(&format!("/api/user/{}", id))
        .json(&json!({ "password": "pw" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    body["data"]["balance"]
        .as_str()
        .expect("balance serialized as a decimal string")
        .to_string()
}

/// Create a transaction and return the response
async fn post_transaction(
    server: &TestServer,
    sender: i64,
    receiver: i64,
    amount: i64,
    accepted: Value,
) -> axum_test::TestResponse {
    server
        .post("/api/transactions")
        .json(&json!({
            "sender_id": sender,
            "receiver_id": receiver,
            "amount": amount,
            "message": "test",
            "accepted": accepted
        }))
        .await
}

#[tokio::test]
async fn test_create_user_returns_profile_without_credentials() {
    let server = server();

    let response = server
        .post("/api/users")
        .json(&json!({
            "name": "Ada",
            "username": "ada",
            "email": "ada@example.com",
            "balance": "100.50",
            "password": "pw"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["username"], "ada");
    assert_eq!(body["data"]["balance"], "100.50");
    assert_eq!(body["data"]["transactions"], json!([]));
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_list_users_returns_public_summaries() {
    let server = server();
    create_user(&server, "ada", "100").await;
    create_user(&server, "bob", "50").await;

    let response = server.get("/api/users").await;
    response.assert_status_ok();

    let body: Value = response.json();
    let listed = body["data"].as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["username"], "ada");
    // Summaries carry no balance or email
    assert!(listed[0].get("balance").is_none());
    assert!(listed[0].get("email").is_none());
}

#[tokio::test]
async fn test_get_user_verifies_password() {
    let server = server();
    let ada = create_user(&server, "ada", "100").await;

    let response = server
        .get(&format!("/api/user/{}", ada))
        .json(&json!({ "password": "wrong" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let body: Value = response.json();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], "Incorrect password");
}

#[tokio::test]
async fn test_get_unknown_user_is_not_found() {
    let server = server();

    let response = server
        .get("/api/user/99")
        .json(&json!({ "password": "pw" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let body: Value = response.json();
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_delete_user_returns_snapshot_then_not_found() {
    let server = server();
    let ada = create_user(&server, "ada", "100").await;

    let response = server.delete(&format!("/api/user/{}", ada)).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["username"], "ada");

    let response = server
        .get(&format!("/api/user/{}", ada))
        .json(&json!({ "password": "pw" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_payment_settles_immediately() {
    let server = server();
    let ada = create_user(&server, "ada", "100").await;
    let bob = create_user(&server, "bob", "50").await;

    let response = post_transaction(&server, ada, bob, 30, json!(true)).await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["data"]["accepted"], json!(true));

    assert_eq!(balance_of(&server, ada).await, "70");
    assert_eq!(balance_of(&server, bob).await, "80");
}

#[tokio::test]
async fn test_request_moves_no_funds_until_accepted() {
    let server = server();
    let ada = create_user(&server, "ada", "100").await;
    let bob = create_user(&server, "bob", "50").await;

    let response = post_transaction(&server, ada, bob, 30, json!(null)).await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["data"]["accepted"], json!(null));
    let tx = body["data"]["id"].as_i64().unwrap();

    assert_eq!(balance_of(&server, ada).await, "100");
    assert_eq!(balance_of(&server, bob).await, "50");

    let response = server
        .post(&format!("/api/transaction/{}", tx))
        .json(&json!({ "accepted": true }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["accepted"], json!(true));

    assert_eq!(balance_of(&server, ada).await, "70");
    assert_eq!(balance_of(&server, bob).await, "80");
}

#[tokio::test]
async fn test_declined_request_leaves_balances_untouched() {
    let server = server();
    let ada = create_user(&server, "ada", "100").await;
    let bob = create_user(&server, "bob", "50").await;

    let body: Value = post_transaction(&server, ada, bob, 30, json!(null))
        .await
        .json();
    let tx = body["data"]["id"].as_i64().unwrap();

    let response = server
        .post(&format!("/api/transaction/{}", tx))
        .json(&json!({ "accepted": false }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["accepted"], json!(false));

    assert_eq!(balance_of(&server, ada).await, "100");
    assert_eq!(balance_of(&server, bob).await, "50");
}

#[tokio::test]
async fn test_insufficient_funds_creates_nothing() {
    let server = server();
    let ada = create_user(&server, "ada", "10").await;
    let bob = create_user(&server, "bob", "0").await;

    let response = post_transaction(&server, ada, bob, 50, json!(true)).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["success"], json!(false));
    assert_eq!(
        body["error"],
        format!(
            "Insufficient funds for user {}: available 10, requested 50",
            ada
        )
    );

    assert_eq!(balance_of(&server, ada).await, "10");

    // No record was created
    let response = server
        .get(&format!("/api/user/{}", ada))
        .json(&json!({ "password": "pw" }))
        .await;
    let body: Value = response.json();
    assert_eq!(body["data"]["transactions"], json!([]));
}

#[tokio::test]
async fn test_non_positive_amount_is_rejected() {
    let server = server();
    let ada = create_user(&server, "ada", "100").await;
    let bob = create_user(&server, "bob", "50").await;

    let response = post_transaction(&server, ada, bob, 0, json!(true)).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_transaction_with_unknown_party_is_not_found() {
    let server = server();
    let ada = create_user(&server, "ada", "100").await;

    let response = post_transaction(&server, ada, 99, 10, json!(true)).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_resolving_twice_is_rejected() {
    let server = server();
    let ada = create_user(&server, "ada", "100").await;
    let bob = create_user(&server, "bob", "50").await;

    let body: Value = post_transaction(&server, ada, bob, 30, json!(null))
        .await
        .json();
    let tx = body["data"]["id"].as_i64().unwrap();

    server
        .post(&format!("/api/transaction/{}", tx))
        .json(&json!({ "accepted": true }))
        .await
        .assert_status_ok();

    // Terminal state: the second decision is rejected and changes nothing
    let response = server
        .post(&format!("/api/transaction/{}", tx))
        .json(&json!({ "accepted": false }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], format!("Transaction {} is already accepted", tx));

    assert_eq!(balance_of(&server, ada).await, "70");
    assert_eq!(balance_of(&server, bob).await, "80");
}

#[tokio::test]
async fn test_resolve_unknown_transaction_is_not_found() {
    let server = server();

    let response = server
        .post("/api/transaction/77")
        .json(&json!({ "accepted": true }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_user_embeds_transaction_history() {
    let server = server();
    let ada = create_user(&server, "ada", "100").await;
    let bob = create_user(&server, "bob", "50").await;
    post_transaction(&server, ada, bob, 30, json!(true)).await;
    post_transaction(&server, bob, ada, 5, json!(null)).await;

    let response = server
        .get(&format!("/api/user/{}", ada))
        .json(&json!({ "password": "pw" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let history = body["data"]["transactions"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["amount"], "30");
    assert_eq!(history[1]["accepted"], json!(null));
}

#[tokio::test]
async fn test_friendship_is_symmetric() {
    let server = server();
    let ada = create_user(&server, "ada", "0").await;
    let bob = create_user(&server, "bob", "0").await;

    let response = server
        .post(&format!("/api/user/{}/friend/{}", ada, bob))
        .await;
    response.assert_status(StatusCode::CREATED);

    for (user, friend) in [(ada, "bob"), (bob, "ada")] {
        let response = server.get(&format!("/api/user/{}/friends", user)).await;
        response.assert_status_ok();
        let body: Value = response.json();
        let friends = body["data"].as_array().unwrap();
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0]["username"], friend);
    }
}

#[tokio::test]
async fn test_befriending_unknown_user_is_not_found() {
    let server = server();
    let ada = create_user(&server, "ada", "0").await;

    let response = server
        .post(&format!("/api/user/{}/friend/99", ada))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}
