use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use serde_json::{json, Value};
use shop_hex::application::payment_kickoff::PaymentKickoff;
use shop_hex::application::EntityService;
use shop_hex::inbound::http::{resource_routes, HttpServer, HttpServerConfig};
use shop_repo::Repository;
use shop_types::domain::order::Order;
use shop_types::domain::user::User;
use shop_types::ports::upstream::{PaymentGateway, PaymentRequest, UpstreamError};

fn find_free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

async fn spawn_server(api: Router) -> (String, tokio::task::JoinHandle<()>) {
    let port = find_free_port();
    let config = HttpServerConfig {
        port: port.to_string(),
    };
    let server = HttpServer::new(api, config).await.unwrap();
    let handle = tokio::spawn(async move {
        server.run().await.expect("server run");
    });

    // Give the server a moment to start.
    tokio::time::sleep(Duration::from_millis(50)).await;
    (format!("http://127.0.0.1:{}", port), handle)
}

fn users_api() -> Router {
    let repo = Arc::new(Repository::<User>::in_memory());
    resource_routes(Arc::new(EntityService::<User>::new(repo)))
}

struct StaticGateway {
    accept: bool,
}

#[async_trait]
impl PaymentGateway for StaticGateway {
    async fn request_payment(&self, _request: &PaymentRequest) -> Result<(), UpstreamError> {
        if self.accept {
            Ok(())
        } else {
            Err(UpstreamError::Transport("payments offline".into()))
        }
    }
}

fn orders_api(accept: bool) -> Router {
    let repo = Arc::new(Repository::<Order>::in_memory());
    let kickoff = PaymentKickoff::new(repo.clone(), Arc::new(StaticGateway { accept }));
    let service = EntityService::<Order>::new(repo).with_hook(Arc::new(kickoff));
    resource_routes(Arc::new(service))
}

async fn wait_for_status(client: &reqwest::Client, url: &str, expected: &str) -> Value {
    for _ in 0..50 {
        let body: Value = client.get(url).send().await.unwrap().json().await.unwrap();
        if body["status"] == expected {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("status never became {expected}");
}

#[tokio::test]
async fn health_reports_ok() {
    let (addr, handle) = spawn_server(users_api()).await;
    let res = reqwest::get(format!("{}/health", addr)).await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "OK");
    handle.abort();
}

#[tokio::test]
async fn user_crud_over_http() {
    let (addr, handle) = spawn_server(users_api()).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/users", addr))
        .json(&json!({"first_name":"Jane","last_name":"Doe","email":"jane@x.com","age":30}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["id"], 1);
    assert!(created.get("status").is_none());
    assert_eq!(created["created_at"], created["updated_at"]);

    let fetched: Value = client
        .get(format!("{}/api/users/1", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, created);

    let res = client
        .put(format!("{}/api/users/1", addr))
        .json(&json!({"age": 31}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["age"], 31);
    assert_eq!(updated["email"], "jane@x.com");

    let list: Vec<Value> = client
        .get(format!("{}/api/users", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.len(), 1);

    let exists: Value = client
        .get(format!("{}/api/users/1/exists", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(exists, json!({"exists": true}));

    let res = client
        .delete(format!("{}/api/users/1", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NO_CONTENT);
    assert!(res.bytes().await.unwrap().is_empty());

    let res = client
        .get(format!("{}/api/users/1", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);

    let exists: Value = client
        .get(format!("{}/api/users/1/exists", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(exists, json!({"exists": false}));

    handle.abort();
}

#[tokio::test]
async fn bad_request_and_not_found_paths() {
    let (addr, handle) = spawn_server(users_api()).await;
    let client = reqwest::Client::new();
    let users = format!("{}/api/users", addr);

    for email in ["ab", "@ab", "ab@", "a@@b"] {
        let res = client
            .post(&users)
            .json(&json!({"first_name":"A","last_name":"B","email":email,"age":20}))
            .send()
            .await
            .unwrap();
        assert_eq!(
            res.status(),
            reqwest::StatusCode::UNPROCESSABLE_ENTITY,
            "email {email}"
        );
    }

    let ok = json!({"first_name":"A","last_name":"B","email":"a@b","age":20});
    let res = client.post(&users).json(&ok).send().await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    let res = client.post(&users).json(&ok).send().await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);

    let res = client
        .post(&users)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);

    let res = client
        .post(&users)
        .json(&json!({"first_name":"A"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);

    let res = client
        .get(format!("{}/abc", users))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);

    let res = client
        .get(format!("{}/999", users))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "user 999 not found");

    let res = client
        .put(format!("{}/999", users))
        .json(&json!({"age": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);

    handle.abort();
}

#[tokio::test]
async fn order_payment_outcome_becomes_visible() {
    let (addr, handle) = spawn_server(orders_api(true)).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/orders", addr))
        .json(&json!({"user_id":1,"items":["a","b"]}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["status"], "created");
    assert_eq!(created["id"], 1);

    let settled = wait_for_status(
        &client,
        &format!("{}/api/orders/1", addr),
        "payment_pending",
    )
    .await;
    assert_eq!(settled["items"], json!(["a", "b"]));

    handle.abort();
}

#[tokio::test]
async fn unreachable_payments_marks_order_failed() {
    let (addr, handle) = spawn_server(orders_api(false)).await;
    let client = reqwest::Client::new();

    client
        .post(format!("{}/api/orders", addr))
        .json(&json!({"user_id":1,"items":["a"]}))
        .send()
        .await
        .unwrap();
    wait_for_status(
        &client,
        &format!("{}/api/orders/1", addr),
        "payment_failed",
    )
    .await;

    handle.abort();
}

#[tokio::test]
async fn user_scoped_order_routes() {
    let (addr, handle) = spawn_server(orders_api(true)).await;
    let client = reqwest::Client::new();
    let orders = format!("{}/api/orders", addr);

    for user_id in [1, 2, 1] {
        let res = client
            .post(&orders)
            .json(&json!({"user_id": user_id, "items": ["x"], "amount": 5.0}))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    }

    let mine: Vec<Value> = client
        .get(format!("{}/user/1", orders))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ids: Vec<i64> = mine.iter().map(|o| o["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![1, 3]);

    let res = client
        .put(format!("{}/2", orders))
        .json(&json!({"status": "shipped"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);

    let res = client
        .put(format!("{}/2", orders))
        .json(&json!({"status": "cancelled"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);

    let res = client
        .delete(format!("{}/user/1", orders))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NO_CONTENT);

    let mine: Vec<Value> = client
        .get(format!("{}/user/1", orders))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(mine.is_empty());

    let res = client
        .delete(format!("{}/user/1", orders))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NO_CONTENT);

    handle.abort();
}
