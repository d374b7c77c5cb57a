use serde_json::{json, Value};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use std::net::TcpListener;
use switch_controller::auth::{hash_password, TokenService};
use switch_controller::configuration::{get_configuration, DatabaseSettings};
use switch_controller::startup::run;

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
    pub access_token: String,
}

/// Spawn the app with a seeded admin user and log in as that user.
async fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let mut configuration = get_configuration().expect("Failed to read configuration.");
    configuration.database.database_name = uuid::Uuid::new_v4().to_string();
    let connection_pool = configure_database(&configuration.database).await;

    let token_service =
        TokenService::from_settings(&configuration.jwt).expect("Failed to build token service");
    let server = run(listener, connection_pool.clone(), token_service)
        .expect("Failed to bind address");
    let _ = tokio::spawn(server);

    let password_hash = hash_password("AdminPw123").expect("Failed to hash seed password");
    sqlx::query(
        r#"
        INSERT INTO users (user_name, user_role_id, password_hash)
        VALUES ('admin', (SELECT role_id FROM roles WHERE role_name = 'admin'), $1)
        "#,
    )
    .bind(password_hash)
    .execute(&connection_pool)
    .await
    .expect("Failed to seed admin user");

    let login_body: Value = reqwest::Client::new()
        .post(&format!("{}/auth/login", &address))
        .form(&[("username", "admin"), ("password", "AdminPw123")])
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .expect("Failed to parse login response");
    let access_token = login_body["access_token"]
        .as_str()
        .expect("No access token in response")
        .to_string();

    TestApp {
        address,
        db_pool: connection_pool,
        access_token,
    }
}

pub async fn configure_database(config: &DatabaseSettings) -> PgPool {
    let mut connection = PgConnection::connect(&config.connection_string_without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, config.database_name))
        .await
        .expect("Failed to create database.");

    let connection_pool = PgPool::connect(&config.connection_string())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database.");
    connection_pool
}

impl TestApp {
    fn client(&self) -> reqwest::Client {
        reqwest::Client::new()
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

// --- Users ---

#[tokio::test]
async fn created_user_appears_in_the_user_list() {
    let app = spawn_app().await;

    let response = app
        .client()
        .post(&format!("{}/users", &app.address))
        .header("Authorization", app.auth_header())
        .json(&json!({
            "user_name": "Bob",
            "role_name": "operator",
            "password": "OperatorPw1"
        }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(201, response.status().as_u16());

    let names: Vec<String> = app
        .client()
        .get(&format!("{}/users", &app.address))
        .header("Authorization", app.auth_header())
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .expect("Failed to parse response");

    // stored lowercased
    assert_eq!(names, vec!["admin".to_string(), "bob".to_string()]);
}

#[tokio::test]
async fn created_user_can_log_in() {
    let app = spawn_app().await;

    app.client()
        .post(&format!("{}/users", &app.address))
        .header("Authorization", app.auth_header())
        .json(&json!({
            "user_name": "bob",
            "role_name": "operator",
            "password": "OperatorPw1"
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    let response = app
        .client()
        .post(&format!("{}/auth/login", &app.address))
        .form(&[("username", "bob"), ("password", "OperatorPw1")])
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn create_user_with_unknown_role_returns_404() {
    let app = spawn_app().await;

    let response = app
        .client()
        .post(&format!("{}/users", &app.address))
        .header("Authorization", app.auth_header())
        .json(&json!({
            "user_name": "bob",
            "role_name": "wizard",
            "password": "OperatorPw1"
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn create_duplicate_user_returns_409() {
    let app = spawn_app().await;

    let body = json!({
        "user_name": "bob",
        "role_name": "operator",
        "password": "OperatorPw1"
    });

    let first = app
        .client()
        .post(&format!("{}/users", &app.address))
        .header("Authorization", app.auth_header())
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(201, first.status().as_u16());

    let second = app
        .client()
        .post(&format!("{}/users", &app.address))
        .header("Authorization", app.auth_header())
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(409, second.status().as_u16());
}

#[tokio::test]
async fn create_user_rejects_invalid_input() {
    let app = spawn_app().await;

    let bad_requests = vec![
        (
            json!({"user_name": "", "role_name": "operator", "password": "OperatorPw1"}),
            "empty user name",
        ),
        (
            json!({"user_name": "bob smith", "role_name": "operator", "password": "OperatorPw1"}),
            "whitespace in user name",
        ),
        (
            json!({"user_name": "bob", "role_name": "operator", "password": "weak"}),
            "weak password",
        ),
    ];

    for (body, reason) in bad_requests {
        let response = app
            .client()
            .post(&format!("{}/users", &app.address))
            .header("Authorization", app.auth_header())
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(
            400,
            response.status().as_u16(),
            "Should reject request: {}",
            reason
        );
    }
}

#[tokio::test]
async fn update_user_changes_the_password() {
    let app = spawn_app().await;

    app.client()
        .post(&format!("{}/users", &app.address))
        .header("Authorization", app.auth_header())
        .json(&json!({
            "user_name": "bob",
            "role_name": "operator",
            "password": "OperatorPw1"
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    let response = app
        .client()
        .put(&format!("{}/users/bob", &app.address))
        .header("Authorization", app.auth_header())
        .json(&json!({"role_name": "observer", "password": "NewerPw123"}))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());

    let old_login = app
        .client()
        .post(&format!("{}/auth/login", &app.address))
        .form(&[("username", "bob"), ("password", "OperatorPw1")])
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, old_login.status().as_u16());

    let new_login = app
        .client()
        .post(&format!("{}/auth/login", &app.address))
        .form(&[("username", "bob"), ("password", "NewerPw123")])
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, new_login.status().as_u16());
}

#[tokio::test]
async fn update_unknown_user_returns_404() {
    let app = spawn_app().await;

    let response = app
        .client()
        .put(&format!("{}/users/nobody", &app.address))
        .header("Authorization", app.auth_header())
        .json(&json!({"role_name": "observer", "password": "NewerPw123"}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn delete_user_returns_204_then_404() {
    let app = spawn_app().await;

    app.client()
        .post(&format!("{}/users", &app.address))
        .header("Authorization", app.auth_header())
        .json(&json!({
            "user_name": "bob",
            "role_name": "operator",
            "password": "OperatorPw1"
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    let first = app
        .client()
        .delete(&format!("{}/users/bob", &app.address))
        .header("Authorization", app.auth_header())
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(204, first.status().as_u16());

    let second = app
        .client()
        .delete(&format!("{}/users/bob", &app.address))
        .header("Authorization", app.auth_header())
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(404, second.status().as_u16());
}

// --- Roles ---

#[tokio::test]
async fn roles_list_contains_the_seeded_reference_set() {
    let app = spawn_app().await;

    let roles: Vec<Value> = app
        .client()
        .get(&format!("{}/roles", &app.address))
        .header("Authorization", app.auth_header())
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .expect("Failed to parse response");

    let names: Vec<&str> = roles
        .iter()
        .map(|r| r["role_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["admin", "operator", "observer"]);
}

// --- Downtime ---

#[tokio::test]
async fn downtime_create_list_delete_round_trip() {
    let app = spawn_app().await;

    let create = app
        .client()
        .post(&format!("{}/downtime", &app.address))
        .header("Authorization", app.auth_header())
        .json(&json!({
            "start_time": "2026-09-01T18:00:00Z",
            "end_time": "2026-09-01T22:00:00Z",
            "comment": "Laser maintenance"
        }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(201, create.status().as_u16());

    let records: Vec<Value> = app
        .client()
        .get(&format!("{}/downtime", &app.address))
        .header("Authorization", app.auth_header())
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["comment"], "Laser maintenance");
    let downtime_id = records[0]["downtime_id"].as_i64().unwrap();

    let delete = app
        .client()
        .delete(&format!("{}/downtime/{}", &app.address, downtime_id))
        .header("Authorization", app.auth_header())
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(204, delete.status().as_u16());
}

#[tokio::test]
async fn downtime_with_inverted_window_returns_400() {
    let app = spawn_app().await;

    let response = app
        .client()
        .post(&format!("{}/downtime", &app.address))
        .header("Authorization", app.auth_header())
        .json(&json!({
            "start_time": "2026-09-01T22:00:00Z",
            "end_time": "2026-09-01T18:00:00Z",
            "comment": "backwards"
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn delete_unknown_downtime_returns_404() {
    let app = spawn_app().await;

    let response = app
        .client()
        .delete(&format!("{}/downtime/999", &app.address))
        .header("Authorization", app.auth_header())
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn downtime_is_attributed_to_the_authenticated_user() {
    let app = spawn_app().await;

    app.client()
        .post(&format!("{}/downtime", &app.address))
        .header("Authorization", app.auth_header())
        .json(&json!({
            "start_time": "2026-09-02T00:00:00Z",
            "end_time": "2026-09-02T04:00:00Z",
            "comment": "Telescope alignment"
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    let (user_id,): (i32,) =
        sqlx::query_as("SELECT user_id FROM downtime WHERE comment = 'Telescope alignment'")
            .fetch_one(&app.db_pool)
            .await
            .expect("Failed to fetch downtime record");

    let (admin_id,): (i32,) = sqlx::query_as("SELECT user_id FROM users WHERE user_name = 'admin'")
        .fetch_one(&app.db_pool)
        .await
        .expect("Failed to fetch admin user");

    assert_eq!(user_id, admin_id);
}
