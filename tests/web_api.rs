//! HTTP surface tests: envelope shape, validation mapping, auth gate.
//!
//! The app is driven in-process with `tower::ServiceExt::oneshot`; each
//! test gets a fresh database from `#[sqlx::test]`.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use turnero_core::config::TurneroConfig;
use turnero_core::models::{NewWorkshop, Workshop};
use turnero_core::web::{self, state::AppState};

fn test_config() -> TurneroConfig {
    TurneroConfig {
        api_token: None,
        ..TurneroConfig::default()
    }
}

fn app(pool: &PgPool, config: TurneroConfig) -> Router {
    web::create_app(AppState::new(pool.clone(), config))
}

async fn create_workshop(pool: &PgPool, capacity: i32) -> Workshop {
    Workshop::create(
        pool,
        NewWorkshop {
            name: "Taller Norte".to_string(),
            address: None,
            logo: None,
            capacity,
        },
    )
    .await
    .expect("workshop creation failed")
}

fn turn_body(plate: &str) -> Value {
    json!({
        "nombreCliente": "Ana García",
        "telefono": "1122334455",
        "modeloVehiculo": "Corsa",
        "patente": plate,
        "descripcionProblema": "no arranca",
    })
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[sqlx::test(migrations = "./migrations")]
async fn create_turn_wraps_payload_in_envelope(pool: PgPool) {
    let workshop = create_workshop(&pool, 2).await;
    let app = app(&pool, test_config());

    let uri = format!("/v1/workshops/{}/turns", workshop.id);
    let (status, body) = send(app, post_json(&uri, &turn_body("ABC123"))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["error"], Value::Null);
    assert_eq!(body["data"]["numeroTurno"], json!(1));
    assert_eq!(body["data"]["estado"], json!("IN_SERVICE"));
}

#[sqlx::test(migrations = "./migrations")]
async fn create_turn_validates_input(pool: PgPool) {
    let workshop = create_workshop(&pool, 2).await;
    let uri = format!("/v1/workshops/{}/turns", workshop.id);

    let mut bad_phone = turn_body("ABC123");
    bad_phone["telefono"] = json!("11-2233");
    let (status, body) = send(app(&pool, test_config()), post_json(&uri, &bad_phone)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));

    let mut short_name = turn_body("ABC123");
    short_name["nombreCliente"] = json!("A");
    let (status, _) = send(app(&pool, test_config()), post_json(&uri, &short_name)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn create_turn_unknown_workshop_is_404(pool: PgPool) {
    let app = app(&pool, test_config());

    let (status, body) = send(
        app,
        post_json("/v1/workshops/424242/turns", &turn_body("ABC123")),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_plate_conflict_carries_turn_number(pool: PgPool) {
    let workshop = create_workshop(&pool, 2).await;
    let uri = format!("/v1/workshops/{}/turns", workshop.id);

    send(app(&pool, test_config()), post_json(&uri, &turn_body("ABC123"))).await;
    let (status, body) =
        send(app(&pool, test_config()), post_json(&uri, &turn_body("abc123"))).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["data"]["numeroTurno"], json!(1));
}

#[sqlx::test(migrations = "./migrations")]
async fn status_board_splits_queue_by_state(pool: PgPool) {
    let workshop = create_workshop(&pool, 1).await;
    let turns_uri = format!("/v1/workshops/{}/turns", workshop.id);

    send(app(&pool, test_config()), post_json(&turns_uri, &turn_body("AAA111"))).await;
    send(app(&pool, test_config()), post_json(&turns_uri, &turn_body("BBB222"))).await;

    let status_uri = format!("/v1/workshops/{}/status", workshop.id);
    let request = Request::builder().uri(&status_uri).body(Body::empty()).unwrap();
    let (status, body) = send(app(&pool, test_config()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["taller"], json!("Taller Norte"));
    assert_eq!(body["data"]["capacidad"], json!(1));
    assert_eq!(body["data"]["enTaller"][0]["numeroTurno"], json!(1));
    assert_eq!(body["data"]["enTaller"][0]["estado"], json!("IN_SERVICE"));
    assert_eq!(body["data"]["enEspera"][0]["numeroTurno"], json!(2));
}

#[sqlx::test(migrations = "./migrations")]
async fn admin_routes_require_token_when_configured(pool: PgPool) {
    let workshop = create_workshop(&pool, 1).await;
    let config = TurneroConfig {
        api_token: Some("secreto".to_string()),
        ..TurneroConfig::default()
    };

    let list_uri = format!("/v1/workshops/{}/turns?patente=abc", workshop.id);

    let bare = Request::builder().uri(&list_uri).body(Body::empty()).unwrap();
    let (status, body) = send(app(&pool, config.clone()), bare).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));

    let wrong = Request::builder()
        .uri(&list_uri)
        .header(header::AUTHORIZATION, "Bearer nope")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app(&pool, config.clone()), wrong).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let good = Request::builder()
        .uri(&list_uri)
        .header(header::AUTHORIZATION, "Bearer secreto")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(&pool, config), good).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["turnos"], json!([]));

    // Public creation stays open
    let turns_uri = format!("/v1/workshops/{}/turns", workshop.id);
    let config = TurneroConfig {
        api_token: Some("secreto".to_string()),
        ..TurneroConfig::default()
    };
    let (status, _) = send(app(&pool, config), post_json(&turns_uri, &turn_body("ABC123"))).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[sqlx::test(migrations = "./migrations")]
async fn finalize_maps_state_conflict_to_409(pool: PgPool) {
    let workshop = create_workshop(&pool, 1).await;
    let turns_uri = format!("/v1/workshops/{}/turns", workshop.id);

    send(app(&pool, test_config()), post_json(&turns_uri, &turn_body("AAA111"))).await;
    let (_, body) =
        send(app(&pool, test_config()), post_json(&turns_uri, &turn_body("BBB222"))).await;
    let waiting_id = body["data"]["id"].as_i64().unwrap();

    let finalize_uri = format!("/v1/turns/{waiting_id}/finalize");
    let request = Request::builder()
        .method("POST")
        .uri(&finalize_uri)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(&pool, test_config()), request).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], json!(false));

    let missing = Request::builder()
        .method("POST")
        .uri("/v1/turns/424242/finalize")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app(&pool, test_config()), missing).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn cancel_by_plate_is_public(pool: PgPool) {
    let workshop = create_workshop(&pool, 1).await;
    let turns_uri = format!("/v1/workshops/{}/turns", workshop.id);
    send(app(&pool, test_config()), post_json(&turns_uri, &turn_body("ABC123"))).await;

    let cancel_uri = format!("/v1/workshops/{}/turns/cancel-by-plate", workshop.id);
    let (status, body) = send(
        app(&pool, test_config()),
        post_json(&cancel_uri, &json!({ "patente": "abc123" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["numeroTurno"], json!(1));

    // Nothing left to cancel for that plate
    let (status, _) = send(
        app(&pool, test_config()),
        post_json(&cancel_uri, &json!({ "patente": "ABC123" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn health_endpoint_reports_ok(pool: PgPool) {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(app(&pool, test_config()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["status"], json!("ok"));
}
