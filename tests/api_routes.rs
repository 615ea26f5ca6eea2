// Router-level tests: requests driven through the API with an in-memory store.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use paldex_backend::api;
use paldex_backend::gateway::{MemoryStore, StoreGateway, StorePath};
use paldex_backend::models::GenderDomain;
use paldex_backend::service::PalService;

fn seeded_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_nodes([
        (
            StorePath::Species,
            json!([
                {"Name": "Lamball", "ImageUrl": "https://img/lamball.png"},
                {"Name": "Cattiva", "ImageUrl": "https://img/cattiva.png"},
                {"Name": "Foxparks", "ImageUrl": "https://img/foxparks.png"}
            ]),
        ),
        (
            StorePath::Traits,
            json!([
                {"Name": "Swift", "Effect": "+30% movement speed", "Tier": 3},
                {"Name": "Lucky", "Effect": "+15% attack", "Tier": 3},
                {"Name": "Legend", "Effect": "+20% attack", "Tier": 3}
            ]),
        ),
    ]))
}

fn app(store: Arc<MemoryStore>) -> Router {
    api::router(Arc::new(PalService::new(store, GenderDomain::Short)))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn add(app: &Router, name: &str, gender: &str, skills: &[&str]) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/api/add-pal",
        Some(json!({ "name": name, "gender": gender, "passive_skills": skills })),
    )
    .await
}

#[tokio::test]
async fn test_add_then_list() {
    let app = app(seeded_store());

    let (status, body) = add(&app, "lamball", "m", &["Swift"]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["passive_skills"], json!(["Swift"]));

    let (status, body) = send(&app, Method::GET, "/api/pals", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{
            "id": 1,
            "name": "lamball",
            "image_url": "https://img/lamball.png",
            "gender": "m",
            "passive_skills": [{"name": "Swift"}]
        }])
    );
}

#[tokio::test]
async fn test_add_validation_errors() {
    let store = seeded_store();
    let app = app(store.clone());

    let (status, body) = add(&app, "Pikachu", "m", &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid pal name: Pikachu");

    let (status, body) = add(&app, "Lamball", "male", &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid gender: male. Must be 'm' or 'f'");

    let (status, body) = add(&app, "Lamball", "f", &["Swift", "Bogus", "AlsoBogus"]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid passive skill: Bogus");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/add-pal",
        Some(json!({ "name": "Lamball", "gender": "f" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Missing required fields: name, gender, passive_skills"
    );

    // Nothing was written by any of the rejected requests.
    assert!(store
        .read(StorePath::StoredRecords)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_remove_renumbers_and_drops_empty_species() {
    let store = seeded_store();
    let app = app(store.clone());
    add(&app, "Lamball", "m", &["Swift"]).await;
    add(&app, "Lamball", "f", &["Lucky"]).await;
    add(&app, "Lamball", "m", &["Legend"]).await;
    add(&app, "Cattiva", "f", &[]).await;

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/api/remove-pal",
        Some(json!({ "name": "LAMBALL", "id": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/api/remove-pal",
        Some(json!({ "name": "cattiva", "id": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let raw = store.read(StorePath::StoredRecords).await.unwrap().unwrap();
    assert_eq!(
        raw,
        json!([{
            "Name": "Lamball",
            "StoredPals": [
                {"ID": 1, "Gender": "f", "PassiveSkills": ["Lucky"]},
                {"ID": 2, "Gender": "m", "PassiveSkills": ["Legend"]}
            ]
        }])
    );
}

#[tokio::test]
async fn test_remove_errors() {
    let app = app(seeded_store());
    add(&app, "Lamball", "m", &[]).await;

    let (status, body) = send(
        &app,
        Method::DELETE,
        "/api/remove-pal",
        Some(json!({ "name": "Lamball", "id": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Pal not found: Lamball #5");

    let (status, body) = send(
        &app,
        Method::DELETE,
        "/api/remove-pal",
        Some(json!({ "name": "Lamball" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name and id are required");
}

#[tokio::test]
async fn test_malformed_bodies_are_invalid_input() {
    let app = app(seeded_store());
    add(&app, "Lamball", "m", &[]).await;

    for id in [json!("1"), json!(-1), json!(1.5)] {
        let (status, body) = send(
            &app,
            Method::DELETE,
            "/api/remove-pal",
            Some(json!({ "name": "Lamball", "id": id })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "id {id}");
        assert!(body["error"].is_string());
    }

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/add-pal",
        Some(json!({ "name": "Lamball", "gender": "m", "passive_skills": "Swift" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/import")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Nothing was removed or added along the way.
    let (_, pals) = send(&app, Method::GET, "/api/pals", None).await;
    assert_eq!(pals.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_filters() {
    let app = app(seeded_store());
    add(&app, "Lamball", "m", &["Swift", "Lucky"]).await;
    add(&app, "Lamball", "f", &["Swift"]).await;
    add(&app, "Foxparks", "f", &["Lucky"]).await;

    let (_, body) = send(&app, Method::GET, "/api/pals?name=FOX", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "Foxparks");

    let (_, body) = send(&app, Method::GET, "/api/pals?skills=swift,luck", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], 1);
    assert_eq!(body[0]["name"], "Lamball");

    let (_, body) = send(&app, Method::GET, "/api/pals?name=lamb&skills=swift", None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_options() {
    let app = app(seeded_store());

    let (status, body) = send(&app, Method::GET, "/api/options/pal-species", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["Lamball", "Cattiva", "Foxparks"]));

    let (_, body) = send(&app, Method::GET, "/api/options/passive-skills", None).await;
    assert_eq!(body, json!(["Swift", "Lucky", "Legend"]));

    let (_, body) = send(&app, Method::GET, "/api/options/passive-skill-combos", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_import_round() {
    let app = app(Arc::new(MemoryStore::new()));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/import",
        Some(json!({ "source": "scrape" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("upload"));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/import",
        Some(json!({
            "source": "upload",
            "data": {
                "pals": [{"name": "Lamball", "imageUrl": "l.png"}],
                "passive_skills": [{"name": "Swift", "effect": "fast", "tier": 3}],
                "passive_skill_combos": [],
                "stored_pals": []
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["imported"]["pals"], 1);
    assert_eq!(body["imported"]["passiveSkills"], 1);

    let (status, _) = add(&app, "Lamball", "m", &["swift"]).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/api/import", None).await;
    assert_eq!(body["counts"]["storedPals"], 1);
}

#[tokio::test]
async fn test_word_gender_deployment() {
    let app = api::router(Arc::new(PalService::new(seeded_store(), GenderDomain::Word)));

    let (status, _) = add(&app, "Lamball", "m", &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = add(&app, "Lamball", "female", &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["gender"], "female");

    let (_, body) = send(&app, Method::GET, "/api/pals", None).await;
    assert_eq!(body[0]["gender"], "female");
}
