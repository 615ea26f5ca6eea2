// HTTP API routes (pal store, option lists, bulk import).

use axum::{
    extract::{rejection::JsonRejection, Json, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::catalog::{species_names, trait_names};
use crate::error::PalError;
use crate::metrics;
use crate::models::{AddPalRequest, ImportRequest, RemovePalRequest};
use crate::service::PalService;

// ── Request types ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ListPalsParams {
    /// Substring of the species name.
    pub name: Option<String>,
    /// Comma-separated passive skill filters; each must match.
    pub skills: Option<String>,
}

/// Unwrap a JSON body. A body that does not parse into `T` is `InvalidInput`.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, PalError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        let err = PalError::from(rejection);
        metrics::VALIDATION_FAILURES_TOTAL
            .with_label_values(&[err.kind()])
            .inc();
        tracing::warn!("Rejected request body: {err}");
        err
    })
}

// ── Shared application state ─────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PalService>,
}

// ── Router ────────────────────────────────────────────────────────────

pub fn router(service: Arc<PalService>) -> Router {
    let state = AppState { service };

    Router::new()
        // Stored pals
        .route("/api/pals", get(list_pals))
        .route("/api/add-pal", post(add_pal))
        .route("/api/remove-pal", delete(remove_pal))
        // Options
        .route("/api/options/pal-species", get(pal_species_options))
        .route("/api/options/passive-skills", get(passive_skill_options))
        .route(
            "/api/options/passive-skill-combos",
            get(passive_skill_combo_options),
        )
        // Bulk data
        .route("/api/import", get(import_status).post(import_data))
        // Metrics
        .route("/metrics", get(get_metrics))
        .with_state(state)
}

// ── Stored pal handlers ──────────────────────────────────────────────

async fn list_pals(
    State(state): State<AppState>,
    Query(params): Query<ListPalsParams>,
) -> impl IntoResponse {
    let skills: Vec<String> = params
        .skills
        .as_deref()
        .map(|s| s.split(',').map(str::to_string).collect())
        .unwrap_or_default();

    match state
        .service
        .list_pals(params.name.as_deref(), &skills)
        .await
    {
        Ok(pals) => (StatusCode::OK, Json(json!(pals))).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn add_pal(
    State(state): State<AppState>,
    payload: Result<Json<AddPalRequest>, JsonRejection>,
) -> impl IntoResponse {
    let req = match json_body(payload) {
        Ok(req) => req,
        Err(e) => return e.into_response(),
    };
    let domain = state.service.gender_domain();
    match state.service.add_pal(req).await {
        Ok(pal) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Pal added successfully",
                "data": {
                    "name": pal.species,
                    "gender": domain.display(pal.gender.code()),
                    "passive_skills": pal.traits,
                }
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn remove_pal(
    State(state): State<AppState>,
    payload: Result<Json<RemovePalRequest>, JsonRejection>,
) -> impl IntoResponse {
    let req = match json_body(payload) {
        Ok(req) => req,
        Err(e) => return e.into_response(),
    };
    match state.service.remove_pal(req).await {
        Ok((name, id)) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Pal removed successfully",
                "data": { "name": name, "id": id }
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

// ── Option handlers ──────────────────────────────────────────────────

async fn pal_species_options(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.species().await {
        Ok(species) => (StatusCode::OK, Json(json!(species_names(&species)))).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn passive_skill_options(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.traits().await {
        Ok(traits) => (StatusCode::OK, Json(json!(trait_names(&traits)))).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn passive_skill_combo_options(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.trait_combos().await {
        Ok(combos) => (StatusCode::OK, Json(json!(combos))).into_response(),
        Err(e) => e.into_response(),
    }
}

// ── Bulk data handlers ───────────────────────────────────────────────

async fn import_status(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.counts().await {
        Ok(counts) => (
            StatusCode::OK,
            Json(json!({ "message": "Store data status", "counts": counts })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn import_data(
    State(state): State<AppState>,
    payload: Result<Json<ImportRequest>, JsonRejection>,
) -> impl IntoResponse {
    let req = match json_body(payload) {
        Ok(req) => req,
        Err(e) => return e.into_response(),
    };
    let data = match (req.source.as_str(), req.data) {
        ("upload", Some(data)) => data,
        _ => {
            return PalError::InvalidInput(
                "Invalid source or missing data. Only \"upload\" source with data is supported."
                    .into(),
            )
            .into_response()
        }
    };
    match state.service.import(data).await {
        Ok(counts) => (
            StatusCode::OK,
            Json(json!({ "message": "Data imported successfully", "imported": counts })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

// ── Metrics ──────────────────────────────────────────────────────────

async fn get_metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::gather_metrics(),
    )
}
