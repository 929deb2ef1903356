//! Patient record endpoints.
//!
//! - `GET /api/patients`: every patient, newest first
//! - `POST /api/patients`: create
//! - `GET /api/patients/search?q=`: substring search
//! - `GET|PUT|DELETE /api/patients/:id`: single record

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use patient_records_core::{Patient, PatientForm, PatientId, SearchQuery};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct PatientListResponse {
    pub total: i64,
    pub patients: Vec<Patient>,
}

/// `GET /api/patients`
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<PatientListResponse>, ApiError> {
    let patients = ctx.run(|store| store.list()).await?;

    Ok(Json(PatientListResponse {
        total: patients.len() as i64,
        patients,
    }))
}

#[derive(Serialize)]
pub struct CreatedResponse {
    pub patient_id: PatientId,
}

/// `POST /api/patients`
pub async fn create(
    State(ctx): State<ApiContext>,
    body: Result<Json<PatientForm>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let Json(form) = body?;
    let patient_id = ctx.run(move |store| store.create(&form)).await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { patient_id })))
}

/// `GET /api/patients/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
) -> Result<Json<Patient>, ApiError> {
    let lookup = patient_id.clone();
    ctx.run(move |store| store.get(&lookup))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Patient {patient_id} not found")))
}

#[derive(Serialize)]
pub struct UpdatedResponse {
    pub patient_id: String,
    /// False when no patient had this identifier; nothing was written.
    pub updated: bool,
}

/// `PUT /api/patients/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
    body: Result<Json<PatientForm>, JsonRejection>,
) -> Result<Json<UpdatedResponse>, ApiError> {
    let Json(form) = body?;
    let target = patient_id.clone();
    let updated = ctx.run(move |store| store.update(&target, &form)).await?;

    Ok(Json(UpdatedResponse {
        patient_id,
        updated,
    }))
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub patient_id: String,
    pub deleted: bool,
}

/// `DELETE /api/patients/:id`: deleting an unknown identifier succeeds.
pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let target = patient_id.clone();
    let deleted = ctx.run(move |store| store.delete(&target)).await?;

    Ok(Json(DeletedResponse {
        patient_id,
        deleted,
    }))
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub patients: Vec<Patient>,
}

/// `GET /api/patients/search?q=`
pub async fn search(
    State(ctx): State<ApiContext>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = SearchQuery::parse(&params.q)?;
    let term = query.as_str().to_string();
    let patients = ctx.run(move |store| store.search(&query)).await?;

    Ok(Json(SearchResponse {
        query: term,
        patients,
    }))
}
