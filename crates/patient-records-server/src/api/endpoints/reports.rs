//! Reporting endpoints: printable list, CSV download and statistics.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use patient_records_core::{Patient, PatientStatistics};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct PrintResponse {
    pub generated_at: DateTime<Utc>,
    pub patients: Vec<Patient>,
}

/// `GET /api/patients/print`: every patient, alphabetically.
pub async fn print(State(ctx): State<ApiContext>) -> Result<Json<PrintResponse>, ApiError> {
    let patients = ctx.run(|store| store.list_by_name()).await?;

    Ok(Json(PrintResponse {
        generated_at: Utc::now(),
        patients,
    }))
}

/// `GET /api/patients/export.csv`: attachment download.
pub async fn export_csv(State(ctx): State<ApiContext>) -> Result<impl IntoResponse, ApiError> {
    let export = ctx.run(|store| store.export_csv()).await?;

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", export.filename),
        ),
    ];
    Ok((headers, export.content))
}

/// `GET /api/stats`
pub async fn statistics(
    State(ctx): State<ApiContext>,
) -> Result<Json<PatientStatistics>, ApiError> {
    let stats = ctx.run(|store| store.statistics()).await?;
    Ok(Json(stats))
}
