use crate::{AppState, error::AppError};
use analytics::{CHART_TOP_ACTIVES, HerdOverview, MetricBreakdown};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use core_types::{
    AmuEntry, CoreError, Herd, Medication, MedicationFilter, MetricType, NewAmuEntry,
    NewMedication,
};
use serde::{Deserialize, Deserializer};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct BreakdownQuery {
    #[serde(default, deserialize_with = "metric_from_str")]
    pub metric: MetricType,
}

/// Accepts the same spellings as the CLI, e.g. `DDDvet` or `mg`.
fn metric_from_str<'de, D>(deserializer: D) -> Result<MetricType, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

/// Client-held state for a calculation that is not persisted.
#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub herd: Herd,
    #[serde(default)]
    pub entries: Vec<NewAmuEntry>,
}

/// Loads the configured herd and its treatments.
async fn load_active_herd(state: &AppState) -> Result<(Herd, Vec<AmuEntry>), AppError> {
    let herd_id = state.config.herd.active_herd_id;
    let herd = match state.db_repo.get_herd(herd_id).await {
        Err(database::DbError::NotFound) => {
            return Err(AppError::NotFound(format!("Herd {herd_id} does not exist")));
        }
        other => other?,
    };
    let entries = state.db_repo.get_entries_for_herd(herd_id).await?;
    Ok((herd, entries))
}

/// # GET /api/herd-overview
pub async fn get_herd_overview(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HerdOverview>, AppError> {
    let (herd, entries) = load_active_herd(&state).await?;
    Ok(Json(state.engine.herd_overview(&herd, &entries)))
}

/// # GET /api/metrics/breakdown?metric=dddvet
/// Class and top-ten ingredient breakdown in the selected metric.
pub async fn get_metric_breakdown(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BreakdownQuery>,
) -> Result<Json<MetricBreakdown>, AppError> {
    let (_herd, entries) = load_active_herd(&state).await?;
    let breakdown = state
        .engine
        .breakdown_by_metric(&entries, query.metric, CHART_TOP_ACTIVES);
    Ok(Json(breakdown))
}

/// # POST /api/metrics/preview
/// Runs the overview calculation on entries supplied in the request body.
pub async fn preview_metrics(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<HerdOverview>, AppError> {
    if request.herd.adult_count < 0 {
        return Err(CoreError::InvalidInput(
            "adult_count".to_string(),
            "must not be negative".to_string(),
        )
        .into());
    }
    for entry in &request.entries {
        entry.validate()?;
    }

    let herd_id = request.herd.id;
    let entries: Vec<AmuEntry> = request
        .entries
        .into_iter()
        .zip(1..)
        .map(|(entry, id)| entry.into_entry(id, Some(herd_id)))
        .collect();
    Ok(Json(state.engine.herd_overview(&request.herd, &entries)))
}

/// # GET /api/amu-entries
pub async fn get_amu_entries(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AmuEntry>>, AppError> {
    let entries = state
        .db_repo
        .get_entries_for_herd(state.config.herd.active_herd_id)
        .await?;
    Ok(Json(entries))
}

/// # POST /api/amu-entries
pub async fn create_amu_entry(
    State(state): State<Arc<AppState>>,
    Json(entry): Json<NewAmuEntry>,
) -> Result<impl IntoResponse, AppError> {
    entry.validate()?;
    let created = state
        .db_repo
        .create_entry(state.config.herd.active_herd_id, &entry)
        .await?;
    tracing::info!(entry_id = created.id, active = %created.active_name, "Recorded treatment.");
    Ok((StatusCode::CREATED, Json(created)))
}

/// # PUT /api/amu-entries/:id
pub async fn update_amu_entry(
    Path(entry_id): Path<i32>,
    State(state): State<Arc<AppState>>,
    Json(entry): Json<NewAmuEntry>,
) -> Result<Json<AmuEntry>, AppError> {
    entry.validate()?;
    let updated = state
        .db_repo
        .update_entry(state.config.herd.active_herd_id, entry_id, &entry)
        .await?;
    Ok(Json(updated))
}

/// # DELETE /api/amu-entries/:id
pub async fn delete_amu_entry(
    Path(entry_id): Path<i32>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    state
        .db_repo
        .delete_entry(state.config.herd.active_herd_id, entry_id)
        .await?;
    tracing::info!(entry_id, "Deleted treatment.");
    Ok(StatusCode::NO_CONTENT)
}

/// # GET /api/medications?search=amox&class=Penicillins
pub async fn get_medications(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<MedicationFilter>,
) -> Result<Json<Vec<Medication>>, AppError> {
    let medications = state.db_repo.get_medications(&filter).await?;
    Ok(Json(medications))
}

/// # POST /api/medications
pub async fn create_medication(
    State(state): State<Arc<AppState>>,
    Json(medication): Json<NewMedication>,
) -> Result<impl IntoResponse, AppError> {
    medication.validate()?;
    let created = state.db_repo.create_medication(&medication).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// # PUT /api/medications/:id
pub async fn update_medication(
    Path(medication_id): Path<i32>,
    State(state): State<Arc<AppState>>,
    Json(medication): Json<NewMedication>,
) -> Result<Json<Medication>, AppError> {
    medication.validate()?;
    let updated = state
        .db_repo
        .update_medication(medication_id, &medication)
        .await?;
    Ok(Json(updated))
}

/// # DELETE /api/medications/:id
pub async fn delete_medication(
    Path(medication_id): Path<i32>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    state.db_repo.delete_medication(medication_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
