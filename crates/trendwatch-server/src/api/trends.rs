use axum::{
    extract::{rejection::PathRejection, Path, State},
    Extension, Json,
};
use trendwatch_core::TrendRecord;
use trendwatch_db::DbError;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, AppState};

pub(super) async fn list_trends(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<Vec<TrendRecord>>, ApiError> {
    let rows = trendwatch_db::list_trends(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(rows.into_iter().map(TrendRecord::from).collect()))
}

pub(super) async fn get_trend(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<TrendRecord>, ApiError> {
    let Path(id) = id.map_err(|e| ApiError::new(req_id.0.clone(), "bad_request", e.body_text()))?;

    match trendwatch_db::get_trend(&state.pool, id).await {
        Ok(row) => Ok(Json(TrendRecord::from(row))),
        Err(DbError::NotFound) => Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("trend {id} not found"),
        )),
        Err(e) => Err(map_db_error(req_id.0, &e)),
    }
}

pub(super) async fn list_trends_by_category(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(category): Path<String>,
) -> Result<Json<Vec<TrendRecord>>, ApiError> {
    let rows = trendwatch_db::list_trends_by_category(&state.pool, &category)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(rows.into_iter().map(TrendRecord::from).collect()))
}
