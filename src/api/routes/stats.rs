use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Datelike, Utc};
use serde::Deserialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::service::{parse_stat_type, parse_year, validate_league_id, StatsError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsParams {
    pub stat_type: Option<String>,
    pub year: Option<String>,
}

impl StatsParams {
    /// Blank `statType` counts as absent.
    fn stat_type(&self) -> Option<&str> {
        self.stat_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Single-stat leader, or general league stats when no `statType` is given.
pub async fn league_stats(
    State(state): State<AppState>,
    Path(league_id): Path<String>,
    Query(params): Query<StatsParams>,
) -> Result<Response, ApiError> {
    let league_id = validate_league_id(&league_id)?;
    let window = parse_year(params.year.as_deref(), Utc::now().year())?;

    match params.stat_type() {
        Some(raw) => {
            let stat_type = parse_stat_type(raw)?;
            let response = state
                .service
                .single_stat(league_id, stat_type, window)
                .await?;
            Ok(Json(response).into_response())
        }
        None => {
            let response = state.service.general_stats(league_id, window).await?;
            Ok(Json(response).into_response())
        }
    }
}

/// Full ranking for a stat. `statType` is required.
pub async fn league_rankings(
    State(state): State<AppState>,
    Path(league_id): Path<String>,
    Query(params): Query<StatsParams>,
) -> Result<Response, ApiError> {
    let league_id = validate_league_id(&league_id)?;
    let window = parse_year(params.year.as_deref(), Utc::now().year())?;
    let stat_type = parse_stat_type(params.stat_type().ok_or(StatsError::MissingStatType)?)?;

    let response = state.service.ranking(league_id, stat_type, window).await?;
    Ok(Json(response).into_response())
}
