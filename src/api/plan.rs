use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use validator::Validate;

use crate::{
    api::{
        dto::{ChargingPlanDto, ChargingPlanRequestDto},
        error::ApiError,
    },
    domain::ChargingPlanRequest,
    state::AppState,
};

/// POST /api/plan - Compute the cheapest charging plan before a deadline
pub async fn create_plan(
    State(state): State<AppState>,
    body: Result<Json<ChargingPlanRequestDto>, JsonRejection>,
) -> Result<Json<ChargingPlanDto>, ApiError> {
    let Json(dto) = body?;
    dto.validate()?;

    let request = ChargingPlanRequest::try_from(dto)?;
    tracing::debug!(
        date = %request.date,
        deadline = %request.deadline,
        timezone = %request.timezone,
        continuous = request.continuous,
        "plan requested"
    );

    let plan = state.planner.plan(&request).await?;
    Ok(Json(ChargingPlanDto::from(&plan)))
}
