use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};

use crate::{
    api::{
        dto::{PricePointDto, PricesQuery},
        error::ApiError,
    },
    state::AppState,
};

/// GET /api/prices?date=YYYY-MM-DD - Hourly prices for today or tomorrow
///
/// Without a date, today's prices in the feed's timezone are returned.
pub async fn get_prices(
    State(state): State<AppState>,
    query: Result<Query<PricesQuery>, QueryRejection>,
) -> Result<Json<Vec<PricePointDto>>, ApiError> {
    let Query(query) = query?;
    let date = query
        .date
        .unwrap_or_else(|| state.planner.feed().today());

    let prices = state.planner.prices(date).await?;
    Ok(Json(prices.iter().map(PricePointDto::from).collect()))
}
