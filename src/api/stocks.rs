//! Read-only REST views of the instrument store. All mutation happens in
//! the simulation loop; these endpoints only serve dashboards.

use crate::error::{AppError, Result};
use crate::types::{PricePoint, Stock, StockSummary};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

/// Response wrapper matching frontend expectations.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub data: T,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

/// GET /api/stocks
async fn list_stocks(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<StockSummary>>>> {
    let summaries = state.store.summaries()?;
    Ok(Json(ApiResponse::success(summaries)))
}

/// GET /api/stocks/:symbol
async fn get_stock(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Stock>>> {
    let stock = state
        .store
        .get(&symbol)?
        .ok_or_else(|| AppError::NotFound(format!("Stock {} not found", symbol.to_uppercase())))?;
    Ok(Json(ApiResponse::success(stock)))
}

/// GET /api/stocks/:symbol/history?limit=n
async fn get_history(
    Path(symbol): Path<String>,
    Query(query): Query<HistoryQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<PricePoint>>>> {
    if state.store.get(&symbol)?.is_none() {
        return Err(AppError::NotFound(format!(
            "Stock {} not found",
            symbol.to_uppercase()
        )));
    }
    let limit = query.limit.unwrap_or(state.config.snapshot_points);
    let history = state.store.history_tail(&symbol, limit)?;
    Ok(Json(ApiResponse::success(history)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stocks))
        .route("/:symbol", get(get_stock))
        .route("/:symbol/history", get(get_history))
}
