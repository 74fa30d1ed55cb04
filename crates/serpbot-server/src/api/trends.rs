use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use serpbot_core::{AggregatedSeries, TrendError, TrendRequest};
use serpbot_db::PgTrendStore;
use uuid::Uuid;

use crate::middleware::{Principal, RequestId};

use super::{map_trend_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// `GET /api/v1/websites/{website_id}/trends/{engine}/{period}`
pub(super) async fn get_trend(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(principal): Extension<Principal>,
    Path((website_id, engine, period)): Path<(String, String, String)>,
) -> Result<Json<ApiResponse<AggregatedSeries>>, ApiError> {
    let Ok(website_id) = Uuid::parse_str(&website_id) else {
        // Tags are still validated first so a bad period wins over a bad id.
        let error = serpbot_core::parse_tags(&engine, &period)
            .err()
            .unwrap_or(TrendError::WebsiteNotFound(Uuid::nil()));
        return Err(map_trend_error(req_id.0, &error));
    };

    let store = PgTrendStore::new(state.pool.clone());
    let trend = serpbot_core::compute_trend(
        &store,
        TrendRequest {
            owner: &principal.0,
            website_id,
            engine: &engine,
            period: &period,
        },
        Utc::now().date_naive(),
        state.rank_policy,
    )
    .await
    .map_err(|e| map_trend_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(trend, ResponseMeta::new(req_id.0))))
}
