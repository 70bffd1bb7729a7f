//! Snapshot Routes
//!
//! Single-year views:
//!
//! - POST /api/v1/snapshot/ranking - Ranked totals by country or disease
//! - POST /api/v1/snapshot/map - Choropleth figure by country

use axum::{extract::rejection::JsonRejection, extract::State, response::Response, Json};
use std::sync::Arc;

use super::format::{artifact_response, csv_response, json_response, OutputFormat};
use crate::api::dto::{MapRequest, MapResponse, QueryMeta, RankingRequest, RankingResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::controls::View;
use crate::query::{GroupKey, Selection};
use crate::render::BarFill;

/// POST /api/v1/snapshot/ranking
///
/// Country rankings keep `top_n` ranks (the configured default when
/// omitted); disease rankings always use the configured disease cut-off.
pub async fn get_ranking(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RankingRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(req) = payload?;
    let format = OutputFormat::parse(&req.format)?;

    if req.top_n == Some(0) {
        return Err(ApiError::Validation("top_n must be at least 1".to_string()));
    }

    let (view, top_n, fill) = match req.group_by {
        GroupKey::Country => (
            View::CountryRanking,
            req.top_n.unwrap_or(state.dashboard.top_n),
            BarFill::Scaled,
        ),
        GroupKey::Disease => (
            View::DiseaseRanking,
            state.dashboard.disease_top_n,
            BarFill::Uniform,
        ),
    };

    let selection = Selection::year(req.year)
        .countries(req.countries)
        .diseases(req.diseases)
        .stat_mode(req.stat_mode)
        .top_n(top_n)
        .build();

    let output = state.executor.ranking(&selection, req.group_by);

    match format {
        OutputFormat::Csv => csv_response(&output.data.rows),
        OutputFormat::Svg => {
            let labels = view.labels(selection.stat_mode, output.year_filter);
            Ok(artifact_response(
                state.renderer.bar_chart(&output.data, &labels, fill),
            ))
        }
        OutputFormat::Json => {
            let meta = QueryMeta::from_output(&output);
            Ok(json_response(RankingResponse {
                group_by: req.group_by,
                rows: output.data.rows,
                domain: output.data.domain,
                group_count: output.data.group_count,
                meta,
            }))
        }
    }
}

/// POST /api/v1/snapshot/map
pub async fn get_map(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MapRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(req) = payload?;

    let selection = Selection::year(req.year)
        .countries(req.countries)
        .diseases(req.diseases)
        .stat_mode(req.stat_mode)
        .build();

    let output = state.executor.map(&selection);
    let labels = View::Map.labels(selection.stat_mode, output.year_filter);
    let artifact = state.renderer.choropleth(&output.data, &labels);
    let meta = QueryMeta::from_output(&output);

    Ok(json_response(MapResponse {
        artifact,
        regions: output.data.regions,
        domain: output.data.domain,
        meta,
    }))
}
