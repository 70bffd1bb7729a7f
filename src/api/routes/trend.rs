//! Trend Routes
//!
//! - POST /api/v1/trend - Per-year sums over a year range

use axum::{extract::rejection::JsonRejection, extract::State, response::Response, Json};
use std::sync::Arc;

use super::format::{artifact_response, csv_response, json_response, OutputFormat};
use crate::api::dto::{QueryMeta, TrendRequest, TrendResponse};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::controls::View;
use crate::query::{GroupKey, Selection};

/// POST /api/v1/trend
pub async fn get_trend(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TrendRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(req) = payload?;
    let format = OutputFormat::parse(&req.format)?;

    let (from, to) = req.year_range;
    let selection = Selection::years(from, to)
        .countries(req.countries)
        .diseases(req.diseases)
        .stat_mode(req.stat_mode)
        .build();

    let output = state.executor.trend(&selection, req.group_by);

    match format {
        OutputFormat::Csv => csv_response(&output.data.points),
        OutputFormat::Svg => {
            let view = match req.group_by {
                GroupKey::Country => View::CountryTrend,
                GroupKey::Disease => View::DiseaseTrend,
            };
            let labels = view.labels(selection.stat_mode, output.year_filter);
            Ok(artifact_response(
                state.renderer.line_chart(&output.data, &labels),
            ))
        }
        OutputFormat::Json => {
            let meta = QueryMeta::from_output(&output);
            Ok(json_response(TrendResponse {
                group_by: req.group_by,
                points: output.data.points,
                domain: output.data.domain,
                meta,
            }))
        }
    }
}
