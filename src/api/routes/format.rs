//! Response formats shared by the pipeline routes

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::api::error::{ApiError, ApiResult};
use crate::render::RenderArtifact;

/// Requested output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
    Svg,
}

impl OutputFormat {
    pub fn parse(s: &str) -> ApiResult<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "svg" => Ok(OutputFormat::Svg),
            _ => Err(ApiError::Validation(format!(
                "Invalid format: {}. Use json, csv, or svg",
                s
            ))),
        }
    }
}

/// JSON body with 200
pub fn json_response<T: Serialize>(body: T) -> Response {
    (StatusCode::OK, Json(body)).into_response()
}

/// Serialize rows as CSV with a header row
pub fn csv_response<T: Serialize>(rows: &[T]) -> ApiResult<Response> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| ApiError::Internal(format!("CSV encoding failed: {}", e)))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ApiError::Internal(format!("CSV encoding failed: {}", e)))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/csv")],
        bytes,
    )
        .into_response())
}

/// SVG markup, or the artifact as JSON when there is nothing to draw
pub fn artifact_response(artifact: RenderArtifact) -> Response {
    match artifact {
        RenderArtifact::Svg { markup } => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "image/svg+xml")],
            markup,
        )
            .into_response(),
        other => json_response(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!(OutputFormat::parse("CSV").unwrap(), OutputFormat::Csv);
        assert_eq!(OutputFormat::parse("svg").unwrap(), OutputFormat::Svg);
        assert!(OutputFormat::parse("chart").is_err());
    }

    #[test]
    fn test_csv_header() {
        #[derive(Serialize)]
        struct Row {
            key: &'static str,
            metric: f64,
        }
        let response = csv_response(&[Row {
            key: "Chad",
            metric: 20.0,
        }])
        .unwrap();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/csv"
        );
    }
}
