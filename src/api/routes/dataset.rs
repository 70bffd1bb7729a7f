//! Dataset Routes
//!
//! - GET /api/v1/dataset - Widget options and defaults
//! - GET /api/v1/dataset/countries - Country universe with map codes

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{CountriesResponse, DatasetResponse};
use crate::api::state::AppState;
use crate::dataset::Disease;

/// GET /api/v1/dataset
pub async fn get_dataset(State(state): State<Arc<AppState>>) -> Json<DatasetResponse> {
    let stats = state.store.stats();

    Json(DatasetResponse {
        countries: state.universe.to_vec(),
        diseases: Disease::specific().to_vec(),
        years: stats.years,
        sub_regions: state.store.sub_regions().to_vec(),
        record_count: stats.record_count,
        missing_iso: stats.missing_iso,
        defaults: (*state.dashboard).clone(),
    })
}

/// GET /api/v1/dataset/countries
pub async fn list_countries(State(state): State<Arc<AppState>>) -> Json<CountriesResponse> {
    let countries = state.store.countries().to_vec();
    let count = countries.len();
    Json(CountriesResponse { countries, count })
}
