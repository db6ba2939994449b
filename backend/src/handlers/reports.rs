//! HTTP handlers for dashboard, reports and CSV export

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use shared::models::{DashboardSnapshot, PeriodReport};

use crate::error::AppResult;
use crate::services::{export_filename, report_to_csv};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub period: Option<String>,
    /// Required when period=custom, YYYY-MM-DD
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Dashboard metrics over the current ledger contents
pub async fn get_dashboard(
    State(state): State<AppState>,
) -> AppResult<Json<DashboardSnapshot>> {
    let snapshot = state.metrics.dashboard().await?;
    Ok(Json(snapshot))
}

/// Period report over purchases and usage
pub async fn get_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<PeriodReport>> {
    let report = state
        .metrics
        .report(
            query.period.as_deref(),
            query.start_date.as_deref(),
            query.end_date.as_deref(),
        )
        .await?;
    Ok(Json(report))
}

/// Same report as CSV, served as a file download
pub async fn export_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let report = state
        .metrics
        .report(
            query.period.as_deref(),
            query.start_date.as_deref(),
            query.end_date.as_deref(),
        )
        .await?;

    let csv = report_to_csv(&report)?;
    let filename = export_filename(&report.period, Utc::now().date_naive());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    )
        .into_response())
}
