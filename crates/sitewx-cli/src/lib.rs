use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use opentelemetry::metrics::{Counter, MeterProvider};
use opentelemetry_prometheus::exporter;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::{Encoder, Registry, TextEncoder};
use serde::{Deserialize, Serialize};
use sitewx_config::AppConfig;
use sitewx_core::{
    CalendarMetric, CellView, DailyAggregate, HourlyRow, WeekStart, YearMonth, DAYS_PER_WEEK,
};
use sitewx_ingest::{decode_export, Encoding, ParseStats};
use sitewx_rollup::{Pipeline, PipelineOptions, Report};
use tokio::sync::RwLock;

pub mod render;

/// Upload body cap. A month of one-minute UTF-16LE rows is roughly 8 MiB.
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

pub struct AppState {
    ready: AtomicBool,
    registry: Registry,
    #[allow(dead_code)]
    provider: SdkMeterProvider,
    requests_total: Counter<u64>,
    uploads_total: Counter<u64>,
    skipped_rows_total: Counter<u64>,
    station: String,
    encoding: Encoding,
    pipeline: Pipeline,
    report: RwLock<Option<Arc<Report>>>,
}

/// Router with default configuration
pub fn build_app() -> (Router, Arc<AppState>) {
    build_app_with(&AppConfig::default())
}

pub fn build_app_with(cfg: &AppConfig) -> (Router, Arc<AppState>) {
    // Prometheus exporter via OpenTelemetry
    let registry = Registry::new();
    let reader = exporter()
        .with_registry(registry.clone())
        .build()
        .expect("prom exporter");
    let provider = SdkMeterProvider::builder().with_reader(reader).build();
    let meter = provider.meter("sitewx-cli");

    let requests_total = meter
        .u64_counter("sitewx_requests_total")
        .with_description("Total HTTP requests served")
        .init();
    let uploads_total = meter
        .u64_counter("sitewx_uploads_total")
        .with_description("Exports accepted through the upload endpoint")
        .init();
    let skipped_rows_total = meter
        .u64_counter("sitewx_skipped_rows_total")
        .with_description("Export rows skipped as malformed")
        .init();

    let state = Arc::new(AppState {
        ready: AtomicBool::new(false),
        registry,
        provider,
        requests_total,
        uploads_total,
        skipped_rows_total,
        station: cfg.station_name().to_string(),
        encoding: cfg.encoding(),
        pipeline: Pipeline::new(PipelineOptions {
            week_start: cfg.week_start(),
        }),
        report: RwLock::new(None),
    });

    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route(
            "/api/v1/upload",
            post(upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/v1/daily", get(daily))
        .route("/api/v1/summary", get(summary))
        .route("/api/v1/calendar", get(calendar))
        .route("/api/v1/chart", get(chart))
        .route("/api/v1/days/:date", get(day_detail))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            count_requests,
        ))
        .with_state(Arc::clone(&state));

    (router, state)
}

pub fn set_ready(state: &Arc<AppState>, is_ready: bool) {
    state.ready.store(is_ready, Ordering::Relaxed);
}

/// Replace the current snapshot. Readers see either the old report or the
/// new one, never a mix.
pub async fn load_report(state: &Arc<AppState>, report: Report) {
    let stats = report.parse_stats;
    state.uploads_total.add(1, &[]);
    state.skipped_rows_total.add(stats.skipped() as u64, &[]);

    *state.report.write().await = Some(Arc::new(report));
    tracing::info!(
        station = %state.station,
        rows = stats.rows,
        skipped = stats.skipped(),
        "snapshot replaced"
    );
}

async fn current(state: &AppState) -> Option<Arc<Report>> {
    state.report.read().await.clone()
}

async fn count_requests(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    state.requests_total.add(1, &[]);
    next.run(req).await
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn readyz(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.ready.load(Ordering::Relaxed) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn metrics(
    State(state): State<Arc<AppState>>,
) -> (
    [(axum::http::header::HeaderName, axum::http::HeaderValue); 1],
    String,
) {
    let encoder = TextEncoder::new();
    let metric_families = state.registry.gather();
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buf) {
        tracing::warn!(error=?e, "failed to encode metrics");
    }
    let body = String::from_utf8(buf).unwrap_or_default();
    let header = (
        header::CONTENT_TYPE,
        axum::http::HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    ([header], body)
}

/// Response body of a successful upload
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadSummary {
    pub station: String,
    pub period: Option<YearMonth>,
    pub days: usize,
    pub days_with_data: usize,
    pub parse_stats: ParseStats,
}

async fn upload(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let text = match decode_export(&body, state.encoding) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, bytes = body.len(), "rejected upload");
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    let report = state.pipeline.run(&text);
    let summary = UploadSummary {
        station: state.station.clone(),
        period: report.summary.period,
        days: report.daily.len(),
        days_with_data: report.summary.days_with_data,
        parse_stats: report.parse_stats,
    };
    load_report(&state, report).await;

    (StatusCode::OK, Json(summary)).into_response()
}

async fn daily(State(state): State<Arc<AppState>>) -> Response {
    match current(&state).await {
        Some(report) => Json(&report.daily).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn summary(State(state): State<Arc<AppState>>) -> Response {
    match current(&state).await {
        Some(report) => Json(&report.summary).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn chart(State(state): State<Arc<AppState>>) -> Response {
    match current(&state).await {
        Some(report) => Json(report.chart()).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

#[derive(Deserialize)]
struct CalendarQuery {
    metric: Option<String>,
}

/// Calendar grid projected onto one metric
#[derive(Debug, Serialize)]
pub struct CalendarView {
    pub period: YearMonth,
    pub week_start: WeekStart,
    pub metric: CalendarMetric,
    pub labels: [&'static str; DAYS_PER_WEEK],
    pub weeks: Vec<Vec<Option<CellView>>>,
}

async fn calendar(
    State(state): State<Arc<AppState>>,
    Query(q): Query<CalendarQuery>,
) -> Response {
    let metric = match q.metric.as_deref().map(str::parse::<CalendarMetric>) {
        None => CalendarMetric::default(),
        Some(Ok(metric)) => metric,
        Some(Err(e)) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let Some(report) = current(&state).await else {
        return StatusCode::NO_CONTENT.into_response();
    };
    let Some(grid) = report.calendar.as_ref() else {
        return StatusCode::NO_CONTENT.into_response();
    };

    let view = CalendarView {
        period: grid.period,
        week_start: grid.week_start,
        metric,
        labels: grid.week_start.labels(),
        weeks: grid.views(metric),
    };
    (StatusCode::OK, Json(view)).into_response()
}

/// One day with its 24 hourly rows
#[derive(Debug, Serialize)]
pub struct DayDetail<'a> {
    pub aggregate: &'a DailyAggregate,
    pub low_temperature_alert: bool,
    pub hours: Vec<HourlyRow<'a>>,
}

async fn day_detail(State(state): State<Arc<AppState>>, Path(date): Path<NaiveDate>) -> Response {
    let Some(report) = current(&state).await else {
        return StatusCode::NO_CONTENT.into_response();
    };
    let Some(aggregate) = report.day(date) else {
        return error_response(StatusCode::NOT_FOUND, format!("no data for {}", date));
    };

    let detail = DayDetail {
        aggregate,
        low_temperature_alert: aggregate.low_temperature_alert(),
        hours: aggregate.hourly_rows(),
    };
    (StatusCode::OK, Json(detail)).into_response()
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
