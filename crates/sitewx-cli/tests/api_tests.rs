use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use sitewx_cli::UploadSummary;
use tower::ServiceExt;

const EXPORT: &[u8] = include_bytes!("../../sitewx-rollup/tests/fixtures/november_2023_utf16le.csv");

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn upload(bytes: &'static [u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/upload")
        .body(Body::from(bytes))
        .unwrap()
}

async fn json(app: &Router, uri: &str) -> Value {
    let res = app.clone().oneshot(get(uri)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK, "{uri}");
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn reads_are_empty_before_upload() {
    let (app, _state) = sitewx_cli::build_app();

    for uri in [
        "/api/v1/daily",
        "/api/v1/summary",
        "/api/v1/calendar",
        "/api/v1/chart",
        "/api/v1/days/2023-11-01",
    ] {
        let res = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT, "{uri}");
    }
}

#[tokio::test]
async fn upload_then_read() {
    let (app, _state) = sitewx_cli::build_app();

    let res = app.clone().oneshot(upload(EXPORT)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let summary: UploadSummary = serde_json::from_slice(&body).unwrap();
    assert_eq!(summary.days, 3);
    assert_eq!(summary.days_with_data, 2);
    assert_eq!(summary.parse_stats.parsed, 10);
    assert_eq!(summary.parse_stats.skipped(), 2);

    let daily = json(&app, "/api/v1/daily").await;
    let dates: Vec<&str> = daily
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2023-11-01", "2023-11-02", "2023-11-04"]);

    let month = json(&app, "/api/v1/summary").await;
    assert_eq!(month["temperature"]["max"], 12.0);
    assert_eq!(month["days_with_data"], 2);
    assert_eq!(month["period"]["month"], 11);

    let chart = json(&app, "/api/v1/chart").await;
    assert_eq!(chart[0]["label"], "11/1");
    assert_eq!(chart[1]["avg_temp"], Value::Null);
}

#[tokio::test]
async fn calendar_metric_selection() {
    let (app, _state) = sitewx_cli::build_app();
    app.clone().oneshot(upload(EXPORT)).await.unwrap();

    let grid = json(&app, "/api/v1/calendar").await;
    assert_eq!(grid["metric"], "temperature");
    assert_eq!(grid["labels"][0], "Sun");
    assert_eq!(grid["weeks"].as_array().unwrap().len(), 5);
    assert_eq!(grid["weeks"][0][0], Value::Null);
    assert_eq!(grid["weeks"][0][3]["day"], 1);
    assert_eq!(grid["weeks"][0][3]["alert"], true);

    let grid = json(&app, "/api/v1/calendar?metric=humidity").await;
    assert_eq!(grid["weeks"][0][4]["max"], 90.0);
    assert_eq!(grid["weeks"][0][3]["alert"], false);

    let res = app
        .clone()
        .oneshot(get("/api/v1/calendar?metric=wind"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn day_detail_has_24_rows() {
    let (app, _state) = sitewx_cli::build_app();
    app.clone().oneshot(upload(EXPORT)).await.unwrap();

    let day = json(&app, "/api/v1/days/2023-11-01").await;
    let hours = day["hours"].as_array().unwrap();
    assert_eq!(hours.len(), 24);
    assert_eq!(hours[1]["sample"]["minute_of_hour"], 10);
    assert_eq!(hours[2]["sample"], Value::Null);
    assert_eq!(day["low_temperature_alert"], true);

    let res = app
        .clone()
        .oneshot(get("/api/v1/days/2023-11-03"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app
        .clone()
        .oneshot(get("/api/v1/days/not-a-date"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_larger_than_axum_default_limit() {
    let (app, _state) = sitewx_cli::build_app();

    // trailing blank UTF-16LE lines push the body past 2 MiB
    let mut body = EXPORT.to_vec();
    let blank: [u8; 4] = [b'\r', 0, b'\n', 0];
    while body.len() < 3 * 1024 * 1024 {
        body.extend_from_slice(&blank);
    }

    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/upload")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let summary: UploadSummary = serde_json::from_slice(&body).unwrap();
    assert_eq!(summary.days, 3);
}

#[tokio::test]
async fn undecodable_upload_is_rejected() {
    let (app, _state) = sitewx_cli::build_app();

    // odd byte length cannot be UTF-16LE
    let res = app.clone().oneshot(upload(b"abc")).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app.clone().oneshot(get("/api/v1/summary")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn new_upload_replaces_snapshot() {
    let (app, state) = sitewx_cli::build_app();
    app.clone().oneshot(upload(EXPORT)).await.unwrap();

    let report = sitewx_rollup::build_report(
        "header\n01/05/2024 00:00:00;;3.0;;;;50;;;;1000;0\n",
    );
    sitewx_cli::load_report(&state, report).await;

    let daily = json(&app, "/api/v1/daily").await;
    assert_eq!(daily.as_array().unwrap().len(), 1);
    assert_eq!(daily[0]["date"], "2024-05-01");
}
