use axum::http::StatusCode;
use fanscore::api::{self, AppState};
use fanscore::config::Config;
use fanscore::db::init_db;
use fanscore::{seed_defaults, Repository};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

struct TestApp {
    app: axum::Router,
    repo: Arc<Repository>,
    _temp: TempDir,
}

async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");

    let repo = Arc::new(Repository::new(pool));
    seed_defaults(&repo).await.expect("seed failed");

    let config = Config {
        port: 0,
        database_path: db_path,
        seed_defaults: true,
        history_months: 6,
        recent_logs_limit: 10,
    };
    let app = api::create_router(AppState::new(repo.clone(), config));

    TestApp {
        app,
        repo,
        _temp: temp_dir,
    }
}

async fn request(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = axum::http::Request::builder().method(method).uri(uri);
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(axum::body::Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    };

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_fan(app: &axum::Router, name: &str, area: &str) -> String {
    let (status, body) = request(
        app,
        "POST",
        "/api/fans",
        Some(json!({"displayName": name, "residenceArea": area})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_and_ready() {
    let t = setup_test_app().await;
    let (status, body) = request(&t.app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = request(&t.app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

// =============================================================================
// Fans
// =============================================================================

#[tokio::test]
async fn test_fan_crud() {
    let t = setup_test_app().await;
    let id = create_fan(&t.app, "Aki", "KOBE").await;
    create_fan(&t.app, "Ren", "TOKYO").await;

    let (status, body) = request(&t.app, "GET", "/api/fans?search=ak", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["displayName"], "Aki");

    let (status, body) = request(
        &t.app,
        "PUT",
        &format!("/api/fans/{id}"),
        Some(json!({"displayName": "Aki N.", "residenceArea": "NARA", "memo": "moved"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["residenceArea"], "NARA");
    assert!(body["createdAt"].is_string());

    let (status, body) = request(&t.app, "GET", &format!("/api/fans/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["displayName"], "Aki N.");
    assert_eq!(body["memo"], "moved");
    let created_at = body["createdAt"].as_str().unwrap();
    assert!(created_at.ends_with('Z'));

    let (status, body) = request(&t.app, "DELETE", &format!("/api/fans/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = request(&t.app, "GET", &format!("/api/fans/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = request(&t.app, "DELETE", &format!("/api/fans/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_created_fan_reports_created_at() {
    let t = setup_test_app().await;
    let (status, body) = request(
        &t.app,
        "POST",
        "/api/fans",
        Some(json!({"displayName": "Aki", "residenceArea": "KOBE"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["createdAt"].is_string());

    let id = body["id"].as_str().unwrap();
    let (_, listed) = request(&t.app, "GET", "/api/fans", None).await;
    assert_eq!(listed[0]["id"], id);
    assert_eq!(listed[0]["createdAt"], body["createdAt"]);
}

#[tokio::test]
async fn test_fan_validation() {
    let t = setup_test_app().await;
    let cases = [
        json!({"displayName": "  ", "residenceArea": "KOBE"}),
        json!({"displayName": "Aki", "residenceArea": "ONLINE"}),
        json!({"displayName": "Aki", "residenceArea": "kobe"}),
        json!({"displayName": "Aki"}),
    ];
    for body in cases {
        let (status, resp) = request(&t.app, "POST", "/api/fans", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(resp["error"].is_string());
    }
}

// =============================================================================
// Logs
// =============================================================================

#[tokio::test]
async fn test_log_lifecycle() {
    let t = setup_test_app().await;
    let fan_id = create_fan(&t.app, "Aki", "KOBE").await;

    let (status, created) = request(
        &t.app,
        "POST",
        "/api/logs",
        Some(json!({
            "date": "2024-05-01",
            "fanId": fan_id,
            "eventType": "PaidLive",
            "venueArea": "OSAKA",
            "merchAmountJPY": 3000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["fanName"], "Aki");
    assert_eq!(created["attendCount"], 1);
    assert_eq!(created["venueArea"], "OSAKA");
    let log_id = created["id"].as_str().unwrap().to_string();

    let (status, streamed) = request(
        &t.app,
        "POST",
        "/api/logs",
        Some(json!({
            "date": "2024-05-03",
            "fanId": fan_id,
            "eventType": "YouTube",
            "venueArea": "TOKYO"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(streamed["venueArea"], "ONLINE");

    let (status, body) = request(&t.app, "GET", "/api/logs?month=2024-05", None).await;
    assert_eq!(status, StatusCode::OK);
    let dates: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-05-03", "2024-05-01"]);

    let (status, updated) = request(
        &t.app,
        "PUT",
        &format!("/api/logs/{log_id}"),
        Some(json!({"attendCount": 2, "note": "encore"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["attendCount"], 2);
    assert_eq!(updated["note"], "encore");
    assert_eq!(updated["eventType"], "PaidLive");

    let (status, _) = request(&t.app, "DELETE", &format!("/api/logs/{log_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = request(&t.app, "GET", &format!("/api/logs/{log_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_log_validation() {
    let t = setup_test_app().await;
    let fan_id = create_fan(&t.app, "Aki", "KOBE").await;

    let base = json!({
        "date": "2024-05-01",
        "fanId": fan_id,
        "eventType": "PaidLive",
        "venueArea": "KOBE"
    });
    let with = |key: &str, value: Value| {
        let mut body = base.clone();
        body[key] = value;
        body
    };

    for body in [
        with("attendCount", json!(0)),
        with("merchAmount", json!(-1)),
        with("date", json!("2024/13/01")),
        with("eventType", json!("Concert")),
        with("venueArea", Value::Null),
    ] {
        let (status, _) = request(&t.app, "POST", "/api/logs", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, _) = request(
        &t.app,
        "POST",
        "/api/logs",
        Some(with("fanId", json!("nobody"))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_fan_removes_logs() {
    let t = setup_test_app().await;
    let fan_id = create_fan(&t.app, "Aki", "KOBE").await;
    let (status, _) = request(
        &t.app,
        "POST",
        "/api/logs",
        Some(json!({"date": "2024-05-01", "fanId": fan_id, "eventType": "YouTube"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    request(&t.app, "DELETE", &format!("/api/fans/{fan_id}"), None).await;
    assert!(t.repo.list_records().await.unwrap().is_empty());
}

// =============================================================================
// Settings
// =============================================================================

#[tokio::test]
async fn test_settings_defaults_and_update() {
    let t = setup_test_app().await;

    let (status, body) = request(&t.app, "GET", "/api/settings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["moneyMode"], "sqrt");
    assert_eq!(body["pointsBase"]["paidLiveBase"], 10.0);
    assert_eq!(body["diminishingReturns"]["rate"], 0.9);

    let (status, body) = request(
        &t.app,
        "PUT",
        "/api/settings",
        Some(json!({"key": "moneyMode", "value": "log"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["moneyMode"], "log");

    let (_, body) = request(&t.app, "GET", "/api/settings", None).await;
    assert_eq!(body["moneyMode"], "log");
}

#[tokio::test]
async fn test_settings_rejects_invalid_values() {
    let t = setup_test_app().await;
    let cases = [
        json!({"key": "moneyMode", "value": "cubic"}),
        json!({"key": "diminishingReturns", "value": {"enabled": true, "rate": 0, "applyTo": []}}),
        json!({"key": "diminishingReturns", "value": {"enabled": true, "rate": 1.5, "applyTo": []}}),
        json!({"key": "pointsBase", "value": {
            "paidLiveBase": -1, "freeLiveBase": 5, "paidStreamBase": 3, "youtubeViewBase": 1
        }}),
        json!({"key": "theme", "value": "dark"}),
        json!({"value": "log"}),
    ];
    for body in cases {
        let (status, _) = request(&t.app, "PUT", "/api/settings", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (_, body) = request(&t.app, "GET", "/api/settings", None).await;
    assert_eq!(body["moneyMode"], "sqrt");
}

// =============================================================================
// Area multipliers
// =============================================================================

#[tokio::test]
async fn test_multiplier_upsert_update_delete() {
    let t = setup_test_app().await;

    let (status, body) = request(&t.app, "GET", "/api/area-multipliers", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 64);

    let (status, kobe_tokyo) = request(
        &t.app,
        "POST",
        "/api/area-multipliers",
        Some(json!({"fromArea": "KOBE", "toArea": "TOKYO", "multiplier": 2.5})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(kobe_tokyo["multiplier"], 2.5);

    // upsert keeps a single row per pair
    let (_, body) = request(&t.app, "GET", "/api/area-multipliers", None).await;
    assert_eq!(body.as_array().unwrap().len(), 64);

    let id = kobe_tokyo["id"].as_str().unwrap();
    let (status, body) = request(
        &t.app,
        "PUT",
        &format!("/api/area-multipliers/{id}"),
        Some(json!({"multiplier": 1.9})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["multiplier"], 1.9);

    // moving onto an existing pair conflicts
    let (status, _) = request(
        &t.app,
        "PUT",
        &format!("/api/area-multipliers/{id}"),
        Some(json!({"toArea": "OSAKA"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(
        &t.app,
        "POST",
        "/api/area-multipliers",
        Some(json!({"fromArea": "KOBE", "toArea": "NARA", "multiplier": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(&t.app, "DELETE", &format!("/api/area-multipliers/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = request(&t.app, "DELETE", &format!("/api/area-multipliers/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Tiers
// =============================================================================

#[tokio::test]
async fn test_tiers_and_benefits() {
    let t = setup_test_app().await;

    let gold = json!({
        "name": "Gold", "slug": "gold", "color": "#ffd700", "icon": "crown",
        "minScore": 150, "sortOrder": 1
    });
    let (status, created) = request(&t.app, "POST", "/api/tiers", Some(gold.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let tier_id = created["id"].as_str().unwrap().to_string();

    let (status, _) = request(&t.app, "POST", "/api/tiers", Some(gold)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "duplicate slug");

    let (status, _) = request(
        &t.app,
        "POST",
        "/api/tiers",
        Some(json!({"name": "Silver", "slug": "silver"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let benefits_uri = format!("/api/tiers/{tier_id}/benefits");
    let (status, first) = request(
        &t.app,
        "POST",
        &benefits_uri,
        Some(json!({"title": "Backstage pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["sortOrder"], 0);

    let (_, second) = request(
        &t.app,
        "POST",
        &benefits_uri,
        Some(json!({"title": "Signed poster", "description": "once a year"})),
    )
    .await;
    assert_eq!(second["sortOrder"], 1);

    let (status, _) = request(&t.app, "POST", &benefits_uri, Some(json!({"title": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let second_id = second["id"].as_str().unwrap();
    let (status, body) = request(
        &t.app,
        "PUT",
        &format!("{benefits_uri}/{second_id}"),
        Some(json!({"sortOrder": -1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Signed poster");

    let (status, body) = request(&t.app, "GET", &format!("/api/tiers/{tier_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body["benefits"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Signed poster", "Backstage pass"]);

    let (status, body) = request(
        &t.app,
        "PUT",
        &format!("/api/tiers/{tier_id}"),
        Some(json!({"minScore": 200})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["minScore"], 200.0);
    assert_eq!(body["slug"], "gold");

    let (status, _) = request(&t.app, "DELETE", &format!("/api/tiers/{tier_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = request(&t.app, "GET", &benefits_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// CSV import
// =============================================================================

#[tokio::test]
async fn test_import_fans_dry_run_then_commit() {
    let t = setup_test_app().await;
    let csv = "表示名,居住エリア,メモ\nAki,神戸,front row\nRen,TOKYO,\n";

    let (status, body) = request(
        &t.app,
        "POST",
        "/api/import/fans",
        Some(json!({"csvText": csv, "dryRun": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["valid"], 2);
    assert_eq!(body["preview"][0]["residenceArea"], "KOBE");
    assert!(t.repo.list_fans(None).await.unwrap().is_empty());

    let (status, body) = request(
        &t.app,
        "POST",
        "/api/import/fans",
        Some(json!({"csvText": csv})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["created"], 2);
    assert_eq!(t.repo.list_fans(None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_import_with_row_errors_writes_nothing() {
    let t = setup_test_app().await;
    let csv = "displayName,residenceArea\nAki,KOBE\n,OSAKA\nRen,MARS\n";

    let (status, body) = request(
        &t.app,
        "POST",
        "/api/import/fans",
        Some(json!({"csvText": csv})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let rows: Vec<u64> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["row"].as_u64().unwrap())
        .collect();
    assert_eq!(rows, vec![3, 4]);
    assert!(t.repo.list_fans(None).await.unwrap().is_empty());

    let (status, _) = request(
        &t.app,
        "POST",
        "/api/import/fans",
        Some(json!({"csvText": "displayName,residenceArea\n"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_import_logs_matches_fans_by_name() {
    let t = setup_test_app().await;
    create_fan(&t.app, "Aki", "KOBE").await;

    let csv = "\u{feff}日付,ファン名,イベント種別,会場エリア,参加回数,物販金額,スパチャ金額\n\
               2024-05-01,Aki,PaidLive,OSAKA,1,\"3,000\",0\n\
               2024/05/02,Aki,YouTube,,,,500\n";

    let (status, body) = request(
        &t.app,
        "POST",
        "/api/import/logs",
        Some(json!({"csvText": csv})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["created"], 2);

    let records = t.repo.list_records().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].merch_amount.to_canonical_string(), "3000");
    assert_eq!(records[1].venue_area.as_str(), "ONLINE");

    let (status, body) = request(
        &t.app,
        "POST",
        "/api/import/logs",
        Some(json!({
            "csvText": "date,fanName,eventType,venueArea\n2024-05-01,Nobody,PaidLive,KOBE\n",
            "dryRun": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], 0);
    assert_eq!(body["errors"][0]["row"], 2);
}
