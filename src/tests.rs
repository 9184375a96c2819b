//! Integration tests for the exam portal.

use std::path::Path;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::config::Config;
use crate::models::{Category, Record};
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    state: AppState,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_env(&[]).await
    }

    /// Start a server whose configuration is the defaults plus `overrides`.
    async fn with_env(overrides: &[(&str, String)]) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let static_dir = temp_dir.path().join("public");
        std::fs::create_dir_all(&static_dir).expect("Failed to create static dir");
        write_static_files(&static_dir);

        let mut vars: Vec<(String, String)> = vec![
            (
                "PORTAL_DB_PATH".to_string(),
                temp_dir.path().join("test.sqlite").display().to_string(),
            ),
            (
                "PORTAL_STATIC_DIR".to_string(),
                static_dir.display().to_string(),
            ),
            ("PORTAL_BIND_ADDR".to_string(), "127.0.0.1:0".to_string()),
            (
                "PORTAL_SITE_URL".to_string(),
                "https://exams.example.org".to_string(),
            ),
            ("PORTAL_SITE_NAME".to_string(), "Exam Portal".to_string()),
            ("PORTAL_LOG_LEVEL".to_string(), "warn".to_string()),
        ];
        for (key, value) in overrides {
            vars.retain(|(k, _)| k != key);
            vars.push((key.to_string(), value.clone()));
        }

        let config = Config::from_lookup(|key| {
            vars.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        })
        .expect("Failed to build config");

        let state = AppState::from_config(config).expect("Failed to build state");
        let app = create_router(state.clone());

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url,
            state,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn insert(&self, category: Category, value: Value) {
        let record: Record = serde_json::from_value(value).expect("Invalid record");
        self.state
            .store
            .create(category.collection(), &record)
            .await
            .expect("Failed to insert record");
    }

    async fn page(&self, path: &str) -> (StatusCode, String) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = StatusCode::from_u16(resp.status().as_u16()).unwrap();
        // Rendered attributes escape '/' as an entity
        (status, resp.text().await.unwrap().replace("&#x2f;", "/"))
    }
}

fn write_static_files(dir: &Path) {
    let answer_keys = json!([
        {"id": "ssc-gd-key", "examName": "SSC GD Constable 2025", "organization": "SSC"},
        {"id": "ctet-key", "examName": "CTET July 2025", "organization": "CBSE"}
    ]);
    let admissions = json!([
        {"id": "du-ug", "title": "DU UG Admission 2025", "organization": "University of Delhi"}
    ]);
    std::fs::write(dir.join("answerKeysData.json"), answer_keys.to_string()).unwrap();
    std::fs::write(dir.join("admissionsData.json"), admissions.to_string()).unwrap();
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_router_serves_without_listener() {
    let fixture = TestFixture::new().await;
    let app = create_router(fixture.state.clone());

    let resp = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_list_and_get_records() {
    let fixture = TestFixture::new().await;
    fixture
        .insert(
            Category::Jobs,
            json!({"id": "ssc-cgl", "title": "SSC CGL 2025", "organization": "SSC"}),
        )
        .await;
    fixture
        .insert(
            Category::Jobs,
            json!({"id": "rrb-ntpc", "title": "RRB NTPC 2025", "organization": "RRB"}),
        )
        .await;

    // List in store order
    let resp = fixture
        .client
        .get(fixture.url("/api/jobs"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["id"], "ssc-cgl");
    assert_eq!(data[1]["id"], "rrb-ntpc");

    // Get one
    let resp = fixture
        .client
        .get(fixture.url("/api/jobs/rrb-ntpc"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["title"], "RRB NTPC 2025");

    // Missing id
    let resp = fixture
        .client
        .get(fixture.url("/api/jobs/missing"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Not found");
}

#[tokio::test]
async fn test_empty_collection_lists_empty() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/syllabus"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_categories_without_api_have_no_endpoint() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/answerkeys"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_create_notification() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/notifications"))
        .json(&json!({
            "title": "UPSC CSE 2025 Notification",
            "organization": "UPSC",
            "postDate": "2025-02-14"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Notification created");
    assert_eq!(body["data"]["id"], "upsc-cse-2025-notification");
    assert_eq!(body["data"]["postDate"], "2025-02-14");

    // Readable back through the read API
    let resp = fixture
        .client
        .get(fixture.url("/api/notifications/upsc-cse-2025-notification"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["organization"], "UPSC");

    // Same id again
    let resp = fixture
        .client
        .post(fixture.url("/api/notifications"))
        .json(&json!({"id": "upsc-cse-2025-notification", "title": "Duplicate"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_create_notification_rejects_bad_payloads() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/notifications"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);

    let resp = fixture
        .client
        .post(fixture.url("/api/notifications"))
        .json(&json!(["not", "an", "object"]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_list_page_newest_first() {
    let fixture = TestFixture::new().await;
    fixture
        .insert(
            Category::Results,
            json!({"id": "ssc-cgl", "examName": "SSC CGL", "organization": "SSC"}),
        )
        .await;
    fixture
        .insert(
            Category::Results,
            json!({"id": "upsc-cse", "examName": "UPSC CSE", "organization": "UPSC"}),
        )
        .await;

    let (status, html) = fixture.page("/results").await;
    assert_eq!(status, StatusCode::OK);
    let upsc = html.find("UPSC CSE").unwrap();
    let ssc = html.find("SSC CGL").unwrap();
    assert!(upsc < ssc, "newest record should come first");
    assert!(html.contains(r#"href="/results/upsc-cse""#));
    assert!(html.contains("<title>Results | Exam Portal</title>"));
    assert!(html.contains(r#""@type":"ItemList""#));
}

#[tokio::test]
async fn test_list_page_filter() {
    let fixture = TestFixture::new().await;
    fixture
        .insert(
            Category::Results,
            json!({"id": "ssc-cgl", "examName": "SSC CGL"}),
        )
        .await;
    fixture
        .insert(
            Category::Results,
            json!({"id": "upsc-cse", "examName": "UPSC CSE"}),
        )
        .await;

    let (_, html) = fixture.page("/results?q=upsc").await;
    assert!(html.contains("UPSC CSE"));
    assert!(!html.contains("SSC CGL"));

    let (_, html) = fixture.page("/results?q=nomatch").await;
    assert!(html.contains("No records found."));
    assert!(!html.contains(r#"id="records""#));
}

#[tokio::test]
async fn test_empty_list_page() {
    let fixture = TestFixture::new().await;

    let (status, html) = fixture.page("/syllabus").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("No records found."));
}

#[tokio::test]
async fn test_detail_page() {
    let fixture = TestFixture::new().await;
    fixture
        .insert(
            Category::Jobs,
            json!({
                "id": "ssc-gd-2025",
                "title": "SSC GD Constable 2025",
                "organization": "Staff Selection Commission",
                "category": "Police",
                "description": "Recruitment of constables in CAPFs.",
                "keywords": ["ssc", "gd"],
                "importantDates": {"applicationBegin": "2025-01-01", "lastDate": "2025-02-01"},
                "vacancy": [{"postName": "Constable", "totalPosts": "39481"}],
                "importantLinks": [{"label": "Apply Online", "url": "https://ssc.gov.in"}]
            }),
        )
        .await;
    fixture
        .insert(
            Category::Jobs,
            json!({"id": "cisf-hc", "title": "CISF Head Constable", "category": "Police"}),
        )
        .await;
    fixture
        .insert(
            Category::Jobs,
            json!({"id": "ibps-po", "title": "IBPS PO", "category": "Banking"}),
        )
        .await;

    let (status, html) = fixture.page("/jobs/ssc-gd-2025").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<h1>SSC GD Constable 2025</h1>"));
    assert!(html.contains("<title>SSC GD Constable 2025 | Exam Portal</title>"));
    assert!(html.contains(r#"<link rel="canonical" href="https://exams.example.org/jobs/ssc-gd-2025">"#));
    assert!(html.contains(r#"<meta name="keywords" content="ssc, gd">"#));
    assert!(html.contains(r#""@type":"JobPosting""#));

    // Sections in fixed order
    let dates = html.find("Important Dates").unwrap();
    let vacancy = html.find("Vacancy Details").unwrap();
    let links = html.find("Important Links").unwrap();
    assert!(dates < vacancy && vacancy < links);
    assert!(html.contains("Application Begin"));
    assert!(html.contains("39481"));

    // Related by category, never itself
    assert!(html.contains(r#"href="/jobs/cisf-hc""#));
    assert!(!html.contains(r#"href="/jobs/ibps-po""#));
}

#[tokio::test]
async fn test_detail_page_not_found() {
    let fixture = TestFixture::new().await;

    let (status, html) = fixture.page("/jobs/does-not-exist").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Job Not Found"));
    assert!(html.contains(r#"<a class="back" href="/jobs">Back to Latest Jobs</a>"#));
    assert!(html.contains(r#"content="noindex, nofollow""#));
    assert!(!html.contains("application/ld+json"));
}

#[tokio::test]
async fn test_filesystem_categories() {
    let fixture = TestFixture::new().await;

    let (status, html) = fixture.page("/answer-key").await;
    assert_eq!(status, StatusCode::OK);
    let ctet = html.find("CTET July 2025").unwrap();
    let ssc = html.find("SSC GD Constable 2025").unwrap();
    assert!(ctet < ssc);

    let (_, html) = fixture.page("/admission/du-ug").await;
    assert!(html.contains("<h1>DU UG Admission 2025</h1>"));
    assert!(html.contains(r#""@type":"EducationalOccupationalProgram""#));

    let (_, html) = fixture.page("/admission/missing").await;
    assert!(html.contains("Back to Admissions"));
}

#[tokio::test]
async fn test_static_data_files_served() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/admissionsData.json"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body[0]["id"], "du-ug");
}

#[tokio::test]
async fn test_home_page_searches_jobs() {
    let fixture = TestFixture::new().await;
    fixture
        .insert(
            Category::Jobs,
            json!({"id": "ssc-cgl", "title": "Combined Graduate Level", "organization": "SSC"}),
        )
        .await;
    fixture
        .insert(
            Category::Jobs,
            json!({"id": "ibps-po", "title": "Probationary Officer", "organization": "IBPS"}),
        )
        .await;

    let (status, html) = fixture.page("/?q=ibps").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Probationary Officer"));
    assert!(!html.contains("Combined Graduate Level"));
}

#[tokio::test]
async fn test_remote_api_binding() {
    let upstream = TestFixture::new().await;
    upstream
        .insert(
            Category::Syllabus,
            json!({"id": "upsc-cse", "examName": "UPSC CSE Syllabus"}),
        )
        .await;

    let fixture = TestFixture::with_env(&[
        ("PORTAL_BASE_URL", upstream.base_url.clone()),
        ("PORTAL_BINDING_SYLLABUS", "remote-api".to_string()),
    ])
    .await;

    let (_, html) = fixture.page("/syllabus").await;
    assert!(html.contains("UPSC CSE Syllabus"));

    let (_, html) = fixture.page("/syllabus/upsc-cse").await;
    assert!(html.contains("<h1>UPSC CSE Syllabus</h1>"));

    let (_, html) = fixture.page("/syllabus/missing").await;
    assert!(html.contains("Syllabus Not Found"));
}

#[tokio::test]
async fn test_store_unavailable_degrades() {
    let blocker = TempDir::new().unwrap();
    let file = blocker.path().join("not-a-dir");
    std::fs::write(&file, "x").unwrap();

    let fixture = TestFixture::with_env(&[(
        "PORTAL_DB_PATH",
        file.join("portal.sqlite").display().to_string(),
    )])
    .await;

    // Pages render as empty or not found
    let (status, html) = fixture.page("/jobs").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("No records found."));

    let (status, html) = fixture.page("/jobs/anything").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Job Not Found"));

    // The API reports the failure
    let resp = fixture
        .client
        .get(fixture.url("/api/jobs"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "STORE_UNAVAILABLE");
}

#[tokio::test]
async fn test_static_asset_binding() {
    let upstream = TestFixture::new().await;

    let fixture = TestFixture::with_env(&[
        ("PORTAL_BASE_URL", upstream.base_url.clone()),
        ("PORTAL_BINDING_ADMISSIONS", "static-asset".to_string()),
    ])
    .await;
    // Only the upstream copy of the data file remains
    std::fs::remove_file(fixture.state.config.static_dir.join("admissionsData.json")).unwrap();

    let (status, html) = fixture.page("/admission").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(r#"href="/admission/du-ug""#));

    let (_, html) = fixture.page("/admission/du-ug").await;
    assert!(html.contains("<h1>DU UG Admission 2025</h1>"));

    let (_, html) = fixture.page("/admission/missing").await;
    assert!(html.contains("Admission Not Found"));
}

#[tokio::test]
async fn test_misshapen_record_does_not_hide_siblings() {
    let fixture = TestFixture::new().await;
    let data = json!([
        {"id": "du-ug", "title": "DU UG Admission 2025"},
        {"id": "jnu-pg", "title": "JNU PG Admission 2025", "applicationFee": {"general": 500}},
        {"id": "broken", "title": ["not", "a", "title"]}
    ]);
    std::fs::write(
        fixture.state.config.static_dir.join("admissionsData.json"),
        data.to_string(),
    )
    .unwrap();

    let (_, html) = fixture.page("/admission").await;
    assert!(html.contains("DU UG Admission 2025"));
    assert!(html.contains("JNU PG Admission 2025"));
    assert!(!html.contains("No records found."));

    let (_, html) = fixture.page("/admission/jnu-pg").await;
    assert!(html.contains("<h1>JNU PG Admission 2025</h1>"));
    assert!(!html.contains("Application Fee"));

    let (_, html) = fixture.page("/admission/du-ug").await;
    assert!(html.contains("<h1>DU UG Admission 2025</h1>"));
}

#[tokio::test]
async fn test_script_links_are_not_rendered_as_links() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/notifications"))
        .json(&json!({
            "id": "admit-card-out",
            "title": "Admit Card Out",
            "importantLinks": [
                {"label": "Click", "url": "javascript:alert(document.cookie)"},
                {"label": "Official", "url": "https://ssc.gov.in"}
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let (_, html) = fixture.page("/notifications/admit-card-out").await;
    assert!(!html.contains("javascript:"));
    assert!(html.contains("<li>Click</li>"));
    assert!(html.contains(r#"<a href="https://ssc.gov.in" rel="nofollow noopener" target="_blank">Official</a>"#));
}

#[tokio::test]
async fn test_ids_with_reserved_characters_stay_reachable() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/notifications"))
        .json(&json!({"id": "ssc 1/2025", "title": "SSC Phase One"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let (_, html) = fixture.page("/notifications").await;
    assert!(html.contains(r#"href="/notifications/ssc%201%2F2025""#));
    assert!(html.contains(r#""url":"https://exams.example.org/notifications/ssc%201%2F2025""#));

    let (status, html) = fixture.page("/notifications/ssc%201%2F2025").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<h1>SSC Phase One</h1>"));
    assert!(html.contains(
        r#"<link rel="canonical" href="https://exams.example.org/notifications/ssc%201%2F2025">"#
    ));
}
