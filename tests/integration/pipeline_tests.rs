//! Integration tests for the inventory pipeline
//!
//! These tests use wiremock to stand in for the vendor inventory services and
//! drive the full crawl cycle end-to-end: HTTP fetch, transform, SQLite upsert
//! and report generation.

use dealer_inventory::config::{BrandConfig, Config, CrawlerConfig, OutputConfig, ReportConfig};
use dealer_inventory::crawler::crawl;
use dealer_inventory::report::generate_markdown_report;
use dealer_inventory::storage::open_store;
use dealer_inventory::{Brand, InventoryStore};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with no pacing delays
fn create_test_config(db_path: &Path, locations: &[&str], brands: Vec<BrandConfig>) -> Config {
    let mut regions = BTreeMap::new();
    regions.insert(
        "test".to_string(),
        locations.iter().map(|code| code.to_string()).collect(),
    );

    Config {
        crawler: CrawlerConfig {
            page_delay_ms: 0,
            location_delay_ms: 0,
            fetch_timeout_secs: 5,
            max_locations: None,
        },
        output: OutputConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            report_path: db_path.with_extension("md").to_string_lossy().into_owned(),
        },
        report: ReportConfig::default(),
        brands,
        locations: regions,
    }
}

fn bmw_brand(server: &MockServer) -> BrandConfig {
    BrandConfig {
        name: Brand::Bmw,
        auth_token: Some("secret-token".to_string()),
        series: Some("3 Series".to_string()),
        radius: 50,
        endpoint: Some(format!("{}/vehicle", server.uri())),
    }
}

fn mercedes_brand(server: &MockServer) -> BrandConfig {
    BrandConfig {
        name: Brand::Mercedes,
        auth_token: None,
        series: None,
        radius: 50,
        endpoint: Some(format!("{}/api/inventory", server.uri())),
    }
}

fn bmw_vehicle(vin: &str, price: u32) -> Value {
    json!({
        "vin": vin,
        "model": "330i xDrive",
        "internetPrice": price,
        "odometer": 14500,
        "drivetrain": "AWD",
        "vdpUrl": format!("https://dealer.example/bmw/{}", vin),
        "series": "3 Series",
        "cpoStatus": "Certified"
    })
}

fn mercedes_vehicle(vin: &str, price: u32) -> Value {
    json!({
        "vin": vin,
        "modelName": "GLC 300 4MATIC SUV",
        "dsrp": price,
        "eLink": format!("https://www.mbusa.com/vehicle/{}", vin),
        "usedVehicleAttributes": { "mileage": 21004 },
        "properties": [
            { "name": "AUTOMATIC_TRANSMISSION", "value": "9-Speed Automatic 4MATIC" }
        ]
    })
}

fn mercedes_page(records: Vec<Value>) -> Value {
    json!({
        "status": { "code": 200 },
        "result": { "pagedVehicles": { "records": records } }
    })
}

/// Mounts a BMW location with one page of vehicles followed by an empty page
async fn mount_bmw_location(server: &MockServer, location: &str, vehicles: Vec<Value>) {
    Mock::given(method("POST"))
        .and(path("/vehicle"))
        .and(header("authorization", "Bearer secret-token"))
        .and(body_partial_json(json!({"postalCode": location, "pageIndex": 0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "vehicles": vehicles })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/vehicle"))
        .and(body_partial_json(json!({"postalCode": location, "pageIndex": 1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "vehicles": [] })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_bmw_price_drop_between_crawls() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("inventory.db");

    // First crawl: V1 listed at 25,000
    let first_server = MockServer::start().await;
    mount_bmw_location(&first_server, "60601", vec![bmw_vehicle("V1", 25_000)]).await;
    let config = create_test_config(&db_path, &["60601"], vec![bmw_brand(&first_server)]);

    let reports = crawl(config, &[Brand::Bmw]).await.expect("First crawl failed");
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].total_vehicles, 1);
    assert_eq!(reports[0].changed_count, 0);
    assert_eq!(reports[0].rows[0].price_change, Some(0.0));

    // Second crawl: V1 dropped to 24,000
    let second_server = MockServer::start().await;
    mount_bmw_location(&second_server, "60601", vec![bmw_vehicle("V1", 24_000)]).await;
    let config = create_test_config(&db_path, &["60601"], vec![bmw_brand(&second_server)]);

    let reports = crawl(config, &[Brand::Bmw]).await.expect("Second crawl failed");
    let row = &reports[0].rows[0];
    assert_eq!(row.vin, "V1");
    assert_eq!(row.price, 24_000.0);
    assert_eq!(row.price_change, Some(-1_000.0));
    assert_eq!(row.price_change_pct, Some(-4.0));
    assert_eq!(row.series.as_deref(), Some("3 Series"));
    assert_eq!(row.certification.as_deref(), Some("Certified"));
    assert_eq!(reports[0].changed_count, 1);

    // Storage holds exactly one row carrying the newest price
    let store = open_store(&db_path).expect("Failed to reopen store");
    let stored = store.brand_inventory(Brand::Bmw).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].price, 24_000.0);
    assert_eq!(stored[0].price_change, None);
}

#[tokio::test]
async fn test_mercedes_paginates_by_offset() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("inventory.db");
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/inventory"))
        .and(query_param("zip", "10001"))
        .and(query_param("start", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mercedes_page(vec![
            mercedes_vehicle("M1", 31_000),
            mercedes_vehicle("M2", 29_500),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/inventory"))
        .and(query_param("start", "100"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(mercedes_page(vec![mercedes_vehicle("M3", 33_250)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/inventory"))
        .and(query_param("start", "200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mercedes_page(Vec::new())))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&db_path, &["10001"], vec![mercedes_brand(&server)]);
    let reports = crawl(config, &[Brand::Mercedes]).await.expect("Crawl failed");

    let report = &reports[0];
    assert_eq!(report.total_vehicles, 3);
    let vins: Vec<&str> = report.rows.iter().map(|r| r.vin.as_str()).collect();
    assert_eq!(vins, vec!["M2", "M1", "M3"]);
    assert_eq!(report.rows[0].drivetrain, "9-Speed Automatic 4MATIC");
    assert_eq!(report.rows[0].odometer_miles, 21_004.0);
}

#[tokio::test]
async fn test_mercedes_api_error_ends_location() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("inventory.db");
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/inventory"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": { "code": 500, "message": "backend unavailable" }
        })))
        .mount(&server)
        .await;

    let config = create_test_config(&db_path, &["10001"], vec![mercedes_brand(&server)]);
    let reports = crawl(config, &[Brand::Mercedes]).await.expect("Crawl failed");

    assert_eq!(reports[0].total_vehicles, 0);
    let store = open_store(&db_path).unwrap();
    assert!(store.all_inventory().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_location_does_not_stop_the_sweep() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("inventory.db");
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/vehicle"))
        .and(body_partial_json(json!({"postalCode": "60601"})))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_bmw_location(&server, "60611", vec![bmw_vehicle("V2", 27_000)]).await;

    let config = create_test_config(&db_path, &["60601", "60611"], vec![bmw_brand(&server)]);
    let reports = crawl(config, &[Brand::Bmw]).await.expect("Crawl failed");

    assert_eq!(reports[0].total_vehicles, 1);
    assert_eq!(reports[0].rows[0].vin, "V2");
}

#[tokio::test]
async fn test_both_brands_into_one_report() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("inventory.db");
    let server = MockServer::start().await;

    mount_bmw_location(&server, "60601", vec![bmw_vehicle("SHARED", 26_000)]).await;
    Mock::given(method("GET"))
        .and(path("/api/inventory"))
        .and(query_param("start", "0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(mercedes_page(vec![mercedes_vehicle("SHARED", 30_000)])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/inventory"))
        .and(query_param("start", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mercedes_page(Vec::new())))
        .mount(&server)
        .await;

    let config = create_test_config(
        &db_path,
        &["60601"],
        vec![bmw_brand(&server), mercedes_brand(&server)],
    );
    let report_path = dir.path().join("report.md");

    let reports = crawl(config, &[Brand::Mercedes, Brand::Bmw])
        .await
        .expect("Crawl failed");

    // Request order is preserved
    assert_eq!(reports[0].brand, Brand::Mercedes);
    assert_eq!(reports[1].brand, Brand::Bmw);

    // The same VIN under two brands is two independent rows
    let store = open_store(&db_path).unwrap();
    let counts = store.count_by_brand().unwrap();
    assert_eq!(counts.get(&Brand::Bmw), Some(&1));
    assert_eq!(counts.get(&Brand::Mercedes), Some(&1));

    generate_markdown_report(
        &reports,
        Duration::from_secs(3),
        &["ops@example.com".to_string()],
        &report_path,
    )
    .expect("Failed to write report");

    let markdown = std::fs::read_to_string(&report_path).unwrap();
    assert!(markdown.starts_with("# Vehicle Inventory Report - BMW, Mercedes"));
    assert!(markdown.contains("| BMW | 330i xDrive | $26,000 |"));
    assert!(markdown.contains("| Mercedes | GLC 300 4MATIC SUV | $30,000 |"));
}
