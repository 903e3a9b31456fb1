//! Report and column CRUD against a mock backend.

mod common;

use std::sync::Arc;

use common::{api_client, jwt, session};
use repdash_core::report::{
    ColumnPatch, NewColumn, NewReport, Page, ReportInterval, ReportPatch, ReportStatus, ReportType,
};
use repdash_core::{Error, MemoryTokenStore, ReportService};
use repdash_http::ReportsClient;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn report_json(id: i64, title: &str, slug: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": null,
        "type": "cached",
        "interval": "daily",
        "status": "active",
        "slug": slug,
        "params": null
    })
}

fn column_json(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": null,
        "status": "active",
        "query": "SELECT count(*) FROM orders",
        "connection_id": "PostgreSQL_Main"
    })
}

async fn reports_client(server: &MockServer) -> ReportsClient {
    let store = Arc::new(MemoryTokenStore::with_tokens(Some(&jwt(600)), Some("r1")));
    let session = session(server, store);
    session.initialize().unwrap();
    let (api, _) = api_client(session);
    ReportsClient::new(api)
}

#[tokio::test]
async fn list_reports_sends_pagination_and_fills_cache() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reports"))
        .and(query_param("limit", "20"))
        .and(query_param("offset", "40"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            report_json(1, "Sales", "sales"),
            report_json(2, "Churn", "churn")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = reports_client(&server).await;
    let reports = client.list_reports(Page::new(20, 40).unwrap()).await.unwrap();

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].report_type, ReportType::Cached);
    assert_eq!(client.cached_reports(), reports);
}

#[tokio::test]
async fn create_report_validates_before_sending() {
    let server = MockServer::start().await;
    let client = reports_client(&server).await;

    let new = NewReport::new("ab", ReportType::Realtime, ReportInterval::Hourly, ReportStatus::Active);
    let err = client.create_report(&new).await.unwrap_err();

    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_report_goes_to_front_of_cache() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reports"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([report_json(1, "Sales", "sales")])),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/reports"))
        .and(body_json(json!({
            "title": "Monthly Revenue",
            "description": "Revenue per month",
            "type": "cached",
            "interval": "monthly",
            "status": "active"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(report_json(2, "Monthly Revenue", "monthly-revenue")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = reports_client(&server).await;
    client.list_reports(Page::default()).await.unwrap();

    let new = NewReport::new(
        "Monthly Revenue",
        ReportType::Cached,
        ReportInterval::Monthly,
        ReportStatus::Active,
    )
    .with_description("Revenue per month");
    let created = client.create_report(&new).await.unwrap();

    assert_eq!(created.slug, "monthly-revenue");
    let ids: Vec<i64> = client.cached_reports().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![2, 1]);
}

#[tokio::test]
async fn update_report_sends_only_changed_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reports/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(report_json(1, "Sales", "sales")))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/reports/1"))
        .and(body_json(json!({"title": "Sales EU"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(report_json(1, "Sales EU", "sales-eu")))
        .expect(1)
        .mount(&server)
        .await;

    let client = reports_client(&server).await;
    client.get_report(1).await.unwrap();

    let patch = ReportPatch {
        title: Some("Sales EU".to_string()),
        ..Default::default()
    };
    let updated = client.update_report(1, &patch).await.unwrap();

    assert_eq!(updated.slug, "sales-eu");
    assert_eq!(client.cached_report(1).unwrap().title, "Sales EU");
}

#[tokio::test]
async fn failed_update_rolls_back_rename() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reports/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(report_json(1, "Sales", "sales")))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/reports/1"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "Database error"})))
        .mount(&server)
        .await;

    let client = reports_client(&server).await;
    client.get_report(1).await.unwrap();

    let patch = ReportPatch {
        title: Some("Renamed".to_string()),
        ..Default::default()
    };
    let err = client.update_report(1, &patch).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    let cached = client.cached_report(1).unwrap();
    assert_eq!(cached.title, "Sales");
    assert_eq!(cached.slug, "sales");
}

#[tokio::test]
async fn empty_patch_is_rejected() {
    let server = MockServer::start().await;
    let client = reports_client(&server).await;

    let err = client
        .update_report(1, &ReportPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_report_drops_it_and_its_columns() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reports"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([report_json(1, "Sales", "sales")])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/reports/1/columns"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([column_json(10, "Orders")])))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/reports/1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Report deleted successfully"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = reports_client(&server).await;
    client.list_reports(Page::default()).await.unwrap();
    client.list_columns(1, Page::default()).await.unwrap();
    assert_eq!(client.cached_columns(1).len(), 1);

    client.delete_report(1).await.unwrap();

    assert!(client.cached_reports().is_empty());
    assert!(client.cached_columns(1).is_empty());
}

#[tokio::test]
async fn columns_are_tagged_with_their_report() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reports/3/columns"))
        .and(query_param("limit", "10"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            column_json(10, "Orders"),
            column_json(11, "Refunds")
        ])))
        .mount(&server)
        .await;

    let client = reports_client(&server).await;
    let columns = client.list_columns(3, Page::default()).await.unwrap();

    assert_eq!(columns.len(), 2);
    assert!(columns.iter().all(|c| c.report_id == Some(3)));
    assert_eq!(client.cached_columns(3), columns);
}

#[tokio::test]
async fn column_lifecycle() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/reports/3/columns"))
        .and(body_partial_json(json!({
            "name": "Orders",
            "status": "active",
            "connection_id": "PostgreSQL_Main"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(column_json(10, "Orders")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/reports/3/columns/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(column_json(10, "Orders")))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/reports/3/columns/10"))
        .and(body_json(json!({"status": "inactive"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 10,
            "name": "Orders",
            "description": null,
            "status": "inactive",
            "query": "SELECT count(*) FROM orders",
            "connection_id": "PostgreSQL_Main"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/reports/3/columns/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Column deleted"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = reports_client(&server).await;

    let new = NewColumn::new("Orders", ReportStatus::Active, "PostgreSQL_Main")
        .with_query("SELECT count(*) FROM orders");
    let created = client.create_column(3, &new).await.unwrap();
    assert_eq!(created.report_id, Some(3));

    let fetched = client.get_column(3, 10).await.unwrap();
    assert_eq!(fetched.name, "Orders");

    let patch = ColumnPatch {
        status: Some(ReportStatus::Inactive),
        ..Default::default()
    };
    let updated = client.update_column(3, 10, &patch).await.unwrap();
    assert_eq!(updated.status, ReportStatus::Inactive);
    assert_eq!(client.cached_columns(3)[0].status, ReportStatus::Inactive);

    client.delete_column(3, 10).await.unwrap();
    assert!(client.cached_columns(3).is_empty());
}

#[tokio::test]
async fn column_without_connection_is_rejected() {
    let server = MockServer::start().await;
    let client = reports_client(&server).await;

    let new = NewColumn::new("Orders", ReportStatus::Active, "  ");
    let err = client.create_column(3, &new).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn admin_listing_leaves_cache_alone() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reports"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([report_json(1, "Sales", "sales")])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/admin/reports"))
        .and(query_param("limit", "50"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            report_json(9, "Fleet", "fleet"),
            report_json(1, "Sales", "sales")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = reports_client(&server).await;
    client.list_reports(Page::default()).await.unwrap();

    let all = client.list_all_reports(Page::new(50, 0).unwrap()).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, 9);

    let cached: Vec<i64> = client.cached_reports().iter().map(|r| r.id).collect();
    assert_eq!(cached, vec![1]);
}

#[tokio::test]
async fn admin_listing_forbidden_for_regular_users() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin/reports"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"detail": "Admin access required"})))
        .mount(&server)
        .await;

    let client = reports_client(&server).await;
    let err = client.list_all_reports(Page::default()).await.unwrap_err();

    assert_eq!(err.status(), Some(403));
    assert!(err.to_string().contains("Admin access required"));
    // Not a session problem.
    assert!(client.api().session().is_authenticated());
}
