//! Integration tests for the engineer endpoints.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_create_and_list_engineers() {
    let app = helpers::TestApp::new().await;
    let id = app.create_engineer("Ali", "علي").await;

    let response = app.request("GET", "/api/engineers", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["isSuccess"], true);
    assert_eq!(response.body["message"], "Completed Successfully");

    let engineers = response.body["data"].as_array().expect("list");
    assert_eq!(engineers.len(), 1);
    assert_eq!(engineers[0]["id"], id.as_str());
    assert_eq!(engineers[0]["name"], "Ali");
    assert_eq!(engineers[0]["nameAR"], "علي");
}

#[tokio::test]
async fn test_create_with_empty_names_is_rejected() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request("POST", "/api/engineers", Some(json!({ "name": "", "nameAR": "" })))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["isSuccess"], false);
    assert_eq!(response.body["message"], "Validation failed.");
    assert_eq!(response.body["errors"]["Name"][0], "Name cannot be empty.");
    assert_eq!(response.body["errors"]["NameAR"][0], "NameAR cannot be empty.");

    let list = app.request("GET", "/api/engineers", None).await;
    assert_eq!(list.body["data"], json!([]));
}

#[tokio::test]
async fn test_create_with_long_name_is_rejected() {
    let app = helpers::TestApp::new().await;
    let response = app
        .request(
            "POST",
            "/api/engineers",
            Some(json!({ "name": "x".repeat(101), "nameAR": "علي" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["errors"]["Name"][0],
        "Max length for name is 100 characters."
    );
    assert!(response.body["errors"].get("NameAR").is_none());
}

#[tokio::test]
async fn test_paged_listing() {
    let app = helpers::TestApp::new().await;
    app.create_engineer("Ali", "علي").await;
    app.create_engineer("Sara", "سارة").await;

    let response = app
        .request("GET", "/api/engineers/paged?page_index=0&page_size=1", None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let page = &response.body["data"];
    assert_eq!(page["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(page["totalCount"], 2);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["hasNextPage"], true);
    assert_eq!(page["hasPreviousPage"], false);
}

#[tokio::test]
async fn test_paged_listing_clamps_and_sorts() {
    let app = helpers::TestApp::new().await;
    app.create_engineer("Ali", "علي").await;
    app.create_engineer("Sara", "سارة").await;

    let response = app
        .request(
            "GET",
            "/api/engineers/paged?page_index=-4&page_size=0&sort_by=name&sort_dir=desc",
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let page = &response.body["data"];
    assert_eq!(page["pageIndex"], 0);
    assert_eq!(page["pageSize"], 1);
    assert_eq!(page["items"][0]["name"], "Sara");

    let response = app
        .request("GET", "/api/engineers/paged?sort_by=salary", None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_paged_search_by_name() {
    let app = helpers::TestApp::new().await;
    app.create_engineer("Ali", "علي").await;
    app.create_engineer("Sara", "سارة").await;

    let response = app
        .request("GET", "/api/engineers/paged?search=SAR", None)
        .await;
    let page = &response.body["data"];
    assert_eq!(page["totalCount"], 1);
    assert_eq!(page["items"][0]["name"], "Sara");
}

#[tokio::test]
async fn test_lookup() {
    let app = helpers::TestApp::new().await;
    let id = app.create_engineer("Ali", "علي").await;

    let response = app.request("GET", "/api/engineers/lookup", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"], json!([{ "id": id, "name": "Ali" }]));
}

#[tokio::test]
async fn test_get_unknown_engineer_is_404() {
    let app = helpers::TestApp::new().await;
    let id = "5f0c6c3e-8d5b-4c43-9b1e-0a6c1f0d2b7a";

    let response = app
        .request("GET", &format!("/api/engineers/{id}"), None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(
        response.body["message"],
        format!("Entity \"Engineer\" ({id}) was not found.")
    );

    let response = app.request("GET", "/api/engineers/not-a-uuid", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_and_delete_engineer() {
    let app = helpers::TestApp::new().await;
    let id = app.create_engineer("Ali", "علي").await;
    let path = format!("/api/engineers/{id}");

    let response = app
        .request("PUT", &path, Some(json!({ "name": "Ali Hassan", "nameAR": "علي حسن" })))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["name"], "Ali Hassan");

    let response = app.request("GET", &path, None).await;
    assert_eq!(response.body["data"]["nameAR"], "علي حسن");

    let response = app.request("DELETE", &path, None).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("GET", &path, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.request("DELETE", &path, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_with_mismatched_id_is_rejected() {
    let app = helpers::TestApp::new().await;
    let id = app.create_engineer("Ali", "علي").await;

    let response = app
        .request(
            "PUT",
            &format!("/api/engineers/{id}"),
            Some(json!({
                "id": "5f0c6c3e-8d5b-4c43-9b1e-0a6c1f0d2b7a",
                "name": "Ali",
                "nameAR": "علي"
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let app = helpers::TestApp::new().await;
    let response = app.request("GET", "/api/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["database"], app.database.provider_name());
}

#[tokio::test]
async fn test_create_with_malformed_json_is_rejected() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request_raw("POST", "/api/engineers", Some("application/json"), "{\"name\": ")
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["isSuccess"], false);
    assert!(
        response.body["message"]
            .as_str()
            .is_some_and(|m| m.starts_with("Invalid request body"))
    );

    let list = app.request("GET", "/api/engineers", None).await;
    assert_eq!(list.body["data"], json!([]));
}

#[tokio::test]
async fn test_create_with_mistyped_field_is_rejected() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request("POST", "/api/engineers", Some(json!({ "name": 5, "nameAR": "علي" })))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["isSuccess"], false);
}

#[tokio::test]
async fn test_create_without_content_type_is_rejected() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request_raw(
            "POST",
            "/api/engineers",
            None,
            r#"{"name": "Ali", "nameAR": "علي"}"#,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["isSuccess"], false);
}

#[tokio::test]
async fn test_update_with_malformed_json_is_rejected() {
    let app = helpers::TestApp::new().await;
    let id = app.create_engineer("Ali", "علي").await;

    let response = app
        .request_raw(
            "PUT",
            &format!("/api/engineers/{id}"),
            Some("application/json"),
            "not json",
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["isSuccess"], false);

    let fetched = app.request("GET", &format!("/api/engineers/{id}"), None).await;
    assert_eq!(fetched.body["data"]["name"], "Ali");
}
