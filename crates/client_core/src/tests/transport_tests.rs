use super::*;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use shared::{
    domain::SavedSearch,
    error::{ApiError, ErrorCode},
    protocol::PageQuery,
};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct ServerState {
    requests: Arc<Mutex<Vec<String>>>,
    authorization: Arc<Mutex<Vec<Option<String>>>>,
}

fn saved_search(n: u32) -> SavedSearch {
    SavedSearch {
        id: format!("s{n}"),
        name: format!("Search {n}"),
        search_term: format!("term-{n}"),
        search_path: format!("?q=term-{n}"),
        count: u64::from(n) * 10,
    }
}

async fn record_auth(state: &ServerState, headers: &HeaderMap) {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.authorization.lock().await.push(auth);
}

async fn list_saved_searches(
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
) -> Json<PageResponse<SavedSearch>> {
    record_auth(&state, &headers).await;
    state
        .requests
        .lock()
        .await
        .push(format!("GET page={}", query.page));
    let first = (query.page - 1) * 2 + 1;
    Json(PageResponse::new(
        vec![saved_search(first), saved_search(first + 1)],
        5,
    ))
}

async fn delete_saved_search(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    record_auth(&state, &headers).await;
    state.requests.lock().await.push(format!("DELETE {id}"));
    match id.as_str() {
        "missing" => (
            StatusCode::NOT_FOUND,
            Json(ApiError::new(ErrorCode::NotFound, "no saved search missing")),
        )
            .into_response(),
        "broken" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        _ => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn malformed_page() -> &'static str {
    "{\"items\": []}"
}

async fn spawn_collection_server() -> Result<(String, ServerState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServerState::default();
    let app = Router::new()
        .route("/api/saved-searches/", get(list_saved_searches))
        .route("/api/saved-searches/:id", delete(delete_saved_search))
        .route("/api/malformed/", get(malformed_page))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}/api"), state))
}

#[test]
fn builds_collection_urls_under_base_path() {
    let api = HttpCollectionApi::<SavedSearch>::new("http://localhost:8080/api/", "saved-searches")
        .expect("api");
    assert_eq!(
        api.list_url().as_str(),
        "http://localhost:8080/api/saved-searches/"
    );
    assert_eq!(
        api.record_url("s1").as_str(),
        "http://localhost:8080/api/saved-searches/s1"
    );
}

#[test]
fn escapes_record_ids_in_delete_url() {
    let api =
        HttpCollectionApi::<SavedSearch>::new("http://localhost:8080", "/saved-searches/")
            .expect("api");
    assert_eq!(
        api.record_url("a/b c").as_str(),
        "http://localhost:8080/saved-searches/a%2Fb%20c"
    );
}

#[test]
fn rejects_unusable_server_urls() {
    assert!(HttpCollectionApi::<SavedSearch>::new("not a url", "saved-searches").is_err());
    assert!(HttpCollectionApi::<SavedSearch>::new("ftp://host", "saved-searches").is_err());
    assert!(HttpCollectionApi::<SavedSearch>::new("http://host", "  /  ").is_err());
}

#[tokio::test]
async fn fetches_page_with_query_and_bearer_token() {
    let (server_url, state) = spawn_collection_server().await.expect("spawn server");
    let api = HttpCollectionApi::<SavedSearch>::new(&server_url, "saved-searches")
        .expect("api")
        .with_bearer_token("secret-token");

    let page = api.fetch_page(2).await.expect("fetch page");

    assert_eq!(page.count, 5);
    assert_eq!(page.result, vec![saved_search(3), saved_search(4)]);
    assert_eq!(*state.requests.lock().await, vec!["GET page=2".to_string()]);
    assert_eq!(
        *state.authorization.lock().await,
        vec![Some("Bearer secret-token".to_string())]
    );
}

#[tokio::test]
async fn deletes_record_without_token_when_none_configured() {
    let (server_url, state) = spawn_collection_server().await.expect("spawn server");
    let api = HttpCollectionApi::<SavedSearch>::new(&server_url, "saved-searches").expect("api");

    api.delete("s3").await.expect("delete");

    assert_eq!(*state.requests.lock().await, vec!["DELETE s3".to_string()]);
    assert_eq!(*state.authorization.lock().await, vec![None]);
}

#[tokio::test]
async fn surfaces_api_error_body_on_failed_delete() {
    let (server_url, _state) = spawn_collection_server().await.expect("spawn server");
    let api = HttpCollectionApi::<SavedSearch>::new(&server_url, "saved-searches").expect("api");

    let err = api.delete("missing").await.expect_err("must fail");
    let chain = format!("{err:#}");
    assert!(chain.contains("404"), "unexpected error: {chain}");
    assert!(
        chain.contains("no saved search missing"),
        "unexpected error: {chain}"
    );
    let exception = err
        .downcast_ref::<shared::error::ApiException>()
        .expect("api exception in chain");
    assert_eq!(exception.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn reports_status_when_error_body_is_not_json() {
    let (server_url, _state) = spawn_collection_server().await.expect("spawn server");
    let api = HttpCollectionApi::<SavedSearch>::new(&server_url, "saved-searches").expect("api");

    let err = api.delete("broken").await.expect_err("must fail");
    assert!(err.to_string().contains("500"), "unexpected error: {err}");
}

#[tokio::test]
async fn rejects_malformed_page_body() {
    let (server_url, _state) = spawn_collection_server().await.expect("spawn server");
    let api = HttpCollectionApi::<SavedSearch>::new(&server_url, "malformed").expect("api");

    let err = api.fetch_page(1).await.expect_err("must fail");
    assert!(err.to_string().contains("malformed collection page body"));
}

#[tokio::test]
async fn controller_drives_http_collection_end_to_end() {
    let (server_url, state) = spawn_collection_server().await.expect("spawn server");
    let api = HttpCollectionApi::<SavedSearch>::new(&server_url, "saved-searches").expect("api");
    let controller = PagedCollectionController::<SavedSearch>::with_page_size(
        Arc::new(api),
        std::num::NonZeroU32::new(2).expect("page size"),
    );

    controller.go_to_page(2).await;
    controller.remove("s4").await;

    assert_eq!(controller.records().await, vec![saved_search(3)]);
    let page_state = controller.page_state().await;
    assert_eq!(page_state.range_label(), "3 - 4 of 5");
    assert_eq!(page_state.total_pages(), 3);
    assert_eq!(
        *state.requests.lock().await,
        vec!["GET page=2".to_string(), "DELETE s4".to_string()]
    );
}
