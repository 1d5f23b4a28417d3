use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicI64, Ordering},
};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, put},
};
use serde_json::{Value, json};

use finance_tui::{
    accounts::{AccountsPage, LoadState, Modal},
    client::Client,
};

const TOKEN: &str = "tok";

#[derive(Clone, Default)]
struct Backend {
    accounts: Arc<Mutex<Vec<Value>>>,
    next_id: Arc<AtomicI64>,
    fail_deletes: Arc<AtomicBool>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) == Some("Bearer tok")
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Authentication credentials were not provided."})),
    )
        .into_response()
}

async fn list(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let accounts = backend.accounts.lock().unwrap().clone();
    Json(Value::Array(accounts)).into_response()
}

async fn create(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let id = backend.next_id.fetch_add(1, Ordering::SeqCst) + 1;
    let account = json!({
        "id": id,
        "name": body["name"],
        "balance": body["balance"],
        "created_at": "2024-05-01T10:00:00Z",
    });
    backend.accounts.lock().unwrap().insert(0, account.clone());
    (StatusCode::CREATED, Json(account)).into_response()
}

async fn update(
    State(backend): State<Backend>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut accounts = backend.accounts.lock().unwrap();
    let Some(slot) = accounts.iter_mut().find(|a| a["id"] == id) else {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response();
    };
    slot["name"] = body["name"].clone();
    slot["balance"] = body["balance"].clone();
    Json(slot.clone()).into_response()
}

async fn remove(
    State(backend): State<Backend>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if backend.fail_deletes.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "database unavailable"})),
        )
            .into_response();
    }
    backend.accounts.lock().unwrap().retain(|a| a["id"] != id);
    StatusCode::NO_CONTENT.into_response()
}

async fn spawn_backend(backend: Backend) -> String {
    let router = Router::new()
        .route("/api/accounts/", get(list).post(create))
        .route("/api/accounts/{id}", put(update).delete(remove))
        .with_state(backend);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/")
}

async fn page_for(backend: &Backend, token: Option<&str>) -> AccountsPage<Client> {
    let base_url = spawn_backend(backend.clone()).await;
    let client = Client::new(&base_url).unwrap();
    AccountsPage::new(client, token.map(str::to_string))
}

#[tokio::test]
async fn create_edit_and_delete_against_live_server() {
    let backend = Backend::default();
    let mut page = page_for(&backend, Some(TOKEN)).await;

    assert_eq!(page.load().await.unwrap(), 0);
    assert_eq!(page.summary().count, 0);

    page.open_create();
    let draft = page.draft_mut().unwrap();
    draft.name = "  Savings ".to_string();
    draft.balance = "250.5".to_string();
    draft.notes = "rainy day".to_string();
    let saved = page.save().await.unwrap();

    assert_eq!(saved.name, "Savings");
    assert_eq!(*page.modal(), Modal::Closed);
    assert_eq!(page.notes().get(saved.id), Some("rainy day"));
    assert_eq!(page.summary().total.to_string(), "$250.50");
    assert_eq!(backend.accounts.lock().unwrap()[0]["balance"], "250.50");

    page.open_edit_selected();
    let draft = page.draft_mut().unwrap();
    assert_eq!(draft.balance, "250.50");
    assert_eq!(draft.notes, "rainy day");
    draft.balance = "-5".to_string();
    page.save().await.unwrap();
    assert_eq!(page.accounts().len(), 1);
    assert_eq!(page.summary().total.to_string(), "$-5.00");

    // a fresh load agrees with the local list
    page.load().await.unwrap();
    assert_eq!(page.accounts()[0].balance.or_zero().to_string(), "$-5.00");

    page.confirm_delete_selected();
    page.delete().await.unwrap();
    assert!(page.accounts().is_empty());
    assert_eq!(page.notes().get(saved.id), None);
    assert!(backend.accounts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn failed_delete_restores_the_list() {
    let backend = Backend::default();
    let mut page = page_for(&backend, Some(TOKEN)).await;

    for name in ["Checking", "Cash"] {
        page.open_create();
        page.draft_mut().unwrap().name = name.to_string();
        page.save().await.unwrap();
    }
    let before: Vec<_> = page.accounts().to_vec();
    backend.fail_deletes.store(true, Ordering::SeqCst);

    page.confirm_delete_selected();
    let ticket = page.begin_delete().unwrap();
    assert_eq!(ticket.target().name, "Cash");
    assert_eq!(page.accounts().len(), 1);

    assert!(page.complete_delete(ticket).await.is_err());
    assert_eq!(page.accounts(), before.as_slice());
    assert_eq!(page.alert(), Some("Failed to delete account: 500"));
    assert_eq!(backend.accounts.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn missing_token_shows_the_status_banner() {
    let backend = Backend::default();
    backend
        .accounts
        .lock()
        .unwrap()
        .push(json!({"id": 1, "name": "Checking", "balance": "10.00"}));
    let mut page = page_for(&backend, None).await;

    assert!(page.load().await.is_err());
    assert_eq!(
        *page.load_state(),
        LoadState::Error("Failed to load accounts: 401".to_string())
    );
    assert!(page.accounts().is_empty());

    page.set_token(Some(TOKEN.to_string()));
    assert_eq!(page.load().await.unwrap(), 1);
    assert_eq!(page.error_banner(), None);
}
