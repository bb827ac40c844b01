//! Test helpers for integration tests.
//!
//! Provides `TestBackend`, an in-process HTTP stub of the storage backend
//! serving both the direct and the webhook endpoint families over an
//! in-memory directory tree.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path as AxumPath, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use stowage::path;

/// Fixed modification timestamp reported for every stored file.
pub const FIXED_MODIFIED: &str = "2025-01-01T00:00:00Z";

/// In-memory backend state.
#[derive(Default)]
pub struct StubState {
    /// Normalized folder paths; the root is implicit.
    folders: BTreeSet<String>,
    /// File path -> content.
    files: BTreeMap<String, Vec<u8>>,
    /// Last Authorization header seen on a listing request.
    last_authorization: Option<String>,
}

impl StubState {
    fn folder_exists(&self, folder: &str) -> bool {
        folder.is_empty() || self.folders.contains(folder)
    }

    fn subfolders_of(&self, parent: &str) -> Vec<String> {
        self.folders
            .iter()
            .filter(|f| path::parent(f) == parent)
            .filter_map(|f| path::file_name(f).map(|n| n.to_string()))
            .collect()
    }

    fn files_of(&self, parent: &str) -> Vec<Value> {
        self.files
            .iter()
            .filter(|(p, _)| path::parent(p) == parent)
            .map(|(p, content)| file_json(p, content))
            .collect()
    }

    fn listing_json(&self, folder: &str) -> Value {
        json!({
            "path": folder,
            "files": self.files_of(folder),
            "subfolders": self.subfolders_of(folder),
        })
    }
}

fn file_json(file_path: &str, content: &[u8]) -> Value {
    json!({
        "name": path::file_name(file_path).unwrap_or_default(),
        "path": file_path,
        "size": content.len(),
        "modified": FIXED_MODIFIED,
        "type": "application/octet-stream",
    })
}

type SharedState = Arc<Mutex<StubState>>;

/// In-process stub backend.
pub struct TestBackend {
    /// Base URL of the running stub, e.g. `http://127.0.0.1:49152`.
    pub base_url: String,
    state: SharedState,
}

impl TestBackend {
    /// Start the stub on an ephemeral port.
    pub async fn start() -> Self {
        let state: SharedState = Arc::new(Mutex::new(StubState::default()));

        let app = Router::new()
            // Direct API family
            .route("/api/folders/status", get(folder_status))
            .route("/api/files/list", get(list_all_files))
            .route("/api/files/upload", post(upload_file))
            .route("/api/files", axum::routing::delete(delete_file))
            .route("/api/files/rename", put(rename_file))
            .route("/api/files/download/*path", get(download_file))
            .route(
                "/api/folders",
                post(create_folder).delete(delete_folder),
            )
            .route("/api/folders/rename", put(rename_folder))
            // Webhook family
            .route("/webhook/folders/status", get(webhook_folder_status))
            .route("/webhook/files/upload", post(webhook_upload_file))
            .route("/webhook/files/delete", post(webhook_delete_file))
            .route("/webhook/files/rename", post(webhook_rename_file))
            .route("/webhook/folders/create", post(webhook_create_folder))
            .route("/webhook/folders/delete", post(webhook_delete_folder))
            .route("/webhook/folders/rename", post(webhook_rename_folder))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind stub backend");
        let addr = listener.local_addr().expect("stub has no local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub backend died");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Seed a folder (parents are not created implicitly).
    pub fn seed_folder(&self, folder: &str) {
        self.state
            .lock()
            .unwrap()
            .folders
            .insert(path::normalize(folder));
    }

    /// Seed a file with content.
    pub fn seed_file(&self, file_path: &str, content: &[u8]) {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(path::normalize(file_path), content.to_vec());
    }

    /// Whether a folder currently exists.
    pub fn has_folder(&self, folder: &str) -> bool {
        self.state.lock().unwrap().folders.contains(folder)
    }

    /// Whether a file currently exists.
    pub fn has_file(&self, file_path: &str) -> bool {
        self.state.lock().unwrap().files.contains_key(file_path)
    }

    /// Content of a stored file.
    pub fn file_content(&self, file_path: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().files.get(file_path).cloned()
    }

    /// The Authorization header observed on the last listing request.
    pub fn last_authorization(&self) -> Option<String> {
        self.state.lock().unwrap().last_authorization.clone()
    }
}

fn query_param(params: &HashMap<String, String>, key: &str) -> String {
    params.get(key).cloned().unwrap_or_default()
}

// ----------------------------------------------------------------------
// Shared operation logic (both families route here)
// ----------------------------------------------------------------------

fn do_delete_file(state: &SharedState, file_path: &str) -> Result<String, (StatusCode, String)> {
    let mut state = state.lock().unwrap();
    if state.files.remove(file_path).is_none() {
        return Err((StatusCode::NOT_FOUND, "file not found".to_string()));
    }
    Ok(format!("deleted {file_path}"))
}

fn do_rename_file(
    state: &SharedState,
    old_path: &str,
    new_name: &str,
) -> Result<String, (StatusCode, String)> {
    let mut state = state.lock().unwrap();
    let Some(content) = state.files.remove(old_path) else {
        return Err((StatusCode::NOT_FOUND, "file not found".to_string()));
    };
    let new_path = path::join(&path::parent(old_path), new_name);
    if state.files.contains_key(&new_path) {
        // Restore and refuse
        state.files.insert(old_path.to_string(), content);
        return Err((StatusCode::CONFLICT, "target exists".to_string()));
    }
    state.files.insert(new_path.clone(), content);
    Ok(format!("renamed to {new_path}"))
}

fn do_create_folder(
    state: &SharedState,
    parent_path: &str,
    name: &str,
) -> Result<String, (StatusCode, String)> {
    let mut state = state.lock().unwrap();
    let folder = path::join(parent_path, name);
    if state.folders.contains(&folder) {
        return Err((StatusCode::CONFLICT, "folder exists".to_string()));
    }
    state.folders.insert(folder.clone());
    Ok(format!("created {folder}"))
}

fn do_delete_folder(state: &SharedState, folder: &str) -> Result<String, (StatusCode, String)> {
    let mut state = state.lock().unwrap();
    if !state.folders.contains(folder) {
        return Err((StatusCode::NOT_FOUND, "folder not found".to_string()));
    }
    let prefix = format!("{folder}/");
    state
        .folders
        .retain(|f| f != folder && !f.starts_with(&prefix));
    state.files.retain(|f, _| !f.starts_with(&prefix));
    Ok(format!("deleted {folder}"))
}

fn do_rename_folder(
    state: &SharedState,
    parent_path: &str,
    old_name: &str,
    new_name: &str,
) -> Result<String, (StatusCode, String)> {
    let mut state = state.lock().unwrap();
    let old_folder = path::join(parent_path, old_name);
    let new_folder = path::join(parent_path, new_name);
    if !state.folders.contains(&old_folder) {
        return Err((StatusCode::NOT_FOUND, "folder not found".to_string()));
    }
    if state.folders.contains(&new_folder) {
        return Err((StatusCode::CONFLICT, "folder exists".to_string()));
    }

    let old_prefix = format!("{old_folder}/");
    let rekey = |p: &str| {
        if p == old_folder {
            new_folder.clone()
        } else if let Some(rest) = p.strip_prefix(&old_prefix) {
            format!("{new_folder}/{rest}")
        } else {
            p.to_string()
        }
    };

    state.folders = state.folders.iter().map(|f| rekey(f)).collect();
    state.files = state
        .files
        .iter()
        .map(|(p, c)| (rekey(p), c.clone()))
        .collect();
    Ok(format!("renamed to {new_folder}"))
}

async fn read_upload(
    mut multipart: Multipart,
) -> Result<(String, Vec<u8>, String), (StatusCode, String)> {
    let mut file_name = None;
    let mut content = None;
    let mut folder_path = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    {
        match field.name() {
            Some("file") => {
                file_name = field.file_name().map(|n| n.to_string());
                content = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
                        .to_vec(),
                );
            }
            Some("folder_path") => {
                folder_path = field
                    .text()
                    .await
                    .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
            }
            _ => {}
        }
    }

    let name = file_name.ok_or((StatusCode::BAD_REQUEST, "missing file part".to_string()))?;
    let content = content.ok_or((StatusCode::BAD_REQUEST, "missing file content".to_string()))?;
    Ok((name, content, folder_path))
}

fn do_store_upload(state: &SharedState, name: &str, content: Vec<u8>, folder_path: &str) -> Value {
    let file_path = path::join(&path::normalize(folder_path), name);
    let size = content.len();
    state
        .lock()
        .unwrap()
        .files
        .insert(file_path.clone(), content);
    json!({
        "filename": name,
        "path": file_path,
        "size": size,
        "url": format!("/api/files/download/{file_path}"),
    })
}

// ----------------------------------------------------------------------
// Direct API handlers
// ----------------------------------------------------------------------

async fn folder_status(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let folder = query_param(&params, "folder_path");
    let mut guard = state.lock().unwrap();
    guard.last_authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    if !guard.folder_exists(&folder) {
        return (StatusCode::NOT_FOUND, "folder not found").into_response();
    }
    Json(guard.listing_json(&folder)).into_response()
}

async fn list_all_files(
    State(state): State<SharedState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let folder = query_param(&params, "folder_path");
    let guard = state.lock().unwrap();
    let prefix = format!("{folder}/");
    let files: Vec<Value> = guard
        .files
        .iter()
        .filter(|(p, _)| folder.is_empty() || p.starts_with(&prefix))
        .map(|(p, c)| file_json(p, c))
        .collect();
    let count = files.len();
    Json(json!({ "files": files, "count": count })).into_response()
}

async fn upload_file(State(state): State<SharedState>, multipart: Multipart) -> Response {
    match read_upload(multipart).await {
        Ok((name, content, folder_path)) => {
            Json(do_store_upload(&state, &name, content, &folder_path)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

async fn delete_file(
    State(state): State<SharedState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    match do_delete_file(&state, &query_param(&params, "file_path")) {
        Ok(msg) => msg.into_response(),
        Err(e) => e.into_response(),
    }
}

async fn rename_file(
    State(state): State<SharedState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    match do_rename_file(
        &state,
        &query_param(&params, "old_path"),
        &query_param(&params, "new_name"),
    ) {
        Ok(msg) => msg.into_response(),
        Err(e) => e.into_response(),
    }
}

async fn download_file(
    State(state): State<SharedState>,
    AxumPath(file_path): AxumPath<String>,
) -> Response {
    match state.lock().unwrap().files.get(&file_path) {
        Some(content) => content.clone().into_response(),
        None => (StatusCode::NOT_FOUND, "file not found").into_response(),
    }
}

async fn create_folder(State(state): State<SharedState>, Json(body): Json<Value>) -> Response {
    let name = body["name"].as_str().unwrap_or_default();
    let parent = body["parent_path"].as_str().unwrap_or_default();
    match do_create_folder(&state, parent, name) {
        Ok(msg) => msg.into_response(),
        Err(e) => e.into_response(),
    }
}

async fn delete_folder(
    State(state): State<SharedState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    match do_delete_folder(&state, &query_param(&params, "folder_path")) {
        Ok(msg) => msg.into_response(),
        Err(e) => e.into_response(),
    }
}

async fn rename_folder(State(state): State<SharedState>, Json(body): Json<Value>) -> Response {
    match do_rename_folder(
        &state,
        body["parent_path"].as_str().unwrap_or_default(),
        body["old_name"].as_str().unwrap_or_default(),
        body["new_name"].as_str().unwrap_or_default(),
    ) {
        Ok(msg) => msg.into_response(),
        Err(e) => e.into_response(),
    }
}

// ----------------------------------------------------------------------
// Webhook handlers: same operations, enveloped responses, POST writes.
// Failures come back as HTTP 200 with success=false.
// ----------------------------------------------------------------------

fn envelope_ok(message: &str, data: Option<Value>) -> Response {
    let mut body = json!({ "success": true, "message": message });
    if let Some(data) = data {
        body["data"] = data;
    }
    Json(body).into_response()
}

fn envelope_err(message: &str) -> Response {
    Json(json!({ "success": false, "message": message })).into_response()
}

async fn webhook_folder_status(
    State(state): State<SharedState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let folder = query_param(&params, "folder_path");
    let guard = state.lock().unwrap();
    if !guard.folder_exists(&folder) {
        return envelope_err("folder not found");
    }
    let listing = guard.listing_json(&folder);
    envelope_ok("folder status", Some(listing))
}

async fn webhook_upload_file(State(state): State<SharedState>, multipart: Multipart) -> Response {
    match read_upload(multipart).await {
        Ok((name, content, folder_path)) => {
            let uploaded = do_store_upload(&state, &name, content, &folder_path);
            envelope_ok("uploaded", Some(uploaded))
        }
        Err((_, msg)) => envelope_err(&msg),
    }
}

async fn webhook_delete_file(
    State(state): State<SharedState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    match do_delete_file(&state, &query_param(&params, "file_path")) {
        Ok(msg) => envelope_ok(&msg, None),
        Err((_, msg)) => envelope_err(&msg),
    }
}

async fn webhook_rename_file(
    State(state): State<SharedState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    match do_rename_file(
        &state,
        &query_param(&params, "old_path"),
        &query_param(&params, "new_name"),
    ) {
        Ok(msg) => envelope_ok(&msg, None),
        Err((_, msg)) => envelope_err(&msg),
    }
}

async fn webhook_create_folder(
    State(state): State<SharedState>,
    Json(body): Json<Value>,
) -> Response {
    match do_create_folder(
        &state,
        body["parent_path"].as_str().unwrap_or_default(),
        body["name"].as_str().unwrap_or_default(),
    ) {
        Ok(msg) => envelope_ok(&msg, None),
        Err((_, msg)) => envelope_err(&msg),
    }
}

async fn webhook_delete_folder(
    State(state): State<SharedState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    match do_delete_folder(&state, &query_param(&params, "folder_path")) {
        Ok(msg) => envelope_ok(&msg, None),
        Err((_, msg)) => envelope_err(&msg),
    }
}

async fn webhook_rename_folder(
    State(state): State<SharedState>,
    Json(body): Json<Value>,
) -> Response {
    match do_rename_folder(
        &state,
        body["parent_path"].as_str().unwrap_or_default(),
        body["old_name"].as_str().unwrap_or_default(),
        body["new_name"].as_str().unwrap_or_default(),
    ) {
        Ok(msg) => envelope_ok(&msg, None),
        Err((_, msg)) => envelope_err(&msg),
    }
}
