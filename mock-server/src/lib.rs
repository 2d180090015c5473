use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

pub const DEFAULT_PER_PAGE: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub is_done: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Meta {
    pub current_page: usize,
    pub from: Option<usize>,
    pub last_page: usize,
    pub per_page: usize,
    pub to: Option<usize>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListBody {
    pub data: Vec<Todo>,
    pub meta: Meta,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItemBody {
    pub data: Option<Todo>,
    pub message: String,
}

/// JSON write payload. `is_done` defaults to `false`.
#[derive(Deserialize)]
pub struct TodoJson {
    pub title: String,
    #[serde(default)]
    pub is_done: bool,
}

/// Form write payload; booleans arrive as text.
#[derive(Deserialize)]
pub struct TodoForm {
    pub title: String,
    pub is_done: Option<String>,
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub query: String,
    pub page: Option<usize>,
}

pub struct Store {
    next_id: i64,
    per_page: usize,
    todos: BTreeMap<i64, Todo>,
}

pub type Db = Arc<RwLock<Store>>;

/// Error response: `{data: null, message}` with the given status.
#[derive(Debug)]
pub struct Failure(StatusCode, String);

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let body = ItemBody {
            data: None,
            message: self.1,
        };
        (self.0, Json(body)).into_response()
    }
}

fn not_found(id: i64) -> Failure {
    Failure(StatusCode::NOT_FOUND, format!("todo {id} not found"))
}

pub fn app() -> Router {
    app_with_page_size(DEFAULT_PER_PAGE)
}

pub fn app_with_page_size(per_page: usize) -> Router {
    let db: Db = Arc::new(RwLock::new(Store {
        next_id: 1,
        per_page: per_page.max(1),
        todos: BTreeMap::new(),
    }));
    let api = Router::new()
        .route("/todos", get(list_todos).post(create_todo_multipart))
        .route("/todos/search", get(search_todos))
        .route("/todos/{id}", get(get_todo).put(update_todo_form).delete(delete_todo))
        .route("/todos-json", post(create_todo_json))
        .route("/todos-json/{id}", post(update_todo_json))
        .with_state(db);
    Router::new().nest("/api/v2", api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_todos(State(db): State<Db>, Query(query): Query<PageQuery>) -> Json<ListBody> {
    let store = db.read().await;
    let todos: Vec<Todo> = store.todos.values().rev().cloned().collect();
    Json(paginate(todos, query.page, store.per_page))
}

async fn search_todos(State(db): State<Db>, Query(query): Query<SearchQuery>) -> Json<ListBody> {
    let store = db.read().await;
    let needle = query.query.to_lowercase();
    let todos: Vec<Todo> = store
        .todos
        .values()
        .rev()
        .filter(|todo| todo.title.to_lowercase().contains(&needle))
        .cloned()
        .collect();
    Json(paginate(todos, query.page, store.per_page))
}

async fn get_todo(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<ItemBody>, Failure> {
    let store = db.read().await;
    let todo = store.todos.get(&id).cloned().ok_or_else(|| not_found(id))?;
    Ok(item(todo, "fetched"))
}

async fn create_todo_multipart(
    State(db): State<Db>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ItemBody>), Failure> {
    let mut title = None;
    let mut is_done = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Failure(StatusCode::BAD_REQUEST, e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let value = field
            .text()
            .await
            .map_err(|e| Failure(StatusCode::BAD_REQUEST, e.to_string()))?;
        match name.as_str() {
            "title" => title = Some(value),
            "is_done" => is_done = Some(value),
            _ => {}
        }
    }
    let title = title.ok_or_else(|| Failure(StatusCode::UNPROCESSABLE_ENTITY, "title is required".to_string()))?;
    let is_done = parse_flag(is_done.as_deref())?;
    let todo = insert(&db, title, is_done).await?;
    Ok((StatusCode::CREATED, item(todo, "created")))
}

async fn create_todo_json(
    State(db): State<Db>,
    Json(input): Json<TodoJson>,
) -> Result<(StatusCode, Json<ItemBody>), Failure> {
    let todo = insert(&db, input.title, input.is_done).await?;
    Ok((StatusCode::CREATED, item(todo, "created")))
}

async fn update_todo_json(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<TodoJson>,
) -> Result<Json<ItemBody>, Failure> {
    let todo = update(&db, id, input.title, input.is_done).await?;
    Ok(item(todo, "updated"))
}

async fn update_todo_form(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Form(input): Form<TodoForm>,
) -> Result<Json<ItemBody>, Failure> {
    let is_done = parse_flag(input.is_done.as_deref())?;
    let todo = update(&db, id, input.title, is_done).await?;
    Ok(item(todo, "updated"))
}

async fn delete_todo(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<ItemBody>, Failure> {
    let mut store = db.write().await;
    let todo = store.todos.remove(&id).ok_or_else(|| not_found(id))?;
    Ok(item(todo, "deleted"))
}

async fn insert(db: &Db, title: String, is_done: bool) -> Result<Todo, Failure> {
    let title = validate_title(title)?;
    let mut store = db.write().await;
    let now = timestamp();
    let todo = Todo {
        id: store.next_id,
        title,
        is_done,
        created_at: now.clone(),
        updated_at: now,
    };
    store.next_id += 1;
    store.todos.insert(todo.id, todo.clone());
    Ok(todo)
}

async fn update(db: &Db, id: i64, title: String, is_done: bool) -> Result<Todo, Failure> {
    let title = validate_title(title)?;
    let mut store = db.write().await;
    let todo = store.todos.get_mut(&id).ok_or_else(|| not_found(id))?;
    todo.title = title;
    todo.is_done = is_done;
    todo.updated_at = timestamp();
    Ok(todo.clone())
}

fn validate_title(title: String) -> Result<String, Failure> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(Failure(StatusCode::UNPROCESSABLE_ENTITY, "title is required".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Accepts `true`/`false`/`1`/`0`; absent means `false`.
fn parse_flag(value: Option<&str>) -> Result<bool, Failure> {
    match value.map(str::trim) {
        None | Some("") | Some("false") | Some("0") => Ok(false),
        Some("true") | Some("1") => Ok(true),
        Some(other) => Err(Failure(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("is_done must be a boolean, got {other:?}"),
        )),
    }
}

fn item(todo: Todo, message: &str) -> Json<ItemBody> {
    Json(ItemBody {
        data: Some(todo),
        message: message.to_string(),
    })
}

fn paginate(todos: Vec<Todo>, page: Option<usize>, per_page: usize) -> ListBody {
    let total = todos.len();
    let current_page = page.unwrap_or(1).max(1);
    let last_page = total.div_ceil(per_page).max(1);
    let start = (current_page - 1).saturating_mul(per_page);
    let data: Vec<Todo> = todos.into_iter().skip(start).take(per_page).collect();
    let (from, to) = if data.is_empty() {
        (None, None)
    } else {
        (Some(start + 1), Some(start + data.len()))
    };
    ListBody {
        message: format!("{} todos", data.len()),
        data,
        meta: Meta {
            current_page,
            from,
            last_page,
            per_page,
            to,
            total,
        },
    }
}

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
