//! In-process stub of the library backend

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    routing::post,
    Json, Router,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use biblio_client::{
    config::{ApiConfig, SessionConfig},
    ClientConfig, LibraryClient,
};

const SECRET: &[u8] = b"stub-backend-secret";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    user_id: i64,
    exp: i64,
}

#[derive(Debug, Clone)]
pub struct StoredUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl StoredUser {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "username": self.username,
            "email": self.email,
            "created_at": "2024-05-01T10:20:30.123456",
        })
    }
}

#[derive(Default)]
pub struct Backend {
    pub users: Vec<StoredUser>,
    pub books: Vec<Value>,
    next_id: i64,
    /// Number of `GET /app/books` served
    pub list_hits: usize,
    /// Number of `GET /app/books/:id` served
    pub get_hits: usize,
    /// Query string of the last weather request
    pub last_weather_query: Option<HashMap<String, String>>,
    /// Served verbatim instead of a signed JWT on login
    pub opaque_token: Option<String>,
    /// Makes `GET /app/books` fail with a non-JSON 500
    pub fail_books: bool,
    /// Makes weather endpoints fail like the upstream provider timing out
    pub fail_weather: bool,
}

impl Backend {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

pub type Shared = Arc<Mutex<Backend>>;

pub struct TestServer {
    pub base_url: String,
    pub state: Shared,
    handle: JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl TestServer {
    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            api: ApiConfig {
                base_url: self.base_url.clone(),
                timeout_secs: Some(5),
            },
            session: SessionConfig {
                legacy_store_path: None,
            },
            ..Default::default()
        }
    }

    pub fn client(&self) -> LibraryClient {
        LibraryClient::new(self.config()).expect("Failed to create client")
    }

    /// Client logged in as `alice` / `secret1`
    pub async fn logged_in_client(&self) -> LibraryClient {
        self.add_user("alice", "a@x.com", "secret1");
        let client = self.client();
        client
            .services
            .auth
            .login(&biblio_client::models::LoginRequest {
                login: "alice".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .expect("Failed to log in");
        client
    }

    pub fn add_user(&self, username: &str, email: &str, password: &str) {
        let mut backend = self.state.lock();
        let id = backend.next_id();
        backend.users.push(StoredUser {
            id,
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        });
    }
}

pub async fn spawn_backend() -> TestServer {
    let state: Shared = Arc::new(Mutex::new(Backend::default()));

    let app = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/app/books", get(list_books).post(create_book))
        .route("/app/books/:id", get(get_book).put(update_book).delete(delete_book))
        .route("/weather/current", get(current_weather))
        .route("/weather/forecast/3hourly", get(forecast_3hourly))
        .route("/weather/forecast/daily", get(forecast_daily))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub backend");
    let addr = listener.local_addr().expect("No local address");

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Stub backend failed");
    });

    TestServer {
        base_url: format!("http://{}", addr),
        state,
        handle,
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn authorize(headers: &HeaderMap) -> Result<Claims, Response> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Missing Authorization Header" })),
            )
                .into_response()
        })?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Invalid authorization header"))?;

    jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(SECRET), &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| error(StatusCode::UNAUTHORIZED, "Token inválido"))
}

async fn register(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let field = |name: &str| body[name].as_str().unwrap_or_default().to_string();
    let (username, email, password) = (field("username"), field("email"), field("password"));
    if username.is_empty() || email.is_empty() || password.is_empty() {
        return error(StatusCode::BAD_REQUEST, "Username, email y password son requeridos");
    }

    let mut backend = state.lock();
    if backend.users.iter().any(|u| u.username == username || u.email == email) {
        return error(StatusCode::CONFLICT, "Usuario ya existe");
    }

    let id = backend.next_id();
    let user = StoredUser { id, username, email, password };
    let body = json!({ "message": "Usuario registrado exitosamente", "user": user.to_json() });
    backend.users.push(user);
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let login = body["login"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let backend = state.lock();
    let Some(user) = backend
        .users
        .iter()
        .find(|u| (u.username == login || u.email == login) && u.password == password)
    else {
        return error(StatusCode::UNAUTHORIZED, "Credenciales inválidas");
    };

    let token = match &backend.opaque_token {
        Some(token) => token.clone(),
        None => {
            let claims = Claims {
                sub: user.username.clone(),
                user_id: user.id,
                exp: chrono::Utc::now().timestamp() + 3600,
            };
            jsonwebtoken::encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET))
                .expect("Failed to sign token")
        }
    };

    Json(json!({
        "message": "Login exitoso",
        "access_token": token,
        "user": user.to_json(),
    }))
    .into_response()
}

async fn list_books(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(rejection) = authorize(&headers) {
        return rejection;
    }

    let mut backend = state.lock();
    backend.list_hits += 1;
    if backend.fail_books {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }

    Json(json!({ "books": backend.books, "total": backend.books.len() })).into_response()
}

async fn get_book(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if let Err(rejection) = authorize(&headers) {
        return rejection;
    }

    let mut backend = state.lock();
    backend.get_hits += 1;
    match backend.books.iter().find(|b| b["id"] == id) {
        Some(book) => Json(json!({ "message": "Libro encontrado", "book": book })).into_response(),
        None => error(StatusCode::NOT_FOUND, "Book not found"),
    }
}

async fn create_book(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(rejection) = authorize(&headers) {
        return rejection;
    }

    let mut backend = state.lock();
    let mut book = body;
    book["id"] = json!(backend.next_id());
    book["created_at"] = json!("2024-05-01T10:20:30.123456");
    book["updated_at"] = json!("2024-05-01T10:20:30.123456");
    backend.books.push(book.clone());

    (StatusCode::CREATED, Json(json!({ "message": "Libro creado exitosamente", "book": book })))
        .into_response()
}

async fn update_book(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = authorize(&headers) {
        return rejection;
    }

    let mut backend = state.lock();
    let Some(book) = backend.books.iter_mut().find(|b| b["id"] == id) else {
        return error(StatusCode::NOT_FOUND, "Book not found");
    };
    if let (Some(book), Some(changes)) = (book.as_object_mut(), body.as_object()) {
        for (key, value) in changes {
            book.insert(key.clone(), value.clone());
        }
    }
    let book = book.clone();

    Json(json!({ "message": "Libro actualizado exitosamente", "book": book })).into_response()
}

async fn delete_book(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if let Err(rejection) = authorize(&headers) {
        return rejection;
    }

    let mut backend = state.lock();
    let before = backend.books.len();
    backend.books.retain(|b| b["id"] != id);
    if backend.books.len() == before {
        return error(StatusCode::NOT_FOUND, "Book not found");
    }

    Json(json!({ "success": true, "message": "Book deleted successfully" })).into_response()
}

fn record_weather(state: &Shared, headers: &HeaderMap, query: HashMap<String, String>) -> Result<(), Response> {
    authorize(headers)?;
    let mut backend = state.lock();
    backend.last_weather_query = Some(query);
    if backend.fail_weather {
        return Err(error(StatusCode::BAD_GATEWAY, "Timeout al consultar el servicio del clima"));
    }
    Ok(())
}

fn description() -> Value {
    json!({ "code": 800, "description": "Cielo despejado", "icon": "c01d" })
}

async fn current_weather(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Err(rejection) = record_weather(&state, &headers, query) {
        return rejection;
    }

    Json(json!({
        "count": 1,
        "data": [{
            "city_name": "Madrid",
            "country_code": "ES",
            "lat": 40.4168,
            "lon": -3.7038,
            "timezone": "Europe/Madrid",
            "temp": 21.5,
            "app_temp": 20.9,
            "rh": 40,
            "wind_spd": 3.1,
            "wind_cdir": "NE",
            "wind_cdir_full": "noreste",
            "clouds": 0,
            "precip": 0,
            "snow": 0,
            "uv": 6.2,
            "aqi": null,
            "weather": description(),
            "datetime": "2024-05-01:12",
            "ob_time": "2024-05-01 12:00",
            "ts": 1714564800,
            "sunrise": "05:12",
            "sunset": "18:48"
        }]
    }))
    .into_response()
}

async fn forecast_3hourly(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Err(rejection) = record_weather(&state, &headers, query) {
        return rejection;
    }

    let slots: Vec<Value> = (0..8)
        .map(|i| {
            json!({
                "timestamp_local": format!("2024-05-01T{:02}:00:00", i * 3),
                "ts": 1714521600 + i * 10800,
                "temp": 15.0 + i as f64,
                "weather": description(),
                "pop": 0
            })
        })
        .collect();

    Json(json!({ "city_name": "Madrid", "country_code": "ES", "data": slots })).into_response()
}

async fn forecast_daily(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let days: usize = query.get("days").and_then(|d| d.parse().ok()).unwrap_or(7);
    if let Err(rejection) = record_weather(&state, &headers, query) {
        return rejection;
    }

    let data: Vec<Value> = (0..days)
        .map(|i| {
            json!({
                "valid_date": format!("2024-05-{:02}", i + 1),
                "temp": 20.0,
                "max_temp": 25.0,
                "min_temp": 12.0,
                "weather": description(),
                "snow_depth": null
            })
        })
        .collect();

    Json(json!({ "city_name": "Madrid", "country_code": "ES", "data": data })).into_response()
}
