use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{HeaderValue, Method, StatusCode},
    routing::{get, put},
    Json, Router,
};
use server_api::{create_expense, delete_expense, list_expenses, update_expense, ApiContext};
use shared::{
    domain::{Expense, ExpenseId},
    error::ApiError,
    protocol::{DeleteAck, NewExpense},
};
use storage::Storage;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};

mod app_state;
mod config;

use app_state::AppState;
use config::{load_settings, prepare_database_url};

const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state), &settings.allowed_origins);

    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(%addr, "expense store listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/expenses", get(http_list_expenses).post(http_create_expense))
        .route(
            "/expenses/:expense_id",
            put(http_update_expense).delete(http_delete_expense),
        )
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(%origin, %error, "skipping invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}

fn reject(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = StatusCode::from_u16(err.code.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(code = ?err.code, message = %err.message, "request failed");
    }
    (status, Json(err))
}

async fn healthz(State(state): State<Arc<AppState>>) -> Result<&'static str, StatusCode> {
    state.api.storage.health_check().await.map_err(|error| {
        error!(%error, "health check failed");
        StatusCode::SERVICE_UNAVAILABLE
    })?;
    Ok("ok")
}

async fn http_list_expenses(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Expense>> {
    let expenses = list_expenses(&state.api).await.map_err(reject)?;
    Ok(Json(expenses))
}

async fn http_create_expense(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewExpense>,
) -> ApiResult<Expense> {
    let expense = create_expense(&state.api, req).await.map_err(reject)?;
    Ok(Json(expense))
}

async fn http_update_expense(
    State(state): State<Arc<AppState>>,
    Path(expense_id): Path<i64>,
    Json(req): Json<NewExpense>,
) -> ApiResult<Expense> {
    let expense = update_expense(&state.api, ExpenseId(expense_id), req)
        .await
        .map_err(reject)?;
    Ok(Json(expense))
}

async fn http_delete_expense(
    State(state): State<Arc<AppState>>,
    Path(expense_id): Path<i64>,
) -> ApiResult<DeleteAck> {
    let ack = delete_expense(&state.api, ExpenseId(expense_id))
        .await
        .map_err(reject)?;
    Ok(Json(ack))
}
