use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::HeaderValue,
    routing::{get, post},
    Json, Router,
};
use cryptomarket_data::{
    MarketDataClient, OhlcvSeries, OrderBook, Price, Ticker, TopMarketsResponse,
};
use serde_json::Value;
use tokio::task;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    config::Config,
    error::{ApiError, ApiResult},
    main_lib::AppState,
    params::{OhlcvParams, OrderBookParams, SymbolParams, TopMarketsParams},
    tools::{self, ToolDescriptor, ToolError},
};

impl From<ToolError> for ApiError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::UnknownTool(_) => ApiError::NotFound(err.to_string()),
            ToolError::InvalidArguments(_) => ApiError::BadRequest(err.to_string()),
            ToolError::MarketData(e) => ApiError::MarketData(e),
            ToolError::Internal(_) => ApiError::Internal(err.to_string()),
        }
    }
}

/// Run a blocking client call on the blocking pool.
async fn run_blocking<T, E, F>(state: &AppState, f: F) -> ApiResult<T>
where
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
    F: FnOnce(&MarketDataClient) -> Result<T, E> + Send + 'static,
{
    let client = Arc::clone(&state.client);
    task::spawn_blocking(move || f(client.as_ref()))
        .await
        .map_err(|e| ApiError::Internal(format!("Worker task failed: {e}")))?
        .map_err(Into::into)
}

fn query<T>(query: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    query
        .map(|Query(q)| q)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

pub async fn healthz() -> &'static str {
    "ok"
}

async fn get_price(
    State(state): State<Arc<AppState>>,
    q: Result<Query<SymbolParams>, QueryRejection>,
) -> ApiResult<Json<Price>> {
    let params = query(q)?;
    let price = run_blocking(&state, move |client| params.price(client)).await?;
    Ok(Json(price))
}

async fn get_ticker(
    State(state): State<Arc<AppState>>,
    q: Result<Query<SymbolParams>, QueryRejection>,
) -> ApiResult<Json<Ticker>> {
    let params = query(q)?;
    let ticker = run_blocking(&state, move |client| params.ticker(client)).await?;
    Ok(Json(ticker))
}

async fn get_ohlcv(
    State(state): State<Arc<AppState>>,
    q: Result<Query<OhlcvParams>, QueryRejection>,
) -> ApiResult<Json<OhlcvSeries>> {
    let params = query(q)?;
    params.validate().map_err(ApiError::BadRequest)?;
    let series = run_blocking(&state, move |client| params.fetch(client)).await?;
    Ok(Json(series))
}

async fn get_order_book(
    State(state): State<Arc<AppState>>,
    q: Result<Query<OrderBookParams>, QueryRejection>,
) -> ApiResult<Json<OrderBook>> {
    let params = query(q)?;
    params.validate().map_err(ApiError::BadRequest)?;
    let book = run_blocking(&state, move |client| params.fetch(client)).await?;
    Ok(Json(book))
}

async fn get_top_markets(
    State(state): State<Arc<AppState>>,
    q: Result<Query<TopMarketsParams>, QueryRejection>,
) -> ApiResult<Json<TopMarketsResponse>> {
    let params = query(q)?;
    params.validate().map_err(ApiError::BadRequest)?;
    let markets = run_blocking(&state, move |client| params.fetch(client)).await?;
    Ok(Json(markets))
}

async fn list_exchanges(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.client.supported_exchanges())
}

async fn list_tools() -> Json<Vec<ToolDescriptor>> {
    Json(tools::list_tools())
}

async fn invoke_tool(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let args: Value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {e}")))?
    };
    tracing::debug!("Invoking tool '{}'", name);
    let result = run_blocking(&state, move |client| tools::invoke_tool(client, &name, args)).await?;
    Ok(Json(result))
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_allow.iter().any(|o| o == "*") {
        return CorsLayer::new().allow_origin(Any);
    }
    let origins = config
        .cors_allow
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(origin) => Some(origin),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect::<Vec<_>>();
    CorsLayer::new().allow_origin(origins)
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let api = Router::new()
        .route("/healthz", get(healthz))
        .route("/price", get(get_price))
        .route("/ticker", get(get_ticker))
        .route("/ohlcv", get(get_ohlcv))
        .route("/orderbook", get(get_order_book))
        .route("/top_markets", get(get_top_markets))
        .route("/exchanges", get(list_exchanges))
        .route("/tools", get(list_tools))
        .route("/tools/{name}", post(invoke_tool));

    Router::new()
        .nest("/api/v1", api)
        .with_state(state)
        .layer(cors_layer(config))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
