use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use service::catalog::{Item, ItemCatalog};

use crate::errors::ApiError;

/// Route-layer state, injected at construction time.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<ItemCatalog>,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn hello() -> Json<serde_json::Value> {
    Json(json!({"message": "Hello, World!"}))
}

#[derive(Debug, Deserialize)]
struct AddParams {
    #[serde(default)]
    x: i64,
    #[serde(default)]
    y: i64,
}

/// 查询参数求和：/add?x=5&y=10
async fn add_numbers(Query(params): Query<AddParams>) -> Json<serde_json::Value> {
    let result = params.x + params.y;
    Json(json!({"x": params.x, "y": params.y, "result": result}))
}

/// 根据名称获取商品
async fn get_item(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Item>, ApiError> {
    match state.catalog.get(&name).await {
        Some(item) => Ok(Json(item)),
        None => Err(ApiError::ItemNotFound),
    }
}

/// 随机返回一个商品；目录为空时 404
async fn random_item(State(state): State<AppState>) -> Result<Json<Item>, ApiError> {
    state.catalog.random().await.map(Json).ok_or(ApiError::EmptyCatalog)
}

/// 商品总数
async fn items_count(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({"total_items": state.catalog.count().await}))
}

/// 创建商品：键冲突时 409
async fn create_item(
    State(state): State<AppState>,
    Json(input): Json<Item>,
) -> Result<Json<Item>, ApiError> {
    let created = state.catalog.create(input).await?;
    Ok(Json(created))
}

/// Build the full application router with tracing and CORS layers.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    // 固定路径必须先于 /items/:name 注册（axum 精确匹配优先，顺序只为可读性）
    let items = Router::new()
        .route("/items/random", get(random_item))
        .route("/items/count", get(items_count))
        .route("/items/:name", get(get_item))
        .route("/items/", post(create_item));

    Router::new()
        .route("/", get(hello))
        .route("/health", get(health))
        .route("/add", get(add_numbers))
        .merge(items)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 请求到达时打点
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // 响应返回时打点，包含状态码与耗时
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 失败（5xx 等）时以 ERROR 记录
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                ),
        )
}
