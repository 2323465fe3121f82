use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::{
    error_handling::HandleErrorLayer,
    http::{HeaderValue, Method},
    middleware,
    routing::get,
    BoxError, Router,
};
use tokio::net::TcpListener;
use tower::{timeout::error::Elapsed, timeout::TimeoutLayer, ServiceBuilder};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::{api::error::ApiError, config, database::table::stock::StockStore, logging};

pub mod access_log;
pub mod error;
pub mod stock;

/// 注入到每個 handler 的共用狀態
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StockStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn StockStore>) -> Self {
        AppState { store }
    }
}

/// 建立路由表
pub fn router(state: AppState, system: &config::System) -> Router {
    Router::new()
        .route(
            "/api/stock",
            get(stock::get_all_stocks)
                .post(stock::create_stock)
                .options(stock::preflight),
        )
        .route(
            "/api/stock/{id}",
            get(stock::get_stock)
                .put(stock::update_stock)
                .delete(stock::delete_stock)
                .options(stock::preflight),
        )
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    system.request_timeout_secs,
                ))),
        )
        .layer(cors_layer(&system.cors_origins))
        .layer(middleware::from_fn(access_log::access_log))
}

/// 將逾時等 middleware 錯誤轉成與 handler 相同格式的錯誤回應
async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        ApiError::Timeout
    } else {
        ApiError::Internal(err.to_string())
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}

/// 啟動 HTTP 服務，收到 Ctrl+C 後停止接受新連線並等待處理中的 request 完成
pub async fn start(store: Arc<dyn StockStore>, system: &config::System) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], system.http_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind HTTP listener on {}", addr))?;

    let msg = format!("Starting server on {:?}", addr);
    logging::info_console(msg.clone());
    logging::info_file_async(msg);

    axum::serve(listener, router(AppState::new(store), system))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server stopped unexpectedly")?;

    logging::info_file_async(format!("HTTP 伺服器在 {:?} 正常停止", addr));

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(_) => logging::info_file_async("Shutdown signal received"),
        Err(why) => {
            logging::error_file_async(format!("Failed to listen for Ctrl+C because {:?}", why))
        }
    }
}
