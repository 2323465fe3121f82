use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

use crate::logging;

/// 記錄每個 request 的 method、路徑、狀態碼與耗時
pub async fn access_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let line = format!(
        "{} {} {} {:?}",
        method,
        path,
        status.as_u16(),
        start.elapsed()
    );

    if status.is_server_error() {
        logging::error_file_async(line);
    } else if status.is_client_error() {
        logging::warn_file_async(line);
    } else {
        logging::info_file_async(line);
    }

    response
}
