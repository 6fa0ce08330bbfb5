use axum::response::{IntoResponse, Json};

/// GET /health
pub(super) async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_reports_ok_and_version() {
        let response = handle_health().await.into_response();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }
}
