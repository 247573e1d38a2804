use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, Json},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use context_core::{ContextLoader, WidgetPage};

pub const PAGE_TITLE: &str = "Customer Context";

// Application state
#[derive(Clone)]
pub struct AppState {
    pub loader: Arc<ContextLoader>,
}

#[derive(Debug, Deserialize)]
pub struct WidgetQuery {
    pub record_id: Option<String>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(widget_page))
        .route("/widget", get(widget_page))
        .route("/health", get(health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Host page for one record. Without `record_id` the page is returned in its
/// initial loading state, as the host shows it before the first PageLoad.
async fn widget_page(
    State(state): State<AppState>,
    Query(query): Query<WidgetQuery>,
) -> Result<Html<String>, StatusCode> {
    let mut page = WidgetPage::new();

    if let Some(record_id) = query.record_id.as_deref().filter(|id| !id.is_empty()) {
        let view = state.loader.load_customer_context(record_id, &mut page).await;
        info!(record_id, ?view, "Rendered widget page");
    }

    match state.loader.renderer().render_page(&page, PAGE_TITLE) {
        Ok(html) => Ok(Html(html)),
        Err(e) => {
            warn!("Failed to render widget page: {:?}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
