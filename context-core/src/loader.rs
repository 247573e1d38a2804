//! Context loader: resolve customer key → fetch context → render or show error.

use std::sync::Arc;
use tracing::{error, info};

use crate::api_client::ContextApiClient;
use crate::config::WidgetConfig;
use crate::error::{ConfigError, ContextError};
use crate::host_bridge::{HostBridge, RecordRequest};
use crate::render::Renderer;
use crate::types::{CustomerContext, RecordReference};
use crate::view::{ViewState, WidgetPage};

pub struct ContextLoader {
    bridge: Arc<dyn HostBridge>,
    api: ContextApiClient,
    renderer: Renderer,
}

impl ContextLoader {
    pub fn new(bridge: Arc<dyn HostBridge>, config: &WidgetConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            bridge,
            api: ContextApiClient::new(config)?,
            renderer: Renderer::new()?,
        })
    }

    pub fn bridge(&self) -> &Arc<dyn HostBridge> {
        &self.bridge
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Run one load for `record_id` against `page` and return the view it
    /// ends in. Every failure kind ends in `ViewState::Error`.
    pub async fn load_customer_context(&self, record_id: &str, page: &mut WidgetPage) -> ViewState {
        page.set_view(ViewState::Loading);

        match self.load_and_render(record_id, page).await {
            Ok(tickets) => {
                info!(record_id, tickets, "Customer context loaded");
            }
            Err(err) => {
                error!(
                    kind = err.kind(),
                    record_id,
                    error = %err,
                    "Error loading customer context"
                );
                page.set_view(ViewState::Error);
            }
        }

        page.view()
    }

    async fn load_and_render(
        &self,
        record_id: &str,
        page: &mut WidgetPage,
    ) -> Result<usize, ContextError> {
        let context = self.fetch_context(record_id).await?;
        self.renderer.render(&context, page)?;
        Ok(context.recent_tickets.len())
    }

    /// Resolve the customer key through the host, then fetch and decode the context.
    pub async fn fetch_context(&self, record_id: &str) -> Result<CustomerContext, ContextError> {
        let reference = self.resolve_record(record_id).await?;
        self.api.fetch_context(reference.customer_key()).await
    }

    pub async fn resolve_record(&self, record_id: &str) -> Result<RecordReference, ContextError> {
        let response = self
            .bridge
            .get_record(RecordRequest {
                entity: self.bridge.current_entity(),
                record_id: record_id.to_string(),
            })
            .await?;

        let record = response
            .data
            .first()
            .ok_or_else(|| ContextError::RecordNotFound {
                record_id: record_id.to_string(),
            })?;

        Ok(RecordReference::from_record(record_id, record))
    }
}
