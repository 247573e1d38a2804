//! Widget lifecycle: initialise the host bridge, then load once per page-load event.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;

use crate::error::{HostBridgeError, RenderError};
use crate::loader::ContextLoader;
use crate::view::{ViewState, WidgetPage};

/// Payload of the host's `PageLoad` notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLoadData {
    #[serde(rename = "EntityId")]
    pub entity_id: String,
}

/// Lifecycle notifications pushed by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    PageLoad(PageLoadData),
}

pub struct Widget {
    loader: ContextLoader,
    page: WidgetPage,
}

impl Widget {
    /// Initialise the host SDK and return a widget showing the loading panel.
    pub async fn start(loader: ContextLoader) -> Result<Self, HostBridgeError> {
        loader.bridge().init().await?;
        info!("Host SDK initialized");

        Ok(Self {
            loader,
            page: WidgetPage::new(),
        })
    }

    pub fn page(&self) -> &WidgetPage {
        &self.page
    }

    /// Current host page as a full HTML document.
    pub fn render_page(&self, title: &str) -> Result<String, RenderError> {
        self.loader.renderer().render_page(&self.page, title)
    }

    pub async fn handle_event(&mut self, event: HostEvent) -> ViewState {
        match event {
            HostEvent::PageLoad(data) => {
                info!(record_id = %data.entity_id, "Widget loaded for record");
                self.loader
                    .load_customer_context(&data.entity_id, &mut self.page)
                    .await
            }
        }
    }

    /// Handle host events one at a time until the sender side is dropped.
    pub async fn run(&mut self, mut events: mpsc::Receiver<HostEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
        }
        info!("Host event channel closed, widget stopping");
    }
}
