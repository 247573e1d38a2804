//! Customer context widget for CRM record views.
//!
//! On a host page-load event the widget reads the current record through the
//! [`HostBridge`](host_bridge::HostBridge), fetches the customer's context
//! from the context API and renders it into the content panel of a
//! three-panel [`WidgetPage`](view::WidgetPage):
//!
//! ```text
//! PageLoad → HostBridge::get_record → GET /customer/{key}/context → render
//!                                  └───────── any failure ─────────→ error panel
//! ```
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use context_core::{ContextLoader, EntityType, MemoryHostBridge, WidgetConfig, WidgetPage};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let bridge = Arc::new(MemoryHostBridge::new(EntityType::new("Contacts")));
//! let loader = ContextLoader::new(bridge, &WidgetConfig::new("https://api.example.com")?)?;
//! let mut page = WidgetPage::new();
//! let view = loader.load_customer_context("3477", &mut page).await;
//! println!("{view:?}");
//! # Ok(())
//! # }
//! ```

pub mod api_client;
pub mod config;
pub mod error;
pub mod host_bridge;
pub mod loader;
pub mod render;
pub mod types;
pub mod view;
pub mod widget;

pub use config::WidgetConfig;
pub use error::{ConfigError, ContextError, HostBridgeError, RenderError};
pub use host_bridge::{
    EntityType, HostBridge, MemoryHostBridge, RecordRequest, RecordResponse, RestHostBridge,
};
pub use loader::ContextLoader;
pub use render::Renderer;
pub use types::{CustomerContext, CustomerSummary, RecordReference, RiskScore, SupportTicket};
pub use view::{ViewState, WidgetPage};
pub use widget::{HostEvent, PageLoadData, Widget};
