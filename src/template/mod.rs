//! WhatsApp template catalogue.
//!
//! This module provides:
//! - Template definitions parsed into a closed set of component kinds
//! - In-memory template storage with CRUD operations
//! - Ordinal placeholder scanning ({{1}}, {{2}}, ...)
//! - Placeholder interpolation for previews
//!
//! # Example
//!
//! ```ignore
//! let store = TemplateStore::new();
//!
//! let template: WhatsAppTemplate = serde_json::from_value(json!({
//!     "id": "order_shipped",
//!     "name": "order_shipped",
//!     "components": [
//!         {"type": "BODY", "text": "Hi {{1}}, order {{2}} is on its way"}
//!     ]
//! }))?;
//! store.create(template)?;
//!
//! let body = store.get("order_shipped")?.body().unwrap().text.clone();
//! assert_eq!(count_placeholders(Some(&body)), 2);
//! assert_eq!(interpolate(&body, &["Ann", "#42"]), "Hi Ann, order #42 is on its way");
//! ```

mod interpolate;
mod placeholder;
mod store;
mod types;

pub use interpolate::{interpolate, interpolate_with_examples};
pub use placeholder::{
    count_placeholder_occurrences, count_placeholders, is_contiguous, placeholder_indices,
};
pub use store::{create_template_store, TemplateStore};
pub use types::{
    BodyComponent, BodyExample, ButtonsComponent, CarouselCard, CarouselComponent,
    CreateTemplateRequest, FooterComponent, HeaderComponent, HeaderExample, HeaderFormat,
    TemplateButton, TemplateCategory, TemplateComponent, TemplateError, TemplateListResponse,
    TemplateResult, TemplateStatus, UpdateTemplateRequest, WhatsAppTemplate,
};
