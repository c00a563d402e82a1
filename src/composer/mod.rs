//! Template message composer.
//!
//! Turns a selected template into something sendable:
//! - default variable bindings for every placeholder slot
//! - user edits to those bindings
//! - short-circuit validation before anything is sent
//! - a data-only preview of the message bubble
//! - the request body for the messaging backend
//! - per-dialog sessions tying the above together

mod binding;
mod payload;
mod preview;
mod session;
mod validation;

pub use binding::{
    bind_template, BindingEdit, BindingError, CarouselBinding, CarouselCardBinding,
    HeaderBinding, MediaRef, TemplateBindings, TemplateVariableBinding, VariableSource,
};
pub use payload::{compose, BroadcastTarget, ComposeTarget, ComposedRequest};
pub use preview::{render_preview, PreviewButton, PreviewCard, PreviewHeader, TemplatePreview};
pub use session::{ComposerSession, SessionError, SessionResult, SessionStore};
pub use validation::{validate, Section, ValidationError};
