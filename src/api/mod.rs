//! API layer - HTTP endpoint handlers organized by domain.

mod composer;
mod health;
mod metrics;
mod routes;
mod session;
mod template;

pub use composer::{
    count_template_placeholders, interpolate_text, template_bindings, template_preview,
    template_validate,
};
pub use health::health;
pub use metrics::prometheus_metrics;
pub use routes::api_routes;
pub use session::{
    close_session, edit_bindings, get_session, open_session, select_template, session_preview,
    set_session_target, submit_session,
};
pub use template::{create_template, delete_template, get_template, list_templates, update_template};
