//! API layer - HTTP endpoint handlers.

mod extract;
mod health;
mod media;
mod metrics;
mod routes;
mod template;

pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use health::health;
pub use media::{
    create_media, delete_media, get_media, list_media, media_log, replace_media, revert_media,
};
pub use metrics::prometheus_metrics;
pub use routes::{api_routes, API_PREFIX};
pub use template::{
    create_template, delete_template, get_template, list_templates, render_template,
    replace_template, revert_template, template_log,
};
