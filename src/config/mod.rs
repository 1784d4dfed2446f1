mod settings;

pub use settings::{JwtConfig, OtelConfig, RenderConfig, ServerConfig, Settings};
