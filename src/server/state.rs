use std::sync::Arc;
use std::time::Instant;

use crate::auth::JwtValidator;
use crate::config::Settings;
use crate::media::{create_media_repository, MediaRepository};
use crate::template::{create_template_repository, RenderRequestHandler, TemplateRepository};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub jwt_validator: Arc<JwtValidator>,
    pub repository: Arc<dyn TemplateRepository>,
    pub media: Arc<dyn MediaRepository>,
    pub renderer: Arc<RenderRequestHandler>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self::with_repositories(
            settings,
            create_template_repository(),
            create_media_repository(),
        )
    }

    pub fn with_repositories(
        settings: Settings,
        repository: Arc<dyn TemplateRepository>,
        media: Arc<dyn MediaRepository>,
    ) -> Self {
        let jwt_validator = Arc::new(JwtValidator::new(&settings.jwt));
        let renderer = Arc::new(RenderRequestHandler::new(
            repository.clone(),
            settings.render.variable_policy,
        ));

        Self {
            settings: Arc::new(settings),
            jwt_validator,
            repository,
            media,
            renderer,
            start_time: Instant::now(),
        }
    }
}
