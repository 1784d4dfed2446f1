//! Render request handling: gate, load, substitute, project, serialize.

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use serde::{Deserialize, Serialize};

use crate::resource::{Operation, Resource, Route};

use super::store::TemplateRepository;
use super::substitution;
use super::types::{RenderedTemplate, TemplateError, TemplateId, TemplateResult, Variables};
use super::visibility::Profile;

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Decides which variables reach the substitution engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariablePolicy {
    /// Render with an empty mapping regardless of what the caller sent
    #[default]
    Discard,
    /// Render with the caller's variables
    Apply,
}

impl VariablePolicy {
    pub fn effective(self, supplied: &Variables) -> Variables {
        match self {
            VariablePolicy::Discard => Variables::new(),
            VariablePolicy::Apply => supplied.clone(),
        }
    }
}

/// A render invocation as seen by the web layer
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub template_id: TemplateId,
    pub method: &'a Method,
    /// Route the web layer matched, if any
    pub route: Option<&'static Route>,
    /// Raw caller variables, expected to be a JSON object
    pub variables: Option<&'a serde_json::Value>,
}

/// A fully serialized render response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResponse {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Not a render request; the web layer applies its default handling
    PassThrough,
    Response(RenderResponse),
}

/// Orchestrates a single render request
pub struct RenderRequestHandler {
    repository: Arc<dyn TemplateRepository>,
    policy: VariablePolicy,
}

impl RenderRequestHandler {
    pub fn new(repository: Arc<dyn TemplateRepository>, policy: VariablePolicy) -> Self {
        Self { repository, policy }
    }

    pub fn policy(&self) -> VariablePolicy {
        self.policy
    }

    pub async fn handle(&self, request: RenderRequest<'_>) -> TemplateResult<RenderOutcome> {
        if !is_render_request(request.method, request.route) {
            tracing::debug!(
                method = %request.method,
                route = ?request.route.map(|route| route.name.as_str()),
                "Not a render request, passing through"
            );
            return Ok(RenderOutcome::PassThrough);
        }

        let template = self.repository.load_by_id(request.template_id).await?;
        let supplied = parse_variables(request.variables)?;
        let effective = self.policy.effective(&supplied);

        let rendered = substitution::render(
            &template.content.external_title,
            &template.content.body,
            &effective,
        )?;

        let view = RenderedTemplate {
            id: template.id,
            external_title: rendered.title,
            body: rendered.body,
            variables: supplied,
        };
        let body = serde_json::to_string(&Profile::Render.view(&view)?)?;

        tracing::debug!(
            template_id = template.id,
            policy = ?self.policy,
            "Template rendered"
        );

        Ok(RenderOutcome::Response(RenderResponse {
            status: StatusCode::OK,
            content_type: CONTENT_TYPE_JSON,
            body,
        }))
    }
}

fn is_render_request(method: &Method, route: Option<&Route>) -> bool {
    match (route, Route::find(Resource::Templates, Operation::Render)) {
        (Some(route), Some(render)) => route == render && route.method == *method,
        _ => false,
    }
}

/// Coerce a raw variables payload into a string mapping
pub fn parse_variables(raw: Option<&serde_json::Value>) -> TemplateResult<Variables> {
    let vars = match raw {
        None | Some(serde_json::Value::Null) => return Ok(Variables::new()),
        Some(serde_json::Value::Object(map)) => map,
        Some(_) => {
            return Err(TemplateError::InvalidVariables(
                "Variables must be an object".to_string(),
            ))
        }
    };

    Ok(vars
        .iter()
        .map(|(key, value)| {
            let replacement = match value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Null => String::new(),
                // For arrays and objects, use JSON representation
                _ => value.to_string(),
            };
            (key.clone(), replacement)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Provenance;
    use crate::template::store::InMemoryTemplateRepository;
    use crate::template::types::{PageMetadata, Template, TemplateContent, TemplateKind};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn content(title: &str, body: &str) -> TemplateContent {
        TemplateContent {
            external_identifier: None,
            kind: TemplateKind::Message,
            internal_name: "Welcome".to_string(),
            external_title: title.to_string(),
            description: None,
            body: body.to_string(),
            contact_person: None,
            page: PageMetadata::default(),
        }
    }

    async fn repository_with(title: &str, body: &str) -> Arc<InMemoryTemplateRepository> {
        let repo = Arc::new(InMemoryTemplateRepository::new());
        repo.create(
            content(title, body),
            Provenance {
                owner: "app-1".to_string(),
                source_organization: "123456789".to_string(),
            },
        )
        .await
        .unwrap();
        repo
    }

    fn request<'a>(
        method: &'a Method,
        variables: Option<&'a serde_json::Value>,
    ) -> RenderRequest<'a> {
        RenderRequest {
            template_id: 1,
            method,
            route: Route::find(Resource::Templates, Operation::Render),
            variables,
        }
    }

    fn body_of(outcome: RenderOutcome) -> serde_json::Value {
        match outcome {
            RenderOutcome::Response(response) => {
                assert_eq!(response.status, StatusCode::OK);
                assert_eq!(response.content_type, CONTENT_TYPE_JSON);
                serde_json::from_str(&response.body).unwrap()
            }
            RenderOutcome::PassThrough => panic!("expected a response"),
        }
    }

    #[tokio::test]
    async fn test_render_with_default_policy_discards_variables() {
        let repo = repository_with("Welcome {{user}}", "Dear {{user}}, visit {{link}}.").await;
        let handler = RenderRequestHandler::new(repo, VariablePolicy::Discard);
        let variables = json!({"user": "Alice"});

        let outcome = handler
            .handle(request(&Method::GET, Some(&variables)))
            .await
            .unwrap();
        let body = body_of(outcome);

        assert_eq!(
            body,
            json!({
                "id": 1,
                "externalTitle": "Welcome ",
                "body": "Dear , visit .",
                "variables": {"user": "Alice"}
            })
        );
    }

    #[tokio::test]
    async fn test_render_with_apply_policy() {
        let repo = repository_with("Welcome {{user}}", "Dear {{user}}, visit {{link}}.").await;
        let handler = RenderRequestHandler::new(repo, VariablePolicy::Apply);
        let variables = json!({"user": "Alice", "link": "https://example.org", "count": 3});

        let body = body_of(
            handler
                .handle(request(&Method::GET, Some(&variables)))
                .await
                .unwrap(),
        );

        assert_eq!(body["externalTitle"], "Welcome Alice");
        assert_eq!(body["body"], "Dear Alice, visit https://example.org.");
        assert_eq!(body["variables"]["count"], "3");
    }

    #[tokio::test]
    async fn test_render_does_not_mutate_stored_template() {
        let repo = repository_with("Hi {{user}}", "Bye {{user}}").await;
        let before = repo.load_by_id(1).await.unwrap();
        let handler = RenderRequestHandler::new(repo.clone(), VariablePolicy::Apply);
        let variables = json!({"user": "Bob"});

        let first = handler
            .handle(request(&Method::GET, Some(&variables)))
            .await
            .unwrap();
        let second = handler
            .handle(request(&Method::GET, Some(&variables)))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(repo.load_by_id(1).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_post_passes_through() {
        let repo = repository_with("Title", "Body").await;
        let handler = RenderRequestHandler::new(repo, VariablePolicy::Discard);

        let outcome = handler.handle(request(&Method::POST, None)).await.unwrap();
        assert_eq!(outcome, RenderOutcome::PassThrough);
    }

    #[tokio::test]
    async fn test_other_route_passes_through() {
        let repo = repository_with("Title", "Body").await;
        let handler = RenderRequestHandler::new(repo, VariablePolicy::Discard);

        let mut req = request(&Method::GET, None);
        req.route = Route::find(Resource::Templates, Operation::Get);
        assert_eq!(handler.handle(req).await.unwrap(), RenderOutcome::PassThrough);

        req.route = Route::find(Resource::Documents, Operation::Get);
        assert_eq!(handler.handle(req).await.unwrap(), RenderOutcome::PassThrough);

        req.route = None;
        assert_eq!(handler.handle(req).await.unwrap(), RenderOutcome::PassThrough);
    }

    #[tokio::test]
    async fn test_syntax_error_produces_no_body() {
        let repo = repository_with("Title", "Hello {{name").await;
        let handler = RenderRequestHandler::new(repo, VariablePolicy::Discard);

        let result = handler.handle(request(&Method::GET, None)).await;
        assert!(matches!(result, Err(TemplateError::Syntax { .. })));
    }

    #[tokio::test]
    async fn test_invalid_variables_rejected() {
        let repo = repository_with("Title", "Body").await;
        let handler = RenderRequestHandler::new(repo, VariablePolicy::Apply);
        let variables = json!(["not", "an", "object"]);

        let result = handler
            .handle(request(&Method::GET, Some(&variables)))
            .await;
        assert!(matches!(result, Err(TemplateError::InvalidVariables(_))));
    }

    struct CountingRepository {
        loads: AtomicUsize,
    }

    #[async_trait]
    impl TemplateRepository for CountingRepository {
        async fn load_by_id(&self, id: TemplateId) -> TemplateResult<Template> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Err(TemplateError::NotFound(id))
        }

        async fn list(&self) -> TemplateResult<Vec<Template>> {
            Ok(Vec::new())
        }

        async fn create(
            &self,
            _content: TemplateContent,
            _provenance: Provenance,
        ) -> TemplateResult<Template> {
            unreachable!("render never creates")
        }

        async fn replace(
            &self,
            _id: TemplateId,
            _content: TemplateContent,
        ) -> TemplateResult<Template> {
            unreachable!("render never replaces")
        }

        async fn delete(&self, _id: TemplateId) -> TemplateResult<()> {
            unreachable!("render never deletes")
        }

        async fn revert(&self, _id: TemplateId, _version: u32) -> TemplateResult<Template> {
            unreachable!("render never reverts")
        }

        fn count(&self) -> usize {
            0
        }
    }

    #[tokio::test]
    async fn test_missing_template_loads_once() {
        let repo = Arc::new(CountingRepository {
            loads: AtomicUsize::new(0),
        });
        let handler = RenderRequestHandler::new(repo.clone(), VariablePolicy::Discard);

        let result = handler.handle(request(&Method::GET, None)).await;

        assert!(matches!(result, Err(TemplateError::NotFound(1))));
        assert_eq!(repo.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_parse_variables_coercion() {
        let raw = json!({"s": "text", "n": 4.5, "b": true, "z": null, "a": [1, 2]});
        let parsed = parse_variables(Some(&raw)).unwrap();

        assert_eq!(parsed["s"], "text");
        assert_eq!(parsed["n"], "4.5");
        assert_eq!(parsed["b"], "true");
        assert_eq!(parsed["z"], "");
        assert_eq!(parsed["a"], "[1,2]");
    }

    #[test]
    fn test_parse_variables_absent() {
        assert!(parse_variables(None).unwrap().is_empty());
        assert!(parse_variables(Some(&serde_json::Value::Null)).unwrap().is_empty());
    }
}
