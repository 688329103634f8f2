use crate::api::client::ApiClient;
use crate::api::models::{Template, TemplateInput};
use crate::error::{ApiError, ValidationError};

pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this template?";

/// Contents of the edit form. `id` is set while editing an existing template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateDraft {
    pub id: Option<i64>,
    pub name: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveRequest {
    Create(TemplateInput),
    Update(i64, TemplateInput),
}

impl TemplateDraft {
    pub fn prepare(&self) -> Result<SaveRequest, ValidationError> {
        let (name, body) = (self.name.trim(), self.body.trim());
        if name.is_empty() || body.is_empty() {
            return Err(ValidationError::MissingTemplateFields);
        }
        let input = TemplateInput {
            template_name: name.to_string(),
            template_body: body.to_string(),
        };
        Ok(match self.id {
            Some(id) => SaveRequest::Update(id, input),
            None => SaveRequest::Create(input),
        })
    }
}

/// Cached copy of the backend's templates, used to render the table.
#[derive(Debug, Default)]
pub struct TemplateManager {
    templates: Vec<Template>,
}

impl TemplateManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_templates(&mut self, templates: Vec<Template>) {
        self.templates = templates;
    }

    pub fn rows(&self) -> &[Template] {
        &self.templates
    }

    /// Edit form contents for `id`, taken from the cached row.
    pub fn edit(&self, id: i64) -> Option<TemplateDraft> {
        self.templates.iter().find(|t| t.id == id).map(|t| TemplateDraft {
            id: Some(t.id),
            name: t.template_name.clone(),
            body: t.template_body.clone(),
        })
    }
}

pub async fn list(api: &ApiClient) -> Result<Vec<Template>, ApiError> {
    api.templates().await
}

pub async fn save(api: &ApiClient, request: SaveRequest) -> Result<(), ApiError> {
    match request {
        SaveRequest::Create(input) => {
            let created = api.create_template(&input).await?;
            log::info!("created template {} ({})", created.template_name, created.id);
        }
        SaveRequest::Update(id, input) => {
            api.update_template(id, &input).await?;
            log::info!("updated template {id}");
        }
    }
    Ok(())
}

pub async fn delete(api: &ApiClient, id: i64) -> Result<(), ApiError> {
    api.delete_template(id).await?;
    log::info!("deleted template {id}");
    Ok(())
}

pub fn save_failure(err: &ApiError) -> String {
    format!("Failed to save template: {}", err.detail())
}

pub fn delete_failure(err: &ApiError) -> String {
    format!("Failed to delete template: {}", err.detail())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cached() -> TemplateManager {
        let mut manager = TemplateManager::new();
        manager.set_templates(vec![Template {
            id: 7,
            template_name: "welcome".into(),
            template_body: "Hello {{1}}".into(),
        }]);
        manager
    }

    #[test]
    fn presence_check() {
        let draft = TemplateDraft { id: None, name: "x".into(), body: "  ".into() };
        assert_eq!(draft.prepare(), Err(ValidationError::MissingTemplateFields));
    }

    #[test]
    fn edit_uses_cached_row() {
        let draft = cached().edit(7).unwrap();
        assert_eq!(draft.id, Some(7));
        assert_eq!(draft.name, "welcome");
        assert!(matches!(draft.prepare(), Ok(SaveRequest::Update(7, _))));
        assert!(cached().edit(8).is_none());
    }

    #[tokio::test]
    async fn list_then_delete() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/templates"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 7, "template_name": "welcome", "template_body": "Hello {{1}}"},
                {"id": 9, "template_name": "bye", "template_body": "Bye"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/templates/9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "success"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/templates/10"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({"detail": "Template not found"})))
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri()).unwrap();
        let mut manager = TemplateManager::new();
        manager.set_templates(list(&api).await.unwrap());
        assert_eq!(manager.rows().len(), 2);
        assert_eq!(manager.edit(9).unwrap().name, "bye");

        delete(&api, 9).await.unwrap();
        let err = delete(&api, 10).await.unwrap_err();
        assert_eq!(delete_failure(&err), "Failed to delete template: Template not found");
    }

    #[tokio::test]
    async fn create_without_id_update_with_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/templates"))
            .and(body_json(serde_json::json!({"template_name": "promo", "template_body": "50% off"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(
                {"id": 3, "template_name": "promo", "template_body": "50% off"}
            )))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/templates/3"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({"detail": "locked"})))
            .expect(1)
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri()).unwrap();
        let mut draft = TemplateDraft { id: None, name: " promo ".into(), body: "50% off".into() };
        save(&api, draft.prepare().unwrap()).await.unwrap();

        draft.id = Some(3);
        let err = save(&api, draft.prepare().unwrap()).await.unwrap_err();
        assert_eq!(save_failure(&err), "Failed to save template: locked");
    }
}
