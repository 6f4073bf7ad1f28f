use super::chat::api::ListModelsResponse;
use super::chat::model::GeminiChatModel;
use crate::client::Client;
use crate::{ChatModel, ModelDefinition, ModelProvider};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{self, HeaderValue};
use std::sync::Arc;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiProvider {
    client: Client,
    base_url: String,
}

impl GeminiProvider {
    pub fn default(api_key: &str) -> anyhow::Result<Self> {
        Self::new(DEFAULT_BASE_URL, api_key)
    }

    pub fn new(base_url: &str, api_key: &str) -> anyhow::Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(api_key).context("Gemini API key is not a valid header value")?,
        );
        Ok(GeminiProvider {
            client: Client::with_headers(headers)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    async fn list_models(&self) -> anyhow::Result<Vec<ModelDefinition>> {
        let url = format!("{}/models", self.base_url);
        let response: ListModelsResponse = self.client.get(&url).await?;
        Ok(response.models.into_iter().map(Into::into).collect())
    }

    fn create_chat_model(&self, model_name: &str) -> Option<Arc<dyn ChatModel + Send + Sync>> {
        Some(Arc::new(GeminiChatModel::new(
            self.client.clone(),
            self.base_url.clone(),
            model_name.to_string(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_list_models_sends_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [
                    {"name": "models/gemini-2.5-flash", "displayName": "Gemini 2.5 Flash"},
                    {"name": "models/text-embedding-004"}
                ]
            })))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(&server.uri(), "test-key").unwrap();
        let models = provider.list_models().await.unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].id, "models/gemini-2.5-flash");
        assert_eq!(models[0].name(), "Gemini 2.5 Flash");
        assert_eq!(models[1].name(), "models/text-embedding-004");
    }

    #[test]
    fn test_invalid_api_key_is_rejected() {
        assert!(GeminiProvider::default("bad\nkey").is_err());
    }
}
