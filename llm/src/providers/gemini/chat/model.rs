use super::api::{GenerateContentRequest, GenerateContentResponse};
use crate::client::Client;
use crate::traffic_log;
use crate::{ChatMessage, ChatModel, ChatRequest};
use async_trait::async_trait;

pub struct GeminiChatModel {
    client: Client,
    base_url: String,
    model_name: String,
}

impl GeminiChatModel {
    pub fn new(client: Client, base_url: String, model_name: String) -> Self {
        GeminiChatModel {
            client,
            base_url,
            model_name,
        }
    }
}

#[async_trait]
impl ChatModel for GeminiChatModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    async fn chat(&self, request: &ChatRequest) -> anyhow::Result<ChatMessage> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model_name);

        let api_request = GenerateContentRequest::from(request);
        traffic_log::log_request(&self.model_name, &api_request);

        let response: GenerateContentResponse = match self.client.post(url, &api_request).await {
            Ok(response) => response,
            Err(e) => {
                traffic_log::log_error(&self.model_name, &e.to_string());
                return Err(e);
            }
        };
        traffic_log::log_response(&self.model_name, &response);
        ChatMessage::try_from(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ModelProvider, providers::GeminiProvider};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_chat_posts_generate_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "hi"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "hello there"}]}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(&server.uri(), "key").unwrap();
        let model = provider.create_chat_model("models/gemini-2.5-flash").unwrap();
        let reply = model
            .chat(&ChatRequest::new(vec![ChatMessage::user("hi")]))
            .await
            .unwrap();
        assert_eq!(reply.content, "hello there");
        assert_eq!(model.name(), "models/gemini-2.5-flash");
    }

    #[tokio::test]
    async fn test_chat_surfaces_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(&server.uri(), "key").unwrap();
        let model = provider.create_chat_model("models/gemini-2.5-flash").unwrap();
        let err = model
            .chat(&ChatRequest::new(vec![ChatMessage::user("hi")]))
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("429"), "{message}");
        assert!(message.contains("quota exceeded"), "{message}");
    }
}
