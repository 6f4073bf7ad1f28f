use serde::{Deserialize, Serialize};

use crate::ChatRequest;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ModelDefinition {
    pub(crate) name: String,

    #[serde(default)]
    pub(crate) display_name: Option<String>,
}

impl From<ModelDefinition> for crate::ModelDefinition {
    fn from(model: ModelDefinition) -> Self {
        match model.display_name {
            Some(display_name) => crate::ModelDefinition::with_display_name(model.name, display_name),
            None => crate::ModelDefinition::new(model.name),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListModelsResponse {
    #[serde(default)]
    pub(crate) models: Vec<ModelDefinition>,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl From<crate::Role> for Role {
    fn from(value: crate::Role) -> Self {
        match value {
            crate::Role::User => Role::User,
            crate::Role::Assistant => Role::Model,
        }
    }
}

impl From<Role> for crate::Role {
    fn from(value: Role) -> Self {
        match value {
            Role::User => crate::Role::User,
            Role::Model => crate::Role::Assistant,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) thought: Option<bool>,
}

impl Part {
    pub fn new_text(text: impl Into<String>) -> Self {
        Part {
            text: Some(text.into()),
            thought: None,
        }
    }
}

// Gemini representation of messages.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) role: Option<Role>,
    #[serde(default)]
    pub(crate) parts: Vec<Part>,
}

impl Content {
    /// Concatenated text of all non-thought parts.
    fn text(&self) -> String {
        self.parts
            .iter()
            .filter(|p| !p.thought.unwrap_or(false))
            .filter_map(|p| p.text.as_deref())
            .collect()
    }
}

impl From<&crate::ChatMessage> for Content {
    fn from(msg: &crate::ChatMessage) -> Self {
        Content {
            role: Some(msg.role.into()),
            parts: vec![Part::new_text(msg.content.clone())],
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct GenerateContentRequest {
    pub(crate) contents: Vec<Content>,
}

impl From<&ChatRequest> for GenerateContentRequest {
    fn from(request: &ChatRequest) -> Self {
        GenerateContentRequest {
            contents: request.messages.iter().map(Content::from).collect(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    #[serde(default)]
    pub(crate) content: Option<Content>,

    #[serde(default)]
    pub(crate) finish_reason: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub(crate) candidates: Vec<Candidate>,
}

impl TryFrom<GenerateContentResponse> for crate::ChatMessage {
    type Error = anyhow::Error;

    fn try_from(response: GenerateContentResponse) -> Result<Self, Self::Error> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Gemini response contained no candidates"))?;
        let content = candidate.content.ok_or_else(|| {
            anyhow::anyhow!(
                "Gemini candidate has no content (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )
        })?;
        Ok(crate::ChatMessage {
            role: content.role.map(Into::into).unwrap_or(crate::Role::Assistant),
            content: content.text(),
        })
    }
}
