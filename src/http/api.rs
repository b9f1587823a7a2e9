use super::{ApiResponse, RequestOptions, RequestRouter};
use crate::types::{Result, paths};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub agent_id: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Typed handle on the backend's fixed endpoint set.
#[derive(Clone)]
pub struct ChatApi {
    router: RequestRouter,
    token: Option<String>,
}

impl ChatApi {
    pub fn new(router: RequestRouter) -> Self {
        Self {
            router,
            token: None,
        }
    }

    /// Copy of this handle that sends `token` as a bearer credential.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            router: self.router.clone(),
            token: Some(token.into()),
        }
    }

    pub fn router(&self) -> &RequestRouter {
        &self.router
    }

    async fn call(&self, path: &str, mut options: RequestOptions) -> Result<ApiResponse> {
        if let Some(token) = &self.token {
            options = options.with_bearer_token(token.clone());
        }
        self.router.request(path, options).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<ApiResponse> {
        self.call(paths::REGISTER, RequestOptions::post(serde_json::to_value(request)?))
            .await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<ApiResponse> {
        self.call(paths::LOGIN, RequestOptions::post(serde_json::to_value(request)?))
            .await
    }

    pub async fn send_message(&self, request: &SendMessageRequest) -> Result<ApiResponse> {
        self.call(paths::MESSAGES, RequestOptions::post(serde_json::to_value(request)?))
            .await
    }

    /// Chat history, optionally limited to one agent.
    pub async fn list_messages(&self, agent_id: Option<&str>) -> Result<ApiResponse> {
        let path = match agent_id {
            Some(id) => format!("{}?agent_id={}", paths::MESSAGES, encode(id)),
            None => paths::MESSAGES.to_string(),
        };
        self.call(&path, RequestOptions::get()).await
    }

    pub async fn delete_message(&self, message_id: &str) -> Result<ApiResponse> {
        let path = format!("{}/{}", paths::MESSAGES, encode(message_id));
        self.call(&path, RequestOptions::delete()).await
    }

    pub async fn list_agents(&self) -> Result<ApiResponse> {
        self.call(paths::AGENTS, RequestOptions::get()).await
    }

    pub async fn get_agent(&self, agent_id: &str) -> Result<ApiResponse> {
        let path = format!("{}/{}", paths::AGENTS, encode(agent_id));
        self.call(&path, RequestOptions::get()).await
    }

    pub async fn create_agent(&self, agent: &AgentPayload) -> Result<ApiResponse> {
        self.call(paths::AGENTS, RequestOptions::post(serde_json::to_value(agent)?))
            .await
    }

    pub async fn update_agent(&self, agent_id: &str, agent: &AgentPayload) -> Result<ApiResponse> {
        let path = format!("{}/{}", paths::AGENTS, encode(agent_id));
        self.call(&path, RequestOptions::put(serde_json::to_value(agent)?))
            .await
    }

    pub async fn delete_agent(&self, agent_id: &str) -> Result<ApiResponse> {
        let path = format!("{}/{}", paths::AGENTS, encode(agent_id));
        self.call(&path, RequestOptions::delete()).await
    }

    pub async fn get_profile(&self) -> Result<ApiResponse> {
        self.call(paths::PROFILE, RequestOptions::get()).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<ApiResponse> {
        self.call(paths::PROFILE, RequestOptions::put(serde_json::to_value(update)?))
            .await
    }

    pub async fn delete_profile(&self) -> Result<ApiResponse> {
        self.call(paths::PROFILE, RequestOptions::delete()).await
    }

    pub async fn health(&self) -> Result<ApiResponse> {
        self.call(paths::HEALTH, RequestOptions::get()).await
    }
}

/// Percent-encodes a single path segment or query value.
fn encode(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}
