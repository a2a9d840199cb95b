use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::prompt::{PromptMessage, PromptRole};

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: WireReply,
}

#[derive(Deserialize)]
struct WireReply {
    content: String,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

#[derive(Deserialize)]
struct OllamaModelsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.to_string(),
        }
    }

    /// Send the assembled message sequence to `/api/chat` and return the
    /// model's reply text. Blocking from the caller's point of view: the
    /// whole reply arrives at once, no token streaming.
    pub async fn chat(
        &self,
        model: &str,
        messages: &[PromptMessage],
        temperature: f32,
    ) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);

        let request = ChatRequest {
            model: model.to_string(),
            messages: messages.iter().map(to_wire).collect(),
            stream: false,
            options: ChatOptions { temperature },
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Ollama request failed with status: {}. Make sure Ollama is running with: ollama serve",
                response.status()
            ));
        }

        let chat_response: ChatResponse = response.json().await?;
        Ok(chat_response.message.content)
    }

    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("Failed to list models: {}", response.status()));
        }

        let models_response: OllamaModelsResponse = response.json().await?;
        let model_names: Vec<String> = models_response
            .models
            .into_iter()
            .map(|model| model.name)
            .collect();

        Ok(model_names)
    }
}

fn to_wire(message: &PromptMessage) -> WireMessage {
    let role = match message.role {
        PromptRole::System => "system",
        PromptRole::Human => "user",
        PromptRole::Ai => "assistant",
    };
    WireMessage {
        role,
        content: message.content.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_roles_map_to_ollama_roles() {
        let cases = [
            (PromptRole::System, "system"),
            (PromptRole::Human, "user"),
            (PromptRole::Ai, "assistant"),
        ];
        for (role, expected) in cases {
            let wire = to_wire(&PromptMessage {
                role,
                content: "text".to_string(),
            });
            assert_eq!(wire.role, expected);
            assert_eq!(wire.content, "text");
        }
    }

    #[test]
    fn chat_request_serializes_without_streaming() {
        let request = ChatRequest {
            model: "deepseek-r1:1.5b".to_string(),
            messages: vec![WireMessage {
                role: "system",
                content: "persona".to_string(),
            }],
            stream: false,
            options: ChatOptions { temperature: 0.5 },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["temperature"], 0.5);
        assert_eq!(json["messages"][0]["role"], "system");
    }
}
