use crate::llm::client::LLMClient;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use ollama_rs::{
    Ollama,
    generation::chat::{ChatMessage, request::ChatMessageRequest},
};

const DEFAULT_OLLAMA_PORT: u16 = 11434;

pub struct OllamaClient {
    client: Ollama,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: String, model: String) -> Result<Self> {
        let (host, port) = split_host_port(&base_url);
        let client = Ollama::new(host, port);

        Ok(Self { client, model })
    }

    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let request = ChatMessageRequest::new(self.model.clone(), messages);

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| AppError::LLM(format!("Ollama error: {}", e)))?;

        Ok(response.message.content.trim().to_string())
    }
}

/// Split `scheme://host:port` into (`scheme://host`, port), defaulting to
/// `http` and the standard Ollama port. Bracketed IPv6 hosts keep their colons.
fn split_host_port(base_url: &str) -> (String, u16) {
    let base_url = base_url.trim_end_matches('/');
    let (scheme, rest) = match base_url.split_once("://") {
        Some((scheme, rest)) => (scheme, rest),
        None => ("http", base_url),
    };

    // Only a colon after the closing bracket of an IPv6 literal separates a port
    let port_search_start = rest.rfind(']').map_or(0, |i| i + 1);
    let split = rest[port_search_start..]
        .rfind(':')
        .map(|i| rest.split_at(port_search_start + i))
        .map(|(host, port)| (host, &port[1..]));

    match split {
        Some((host, port)) => {
            let port = port.parse().unwrap_or(DEFAULT_OLLAMA_PORT);
            (format!("{}://{}", scheme, host), port)
        }
        None => (format!("{}://{}", scheme, rest), DEFAULT_OLLAMA_PORT),
    }
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.chat(vec![ChatMessage::user(prompt.to_string())]).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
