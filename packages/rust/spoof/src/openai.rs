//! Chat-completions transformer backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use counterclaim_shared::{CounterclaimError, Rating, Result};

use crate::Spoofer;

const SYSTEM_PROMPT: &str = "You will read a fact-check article. \
Your task is to write a new article in the same style as the original article. \
This new article should come to the opposite conclusion as the original article. \
For example, if the original article concludes that a claim is false, your new \
article should conclude that the claim is true. \
Adopt a professional, reporting tone.";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: String,
}

/// [`Spoofer`] backed by an OpenAI-compatible chat-completions API.
///
/// The base URL is configurable so tests and self-hosted gateways can
/// stand in for the real endpoint.
pub struct OpenAiSpoofer {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiSpoofer {
    pub fn new(api_key: String, model: String, base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| CounterclaimError::Transform(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn user_prompt(content: &[String], rating: Rating) -> String {
        format!(
            "Here is the article:\n\n{}\n\nThis article concludes that the claim is {rating}.\n\n\
             Write a new article that comes to the opposite conclusion.",
            content.join("\n\n")
        )
    }
}

#[async_trait]
impl Spoofer for OpenAiSpoofer {
    async fn spoof(&self, content: &[String], rating: Rating) -> Result<Vec<String>> {
        let user_prompt = Self::user_prompt(content, rating);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CounterclaimError::Transform(format!("POST {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CounterclaimError::Transform(format!(
                "chat completion failed: HTTP {status}"
            )));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| CounterclaimError::Transform(format!("decoding chat response: {e}")))?;

        let text = reply
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| CounterclaimError::Transform("chat response had no choices".into()))?;

        // The model replies with blank-line separated paragraphs.
        let paragraphs: Vec<String> = text
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect();

        if paragraphs.is_empty() {
            return Err(CounterclaimError::Transform(
                "chat response was empty".into(),
            ));
        }

        tracing::debug!(paragraphs = paragraphs.len(), "received transformed article");
        Ok(paragraphs)
    }
}
