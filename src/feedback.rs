// src/feedback.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{config::Config, error::AppError};

/// Returned instead of an error when the upstream AI call fails.
const FALLBACK_MESSAGE: &str =
    "AI feedback generation encountered an error. Please try again later.";

const EMPTY_COMPLETION_MESSAGE: &str =
    "Unable to generate feedback at this time. Please try again later.";

const SYSTEM_PROMPT: &str = "You are an expert coding interviewer and software engineer. \
Your task is to review code submissions and provide constructive, structured feedback. Focus on:\n\
1. Code Correctness: Does the code solve the problem correctly? Are there any logical errors?\n\
2. Time & Space Complexity: Analyze the algorithm's efficiency. Suggest optimizations if needed.\n\
3. Coding Style & Readability: Is the code clean, well-structured, and easy to understand?\n\
4. Best Practices: Does the code follow language conventions and best practices?\n\
5. Improvement Suggestions: Provide specific, actionable suggestions for improvement.\n\
Format your response as clear, concise text without JSON or markdown formatting. \
Be encouraging but honest. Keep feedback to 500 words maximum.";

/// Contract for AI-based code feedback generation.
///
/// Implementations validate their inputs, fail with a configuration error
/// when not provisioned and degrade to a fallback string when the remote
/// call itself errors. The submission counters never depend on this.
#[async_trait]
pub trait FeedbackGenerator: Send + Sync {
    async fn generate(&self, code: &str, language: &str) -> Result<String, AppError>;
}

/// OpenAI chat-completions backed implementation.
pub struct OpenAiFeedback {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl OpenAiFeedback {
    const API_URL: &'static str = "https://api.openai.com/v1/chat/completions";

    pub fn from_config(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            max_tokens: config.openai_max_tokens,
            temperature: config.openai_temperature,
        }
    }

    fn user_message(code: &str, language: &str) -> String {
        format!(
            "Please review the following {} code and provide structured feedback:\n\n```{}\n{}\n```",
            language,
            language.to_lowercase(),
            code
        )
    }
}

#[async_trait]
impl FeedbackGenerator for OpenAiFeedback {
    async fn generate(&self, code: &str, language: &str) -> Result<String, AppError> {
        if code.trim().is_empty() {
            tracing::warn!("Feedback requested for empty code submission");
            return Err(AppError::BadRequest(
                "Code cannot be null or empty".to_string(),
            ));
        }

        if language.trim().is_empty() {
            tracing::warn!("Feedback requested without a programming language");
            return Err(AppError::BadRequest(
                "Programming language cannot be null or empty".to_string(),
            ));
        }

        let api_key = match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => key,
            _ => {
                tracing::error!("OpenAI API key is not configured");
                return Err(AppError::InternalServerError(
                    "OPENAI_API_KEY is not configured".to_string(),
                ));
            }
        };

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: Self::user_message(code, language),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        tracing::debug!(model = %self.model, "Requesting AI feedback for {} code", language);

        let response = match self
            .client
            .post(Self::API_URL)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!("OpenAI request failed: {}", e);
                return Ok(FALLBACK_MESSAGE.to_string());
            }
        };

        if !response.status().is_success() {
            tracing::error!("OpenAI returned status {}", response.status());
            return Ok(FALLBACK_MESSAGE.to_string());
        }

        let completion: ChatCompletionResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Failed to decode OpenAI response: {}", e);
                return Ok(FALLBACK_MESSAGE.to_string());
            }
        };

        let feedback = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        match feedback {
            Some(text) => {
                tracing::info!("AI feedback generated for {} code", language);
                Ok(text)
            }
            None => {
                tracing::warn!("Empty completion received from OpenAI");
                Ok(EMPTY_COMPLETION_MESSAGE.to_string())
            }
        }
    }
}
