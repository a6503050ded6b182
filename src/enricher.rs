//! One-sentence token summaries from a chat-completion model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::SUMMARY_MAX_TOKENS;
use crate::error::{AppError, Result};

pub const SYSTEM_PROMPT: &str = "You are a concise crypto analyst. \
Given a token name, symbol, 24h price change %, and 24h volume, \
write ONE sentence describing the token and its current momentum.";

/// What the model is told about a token.
#[derive(Debug, Clone, Copy)]
pub struct SummaryRequest<'a> {
    pub name: &'a str,
    pub symbol: &'a str,
    pub price_change_24h: f64,
    pub volume_24h: f64,
}

impl SummaryRequest<'_> {
    pub fn user_message(&self) -> String {
        format!(
            "Token: {} ({})\n24h Price Change: {:+.1}%\n24h Volume: ${}",
            self.name,
            self.symbol,
            self.price_change_24h,
            format_thousands(self.volume_24h),
        )
    }
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, req: &SummaryRequest<'_>) -> Result<String>;
}

/// OpenAI-compatible `/chat/completions` client.
pub struct OpenAiSummarizer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiSummarizer {
    pub fn new(
        client: reqwest::Client,
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, req: &SummaryRequest<'_>) -> Result<String> {
        let user = req.user_message();
        let body = ChatRequest {
            model: &self.model,
            max_tokens: SUMMARY_MAX_TOKENS,
            messages: [
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: &user },
            ],
        };

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!("chat completion returned {status}: {detail}")));
        }

        let parsed: ChatResponse = resp.json().await?;
        extract_summary(parsed)
    }
}

fn extract_summary(resp: ChatResponse) -> Result<String> {
    resp.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Upstream("chat completion had no content".to_string()))
}

/// `1234567.6` → `"1,234,568"`.
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_separators() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.4), "999");
        assert_eq!(format_thousands(1_000.0), "1,000");
        assert_eq!(format_thousands(1_234_567.6), "1,234,568");
        assert_eq!(format_thousands(-45_000.0), "-45,000");
    }

    #[test]
    fn user_message_layout() {
        let req = SummaryRequest {
            name: "Degen",
            symbol: "DEGEN",
            price_change_24h: 15.04,
            volume_24h: 2_500_000.0,
        };
        assert_eq!(
            req.user_message(),
            "Token: Degen (DEGEN)\n24h Price Change: +15.0%\n24h Volume: $2,500,000"
        );

        let falling = SummaryRequest { price_change_24h: -3.26, ..req };
        assert!(falling.user_message().contains("24h Price Change: -3.3%"));
    }

    #[test]
    fn summary_is_trimmed_first_choice() {
        let resp: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"  DEGEN is surging.\n"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_summary(resp).unwrap(), "DEGEN is surging.");
    }

    #[test]
    fn empty_completion_is_an_error() {
        let resp: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(extract_summary(resp), Err(AppError::Upstream(_))));

        let resp: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(extract_summary(resp).is_err());
    }

    #[test]
    fn request_body_carries_prompt_and_budget() {
        let body = ChatRequest {
            model: "gpt-4o-mini",
            max_tokens: SUMMARY_MAX_TOKENS,
            messages: [
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: "hi" },
            ],
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["model"], "gpt-4o-mini");
        assert_eq!(v["max_tokens"], 120);
        assert_eq!(v["messages"][0]["role"], "system");
        assert_eq!(v["messages"][1]["content"], "hi");
    }
}
