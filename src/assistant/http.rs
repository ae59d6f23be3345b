//! An [ExpenseAssistant] backed by an OpenAI-compatible chat completions API.

use std::fmt::Debug;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use time::OffsetDateTime;

use crate::{Category, Expense};

use super::{AssistantError, AssistantFuture, ExpenseAssistant, ParsedExpense};

/// Talks to a chat completions endpoint, e.g. `https://api.openai.com/v1`.
///
/// Every task asks the model for a JSON object so that the answer can be
/// deserialised directly.
#[derive(Clone)]
pub struct HttpAssistant {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl HttpAssistant {
    /// Create an assistant that sends requests to `{base_url}/chat/completions`.
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: chat_completions_url(base_url),
            api_key: api_key.to_owned(),
            model: model.to_owned(),
        }
    }

    async fn complete<T: DeserializeOwned>(
        &self,
        system_prompt: String,
        user_prompt: String,
    ) -> Result<T, AssistantError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            response_format: ResponseFormat {
                type_: "json_object",
            },
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_owned());

            return Err(AssistantError::Status(status.as_u16(), body));
        }

        let completion = response.json::<ChatResponse>().await?;

        parse_completion(completion)
    }
}

// The API key is left out so that it never ends up in the logs.
impl Debug for HttpAssistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAssistant")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl ExpenseAssistant for HttpAssistant {
    fn suggest_category<'a>(&'a self, description: &'a str) -> AssistantFuture<'a, String> {
        Box::pin(async move {
            let answer: CategoryAnswer = self
                .complete(category_prompt(), format!("Expense: {description}"))
                .await?;

            Ok(answer.category)
        })
    }

    fn parse_expense_text<'a>(&'a self, text: &'a str) -> AssistantFuture<'a, ParsedExpense> {
        Box::pin(async move {
            let today = OffsetDateTime::now_utc().date();

            self.complete(parse_prompt(today), format!("Text: {text}"))
                .await
        })
    }

    fn summarize<'a>(&'a self, expenses: &'a [Expense]) -> AssistantFuture<'a, String> {
        Box::pin(async move {
            let answer: SummaryAnswer = self
                .complete(summary_prompt(), expense_list(expenses))
                .await?;

            Ok(answer.summary)
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage; 2],
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    type_: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CategoryAnswer {
    category: String,
}

#[derive(Debug, Deserialize)]
struct SummaryAnswer {
    summary: String,
}

fn chat_completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

fn parse_completion<T: DeserializeOwned>(completion: ChatResponse) -> Result<T, AssistantError> {
    let content = completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| AssistantError::InvalidResponse("the response had no content".to_owned()))?;

    serde_json::from_str(&content).map_err(|error| {
        AssistantError::InvalidResponse(format!("could not parse {content:?}: {error}"))
    })
}

fn category_names() -> String {
    Category::ALL.map(Category::as_str).join(", ")
}

fn category_prompt() -> String {
    format!(
        "You categorise personal expenses. Given the description of an expense, \
        answer with the single best category. The category must be one of: {}. \
        Respond with a JSON object of the form {{\"category\": \"<category>\"}}.",
        category_names()
    )
}

fn parse_prompt(today: time::Date) -> String {
    format!(
        "You help users record their expenses from a single line of text. \
        Extract the description, amount and category of the expense. \
        The category must be one of: {}. If the user does not name a category, \
        infer the most likely one. The description should be a clean, concise \
        summary without the amount or category. Today is {today}. \
        Respond with a JSON object of the form \
        {{\"description\": \"<text>\", \"amount\": <number>, \"category\": \"<category>\"}}.",
        category_names()
    )
}

fn summary_prompt() -> String {
    "You are Penny, a friendly and insightful financial assistant. Summarise the \
    user's spending over the past week in two or three short sentences: name the \
    top spending category, give the total spent and offer a short, encouraging \
    observation. Respond with a JSON object of the form {\"summary\": \"<text>\"}."
        .to_owned()
}

fn expense_list(expenses: &[Expense]) -> String {
    expenses
        .iter()
        .map(|expense| {
            format!(
                "- {} ({}): ${:.2} on {}",
                expense.description,
                expense.category,
                expense.amount,
                expense.date.date()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
