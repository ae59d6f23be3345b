//! The AI assistant that helps with entering and reviewing expenses.
//!
//! The assistant is only ever advisory. Its answers prefill forms or are shown
//! as text and are never written to the database directly, so a failed or slow
//! assistant cannot corrupt any data.
//!
//! [ExpenseAssistant] is the seam to the language model. The free functions in
//! this module wrap it with input checks, result coercion and a timeout.

mod http;

use std::{fmt::Debug, future::Future, pin::Pin, time::Duration};

use serde::Deserialize;
use time::OffsetDateTime;

use crate::{Category, Error, Expense, ValidationErrors, report::filter_by_date_range};

pub use http::HttpAssistant;

/// Texts shorter than this (in characters, ignoring surrounding whitespace)
/// are not worth sending to the assistant.
pub const MIN_TEXT_LENGTH: usize = 3;

/// The number of days covered by the weekly summary.
const SUMMARY_PERIOD_DAYS: i64 = 7;

/// Shown instead of a summary when there is nothing to summarise.
pub const NO_RECENT_EXPENSES_MESSAGE: &str = "No expenses in the last 7 days to analyze.";

/// The future returned by [ExpenseAssistant] methods.
pub type AssistantFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, AssistantError>> + Send + 'a>>;

/// The ways in which a call to the assistant can fail.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    /// No assistant has been configured.
    #[error("the assistant is not configured")]
    Disabled,

    /// The assistant took too long to answer.
    #[error("the assistant did not respond in time")]
    Timeout,

    /// The request could not be sent or the response could not be read.
    #[error("could not reach the assistant: {0}")]
    Transport(#[from] reqwest::Error),

    /// The assistant answered with an unsuccessful HTTP status code.
    #[error("the assistant responded with status {0}: {1}")]
    Status(u16, String),

    /// The assistant answered with something other than the expected JSON.
    #[error("the assistant gave an invalid response: {0}")]
    InvalidResponse(String),
}

impl From<AssistantError> for Error {
    fn from(error: AssistantError) -> Self {
        Error::ExternalService(error.to_string())
    }
}

/// The fields the assistant extracted from a sentence describing an expense.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParsedExpense {
    /// A short description without the amount or category.
    pub description: String,
    /// The amount spent.
    pub amount: f64,
    /// The category as named by the assistant, not necessarily a valid [Category].
    pub category: String,
}

/// A language model that can help categorise, enter and review expenses.
pub trait ExpenseAssistant: Debug + Send + Sync {
    /// Name the category that best fits an expense `description`.
    fn suggest_category<'a>(&'a self, description: &'a str) -> AssistantFuture<'a, String>;

    /// Extract the fields of an expense from a sentence, e.g. "Dinner with friends for $50".
    fn parse_expense_text<'a>(&'a self, text: &'a str) -> AssistantFuture<'a, ParsedExpense>;

    /// Write a short, friendly summary of `expenses`.
    fn summarize<'a>(&'a self, expenses: &'a [Expense]) -> AssistantFuture<'a, String>;
}

/// The assistant used when no language model is configured.
///
/// Every call fails with [AssistantError::Disabled].
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledAssistant;

impl ExpenseAssistant for DisabledAssistant {
    fn suggest_category<'a>(&'a self, _description: &'a str) -> AssistantFuture<'a, String> {
        Box::pin(async { Err(AssistantError::Disabled) })
    }

    fn parse_expense_text<'a>(&'a self, _text: &'a str) -> AssistantFuture<'a, ParsedExpense> {
        Box::pin(async { Err(AssistantError::Disabled) })
    }

    fn summarize<'a>(&'a self, _expenses: &'a [Expense]) -> AssistantFuture<'a, String> {
        Box::pin(async { Err(AssistantError::Disabled) })
    }
}

/// An expense suggested by the assistant, ready to prefill the expense form.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseSuggestion {
    /// A short description of the expense.
    pub description: String,
    /// The amount spent, if the assistant found a positive amount.
    pub amount: Option<f64>,
    /// The best matching category.
    pub category: Category,
}

/// Ask the assistant for the category of an expense with `description`.
///
/// Returns `Ok(None)` without calling the assistant if the description is
/// too short to be meaningful. Whatever the assistant answers is mapped onto
/// a category with [Category::coerce].
///
/// # Errors
/// Returns [Error::ExternalService] if the assistant fails or does not answer
/// within `timeout`.
pub async fn suggest_category(
    assistant: &dyn ExpenseAssistant,
    description: &str,
    timeout: Duration,
) -> Result<Option<Category>, Error> {
    let description = description.trim();

    if is_too_short(description) {
        return Ok(None);
    }

    let answer = with_timeout(timeout, assistant.suggest_category(description))
        .await
        .inspect_err(|error| tracing::error!("could not get category suggestion: {error}"))?;

    let category = Category::coerce(&answer);
    tracing::debug!("Assistant suggested \"{answer}\", using {category}");

    Ok(Some(category))
}

/// Ask the assistant to turn a sentence into the fields of an expense.
///
/// An amount that is not a positive number is dropped so that the user has
/// to fill it in.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if `text` is too short to parse,
/// - or [Error::ExternalService] if the assistant fails or does not answer
///   within `timeout`.
pub async fn parse_expense_text(
    assistant: &dyn ExpenseAssistant,
    text: &str,
    timeout: Duration,
) -> Result<ExpenseSuggestion, Error> {
    let text = text.trim();

    if is_too_short(text) {
        return Err(ValidationErrors::single(
            "text",
            format!("Describe the expense in at least {MIN_TEXT_LENGTH} characters."),
        )
        .into());
    }

    let parsed = with_timeout(timeout, assistant.parse_expense_text(text))
        .await
        .inspect_err(|error| tracing::error!("could not parse expense text: {error}"))?;

    let amount = (parsed.amount.is_finite() && parsed.amount > 0.0).then_some(parsed.amount);
    if amount.is_none() {
        tracing::warn!("Ignoring invalid amount {} from assistant", parsed.amount);
    }

    Ok(ExpenseSuggestion {
        description: parsed.description.trim().to_owned(),
        amount,
        category: Category::coerce(&parsed.category),
    })
}

/// Ask the assistant to summarise the spending in the seven days up to `now`.
///
/// Only expenses dated within that window are sent. If there are none, a
/// fixed message is returned without calling the assistant.
///
/// # Errors
/// Returns [Error::ExternalService] if the assistant fails or does not answer
/// within `timeout`.
pub async fn weekly_summary(
    assistant: &dyn ExpenseAssistant,
    expenses: &[Expense],
    now: OffsetDateTime,
    timeout: Duration,
) -> Result<String, Error> {
    let week_start = now - time::Duration::days(SUMMARY_PERIOD_DAYS);
    let recent_expenses = filter_by_date_range(expenses, week_start, now);

    if recent_expenses.is_empty() {
        return Ok(NO_RECENT_EXPENSES_MESSAGE.to_owned());
    }

    let summary = with_timeout(timeout, assistant.summarize(&recent_expenses))
        .await
        .inspect_err(|error| tracing::error!("could not get weekly summary: {error}"))?;

    Ok(summary.trim().to_owned())
}

fn is_too_short(text: &str) -> bool {
    text.chars().count() < MIN_TEXT_LENGTH
}

async fn with_timeout<T>(
    timeout: Duration,
    future: AssistantFuture<'_, T>,
) -> Result<T, AssistantError> {
    tokio::time::timeout(timeout, future)
        .await
        .map_err(|_| AssistantError::Timeout)?
}
