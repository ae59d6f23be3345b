//! Endpoints that ask the AI assistant to help fill in the new expense form.
//!
//! Both endpoints only return prefilled form fragments. Nothing is stored
//! until the user submits the expense form.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use serde::Deserialize;

use crate::{
    AppState, ExpenseAssistant,
    assistant::{parse_expense_text, suggest_category},
    expense::expenses_page::{ExpenseFormValues, category_field_view, expense_fields_view},
    timezone::{local_offset_or_error, now_local},
};

/// The state needed by the assist endpoints.
#[derive(Debug, Clone)]
pub struct AssistState {
    /// The assistant to ask.
    pub assistant: Arc<dyn ExpenseAssistant>,
    /// The longest time to wait for `assistant`.
    pub assistant_timeout: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for AssistState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            assistant: state.assistant.clone(),
            assistant_timeout: state.assistant_timeout,
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The expense form as sent by the "Suggest" button.
#[derive(Debug, Deserialize)]
pub struct SuggestCategoryForm {
    /// The description typed so far.
    #[serde(default)]
    pub description: String,
}

/// The quick add form.
#[derive(Debug, Deserialize)]
pub struct ParseExpenseForm {
    /// A sentence describing the expense.
    #[serde(default)]
    pub text: String,
}

/// Replace the category select with one that has the suggested category selected.
///
/// Descriptions that are too short leave the select unchanged.
pub async fn suggest_category_endpoint(
    State(state): State<AssistState>,
    Form(form): Form<SuggestCategoryForm>,
) -> Response {
    match suggest_category(
        state.assistant.as_ref(),
        &form.description,
        state.assistant_timeout,
    )
    .await
    {
        Ok(category) => category_field_view(category).into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Replace the expense form fields with the ones the assistant read from the quick add text.
pub async fn parse_expense_endpoint(
    State(state): State<AssistState>,
    Form(form): Form<ParseExpenseForm>,
) -> Response {
    let local_offset = match local_offset_or_error(&state.local_timezone) {
        Ok(offset) => offset,
        Err(error) => return error.into_alert_response(),
    };

    match parse_expense_text(state.assistant.as_ref(), &form.text, state.assistant_timeout).await {
        Ok(suggestion) => expense_fields_view(&ExpenseFormValues {
            description: suggestion.description,
            amount: suggestion.amount,
            category: Some(suggestion.category),
            date: now_local(local_offset).date(),
        })
        .into_response(),
        Err(error) => error.into_alert_response(),
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use axum::{extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use scraper::{Html, Selector};

    use crate::{
        ParsedExpense,
        test_utils::{FakeAssistant, assert_valid_html, parse_html_fragment},
    };

    use super::{
        AssistState, ParseExpenseForm, SuggestCategoryForm, parse_expense_endpoint,
        suggest_category_endpoint,
    };

    fn get_test_state(assistant: FakeAssistant) -> AssistState {
        AssistState {
            assistant: Arc::new(assistant),
            assistant_timeout: Duration::from_millis(200),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn selected_category(html: &Html) -> Option<String> {
        html.select(&Selector::parse("select[name=category] option[selected]").unwrap())
            .next()
            .and_then(|option| option.value().attr("value"))
            .map(str::to_owned)
    }

    fn input_value(html: &Html, name: &str) -> Option<String> {
        html.select(&Selector::parse(&format!("input[name={name}]")).unwrap())
            .next()
            .and_then(|input| input.value().attr("value"))
            .map(str::to_owned)
    }

    #[tokio::test]
    async fn suggestion_selects_coerced_category() {
        let state = get_test_state(FakeAssistant::with_category("groceries"));
        let form = SuggestCategoryForm {
            description: "Weekly shop at the supermarket".to_owned(),
        };

        let response = suggest_category_endpoint(State(state), Form(form)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert_eq!(selected_category(&html), Some("Groceries".to_owned()));
    }

    #[tokio::test]
    async fn short_description_leaves_category_unselected() {
        let assistant = Arc::new(FakeAssistant::with_category("Food"));
        let state = AssistState {
            assistant: assistant.clone(),
            ..get_test_state(FakeAssistant::failing())
        };
        let form = SuggestCategoryForm {
            description: "ab".to_owned(),
        };

        let response = suggest_category_endpoint(State(state), Form(form)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_eq!(selected_category(&html), Some(String::new()));
        assert_eq!(assistant.call_count(), 0);
    }

    #[tokio::test]
    async fn failed_suggestion_renders_retryable_alert() {
        let state = get_test_state(FakeAssistant::failing());
        let form = SuggestCategoryForm {
            description: "Taxi to the airport".to_owned(),
        };

        let response = suggest_category_endpoint(State(state), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn slow_suggestion_times_out() {
        let assistant = FakeAssistant::with_category("Food").delayed(Duration::from_secs(5));
        let state = AssistState {
            assistant_timeout: Duration::from_millis(10),
            ..get_test_state(assistant)
        };
        let form = SuggestCategoryForm {
            description: "Pizza night".to_owned(),
        };

        let response = suggest_category_endpoint(State(state), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn parsed_text_prefills_form_fields() {
        let state = get_test_state(FakeAssistant::with_parsed(ParsedExpense {
            description: "Dinner with friends".to_owned(),
            amount: 50.0,
            category: "food".to_owned(),
        }));
        let form = ParseExpenseForm {
            text: "Dinner with friends for $50".to_owned(),
        };

        let response = parse_expense_endpoint(State(state), Form(form)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert_eq!(
            input_value(&html, "description"),
            Some("Dinner with friends".to_owned())
        );
        assert_eq!(input_value(&html, "amount"), Some("50.00".to_owned()));
        assert_eq!(selected_category(&html), Some("Food".to_owned()));
        assert!(input_value(&html, "date").is_some());
    }

    #[tokio::test]
    async fn non_positive_amount_is_left_blank() {
        let state = get_test_state(FakeAssistant::with_parsed(ParsedExpense {
            description: "Refund".to_owned(),
            amount: -20.0,
            category: "Other".to_owned(),
        }));
        let form = ParseExpenseForm {
            text: "Got a refund of 20".to_owned(),
        };

        let response = parse_expense_endpoint(State(state), Form(form)).await;

        let html = parse_html_fragment(response).await;
        assert_eq!(input_value(&html, "amount"), None);
    }

    #[tokio::test]
    async fn short_text_is_rejected_without_calling_assistant() {
        let assistant = Arc::new(FakeAssistant::failing());
        let state = AssistState {
            assistant: assistant.clone(),
            ..get_test_state(FakeAssistant::failing())
        };
        let form = ParseExpenseForm {
            text: " a ".to_owned(),
        };

        let response = parse_expense_endpoint(State(state), Form(form)).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(assistant.call_count(), 0);
    }
}
