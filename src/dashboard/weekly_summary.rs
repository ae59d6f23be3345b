//! The endpoint that asks the assistant to summarise the last week of spending.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error, ExpenseAssistant, assistant::weekly_summary, expense::get_expenses,
};

/// The state needed for the weekly summary.
#[derive(Debug, Clone)]
pub struct WeeklySummaryState {
    /// The database connection for reading expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The assistant that writes the summary.
    pub assistant: Arc<dyn ExpenseAssistant>,
    /// The longest time to wait for `assistant`.
    pub assistant_timeout: Duration,
}

impl FromRef<AppState> for WeeklySummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            assistant: state.assistant.clone(),
            assistant_timeout: state.assistant_timeout,
        }
    }
}

/// Render a summary of the expenses from the last 7 days as an HTML fragment.
///
/// The database lock is released before the assistant is called.
pub async fn weekly_summary_endpoint(State(state): State<WeeklySummaryState>) -> Response {
    let expenses = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_alert_response();
            }
        };

        match get_expenses(&connection) {
            Ok(expenses) => expenses,
            Err(error) => {
                tracing::error!("could not get expenses: {error}");
                return error.into_alert_response();
            }
        }
    };

    match weekly_summary(
        state.assistant.as_ref(),
        &expenses,
        OffsetDateTime::now_utc(),
        state.assistant_timeout,
    )
    .await
    {
        Ok(summary) => html!(
            p class="whitespace-pre-line text-gray-900 dark:text-white" { (summary) }
        )
        .into_response(),
        Err(error) => error.into_alert_response(),
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use axum::{extract::State, http::StatusCode};
    use rusqlite::Connection;
    use time::{OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};

    use crate::{
        db::initialize,
        expense::{ExpenseInput, create_expense},
        test_utils::{FakeAssistant, parse_html_fragment},
    };

    use super::{WeeklySummaryState, weekly_summary_endpoint};

    fn get_test_state(assistant: Arc<FakeAssistant>) -> WeeklySummaryState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        WeeklySummaryState {
            db_connection: Arc::new(Mutex::new(connection)),
            assistant,
            assistant_timeout: Duration::from_millis(200),
        }
    }

    fn add_expense(state: &WeeklySummaryState, description: &str, date: OffsetDateTime) -> i64 {
        let input = ExpenseInput {
            description: description.to_owned(),
            amount: "12.0".to_owned(),
            category: "Food".to_owned(),
            date: date.format(&Rfc3339).unwrap(),
        };

        create_expense(&input, UtcOffset::UTC, &state.db_connection.lock().unwrap())
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn summarises_only_last_week() {
        let assistant = Arc::new(FakeAssistant::with_summary("You ate out a lot."));
        let state = get_test_state(assistant.clone());
        let now = OffsetDateTime::now_utc();
        let recent_id = add_expense(&state, "Recent", now - time::Duration::days(2));
        add_expense(&state, "Old", now - time::Duration::days(30));

        let response = weekly_summary_endpoint(State(state)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let text = html.root_element().text().collect::<String>();
        assert_eq!(text.trim(), "You ate out a lot.");
        assert_eq!(assistant.summarized_ids(), vec![recent_id]);
    }

    #[tokio::test]
    async fn no_recent_expenses_skips_assistant() {
        let assistant = Arc::new(FakeAssistant::with_summary("unused"));
        let state = get_test_state(assistant.clone());
        add_expense(
            &state,
            "Old",
            OffsetDateTime::now_utc() - time::Duration::days(30),
        );

        let response = weekly_summary_endpoint(State(state)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let text = html.root_element().text().collect::<String>();
        assert_eq!(text.trim(), "No expenses in the last 7 days to analyze.");
        assert_eq!(assistant.call_count(), 0);
    }

    #[tokio::test]
    async fn assistant_failure_renders_alert() {
        let state = get_test_state(Arc::new(FakeAssistant::failing()));
        add_expense(&state, "Recent", OffsetDateTime::now_utc());

        let response = weekly_summary_endpoint(State(state)).await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
