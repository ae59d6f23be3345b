//! Defines the endpoint for recording a new expense.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    expense::{ExpenseInput, create_expense},
    timezone::local_offset_or_error,
};

/// The state needed to create an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for creating a new expense, redirects to the expenses view on success.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    Form(form): Form<ExpenseInput>,
) -> Response {
    let local_offset = match local_offset_or_error(&state.local_timezone) {
        Ok(offset) => offset,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = create_expense(&form, local_offset, &connection) {
        tracing::error!("could not create expense: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use rusqlite::Connection;

    use crate::{
        Category,
        db::initialize,
        endpoints,
        expense::{ExpenseInput, get_expenses},
        test_utils::{assert_hx_redirect, parse_html_fragment},
    };

    use super::{CreateExpenseState, create_expense_endpoint};

    fn get_test_state() -> CreateExpenseState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        CreateExpenseState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn can_create_expense() {
        let state = get_test_state();
        let form = ExpenseInput {
            description: "Lunch".to_owned(),
            amount: "12.5".to_owned(),
            category: "Food".to_owned(),
            date: "2024-03-01".to_owned(),
        };

        let response = create_expense_endpoint(State(state.clone()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::EXPENSES_VIEW);
        let expenses = get_expenses(&state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].description, "Lunch");
        assert_eq!(expenses[0].category, Category::Food);
    }

    #[tokio::test]
    async fn invalid_expense_renders_alert_and_stores_nothing() {
        let state = get_test_state();
        let form = ExpenseInput {
            description: "  ".to_owned(),
            amount: "-3.0".to_owned(),
            category: "Snacks".to_owned(),
            date: "yesterday".to_owned(),
        };

        let response = create_expense_endpoint(State(state.clone()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = parse_html_fragment(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Description is required."), "got {text}");
        assert!(text.contains("Amount must be"), "got {text}");
        assert!(text.contains("Category must be one of"), "got {text}");
        assert!(text.contains("Date must be"), "got {text}");
        let expenses = get_expenses(&state.db_connection.lock().unwrap()).unwrap();
        assert!(expenses.is_empty());
    }

    #[tokio::test]
    async fn blank_amount_is_a_field_error() {
        let state = get_test_state();
        let form: ExpenseInput =
            serde_html_form::from_str("description=Lunch&amount=&category=Food&date=2024-03-01")
                .unwrap();

        let response = create_expense_endpoint(State(state.clone()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = parse_html_fragment(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(
            text.contains("Amount must be a number greater than zero."),
            "got {text}"
        );
        let expenses = get_expenses(&state.db_connection.lock().unwrap()).unwrap();
        assert!(expenses.is_empty());
    }

    #[tokio::test]
    async fn invalid_timezone_renders_alert() {
        let mut state = get_test_state();
        state.local_timezone = "Not/AZone".to_owned();
        let form = ExpenseInput {
            description: "Bus".to_owned(),
            amount: "3.0".to_owned(),
            category: "Transport".to_owned(),
            date: "2024-03-01".to_owned(),
        };

        let response = create_expense_endpoint(State(state), Form(form)).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn form_decodes_from_url_encoding() {
        let form: ExpenseInput = serde_html_form::from_str(
            "description=Train+ticket&amount=4.20&category=Transport&date=2024-03-01",
        )
        .unwrap();

        assert_eq!(
            form,
            ExpenseInput {
                description: "Train ticket".to_owned(),
                amount: "4.20".to_owned(),
                category: "Transport".to_owned(),
                date: "2024-03-01".to_owned(),
            }
        );
    }
}
