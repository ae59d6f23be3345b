//! Defines the endpoint that replaces the budget set.
use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Category, Error, ValidationErrors,
    budget::{Budget, set_budgets},
    endpoints,
};

/// The state needed to update the budgets.
#[derive(Debug, Clone)]
pub struct UpdateBudgetsState {
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateBudgetsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that replaces every budget with the submitted ones.
///
/// The form maps category names to amounts. Blank amounts mean the category
/// has no budget and unknown names are ignored. Redirects to the budgets view
/// on success.
pub async fn update_budgets_endpoint(
    State(state): State<UpdateBudgetsState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let budgets = match parse_budget_fields(&fields) {
        Ok(budgets) => budgets,
        Err(errors) => {
            tracing::error!("could not parse budget form: {errors:?}");
            return Error::Validation(errors).into_alert_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = set_budgets(&budgets, &connection) {
        tracing::error!("could not set budgets: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

fn parse_budget_fields(fields: &[(String, String)]) -> Result<Vec<Budget>, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut budgets = Vec::new();

    for (name, value) in fields {
        let Ok(category) = name.parse::<Category>() else {
            tracing::debug!("Ignoring unknown budget field {name}");
            continue;
        };

        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        match value.parse::<f64>() {
            Ok(amount) => budgets.push(Budget { category, amount }),
            Err(_) => errors.add(
                "amount",
                format!("The budget for {category} must be a number."),
            ),
        }
    }

    if errors.is_empty() {
        Ok(budgets)
    } else {
        Err(errors)
    }
}
