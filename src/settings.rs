//! The settings page and the endpoint for deleting all stored data.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, ValidationErrors,
    budget::count_budgets,
    db::clear_all_data,
    endpoints,
    expense::count_expenses,
    html::{
        BUTTON_DELETE_STYLE, CARD_STYLE, PAGE_CONTAINER_STYLE, base, loading_spinner, page_header,
    },
    navigation::NavBar,
};

/// The state needed for the settings page and the clear data endpoint.
#[derive(Debug, Clone)]
pub struct SettingsState {
    /// The database connection for managing all data.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SettingsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for managing the stored data.
pub async fn get_settings_page(State(state): State<SettingsState>) -> Result<Response, Error> {
    let (expense_count, budget_count) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let expense_count = count_expenses(&connection)
            .inspect_err(|error| tracing::error!("could not count expenses: {error}"))?;
        let budget_count = count_budgets(&connection)
            .inspect_err(|error| tracing::error!("could not count budgets: {error}"))?;

        (expense_count, budget_count)
    };

    Ok(settings_view(expense_count, budget_count).into_response())
}

fn settings_view(expense_count: usize, budget_count: usize) -> Markup {
    let nav_bar = NavBar::new(endpoints::SETTINGS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            (page_header("Settings", Some("Manage the data stored by Pennywise.")))

            section class={(CARD_STYLE) " max-w-md space-y-4"}
            {
                h2 class="text-xl font-bold" { "Your Data" }

                p
                {
                    "You have " (expense_count) " expenses and " (budget_count) " budgets."
                }
            }

            section class={(CARD_STYLE) " max-w-md mt-6 space-y-4 border border-red-300 dark:border-red-800"}
            {
                h2 class="text-xl font-bold text-red-600 dark:text-red-400" { "Danger Zone" }

                form
                    hx-post=(endpoints::CLEAR_DATA)
                    hx-target-error="#alert-container"
                    hx-confirm="Delete every expense and budget? This cannot be undone."
                    class="space-y-4"
                {
                    label class="flex items-center gap-2 text-sm"
                    {
                        input type="checkbox" name="confirm" value="true" required;
                        "I understand that all expenses and budgets will be permanently deleted."
                    }

                    button type="submit" class=(BUTTON_DELETE_STYLE)
                    {
                        span class="inline htmx-indicator" { (loading_spinner()) }
                        " Clear All Data"
                    }
                }
            }
        }
    };

    base("Settings", &[], &content)
}

/// The form for clearing all data.
#[derive(Debug, Default, Deserialize)]
pub struct ClearDataForm {
    /// Must be "true" for the data to be deleted.
    pub confirm: Option<String>,
}

/// A route handler that deletes every expense and budget, redirects to the dashboard on success.
///
/// Nothing is deleted unless the form confirms the request.
pub async fn clear_data_endpoint(
    State(state): State<SettingsState>,
    Form(form): Form<ClearDataForm>,
) -> Response {
    if form.confirm.as_deref() != Some("true") {
        tracing::error!("refusing to clear data without confirmation");
        return Error::Validation(ValidationErrors::single(
            "confirm",
            "Please confirm that you want to delete all of your data.",
        ))
        .into_alert_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = clear_all_data(&connection) {
        tracing::error!("could not clear data: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
