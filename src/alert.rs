//! Alerts for displaying error messages to users.
//!
//! Alerts are rendered as HTML fragments that HTMX swaps into the
//! `#alert-container` element of the base page.

use maud::{Markup, html};

/// A dismissable message shown at the bottom of the page.
#[derive(Debug, Clone)]
pub enum Alert {
    /// The operation failed.
    Error {
        /// The headline.
        message: String,
        /// What went wrong and how to fix it.
        details: String,
    },
    /// The operation failed for several reasons, e.g. multiple invalid fields.
    ErrorList {
        /// The headline.
        message: String,
        /// One entry per problem.
        details: Vec<String>,
    },
}

impl Alert {
    /// Render the alert as an HTML fragment.
    pub fn into_html(self) -> Markup {
        let (message, body) = match self {
            Alert::Error { message, details } => (message, html!( p { (details) } )),
            Alert::ErrorList { message, details } => (
                message,
                html!(
                    ul class="list-disc list-inside"
                    {
                        @for detail in details {
                            li { (detail) }
                        }
                    }
                ),
            ),
        };

        html!(
            div
                role="alert"
                class={"flex flex-col gap-1 p-4 mb-4 text-sm border rounded-lg " (ERROR_STYLE)}
            {
                div class="flex justify-between items-center"
                {
                    span class="font-semibold" { (message) }

                    button
                        type="button"
                        aria-label="Dismiss"
                        class="ms-4 font-bold"
                        onclick="this.closest('[role=alert]').remove()"
                    {
                        "×"
                    }
                }

                (body)
            }
        )
    }
}

const ERROR_STYLE: &str = "text-red-800 border-red-300 bg-red-50 \
    dark:bg-gray-800 dark:text-red-400 dark:border-red-800";

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use super::Alert;

    #[test]
    fn error_list_renders_one_item_per_detail() {
        let markup = Alert::ErrorList {
            message: "Please check your input".to_owned(),
            details: vec!["first".to_owned(), "second".to_owned()],
        }
        .into_html();

        let html = Html::parse_fragment(&markup.into_string());
        let items = html
            .select(&Selector::parse("li").unwrap())
            .map(|item| item.text().collect::<String>())
            .collect::<Vec<_>>();

        assert_eq!(items, vec!["first", "second"]);
    }
}
