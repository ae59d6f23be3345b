use std::{
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use crate::{
    Expense, ExpenseId,
    assistant::{AssistantError, AssistantFuture, ExpenseAssistant, ParsedExpense},
};

/// An assistant with canned answers that records how it was called.
///
/// Any task without a canned answer fails with [AssistantError::InvalidResponse].
#[derive(Debug, Default)]
pub(crate) struct FakeAssistant {
    category: Option<String>,
    parsed: Option<ParsedExpense>,
    summary: Option<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    summarized_ids: Mutex<Vec<ExpenseId>>,
}

impl FakeAssistant {
    pub(crate) fn failing() -> Self {
        Self::default()
    }

    pub(crate) fn with_category(category: &str) -> Self {
        Self {
            category: Some(category.to_owned()),
            ..Self::default()
        }
    }

    pub(crate) fn with_parsed(parsed: ParsedExpense) -> Self {
        Self {
            parsed: Some(parsed),
            ..Self::default()
        }
    }

    pub(crate) fn with_summary(summary: &str) -> Self {
        Self {
            summary: Some(summary.to_owned()),
            ..Self::default()
        }
    }

    /// Wait for `delay` before answering.
    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The IDs of the expenses passed to the last call to `summarize`.
    pub(crate) fn summarized_ids(&self) -> Vec<ExpenseId> {
        self.summarized_ids.lock().unwrap().clone()
    }

    fn answer<'a, T>(&'a self, answer: Option<&'a T>) -> AssistantFuture<'a, T>
    where
        T: Clone + Send + Sync + 'a,
    {
        self.calls.fetch_add(1, Ordering::SeqCst);

        Box::pin(async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            answer
                .cloned()
                .ok_or_else(|| AssistantError::InvalidResponse("no canned answer".to_owned()))
        })
    }
}

impl ExpenseAssistant for FakeAssistant {
    fn suggest_category<'a>(&'a self, _description: &'a str) -> AssistantFuture<'a, String> {
        self.answer(self.category.as_ref())
    }

    fn parse_expense_text<'a>(&'a self, _text: &'a str) -> AssistantFuture<'a, ParsedExpense> {
        self.answer(self.parsed.as_ref())
    }

    fn summarize<'a>(&'a self, expenses: &'a [Expense]) -> AssistantFuture<'a, String> {
        *self.summarized_ids.lock().unwrap() = expenses.iter().map(|expense| expense.id).collect();

        self.answer(self.summary.as_ref())
    }
}
