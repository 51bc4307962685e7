//! Plain-text rendering of controller state.

use std::fmt::Write as _;

use client_core::{
    EditOutcome, ExpenseSnapshot, PendingEntryForm, ReloadOutcome, RemoveOutcome, SubmitOutcome,
    SyncPhase,
};
use shared::domain::{Category, ExpenseId};

const CURRENCY: &str = "₹";

pub fn render_expenses(snapshot: &ExpenseSnapshot) -> String {
    let mut out = String::new();
    if snapshot.phase == SyncPhase::Uninitialized {
        let _ = writeln!(out, "(not loaded)");
    }
    if snapshot.expenses.is_empty() {
        let _ = writeln!(out, "No expenses yet.");
    }
    for expense in &snapshot.expenses {
        let _ = writeln!(
            out,
            "#{:<4} {} [{}] {CURRENCY} {}",
            expense.id, expense.title, expense.category, expense.amount
        );
    }
    let _ = writeln!(
        out,
        "Total Spent: {CURRENCY} {} | Entries: {}",
        snapshot.total(),
        snapshot.count()
    );
    out
}

pub fn render_form(form: &PendingEntryForm) -> String {
    format!(
        "title={:?} amount={:?} category={:?} (options: {})",
        form.title,
        form.amount,
        form.category,
        Category::KNOWN
            .iter()
            .map(Category::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    )
}

pub fn describe_submit(outcome: SubmitOutcome) -> String {
    match outcome {
        SubmitOutcome::Incomplete => "Title and amount are required.".to_string(),
        SubmitOutcome::InvalidAmount => "Amount must be a number.".to_string(),
        SubmitOutcome::Created(reload) => format!("Expense added.{}", reload_note(reload)),
        SubmitOutcome::Failed => "Could not add expense; your entry was kept.".to_string(),
    }
}

pub fn describe_remove(id: ExpenseId, outcome: RemoveOutcome) -> String {
    let head = if outcome.deleted {
        format!("Expense #{id} deleted.")
    } else {
        format!("Could not delete expense #{id}.")
    };
    format!("{head}{}", reload_note(outcome.reload))
}

pub fn describe_edit(id: ExpenseId, outcome: EditOutcome) -> String {
    match outcome {
        EditOutcome::Updated(reload) => format!("Expense #{id} updated.{}", reload_note(reload)),
        EditOutcome::Failed => format!("Could not update expense #{id}."),
    }
}

fn reload_note(reload: ReloadOutcome) -> &'static str {
    match reload {
        ReloadOutcome::Applied | ReloadOutcome::Stale => "",
        ReloadOutcome::Failed => " (list may be out of date)",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::Expense;

    fn snapshot(expenses: Vec<Expense>) -> ExpenseSnapshot {
        ExpenseSnapshot {
            expenses,
            form: PendingEntryForm::default(),
            phase: SyncPhase::Loaded,
        }
    }

    #[test]
    fn renders_entries_and_summary() {
        let rendered = render_expenses(&snapshot(vec![
            Expense {
                id: ExpenseId(1),
                title: "Coffee".into(),
                amount: 4.5,
                category: Category::Food,
            },
            Expense {
                id: ExpenseId(2),
                title: "Bus".into(),
                amount: 2.0,
                category: Category::Travel,
            },
        ]));

        assert!(rendered.contains("#1    Coffee [Food] ₹ 4.5"));
        assert!(rendered.contains("#2    Bus [Travel] ₹ 2"));
        assert!(rendered.ends_with("Total Spent: ₹ 6.5 | Entries: 2\n"));
    }

    #[test]
    fn renders_empty_collection() {
        let rendered = render_expenses(&snapshot(Vec::new()));
        assert!(rendered.contains("No expenses yet."));
        assert!(rendered.contains("Total Spent: ₹ 0 | Entries: 0"));
    }

    #[test]
    fn failed_delete_is_reported_even_after_reload() {
        let text = describe_remove(
            ExpenseId(3),
            RemoveOutcome {
                deleted: false,
                reload: ReloadOutcome::Applied,
            },
        );
        assert_eq!(text, "Could not delete expense #3.");
    }

    #[test]
    fn form_lists_category_options() {
        let text = render_form(&PendingEntryForm::default());
        assert!(text.contains("category=\"Food\""));
        assert!(text.contains("Food, Travel, Shopping, Bills"));
    }
}
