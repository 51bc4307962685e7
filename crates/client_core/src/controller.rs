//! View-state controller for the expense list.
//!
//! The controller caches the remote collection and owns the pending entry
//! form. Every mutation is followed by a full reload; nothing is ever added
//! to or removed from the cached collection locally.

use std::sync::{
    atomic::{AtomicU64, AtomicUsize, Ordering},
    Arc,
};

use shared::{
    domain::{Expense, ExpenseId},
    protocol::NewExpense,
};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info, warn};

use crate::{
    config::ClientSettings,
    error::{RemoteCallFailure, RemoteOperation},
    form::{FormField, PendingEntryForm},
    store::{ExpenseStore, HttpExpenseStore},
};

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    CollectionReplaced { count: usize, total: f64 },
    FormReset,
    RemoteCallFailed {
        operation: RemoteOperation,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Uninitialized,
    Loading,
    Loaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    Applied,
    /// A newer reload finished first; this response was dropped.
    Stale,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Title or amount is empty; nothing was sent.
    Incomplete,
    /// Amount is not a finite number; nothing was sent.
    InvalidAmount,
    Created(ReloadOutcome),
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveOutcome {
    pub deleted: bool,
    pub reload: ReloadOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Updated(ReloadOutcome),
    Failed,
}

/// Point-in-time copy of everything a view renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseSnapshot {
    pub expenses: Vec<Expense>,
    pub form: PendingEntryForm,
    pub phase: SyncPhase,
}

impl ExpenseSnapshot {
    pub fn total(&self) -> f64 {
        total_of(&self.expenses)
    }

    pub fn count(&self) -> usize {
        self.expenses.len()
    }
}

fn total_of(expenses: &[Expense]) -> f64 {
    expenses
        .iter()
        .fold(0.0, |total, expense| total + expense.amount)
}

#[derive(Default)]
struct ControllerState {
    expenses: Vec<Expense>,
    form: PendingEntryForm,
    applied_seq: u64,
    reload_attempted: bool,
}

impl ControllerState {
    fn phase(&self, reloading: bool) -> SyncPhase {
        if reloading {
            SyncPhase::Loading
        } else if self.reload_attempted {
            SyncPhase::Loaded
        } else {
            SyncPhase::Uninitialized
        }
    }
}

pub struct ExpenseListController {
    store: Arc<dyn ExpenseStore>,
    state: RwLock<ControllerState>,
    reload_seq: AtomicU64,
    reloads_in_flight: AtomicUsize,
    events: broadcast::Sender<ControllerEvent>,
}

/// Counts one outstanding reload; released on drop so a cancelled reload
/// does not leave the controller stuck in `Loading`.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ExpenseListController {
    pub fn new(store: Arc<dyn ExpenseStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            state: RwLock::new(ControllerState::default()),
            reload_seq: AtomicU64::new(0),
            reloads_in_flight: AtomicUsize::new(0),
            events,
        }
    }

    pub fn over_http(settings: &ClientSettings) -> Self {
        Self::new(Arc::new(HttpExpenseStore::new(settings)))
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub async fn initialize(&self) -> ReloadOutcome {
        info!("loading expenses");
        self.reload().await
    }

    /// Replaces the cached collection with the service's current one.
    ///
    /// Each call takes a sequence number before the request goes out; a
    /// response older than the last applied one is discarded, so overlapping
    /// reloads settle on the newest data regardless of arrival order. On
    /// failure the cached collection is left untouched.
    pub async fn reload(&self) -> ReloadOutcome {
        let seq = self.reload_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let in_flight = InFlight::enter(&self.reloads_in_flight);
        self.state.write().await.reload_attempted = true;

        let result = self.store.list().await;

        let mut state = self.state.write().await;
        match result {
            Ok(expenses) if seq > state.applied_seq => {
                state.applied_seq = seq;
                state.expenses = expenses;
                let count = state.expenses.len();
                let total = total_of(&state.expenses);
                drop(state);
                drop(in_flight);

                debug!(seq, count, total, "expense collection replaced");
                let _ = self
                    .events
                    .send(ControllerEvent::CollectionReplaced { count, total });
                ReloadOutcome::Applied
            }
            Ok(_) => {
                debug!(
                    seq,
                    applied_seq = state.applied_seq,
                    "discarding stale expense list"
                );
                ReloadOutcome::Stale
            }
            Err(failure) => {
                drop(state);
                drop(in_flight);
                self.report(&failure);
                ReloadOutcome::Failed
            }
        }
    }

    pub async fn update_field(&self, field: FormField, value: impl Into<String>) {
        self.state.write().await.form.set(field, value.into());
    }

    /// Creates an expense from the pending form. The form is reset only after
    /// the service accepted it, so a failed submit keeps the typed values.
    pub async fn submit(&self) -> SubmitOutcome {
        let draft = {
            let state = self.state.read().await;
            if !state.form.is_submittable() {
                return SubmitOutcome::Incomplete;
            }
            match state.form.to_new_expense() {
                Ok(draft) => draft,
                Err(err) => {
                    warn!(%err, "not submitting expense");
                    return SubmitOutcome::InvalidAmount;
                }
            }
        };

        if let Err(failure) = self.store.create(&draft).await {
            self.report(&failure);
            return SubmitOutcome::Failed;
        }

        self.state.write().await.form.reset();
        let _ = self.events.send(ControllerEvent::FormReset);
        SubmitOutcome::Created(self.reload().await)
    }

    /// Deletes `id`, then reloads whether or not the delete succeeded.
    pub async fn remove(&self, id: ExpenseId) -> RemoveOutcome {
        let deleted = match self.store.delete(id).await {
            Ok(()) => true,
            Err(failure) => {
                self.report(&failure);
                false
            }
        };
        RemoveOutcome {
            deleted,
            reload: self.reload().await,
        }
    }

    /// Replaces the fields of an existing expense. Leaves the pending form alone.
    pub async fn edit(&self, id: ExpenseId, draft: NewExpense) -> EditOutcome {
        match self.store.update(id, &draft).await {
            Ok(()) => EditOutcome::Updated(self.reload().await),
            Err(failure) => {
                self.report(&failure);
                EditOutcome::Failed
            }
        }
    }

    pub async fn total(&self) -> f64 {
        total_of(&self.state.read().await.expenses)
    }

    pub async fn count(&self) -> usize {
        self.state.read().await.expenses.len()
    }

    pub async fn expenses(&self) -> Vec<Expense> {
        self.state.read().await.expenses.clone()
    }

    pub async fn form(&self) -> PendingEntryForm {
        self.state.read().await.form.clone()
    }

    pub async fn phase(&self) -> SyncPhase {
        self.state.read().await.phase(self.is_reloading())
    }

    pub async fn snapshot(&self) -> ExpenseSnapshot {
        let state = self.state.read().await;
        ExpenseSnapshot {
            expenses: state.expenses.clone(),
            form: state.form.clone(),
            phase: state.phase(self.is_reloading()),
        }
    }

    fn is_reloading(&self) -> bool {
        self.reloads_in_flight.load(Ordering::SeqCst) > 0
    }

    fn report(&self, failure: &RemoteCallFailure) {
        error!(operation = %failure.operation, error = %failure, "remote call failed");
        let _ = self.events.send(ControllerEvent::RemoteCallFailed {
            operation: failure.operation,
            message: failure.to_string(),
        });
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
