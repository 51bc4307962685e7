//! Client side of the expense tracker: a controller that keeps local view
//! state in step with the remote expense store.

pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod store;

pub use config::{ClientSettings, SettingsError};
pub use controller::{
    ControllerEvent, EditOutcome, ExpenseListController, ExpenseSnapshot, ReloadOutcome,
    RemoveOutcome, SubmitOutcome, SyncPhase,
};
pub use error::{FailureCause, RemoteCallFailure, RemoteOperation};
pub use form::{FormField, InvalidAmount, PendingEntryForm, UnknownField};
pub use store::{ExpenseStore, HttpExpenseStore};
