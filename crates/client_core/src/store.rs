use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use shared::{
    domain::{Expense, ExpenseId},
    protocol::NewExpense,
};
use tracing::debug;
use url::Url;

use crate::{
    config::ClientSettings,
    error::{RemoteCallFailure, RemoteOperation},
};

/// The remote, authoritative expense collection.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Expense>, RemoteCallFailure>;
    async fn create(&self, expense: &NewExpense) -> Result<(), RemoteCallFailure>;
    async fn update(&self, id: ExpenseId, expense: &NewExpense) -> Result<(), RemoteCallFailure>;
    async fn delete(&self, id: ExpenseId) -> Result<(), RemoteCallFailure>;
}

pub struct HttpExpenseStore {
    http: Client,
    base_url: Url,
}

impl HttpExpenseStore {
    pub fn new(settings: &ClientSettings) -> Self {
        Self::with_client(Client::new(), settings)
    }

    /// `settings` only ever carries an http(s) base, so every endpoint
    /// below can be joined onto its path.
    pub fn with_client(http: Client, settings: &ClientSettings) -> Self {
        Self {
            http,
            base_url: settings.base_url.clone(),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(
        &self,
        operation: RemoteOperation,
        request: RequestBuilder,
    ) -> Result<Response, RemoteCallFailure> {
        request
            .send()
            .await
            .and_then(Response::error_for_status)
            .map_err(|err| RemoteCallFailure::new(operation, err))
    }
}

#[async_trait]
impl ExpenseStore for HttpExpenseStore {
    async fn list(&self) -> Result<Vec<Expense>, RemoteCallFailure> {
        let op = RemoteOperation::List;
        let res = self.send(op, self.http.get(self.endpoint(&["expenses"]))).await?;
        let body = res
            .bytes()
            .await
            .map_err(|err| RemoteCallFailure::new(op, err))?;
        let expenses: Vec<Expense> =
            serde_json::from_slice(&body).map_err(|err| RemoteCallFailure::new(op, err))?;
        debug!(count = expenses.len(), "fetched expenses");
        Ok(expenses)
    }

    async fn create(&self, expense: &NewExpense) -> Result<(), RemoteCallFailure> {
        self.send(
            RemoteOperation::Create,
            self.http.post(self.endpoint(&["expenses"])).json(expense),
        )
        .await?;
        debug!(title = %expense.title, "created expense");
        Ok(())
    }

    async fn update(&self, id: ExpenseId, expense: &NewExpense) -> Result<(), RemoteCallFailure> {
        let id_segment = id.to_string();
        self.send(
            RemoteOperation::Update,
            self.http
                .put(self.endpoint(&["expenses", id_segment.as_str()]))
                .json(expense),
        )
        .await?;
        debug!(expense_id = id.0, "updated expense");
        Ok(())
    }

    async fn delete(&self, id: ExpenseId) -> Result<(), RemoteCallFailure> {
        let id_segment = id.to_string();
        self.send(
            RemoteOperation::Delete,
            self.http.delete(self.endpoint(&["expenses", id_segment.as_str()])),
        )
        .await?;
        debug!(expense_id = id.0, "deleted expense");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
