use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::domain::ExpenseId;

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredExpense {
    pub id: ExpenseId,
    pub title: String,
    pub amount: f64,
    pub category: String,
}

impl StoredExpense {
    fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            id: ExpenseId(row.try_get("id")?),
            title: row.try_get("title")?,
            amount: row.try_get("amount")?,
            category: row.try_get("category")?,
        })
    }
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn insert_expense(
        &self,
        title: &str,
        amount: f64,
        category: &str,
    ) -> Result<ExpenseId> {
        let rec = sqlx::query(
            "INSERT INTO expenses (title, amount, category) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(title)
        .bind(amount)
        .bind(category)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert expense")?;
        Ok(ExpenseId(rec.get::<i64, _>(0)))
    }

    pub async fn list_expenses(&self) -> Result<Vec<StoredExpense>> {
        let rows = sqlx::query("SELECT id, title, amount, category FROM expenses ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .context("failed to list expenses")?;
        rows.iter().map(StoredExpense::from_row).collect()
    }

    pub async fn get_expense(&self, id: ExpenseId) -> Result<Option<StoredExpense>> {
        let row = sqlx::query("SELECT id, title, amount, category FROM expenses WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .context("failed to load expense")?;
        row.as_ref().map(StoredExpense::from_row).transpose()
    }

    /// Returns `false` when no expense with `id` exists.
    pub async fn update_expense(
        &self,
        id: ExpenseId,
        title: &str,
        amount: f64,
        category: &str,
    ) -> Result<bool> {
        let updated = sqlx::query(
            "UPDATE expenses SET title = ?, amount = ?, category = ? WHERE id = ?",
        )
        .bind(title)
        .bind(amount)
        .bind(category)
        .bind(id.0)
        .execute(&self.pool)
        .await
        .context("failed to update expense")?
        .rows_affected();
        Ok(updated > 0)
    }

    /// Returns `false` when no expense with `id` exists.
    pub async fn delete_expense(&self, id: ExpenseId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .context("failed to delete expense")?;
        Ok(result.rows_affected() > 0)
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
