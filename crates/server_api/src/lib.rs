use shared::{
    domain::{Category, Expense, ExpenseId},
    error::{ApiError, ErrorCode},
    protocol::{DeleteAck, NewExpense},
};
use storage::{Storage, StoredExpense};
use tracing::info;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn list_expenses(ctx: &ApiContext) -> Result<Vec<Expense>, ApiError> {
    let expenses = ctx.storage.list_expenses().await.map_err(internal)?;
    Ok(expenses.into_iter().map(to_expense).collect())
}

pub async fn create_expense(ctx: &ApiContext, req: NewExpense) -> Result<Expense, ApiError> {
    validate(&req)?;
    let title = req.title.trim();
    let id = ctx
        .storage
        .insert_expense(title, req.amount, req.category.as_str())
        .await
        .map_err(internal)?;
    info!(expense_id = id.0, category = %req.category, "expense created");
    Ok(Expense {
        id,
        title: title.to_string(),
        amount: req.amount,
        category: req.category,
    })
}

pub async fn update_expense(
    ctx: &ApiContext,
    id: ExpenseId,
    req: NewExpense,
) -> Result<Expense, ApiError> {
    validate(&req)?;
    let title = req.title.trim();
    let updated = ctx
        .storage
        .update_expense(id, title, req.amount, req.category.as_str())
        .await
        .map_err(internal)?;
    if !updated {
        return Err(not_found(id));
    }
    let stored = ctx
        .storage
        .get_expense(id)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found(id))?;
    info!(expense_id = id.0, "expense updated");
    Ok(to_expense(stored))
}

pub async fn delete_expense(ctx: &ApiContext, id: ExpenseId) -> Result<DeleteAck, ApiError> {
    let deleted = ctx.storage.delete_expense(id).await.map_err(internal)?;
    if !deleted {
        return Err(not_found(id));
    }
    info!(expense_id = id.0, "expense deleted");
    Ok(DeleteAck::deleted())
}

fn validate(req: &NewExpense) -> Result<(), ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::new(ErrorCode::Validation, "title must not be empty"));
    }
    if !req.amount.is_finite() {
        return Err(ApiError::new(
            ErrorCode::Validation,
            "amount must be a finite number",
        ));
    }
    if req.category.as_str().trim().is_empty() {
        return Err(ApiError::new(
            ErrorCode::Validation,
            "category must not be empty",
        ));
    }
    Ok(())
}

fn to_expense(stored: StoredExpense) -> Expense {
    Expense {
        id: stored.id,
        title: stored.title,
        amount: stored.amount,
        category: Category::from(stored.category),
    }
}

fn not_found(id: ExpenseId) -> ApiError {
    ApiError::new(ErrorCode::NotFound, format!("expense {id} not found"))
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> ApiContext {
        let storage = Storage::new("sqlite::memory:").await.expect("db");
        ApiContext { storage }
    }

    fn draft(title: &str, amount: f64, category: &str) -> NewExpense {
        NewExpense {
            title: title.to_string(),
            amount,
            category: Category::from(category),
        }
    }

    #[tokio::test]
    async fn created_expense_is_listed_with_assigned_id() {
        let ctx = setup().await;
        let created = create_expense(&ctx, draft("Coffee", 4.5, "Food"))
            .await
            .expect("create");
        assert!(created.id.0 > 0);

        let listed = list_expenses(&ctx).await.expect("list");
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let ctx = setup().await;
        let err = create_expense(&ctx, draft("   ", 1.0, "Food"))
            .await
            .expect_err("should fail");
        assert!(matches!(err.code, ErrorCode::Validation));
        assert!(list_expenses(&ctx).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn non_finite_amount_is_rejected() {
        let ctx = setup().await;
        let err = create_expense(&ctx, draft("Lunch", f64::NAN, "Food"))
            .await
            .expect_err("should fail");
        assert!(matches!(err.code, ErrorCode::Validation));
    }

    #[tokio::test]
    async fn unknown_categories_round_trip_through_storage() {
        let ctx = setup().await;
        create_expense(&ctx, draft("Flowers", 9.0, "Gifts"))
            .await
            .expect("create");
        let listed = list_expenses(&ctx).await.expect("list");
        assert_eq!(listed[0].category, Category::Other("Gifts".into()));
    }

    #[tokio::test]
    async fn update_replaces_fields() {
        let ctx = setup().await;
        let created = create_expense(&ctx, draft("Lunch", 12.0, "Food"))
            .await
            .expect("create");
        let updated = update_expense(&ctx, created.id, draft("Taxi", 30.0, "Travel"))
            .await
            .expect("update");
        assert_eq!(updated.category, Category::Travel);

        let listed = list_expenses(&ctx).await.expect("list");
        assert_eq!(listed[0].title, "Taxi");
        assert_eq!(listed[0].amount, 30.0);
    }

    #[tokio::test]
    async fn update_returns_the_stored_row() {
        let ctx = setup().await;
        let created = create_expense(&ctx, draft("Lunch", 12.0, "Food"))
            .await
            .expect("create");
        let updated = update_expense(&ctx, created.id, draft("  Taxi  ", 30.0, "travel"))
            .await
            .expect("update");

        let listed = list_expenses(&ctx).await.expect("list");
        assert_eq!(listed, vec![updated.clone()]);
        assert_eq!(updated.title, "Taxi");
        assert_eq!(updated.category.as_str(), "travel");
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let ctx = setup().await;
        let err = delete_expense(&ctx, ExpenseId(7))
            .await
            .expect_err("should fail");
        assert!(matches!(err.code, ErrorCode::NotFound));

        let err = update_expense(&ctx, ExpenseId(7), draft("x", 1.0, "Food"))
            .await
            .expect_err("should fail");
        assert!(matches!(err.code, ErrorCode::NotFound));
    }

    #[tokio::test]
    async fn delete_acknowledges_and_removes() {
        let ctx = setup().await;
        let created = create_expense(&ctx, draft("Bus", 2.0, "Travel"))
            .await
            .expect("create");
        let ack = delete_expense(&ctx, created.id).await.expect("delete");
        assert_eq!(ack, DeleteAck::deleted());
        assert!(list_expenses(&ctx).await.expect("list").is_empty());
    }
}
