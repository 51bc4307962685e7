use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{
    ClientSettings, ExpenseListController, FormField, InvalidAmount, PendingEntryForm,
};
use shared::{domain::ExpenseId, protocol::NewExpense};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod shell;
mod view;

#[derive(Parser, Debug)]
#[command(name = "expenses", about = "Track spending against an expense store service")]
struct Cli {
    /// TOML file with a `base_url` key (defaults to ./expenses.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Address of the expense store, e.g. http://127.0.0.1:8000
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show all expenses with the running total.
    List,
    /// Add an expense.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        amount: String,
        #[arg(long, default_value = "Food")]
        category: String,
    },
    /// Delete an expense by id.
    Remove { id: i64 },
    /// Replace the fields of an existing expense.
    Edit {
        id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        amount: String,
        #[arg(long, default_value = "Food")]
        category: String,
    },
    /// Interactive session over stdin.
    Shell,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let cli = Cli::parse();

    let settings = ClientSettings::load(cli.config.as_deref(), cli.base_url.as_deref())?;
    info!(base_url = %settings.base_url, "using expense store");
    let controller = ExpenseListController::over_http(&settings);

    match cli.command {
        Command::List => {
            controller.initialize().await;
            print!("{}", view::render_expenses(&controller.snapshot().await));
        }
        Command::Add {
            title,
            amount,
            category,
        } => {
            controller.update_field(FormField::Title, title).await;
            controller.update_field(FormField::Amount, amount).await;
            controller.update_field(FormField::Category, category).await;
            let outcome = controller.submit().await;
            println!("{}", view::describe_submit(outcome));
            print!("{}", view::render_expenses(&controller.snapshot().await));
        }
        Command::Remove { id } => {
            let outcome = controller.remove(ExpenseId(id)).await;
            println!("{}", view::describe_remove(ExpenseId(id), outcome));
            print!("{}", view::render_expenses(&controller.snapshot().await));
        }
        Command::Edit {
            id,
            title,
            amount,
            category,
        } => {
            let draft = edit_draft(title, amount, category)?;
            let outcome = controller.edit(ExpenseId(id), draft).await;
            println!("{}", view::describe_edit(ExpenseId(id), outcome));
            print!("{}", view::render_expenses(&controller.snapshot().await));
        }
        Command::Shell => {
            controller.initialize().await;
            shell::run(&controller).await?;
        }
    }

    Ok(())
}

/// Edits go through the same amount parsing as form submissions.
fn edit_draft(
    title: String,
    amount: String,
    category: String,
) -> Result<NewExpense, InvalidAmount> {
    PendingEntryForm {
        title,
        amount,
        category,
    }
    .to_new_expense()
}
