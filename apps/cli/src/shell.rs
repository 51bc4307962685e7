//! Line-oriented interactive session: the form is edited field by field,
//! then submitted, the same way a page would drive the controller.

use anyhow::Result;
use client_core::{ControllerEvent, ExpenseListController, FormField};
use shared::domain::ExpenseId;
use tokio::{
    io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader},
    sync::broadcast,
};

use crate::view;

const HELP: &str = "\
commands:
  title <text>       set the pending title
  amount <number>    set the pending amount
  category <name>    set the pending category
  form               show the pending entry
  add                submit the pending entry
  rm <id>            delete an expense
  reload             fetch the list again
  show               print the list
  help               this text
  quit               leave";

#[derive(Debug, Clone, PartialEq, Eq)]
enum ShellCommand {
    Set(FormField, String),
    ShowForm,
    Submit,
    Remove(ExpenseId),
    Reload,
    Show,
    Help,
    Quit,
    Nothing,
}

fn parse_line(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "" => Ok(ShellCommand::Nothing),
        "title" | "amount" | "category" => {
            let field = word.parse::<FormField>().map_err(|err| err.to_string())?;
            Ok(ShellCommand::Set(field, rest.to_string()))
        }
        "form" => Ok(ShellCommand::ShowForm),
        "add" | "submit" => Ok(ShellCommand::Submit),
        "rm" | "remove" | "delete" => rest
            .parse::<i64>()
            .map(|id| ShellCommand::Remove(ExpenseId(id)))
            .map_err(|_| format!("expected an expense id, got {rest:?}")),
        "reload" => Ok(ShellCommand::Reload),
        "show" | "ls" | "list" => Ok(ShellCommand::Show),
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" => Ok(ShellCommand::Quit),
        other => Err(format!("unknown command {other:?}; try `help`")),
    }
}

pub async fn run(controller: &ExpenseListController) -> Result<()> {
    let mut events = controller.subscribe_events();
    let mut stdout = io::stdout();
    let mut lines = BufReader::new(io::stdin()).lines();

    let mut out = format!("{}\n", view::render_expenses(&controller.snapshot().await));
    loop {
        out.push_str("> ");
        stdout.write_all(out.as_bytes()).await?;
        stdout.flush().await?;
        out.clear();

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match parse_line(&line) {
            Ok(command) => command,
            Err(message) => {
                out.push_str(&message);
                out.push('\n');
                continue;
            }
        };

        match command {
            ShellCommand::Nothing => {}
            ShellCommand::Quit => break,
            ShellCommand::Help => {
                out.push_str(HELP);
                out.push('\n');
            }
            ShellCommand::Set(field, value) => {
                controller.update_field(field, value).await;
                out.push_str(&view::render_form(&controller.form().await));
                out.push('\n');
            }
            ShellCommand::ShowForm => {
                out.push_str(&view::render_form(&controller.form().await));
                out.push('\n');
            }
            ShellCommand::Submit => {
                let outcome = controller.submit().await;
                out.push_str(&view::describe_submit(outcome));
                out.push('\n');
                out.push_str(&view::render_expenses(&controller.snapshot().await));
            }
            ShellCommand::Remove(id) => {
                let outcome = controller.remove(id).await;
                out.push_str(&view::describe_remove(id, outcome));
                out.push('\n');
                out.push_str(&view::render_expenses(&controller.snapshot().await));
            }
            ShellCommand::Reload => {
                controller.reload().await;
                out.push_str(&view::render_expenses(&controller.snapshot().await));
            }
            ShellCommand::Show => {
                out.push_str(&view::render_expenses(&controller.snapshot().await));
            }
        }

        for notice in drain_failures(&mut events) {
            out.push_str(&notice);
            out.push('\n');
        }
    }

    Ok(())
}

fn drain_failures(events: &mut broadcast::Receiver<ControllerEvent>) -> Vec<String> {
    let mut notices = Vec::new();
    loop {
        match events.try_recv() {
            Ok(ControllerEvent::RemoteCallFailed { message, .. }) => {
                notices.push(format!("! {message}"));
            }
            Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => {}
            Err(_) => return notices,
        }
    }
}
