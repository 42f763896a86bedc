//! Interactive chat command

use anyhow::Result;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input};
use unibot_conversation::{Assistant, ExportFormat, Session};

use crate::output;

/// A line typed at the chat prompt.
#[derive(Debug, PartialEq, Eq)]
enum ChatCommand {
    Exit,
    Help,
    History,
    Export(ExportFormat),
    Reset,
    Invalid(String),
    Message(String),
}

fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let mut parts = input.split_whitespace();
    let head = parts.next().unwrap_or_default().to_lowercase();

    let command = match head.as_str() {
        "exit" | "quit" | "/exit" | "/quit" => ChatCommand::Exit,
        "/help" => ChatCommand::Help,
        "/history" => ChatCommand::History,
        "/reset" => ChatCommand::Reset,
        "/export" => match parts.next().map(str::parse::<ExportFormat>) {
            None => ChatCommand::Export(ExportFormat::Json),
            Some(Ok(format)) => ChatCommand::Export(format),
            Some(Err(e)) => ChatCommand::Invalid(e),
        },
        _ => ChatCommand::Message(input.to_string()),
    };
    Some(command)
}

pub fn run(assistant: &Assistant) -> Result<()> {
    let mut session = assistant.new_session();

    println!("{} new chat session...", "Starting".green());
    println!("Session ID: {}", session.id().to_string().cyan());
    output::dimmed("Type 'exit' or 'quit' to end the session.");
    output::dimmed("Type '/help' for available commands.");
    println!();

    loop {
        let input: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("You")
            .allow_empty(true)
            .interact_text()?;

        let Some(command) = parse_command(&input) else {
            continue;
        };

        match command {
            ChatCommand::Exit => {
                println!("{}", "Görüşürüz! Goodbye!".green());
                break;
            }
            ChatCommand::Help => print_help(),
            ChatCommand::History => show_history(&session)?,
            ChatCommand::Export(format) => export_session(&session, format)?,
            ChatCommand::Reset => {
                session.reset();
                output::success("Conversation context cleared");
            }
            ChatCommand::Invalid(e) => output::warning(&e),
            ChatCommand::Message(text) => output::reply(&session.handle_turn(&text)),
        }
    }

    Ok(())
}

fn print_help() {
    println!();
    println!("{}", "Available Commands:".yellow().bold());
    println!("  {}        - End the chat session", "exit, quit".cyan());
    println!("  {}             - Show this help message", "/help".cyan());
    println!("  {}          - Show conversation history", "/history".cyan());
    println!("  {}   - Export history to a file (json, md, txt)", "/export [fmt]".cyan());
    println!("  {}            - Forget the conversation so far", "/reset".cyan());
    println!();
}

fn show_history(session: &Session) -> Result<()> {
    if session.context().is_empty() {
        output::dimmed("No history yet.");
        return Ok(());
    }

    println!();
    println!("{}", session.export_history(ExportFormat::Text)?);
    Ok(())
}

fn export_session(session: &Session, format: ExportFormat) -> Result<()> {
    let rendered = session.export_history(format)?;
    let filename = format!("unibot_{}.{}", session.id(), extension(format));
    std::fs::write(&filename, rendered)?;

    println!("{} conversation to {}", "Exported".green(), filename.cyan());
    Ok(())
}

fn extension(format: ExportFormat) -> &'static str {
    match format {
        ExportFormat::Json => "json",
        ExportFormat::Markdown => "md",
        ExportFormat::Text => "txt",
    }
}
