//! Single question command

use anyhow::{Context, Result};
use unibot_conversation::Assistant;

use crate::output::{self, OutputFormat};

pub fn run(assistant: &Assistant, message: &str, format: OutputFormat) -> Result<()> {
    let mut session = assistant.new_session();
    let reply = session.ask(message).context("Failed to answer the question")?;

    match format {
        OutputFormat::Json | OutputFormat::Yaml => {
            println!("{}", output::format_structured(&reply, format)?)
        }
        OutputFormat::Text => {
            println!("{}", reply.response);
            output::dimmed(&format!("[intent: {}]", reply.intent));
        }
    }

    Ok(())
}
