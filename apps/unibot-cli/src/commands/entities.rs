//! Entity inspection command

use anyhow::{Context, Result};
use unibot_conversation::{Assistant, ConversationContext};

use crate::output;

/// Prints the parse of `message` and the entities resolved from it.
pub fn run(assistant: &Assistant, message: &str) -> Result<()> {
    let extractor = assistant.extractor();
    let utterance = extractor
        .analyze(message)
        .context("Failed to analyze the message")?;

    output::key_value("Language", &utterance.language);

    if !utterance.doc.entities.is_empty() {
        output::section("Spans");
        for span in &utterance.doc.entities {
            println!("  {} {}", span.label, span.text);
        }
    }

    if !utterance.keywords.is_empty() {
        output::section("Keywords");
        for hit in &utterance.keywords {
            println!("  {:?} {}", hit.category, hit.text);
        }
    }

    let entities = extractor.extract(message, &ConversationContext::default())?;
    output::section("Entities");
    println!("{}", serde_json::to_string_pretty(&entities)?);

    Ok(())
}
