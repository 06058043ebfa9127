// check.rs — `aim check`: run the phrase policy over generated text.

use std::io::Read;
use std::path::Path;

use aim_policy::{check_output, DragMode, PhraseVerdict};
use anyhow::Context;

pub fn execute(mode: &str, file: Option<&Path>, text: Option<&str>) -> anyhow::Result<()> {
    let mode: DragMode = mode.parse()?;
    let text = read_text(file, text)?;

    match check_output(&text, mode) {
        PhraseVerdict::Accepted => {
            println!("OK: no prescriptive language for {} mode.", mode);
            Ok(())
        }
        PhraseVerdict::Rejected { phrase, reason } => {
            tracing::warn!(drag_mode = %mode, phrase = %phrase, "prescriptive language detected");
            println!("{}", reason);
            anyhow::bail!("Phrase policy violated")
        }
    }
}

/// Text from `--file`, the positional argument, or stdin, in that order.
fn read_text(file: Option<&Path>, text: Option<&str>) -> anyhow::Result<String> {
    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }
    if let Some(text) = text {
        return Ok(text.to_string());
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read text from stdin")?;
    Ok(buf)
}
