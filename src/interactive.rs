use std::io::{self, Write};

use anyhow::{Context, Result};

/// Prompt on stdin for a starting URL when none was given on the command
/// line. Plain `std::io` rather than a raw-terminal menu — this tool runs
/// just as often piped into CI logs as it does at an interactive shell.
pub fn prompt_for_start_url() -> Result<String> {
    print!("Start URL to crawl: ");
    io::stdout().flush().context("flushing prompt to stdout")?;

    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("reading start URL from stdin")?;

    let trimmed = line.trim();
    if trimmed.is_empty() {
        anyhow::bail!("no start URL given");
    }
    Ok(trimmed.to_string())
}
