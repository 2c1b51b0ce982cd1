pub mod csv;
pub mod human;
pub mod sarif;

use std::io::Write;

use anyhow::Result;
use linkwatch_core::CrawlResult;

pub fn write_json<W: Write>(result: &CrawlResult, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, result)?;
    Ok(())
}
