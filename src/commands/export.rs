use std::fs::File;

use anyhow::{Context, Result};

use linkwatch_core::CrawlResult;

use crate::cli::ExportFormat;
use crate::output::{csv, sarif};

pub fn run(input: &str, format: ExportFormat, output: &str) -> Result<()> {
    let raw = std::fs::read_to_string(input).with_context(|| format!("reading {input}"))?;
    let result: CrawlResult =
        serde_json::from_str(&raw).with_context(|| format!("parsing crawl result from {input}"))?;

    let out = File::create(output).with_context(|| format!("creating {output}"))?;
    match format {
        ExportFormat::Csv => csv::write_csv(&result, out)?,
        ExportFormat::Sarif => sarif::write_sarif(&result, out)?,
    }
    Ok(())
}
