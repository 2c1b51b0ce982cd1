use std::io::Write;

use anyhow::Result;
use csv::Writer;
use linkwatch_core::CrawlResult;

const HEADER: &[&str] = &[
    "url",
    "status",
    "status_code",
    "redirected_to",
    "referrers",
    "issues",
    "outdated_signals",
    "content_type",
    "links_found",
];

/// One row per `LinkReport`; list-valued fields (`referrers`, `issues`,
/// `outdated_signals`, `links_found`) are joined with `; ` so the file stays
/// one row per URL instead of exploding into a join table.
pub fn write_csv<W: Write>(result: &CrawlResult, writer: W) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(HEADER)?;

    for report in &result.reports {
        wtr.write_record([
            report.url.as_str(),
            report.status.as_str(),
            &report
                .status_code
                .map(|c| c.to_string())
                .unwrap_or_default(),
            report.redirected_to.as_deref().unwrap_or(""),
            &report.referrers.join("; "),
            &report.issues.join("; "),
            &report.outdated_signals.join("; "),
            report.content_type.as_deref().unwrap_or(""),
            &report.links_found.join("; "),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
