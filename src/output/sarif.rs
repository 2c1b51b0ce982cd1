use anyhow::Result;
use linkwatch_core::{CrawlResult, LinkStatus};
use serde_json::{json, Value};

/// Build a minimal SARIF 2.1.0 log: one result per report that is either
/// non-`ok` or carries a staleness signal, so the file can be dropped
/// straight into a CI annotations step. SARIF is plain JSON under a
/// published schema, so this is built directly with `serde_json::json!`
/// rather than through a dedicated SARIF crate.
pub fn build_sarif(result: &CrawlResult) -> Value {
    let results: Vec<Value> = result
        .reports
        .iter()
        .filter(|r| !matches!(r.status, LinkStatus::Ok) || !r.outdated_signals.is_empty())
        .map(|report| {
            let level = match report.status {
                LinkStatus::ServerError | LinkStatus::Error => "error",
                LinkStatus::Broken => "error",
                LinkStatus::Redirect => "warning",
                LinkStatus::Ok | LinkStatus::Unknown => "note",
            };
            let mut message = report.status.to_string();
            if let Some(code) = report.status_code {
                message = format!("{message} ({code})");
            }
            for issue in &report.issues {
                message.push_str(&format!(" - {issue}"));
            }
            for signal in &report.outdated_signals {
                message.push_str(&format!(" - {signal}"));
            }

            json!({
                "ruleId": format!("link-health/{}", report.status),
                "level": level,
                "message": { "text": message },
                "locations": [{
                    "physicalLocation": {
                        "artifactLocation": { "uri": report.url }
                    }
                }]
            })
        })
        .collect();

    json!({
        "version": "2.1.0",
        "$schema": "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json",
        "runs": [{
            "tool": {
                "driver": {
                    "name": "linkwatch",
                    "informationUri": "https://example.invalid/linkwatch",
                    "rules": [
                        { "id": "link-health/broken" },
                        { "id": "link-health/server-error" },
                        { "id": "link-health/redirect" },
                        { "id": "link-health/error" },
                    ]
                }
            },
            "results": results
        }]
    })
}

pub fn write_sarif<W: std::io::Write>(result: &CrawlResult, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, &build_sarif(result))?;
    Ok(())
}
