//! `report` subcommand -- one-off compliance report from a scan file.

use std::path::Path;

use anyhow::Result;

use benchwatch_core::config::BenchwatchConfig;
use benchwatch_core::types::ProfileSummary;
use benchwatch_ingest::report::WrittenReports;
use benchwatch_ingest::{
    Classifier, IngestConfig, ScanDocument, parse_document_bytes, summarize_document,
    write_reports,
};

/// Report generation result.
#[derive(Debug)]
pub struct ReportRun {
    pub summary: ProfileSummary,
    pub written: WrittenReports,
}

/// Read `input`, summarize every profile into one report and write it to `output_dir`.
///
/// Classification follows the `[classifier]` section of `config`.
///
/// # Errors
///
/// - The input cannot be read
/// - The input is not a scan result document (including score summaries)
/// - The reports cannot be written
pub async fn generate_report(
    config: &BenchwatchConfig,
    input: &Path,
    output_dir: &Path,
) -> Result<ReportRun> {
    let content = tokio::fs::read(input)
        .await
        .map_err(|e| anyhow::anyhow!("failed to read {}: {}", input.display(), e))?;

    let doc = match parse_document_bytes(&content, &input.display().to_string())? {
        ScanDocument::Profiles(doc) => doc,
        ScanDocument::ScoreSummary(_) => {
            return Err(anyhow::anyhow!(
                "{} is already a compliance summary, expected scan results",
                input.display()
            ));
        }
    };

    let classifier = Classifier::from_config(&IngestConfig::from_core(config));
    let report = summarize_document(&doc, &classifier);
    for e in &report.rejected {
        tracing::warn!(error = %e, "control skipped");
    }

    let written = write_reports(output_dir, &report.summary, chrono::Utc::now()).await?;

    Ok(ReportRun {
        summary: report.summary,
        written,
    })
}

/// Human-readable lines printed after a report run.
pub fn summary_lines(run: &ReportRun) -> Vec<String> {
    let s = &run.summary;
    vec![
        format!("Compliance Score: {}%", s.score_percent),
        format!("Passed: {}/{}", s.passed, s.total),
        format!("Failed: {}", s.failed),
        format!("Markdown report saved to: {}", run.written.markdown.display()),
        format!("JSON summary saved to: {}", run.written.json.display()),
    ]
}
