//! 컴플라이언스 리포트 렌더링
//!
//! [`ProfileSummary`]에서 사람이 읽는 Markdown 리포트와 기계가 읽는 JSON 요약을 만듭니다.
//!
//! 리포트는 문서 전체를 하나의 요약으로 합칩니다. 모든 프로파일의 컨트롤을 입력 순서대로
//! 이어 붙이고, 이름은 첫 번째 프로파일을 따릅니다 (없으면 `"Unknown"`).
//!
//! JSON 요약은 보통 감시 디렉토리에 함께 떨어지므로 파서가 `compliance_score` 키로
//! 알아보고 게이지 발행 없이 건너뜁니다.

use std::fmt::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use benchwatch_core::types::{ControlRecord, ControlStatus, ProfileSummary};

use crate::aggregator::aggregate;
use crate::classifier::Classifier;
use crate::document::RawScanDocument;
use crate::error::ScanIngestError;

/// Markdown 리포트 파일 이름
pub const REPORT_FILE_NAME: &str = "compliance_report.md";

/// JSON 요약 파일 이름
pub const SUMMARY_FILE_NAME: &str = "compliance_summary.json";

/// 프로파일이 없는 문서의 요약 이름
pub const UNKNOWN_PROFILE: &str = "Unknown";

/// 기계가 읽는 컴플라이언스 요약
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplianceSummary {
    #[serde(default)]
    pub compliance_score: f64,
    #[serde(default)]
    pub total_controls: usize,
    #[serde(default)]
    pub passed: usize,
    #[serde(default)]
    pub failed: usize,
    #[serde(default)]
    pub skipped: usize,
    /// 생성 시각 (RFC 3339)
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub profile: String,
    #[serde(default)]
    pub failed_control_ids: Vec<String>,
}

impl ComplianceSummary {
    pub fn from_summary(summary: &ProfileSummary, generated_at: DateTime<Utc>) -> Self {
        Self {
            compliance_score: summary.score_percent,
            total_controls: summary.total,
            passed: summary.passed,
            failed: summary.failed,
            skipped: summary.skipped,
            timestamp: generated_at.to_rfc3339(),
            profile: summary.profile_name.clone(),
            failed_control_ids: summary
                .failed_control_ids()
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

/// 점수 구간
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplianceBand {
    /// 90% 이상
    Compliant,
    /// 70% 이상 90% 미만
    PartiallyCompliant,
    /// 70% 미만
    NonCompliant,
}

impl ComplianceBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::Compliant
        } else if score >= 70.0 {
            Self::PartiallyCompliant
        } else {
            Self::NonCompliant
        }
    }

    fn status_line(&self) -> &'static str {
        match self {
            Self::Compliant => "🟢 **Status: COMPLIANT** (≥90%)",
            Self::PartiallyCompliant => "🟡 **Status: PARTIALLY COMPLIANT** (70-89%)",
            Self::NonCompliant => "🔴 **Status: NON-COMPLIANT** (<70%)",
        }
    }
}

/// 문서 전체 요약 결과
#[derive(Debug)]
pub struct DocumentReport {
    pub summary: ProfileSummary,
    /// 분류에서 제외된 컨트롤
    pub rejected: Vec<ScanIngestError>,
}

/// 문서의 모든 프로파일을 하나의 요약으로 합칩니다.
pub fn summarize_document(doc: &RawScanDocument, classifier: &Classifier) -> DocumentReport {
    let name = doc
        .profiles
        .first()
        .and_then(|p| p.name.clone())
        .unwrap_or_else(|| UNKNOWN_PROFILE.to_owned());

    let mut records = Vec::new();
    let mut rejected = Vec::new();
    for profile in &doc.profiles {
        let classified = classifier.classify_profile(profile);
        records.extend(classified.records);
        rejected.extend(classified.rejected);
    }

    DocumentReport {
        summary: aggregate(name, records),
        rejected,
    }
}

/// Markdown 리포트를 렌더링합니다.
pub fn render_markdown(summary: &ProfileSummary, generated_at: DateTime<Utc>) -> String {
    let mut out = String::with_capacity(4096);
    // String에 대한 fmt::Write는 실패하지 않음
    let _ = write_markdown(&mut out, summary, generated_at);
    out
}

fn write_markdown(
    out: &mut impl Write,
    summary: &ProfileSummary,
    generated_at: DateTime<Utc>,
) -> fmt::Result {
    writeln!(out, "# CIS Benchmark Compliance Report\n")?;
    writeln!(out, "**Generated:** {}  ", generated_at.to_rfc3339())?;
    writeln!(out, "**Profile:** {}\n", summary.profile_name)?;

    writeln!(out, "## Executive Summary\n")?;
    writeln!(out, "| Metric | Value |\n|--------|-------|")?;
    writeln!(
        out,
        "| **Compliance Score** | **{}%** |",
        decimal(summary.score_percent)
    )?;
    writeln!(out, "| Total Controls | {} |", summary.total)?;
    writeln!(out, "| ✅ Passed | {} |", summary.passed)?;
    writeln!(out, "| ❌ Failed | {} |", summary.failed)?;
    writeln!(out, "| ⚠️ Skipped | {} |\n", summary.skipped)?;

    writeln!(out, "## Compliance Status\n")?;
    writeln!(
        out,
        "{}\n",
        ComplianceBand::from_score(summary.score_percent).status_line()
    )?;

    let failed: Vec<_> = summary.controls_with_status(ControlStatus::Failed).collect();
    if !failed.is_empty() {
        writeln!(out, "## ❌ Failed Controls (Requires Attention)\n")?;
        for control in failed {
            write_failed_control(out, control)?;
        }
    }

    write_control_table(
        out,
        "✅ Passed Controls",
        summary.controls_with_status(ControlStatus::Passed),
    )?;
    write_control_table(
        out,
        "⚠️ Skipped Controls",
        summary.controls_with_status(ControlStatus::Skipped),
    )?;

    writeln!(out, "## Recommendations\n")?;
    writeln!(
        out,
        "1. **Address Failed Controls:** Prioritize remediation of failed controls based on impact level."
    )?;
    writeln!(
        out,
        "2. **Review Skipped Controls:** Investigate why controls were skipped and enable them if applicable."
    )?;
    writeln!(
        out,
        "3. **Continuous Monitoring:** Schedule regular compliance scans to maintain compliance posture.\n"
    )?;
    writeln!(out, "---")?;
    writeln!(out, "*This report was generated automatically by benchwatch.*")
}

fn write_failed_control(out: &mut impl Write, control: &ControlRecord) -> fmt::Result {
    writeln!(out, "### {}: {}", control.id, control.title)?;
    writeln!(out, "**Impact:** {}\n", decimal(control.impact))?;

    for result in control
        .results
        .iter()
        .filter(|r| r.status.as_deref() == Some("failed"))
    {
        writeln!(
            out,
            "- **Message:** {}",
            result.message.as_deref().unwrap_or("No message")
        )?;
        if let Some(desc) = &result.code_desc {
            writeln!(out, "- **Check:** `{desc}`")?;
        }
    }
    writeln!(out)
}

fn write_control_table<'a>(
    out: &mut impl Write,
    heading: &str,
    controls: impl Iterator<Item = &'a ControlRecord>,
) -> fmt::Result {
    let rows: Vec<_> = controls.collect();
    if rows.is_empty() {
        return Ok(());
    }

    writeln!(out, "## {heading} ({})\n", rows.len())?;
    writeln!(out, "| Control ID | Title |\n|------------|-------|")?;
    for control in rows {
        writeln!(out, "| {} | {} |", control.id, control.title)?;
    }
    writeln!(out)
}

/// 정수 값도 `80.0`처럼 소수점 한 자리를 남깁니다.
fn decimal(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// 작성된 리포트 파일 경로
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenReports {
    pub markdown: PathBuf,
    pub json: PathBuf,
}

/// 리포트 두 개를 `dir`에 씁니다. 디렉토리가 없으면 생성합니다.
///
/// # Errors
///
/// 디렉토리 생성이나 파일 쓰기 실패 시 `ScanIngestError::Io`
pub async fn write_reports(
    dir: &Path,
    summary: &ProfileSummary,
    generated_at: DateTime<Utc>,
) -> Result<WrittenReports, ScanIngestError> {
    let io_err = |path: &Path| {
        let path = path.display().to_string();
        move |source| ScanIngestError::Io { path, source }
    };

    tokio::fs::create_dir_all(dir).await.map_err(io_err(dir))?;

    let markdown = dir.join(REPORT_FILE_NAME);
    tokio::fs::write(&markdown, render_markdown(summary, generated_at))
        .await
        .map_err(io_err(&markdown))?;

    let json = dir.join(SUMMARY_FILE_NAME);
    let body = serde_json::to_string_pretty(&ComplianceSummary::from_summary(summary, generated_at))
        .map_err(|e| ScanIngestError::Io {
            path: json.display().to_string(),
            source: std::io::Error::other(e),
        })?;
    tokio::fs::write(&json, body).await.map_err(io_err(&json))?;

    info!(
        markdown = %markdown.display(),
        json = %json.display(),
        score = summary.score_percent,
        "compliance reports written"
    );

    Ok(WrittenReports { markdown, json })
}
