//! benchwatch 스캔 결과 수집 파이프라인
//!
//! 벤치마크 스캔 도구가 남긴 JSON 결과를 읽어 컨트롤을 분류하고, 프로파일 단위로
//! 집계한 뒤 Prometheus 게이지로 발행합니다. 같은 요약으로 Markdown/JSON 리포트도 만듭니다.
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`ScanIngestError`)
//! - [`config`]: Pipeline configuration (`IngestConfig`, builder)
//! - [`document`]: Lenient scan document parser (`ScanDocument`, `parse_document`)
//! - [`classifier`]: Control classification (`Classifier`, `StatusPolicy`, `SectionStrategy`)
//! - [`aggregator`]: Profile aggregation (`aggregate`)
//! - [`publisher`]: Gauge publishing (`MetricsPublisher`, `GaugeSink`, `RecorderSink`, `GaugeStore`)
//! - [`watcher`]: Directory polling loop (`ScanWatcher`, `ScanWatcherBuilder`)
//! - [`report`]: Markdown / JSON compliance reports
//!
//! # Architecture
//!
//! ```text
//! results_dir/*.json --> ScanWatcher --> parse_document --> Classifier (per control)
//!                            |                                    |
//!                        WatchState                         ControlRecord
//!                       (seen files)                              |
//!                                                             aggregate
//!                                                                 |
//!                                                          ProfileSummary
//!                                                                 |
//!                                       +-------------------------+-----------------+
//!                                       |                                           |
//!                               MetricsPublisher                              report::*
//!                                       |                                           |
//!                              GaugeSink (recorder)                  compliance_report.md
//!                                       |                            compliance_summary.json
//!                               /metrics scrape
//! ```

pub mod aggregator;
pub mod classifier;
pub mod config;
pub mod document;
pub mod error;
pub mod publisher;
pub mod report;
pub mod watcher;

// --- Public API Re-exports ---

// Watcher (main loop)
pub use watcher::{IngestOutcome, PollReport, ScanWatcher, ScanWatcherBuilder, WatchState};

// Configuration
pub use config::{IngestConfig, IngestConfigBuilder};

// Error
pub use error::ScanIngestError;

// Parsing and classification
pub use classifier::{Classifier, SectionStrategy, StatusPolicy};
pub use document::{ScanDocument, parse_document, parse_document_bytes};

// Aggregation
pub use aggregator::aggregate;

// Publishing
pub use publisher::{GaugeSink, GaugeStore, MetricsPublisher, PublishOutcome, RecorderSink};

// Reports
pub use report::{ComplianceSummary, render_markdown, summarize_document, write_reports};
