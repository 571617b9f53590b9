//! 스캔 결과 디렉토리 감시 루프
//!
//! [`ScanWatcher`]는 결과 디렉토리를 주기적으로 훑어 처음 보는 `*.json` 파일을
//! 파서 → 분류기 → 집계기 → 퍼블리셔 순으로 흘려보냅니다.
//!
//! # 상태 전이
//!
//! ```text
//!            새 *.json 발견
//!   Idle ─────────────────────▶ Processing
//!    ▲                              │
//!    └──────── 성공 또는 실패 ──────┘  (파일 이름을 seen에 추가)
//! ```
//!
//! 실패한 파일도 seen으로 표시하므로 같은 파일을 다시 시도하지 않습니다.
//! 처리 순서는 한 주기 안에서 파일 이름 순입니다.
//!
//! # 종료
//!
//! [`CancellationToken`]은 매 주기 시작 시 확인하고, 대기 중에는 `select!`로
//! 즉시 깨웁니다. 이미 시작한 파일은 끝까지 처리합니다.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use benchwatch_core::metrics as m;

use crate::aggregator::aggregate;
use crate::classifier::Classifier;
use crate::config::IngestConfig;
use crate::document::{ScanDocument, parse_document, parse_document_bytes};
use crate::error::ScanIngestError;
use crate::publisher::{GaugeSink, MetricsPublisher, RecorderSink};

/// 이미 처리한 파일 이름 집합 (프로세스 수명 동안만 유지)
#[derive(Debug, Default, Clone)]
pub struct WatchState {
    seen: HashSet<String>,
}

impl WatchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_seen(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    /// 파일 이름을 처리 완료로 표시합니다. 새로 추가되었으면 `true`.
    pub fn mark_seen(&mut self, name: impl Into<String>) -> bool {
        self.seen.insert(name.into())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// 폴링 한 주기의 결과
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    /// 새로 발견한 파일 수
    pub discovered: usize,
    /// 처리에 성공한 파일 수
    pub ingested: usize,
    /// 처리에 실패한 파일 수
    pub failed: usize,
}

/// 파일 한 건의 처리 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// 프로파일 게이지를 발행함
    Published {
        profiles: usize,
        controls: usize,
        /// 집계에서 제외된 컨트롤 수
        rejected_controls: usize,
        /// 기록에 실패한 게이지 수
        publish_failures: usize,
    },
    /// 점수 요약 문서 (발행 없음)
    ScoreSummary,
}

/// 스캔 결과 감시기
///
/// 상태(`WatchState`)와 퍼블리셔를 소유하는 단일 작업자입니다.
/// [`ScanWatcherBuilder`]로 생성합니다.
pub struct ScanWatcher {
    config: IngestConfig,
    classifier: Classifier,
    publisher: MetricsPublisher,
    state: WatchState,
}

impl ScanWatcher {
    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub fn state(&self) -> &WatchState {
        &self.state
    }

    pub fn publisher(&self) -> &MetricsPublisher {
        &self.publisher
    }

    /// 시작 시 초기 파일을 적재합니다.
    ///
    /// 파일이 없으면 아무것도 하지 않고 `false`를 반환합니다.
    /// 적재를 시도했으면 결과와 무관하게 seen으로 표시하고 `true`를 반환합니다.
    pub async fn load_initial(&mut self) -> bool {
        let (Some(name), Some(path)) = (
            self.config.initial_file.clone(),
            self.config.initial_file_path(),
        ) else {
            return false;
        };

        match tokio::fs::try_exists(&path).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(path = %path.display(), "initial scan file not present");
                return false;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot check initial scan file");
                return false;
            }
        }

        info!(path = %path.display(), "loading initial scan file");
        self.process_file(&name, &path).await;
        true
    }

    /// 디렉토리를 한 번 훑어 새 파일을 모두 처리합니다.
    pub async fn poll_once(&mut self) -> PollReport {
        let mut report = PollReport::default();

        let files = match self.list_new_files().await {
            Ok(files) => files,
            Err(e) => {
                warn!(error = %e, "scan directory listing failed, treating as no new files");
                return report;
            }
        };

        report.discovered = files.len();
        for (name, path) in files {
            if self.process_file(&name, &path).await {
                report.ingested += 1;
            } else {
                report.failed += 1;
            }
        }

        if report.discovered > 0 {
            debug!(
                discovered = report.discovered,
                ingested = report.ingested,
                failed = report.failed,
                "poll cycle completed"
            );
        }
        report
    }

    /// 취소될 때까지 초기 적재 후 폴링을 반복합니다.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(
            dir = %self.config.results_dir.display(),
            environment = %self.config.environment,
            interval_secs = self.config.poll_interval_secs,
            "scan watcher started"
        );

        if !cancel.is_cancelled() {
            self.load_initial().await;
        }

        let interval = self.config.poll_interval();
        loop {
            if cancel.is_cancelled() {
                break;
            }

            self.poll_once().await;

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }

        info!(files_seen = self.state.len(), "scan watcher stopped");
    }

    /// 파일 하나를 처리하고 seen으로 표시합니다. 성공하면 `true`.
    async fn process_file(&mut self, name: &str, path: &Path) -> bool {
        let started = Instant::now();
        let result = self.ingest_file(path).await;
        self.state.mark_seen(name);

        let succeeded = match &result {
            Ok(IngestOutcome::Published {
                profiles,
                controls,
                rejected_controls,
                publish_failures,
            }) => {
                info!(
                    file = name,
                    profiles,
                    controls,
                    rejected_controls,
                    publish_failures,
                    "scan file ingested"
                );
                true
            }
            Ok(IngestOutcome::ScoreSummary) => {
                debug!(file = name, "score summary document, nothing to publish");
                true
            }
            Err(e) => {
                warn!(file = name, error = %e, "scan file ingestion failed");
                false
            }
        };

        let result_label = if succeeded { "success" } else { "failure" };
        metrics::histogram!(m::EXPORTER_INGEST_DURATION_SECONDS, m::LABEL_RESULT => result_label)
            .record(started.elapsed().as_secs_f64());
        if succeeded {
            metrics::counter!(m::EXPORTER_FILES_INGESTED_TOTAL).increment(1);
        } else {
            metrics::counter!(m::EXPORTER_FILE_ERRORS_TOTAL).increment(1);
        }
        succeeded
    }

    /// 파일 하나를 읽어 발행합니다. seen 표시는 하지 않습니다.
    ///
    /// # Errors
    ///
    /// - `FileTooBig`: `max_file_size` 초과
    /// - `Io`: 메타데이터/읽기 실패
    /// - `MalformedDocument`: UTF-8 JSON이 아니거나 구조를 인식할 수 없음
    pub async fn ingest_file(&mut self, path: &Path) -> Result<IngestOutcome, ScanIngestError> {
        let io_err = |source| ScanIngestError::Io {
            path: path.display().to_string(),
            source,
        };

        let metadata = tokio::fs::metadata(path).await.map_err(io_err)?;
        if metadata.len() > self.config.max_file_size as u64 {
            return Err(ScanIngestError::FileTooBig {
                path: path.display().to_string(),
                size: metadata.len(),
                max: self.config.max_file_size,
            });
        }

        // UTF-8 검사는 파서가 맡아 MalformedDocument로 보고합니다
        let content = tokio::fs::read(path).await.map_err(io_err)?;
        let source_name = path.display().to_string();
        let doc = parse_document_bytes(&content, &source_name)?;
        Ok(self.publish_document(doc, &source_name))
    }

    /// 문서 문자열을 파싱해 프로파일마다 집계와 발행을 수행합니다.
    pub fn ingest_document(
        &mut self,
        content: &str,
        source_name: &str,
    ) -> Result<IngestOutcome, ScanIngestError> {
        let doc = parse_document(content, source_name)?;
        Ok(self.publish_document(doc, source_name))
    }

    fn publish_document(&mut self, doc: ScanDocument, source_name: &str) -> IngestOutcome {
        let doc = match doc {
            ScanDocument::ScoreSummary(_) => return IngestOutcome::ScoreSummary,
            ScanDocument::Profiles(doc) => doc,
        };

        let mut controls = 0;
        let mut rejected_controls = 0;
        let mut publish_failures = 0;

        for profile in &doc.profiles {
            let classified = self.classifier.classify_profile(profile);
            for e in &classified.rejected {
                warn!(source = source_name, error = %e, "control skipped");
            }
            rejected_controls += classified.rejected.len();
            controls += classified.records.len();

            let summary = aggregate(classified.name, classified.records);
            let outcome = self.publisher.publish(&summary);
            publish_failures += outcome.failures.len();

            info!(
                profile = %summary.profile_name,
                score = summary.score_percent,
                passed = summary.passed,
                failed = summary.failed,
                skipped = summary.skipped,
                "metrics updated"
            );
        }

        IngestOutcome::Published {
            profiles: doc.profiles.len(),
            controls,
            rejected_controls,
            publish_failures,
        }
    }

    /// 아직 처리하지 않은 `*.json` 파일을 이름 순으로 반환합니다.
    async fn list_new_files(&self) -> Result<Vec<(String, PathBuf)>, ScanIngestError> {
        let dir = &self.config.results_dir;
        let unavailable = |source| ScanIngestError::DirectoryUnavailable {
            path: dir.display().to_string(),
            source,
        };

        let mut entries = tokio::fs::read_dir(dir).await.map_err(unavailable)?;
        let mut files = Vec::new();

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "failed to read directory entry");
                    break;
                }
            };

            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !name.ends_with(".json") || self.state.is_seen(&name) {
                continue;
            }
            match entry.file_type().await {
                Ok(t) if t.is_file() => files.push((name, entry.path())),
                Ok(_) => {}
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "failed to read file type");
                }
            }
        }

        files.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(files)
    }
}

/// [`ScanWatcher`] 빌더
pub struct ScanWatcherBuilder {
    config: IngestConfig,
    sink: Option<Arc<dyn GaugeSink>>,
    clock: Option<Box<dyn Fn() -> f64 + Send + Sync>>,
}

impl ScanWatcherBuilder {
    pub fn new() -> Self {
        Self {
            config: IngestConfig::default(),
            sink: None,
            clock: None,
        }
    }

    /// 수집 설정을 지정합니다.
    pub fn config(mut self, config: IngestConfig) -> Self {
        self.config = config;
        self
    }

    /// 게이지 싱크를 지정합니다. 기본값은 전역 레코더([`RecorderSink`])입니다.
    pub fn sink(mut self, sink: Arc<dyn GaugeSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// 스캔 타임스탬프 시계를 지정합니다.
    pub fn clock(mut self, clock: impl Fn() -> f64 + Send + Sync + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// 설정을 검증하고 감시기를 빌드합니다.
    ///
    /// # Errors
    ///
    /// 설정 검증 실패 시 `ScanIngestError::Config`
    pub fn build(self) -> Result<ScanWatcher, ScanIngestError> {
        self.config.validate()?;

        let sink = self.sink.unwrap_or_else(|| Arc::new(RecorderSink));
        let mut publisher = MetricsPublisher::new(sink, self.config.environment.clone());
        if let Some(clock) = self.clock {
            publisher = publisher.with_clock(clock);
        }

        Ok(ScanWatcher {
            classifier: Classifier::from_config(&self.config),
            config: self.config,
            publisher,
            state: WatchState::new(),
        })
    }
}

impl Default for ScanWatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
