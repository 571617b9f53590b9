//! 메트릭 퍼블리셔
//!
//! [`ProfileSummary`]를 레이블이 달린 게이지 집합으로 옮깁니다.
//! 같은 (메트릭 이름, 레이블 집합)에 대한 쓰기는 마지막 값이 이깁니다.
//!
//! # 게이지 표면
//!
//! 실제 저장소는 [`GaugeSink`] 뒤에 숨어 있습니다.
//!
//! - [`RecorderSink`]: `metrics` 파사드를 통해 데몬이 설치한 전역 레코더
//!   (Prometheus 익스포터)에 기록합니다. 스크레이프 경로의 동시 읽기는 레코더가 처리합니다.
//! - [`GaugeStore`]: `RwLock`으로 보호되는 인메모리 게이지 맵. 테스트와
//!   프로세스 내 조회(`get`, `snapshot`)에 씁니다.
//!
//! # 부분 발행
//!
//! 게이지 하나의 기록 실패는 로그와 카운터로 남기고 나머지 게이지는 계속 기록합니다.
//! 한 번 기록된 레이블 집합은 지워지지 않습니다.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use metrics::Label;
use tracing::{debug, warn};

use benchwatch_core::metrics as m;
use benchwatch_core::types::{ControlRecord, ProfileSummary};

use crate::error::ScanIngestError;

/// 게이지 레이블 목록 (키, 값)
pub type LabelPairs = [(&'static str, String)];

/// 게이지 기록 대상
pub trait GaugeSink: Send + Sync {
    /// 게이지 하나를 기록합니다.
    ///
    /// # Errors
    ///
    /// 기록할 수 없으면 `ScanIngestError::PublishFailure`
    fn set_gauge(
        &self,
        name: &'static str,
        labels: &LabelPairs,
        value: f64,
    ) -> Result<(), ScanIngestError>;
}

fn ensure_finite(name: &str, value: f64) -> Result<(), ScanIngestError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ScanIngestError::PublishFailure {
            metric: name.to_owned(),
            reason: format!("non-finite value {value}"),
        })
    }
}

/// 전역 `metrics` 레코더로 기록하는 싱크
#[derive(Debug, Clone, Copy, Default)]
pub struct RecorderSink;

impl GaugeSink for RecorderSink {
    fn set_gauge(
        &self,
        name: &'static str,
        labels: &LabelPairs,
        value: f64,
    ) -> Result<(), ScanIngestError> {
        ensure_finite(name, value)?;
        let labels: Vec<Label> = labels
            .iter()
            .map(|(k, v)| Label::new(*k, v.clone()))
            .collect();
        metrics::gauge!(name, labels).set(value);
        Ok(())
    }
}

/// 게이지 식별자 (메트릭 이름 + 키 순으로 정렬된 레이블)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GaugeKey {
    pub name: String,
    pub labels: Vec<(String, String)>,
}

impl GaugeKey {
    pub fn new<K, V>(name: &str, labels: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut labels: Vec<(String, String)> = labels
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        labels.sort();
        Self {
            name: name.to_owned(),
            labels,
        }
    }

    /// 레이블 값을 조회합니다.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for GaugeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{", self.name)?;
        for (i, (k, v)) in self.labels.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{k}=\"{v}\"")?;
        }
        f.write_str("}")
    }
}

/// 인메모리 게이지 저장소
///
/// 쓰기는 퍼블리셔 하나, 읽기는 여러 곳에서 동시에 일어날 수 있습니다.
#[derive(Debug, Default)]
pub struct GaugeStore {
    gauges: RwLock<BTreeMap<GaugeKey, f64>>,
}

impl GaugeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 게이지 값을 조회합니다. 락이 오염되었으면 `None`입니다.
    pub fn get(&self, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        let key = GaugeKey::new(name, labels.iter().copied());
        self.gauges.read().ok()?.get(&key).copied()
    }

    /// 이름이 `name`인 모든 게이지를 반환합니다.
    pub fn series(&self, name: &str) -> Vec<(GaugeKey, f64)> {
        self.snapshot()
            .into_iter()
            .filter(|(key, _)| key.name == name)
            .collect()
    }

    /// 현재 모든 게이지의 정렬된 복사본
    pub fn snapshot(&self) -> Vec<(GaugeKey, f64)> {
        match self.gauges.read() {
            Ok(gauges) => gauges.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.gauges.read().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl GaugeSink for GaugeStore {
    fn set_gauge(
        &self,
        name: &'static str,
        labels: &LabelPairs,
        value: f64,
    ) -> Result<(), ScanIngestError> {
        ensure_finite(name, value)?;
        let key = GaugeKey::new(name, labels.iter().map(|(k, v)| (*k, v.clone())));
        let mut gauges = self
            .gauges
            .write()
            .map_err(|e| ScanIngestError::PublishFailure {
                metric: name.to_owned(),
                reason: format!("gauge store lock poisoned: {e}"),
            })?;
        gauges.insert(key, value);
        Ok(())
    }
}

/// 한 번의 발행 결과
#[derive(Debug, Default)]
pub struct PublishOutcome {
    /// 기록에 성공한 게이지 수
    pub written: usize,
    /// 기록에 실패한 게이지
    pub failures: Vec<ScanIngestError>,
}

impl PublishOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

type Clock = Box<dyn Fn() -> f64 + Send + Sync>;

fn system_clock() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

/// 스캔 타임스탬프의 최소 증가 폭 (초)
const TIMESTAMP_STEP: f64 = 0.001;

/// 프로파일 요약을 게이지로 발행합니다.
pub struct MetricsPublisher {
    sink: Arc<dyn GaugeSink>,
    environment: String,
    clock: Clock,
    last_timestamp: Option<f64>,
}

impl fmt::Debug for MetricsPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsPublisher")
            .field("environment", &self.environment)
            .field("last_timestamp", &self.last_timestamp)
            .finish_non_exhaustive()
    }
}

impl MetricsPublisher {
    pub fn new(sink: Arc<dyn GaugeSink>, environment: impl Into<String>) -> Self {
        Self {
            sink,
            environment: environment.into(),
            clock: Box::new(system_clock),
            last_timestamp: None,
        }
    }

    /// 스캔 타임스탬프에 쓸 시계(Unix epoch 초)를 교체합니다.
    pub fn with_clock(mut self, clock: impl Fn() -> f64 + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// 프로파일 요약 하나를 발행합니다.
    ///
    /// 기록 순서: 프로파일 게이지 → 심각도 게이지 (4개) → 컨트롤 게이지 (입력 순서).
    /// 실패한 게이지는 `warn` 로그와 실패 카운터를 남기고 건너뜁니다.
    pub fn publish(&mut self, summary: &ProfileSummary) -> PublishOutcome {
        let mut outcome = PublishOutcome::default();

        let profile_labels = [
            (m::LABEL_ENVIRONMENT, self.environment.clone()),
            (m::LABEL_PROFILE, summary.profile_name.clone()),
        ];
        let timestamp = self.next_timestamp();
        let profile_gauges = [
            (m::COMPLIANCE_SCORE, summary.score_percent),
            (m::CONTROLS_TOTAL, summary.total as f64),
            (m::CONTROLS_PASSED, summary.passed as f64),
            (m::CONTROLS_FAILED, summary.failed as f64),
            (m::CONTROLS_SKIPPED, summary.skipped as f64),
            (m::LAST_SCAN_TIMESTAMP, timestamp),
        ];
        for (name, value) in profile_gauges {
            self.write(&mut outcome, name, &profile_labels, value);
        }

        for (severity, count) in summary.severity_counts.iter() {
            let labels = [
                (m::LABEL_SEVERITY, severity.as_str().to_owned()),
                (m::LABEL_ENVIRONMENT, self.environment.clone()),
            ];
            self.write(&mut outcome, m::VIOLATIONS_BY_SEVERITY, &labels, count as f64);
        }

        for control in &summary.controls {
            let labels = control_labels(control);
            self.write(
                &mut outcome,
                m::CONTROL_STATUS,
                &labels,
                control.status.gauge_value(),
            );
        }

        debug!(
            profile = %summary.profile_name,
            written = outcome.written,
            failed = outcome.failures.len(),
            "profile published"
        );
        outcome
    }

    /// 익스포터 정보 게이지(값 1)를 발행합니다.
    pub fn publish_scan_info(&self, version: &str, exporter: &str) -> PublishOutcome {
        let mut outcome = PublishOutcome::default();
        let labels = [
            (m::LABEL_VERSION, version.to_owned()),
            (m::LABEL_ENVIRONMENT, self.environment.clone()),
            (m::LABEL_EXPORTER, exporter.to_owned()),
        ];
        self.write(&mut outcome, m::SCAN_INFO, &labels, 1.0);
        outcome
    }

    fn write(
        &self,
        outcome: &mut PublishOutcome,
        name: &'static str,
        labels: &LabelPairs,
        value: f64,
    ) {
        match self.sink.set_gauge(name, labels, value) {
            Ok(()) => outcome.written += 1,
            Err(e) => {
                warn!(metric = name, error = %e, "gauge write failed");
                metrics::counter!(m::EXPORTER_PUBLISH_FAILURES_TOTAL).increment(1);
                outcome.failures.push(e);
            }
        }
    }

    /// 직전 발행보다 엄격히 큰 타임스탬프를 만듭니다.
    fn next_timestamp(&mut self) -> f64 {
        let now = (self.clock)();
        let ts = match self.last_timestamp {
            Some(last) if now <= last => last + TIMESTAMP_STEP,
            _ => now,
        };
        self.last_timestamp = Some(ts);
        ts
    }
}

/// 컨트롤 게이지 레이블 (제목은 최대 50자)
fn control_labels(control: &ControlRecord) -> [(&'static str, String); 4] {
    [
        (m::LABEL_CONTROL_ID, control.id.clone()),
        (m::LABEL_TITLE, truncate_chars(&control.title, m::TITLE_LABEL_MAX_CHARS)),
        (m::LABEL_SEVERITY, control.severity.as_str().to_owned()),
        (m::LABEL_SECTION, control.section.clone()),
    ]
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
