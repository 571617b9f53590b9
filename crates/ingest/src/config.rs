//! 수집 파이프라인 설정
//!
//! [`IngestConfig`]는 core의 [`WatchConfig`](benchwatch_core::config::WatchConfig)와
//! [`ClassifierConfig`](benchwatch_core::config::ClassifierConfig)를 합쳐
//! 문자열 설정값을 타입이 있는 정책(enum)으로 바꾼 것입니다.
//!
//! # 사용 예시
//!
//! ```
//! use benchwatch_ingest::{IngestConfig, IngestConfigBuilder, SectionStrategy};
//!
//! // 기본값으로 생성
//! let config = IngestConfig::default();
//! config.validate().unwrap();
//!
//! // 빌더로 생성
//! let config = IngestConfigBuilder::new()
//!     .results_dir("/var/lib/inspec")
//!     .environment("staging")
//!     .section_strategy(SectionStrategy::DotPrefix)
//!     .build()
//!     .unwrap();
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use benchwatch_core::config::{MAX_FILE_SIZE, MAX_POLL_INTERVAL_SECS, is_bare_file_name};

use crate::classifier::{SectionStrategy, StatusPolicy};
use crate::error::ScanIngestError;


/// 수집 파이프라인 설정
///
/// # 필드
///
/// - **results_dir**: 스캔 결과 JSON 디렉토리 (비재귀)
/// - **environment**: 프로파일/심각도 게이지의 환경 레이블
/// - **poll_interval_secs**: 디렉토리 재스캔 주기
/// - **initial_file**: 시작 시 먼저 적재할 파일 이름 (없으면 생략)
/// - **max_file_size**: 스캔 파일 최대 크기 (바이트)
/// - **status_policy**: 상태 판정 정책
/// - **section_strategy**: 섹션 키 추출 전략
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// 스캔 결과 디렉토리
    pub results_dir: PathBuf,
    /// 환경 레이블
    pub environment: String,
    /// 폴링 주기 (초)
    pub poll_interval_secs: u64,
    /// 시작 시 적재할 파일 이름
    pub initial_file: Option<String>,
    /// 파일 최대 크기 (바이트)
    pub max_file_size: usize,
    /// 상태 판정 정책
    pub status_policy: StatusPolicy,
    /// 섹션 키 추출 전략
    pub section_strategy: SectionStrategy,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("reports"),
            environment: "production".to_owned(),
            poll_interval_secs: 10,
            initial_file: Some("inspec_aws_report.json".to_owned()),
            max_file_size: 50 * 1024 * 1024, // 50 MB
            status_policy: StatusPolicy::default(),
            section_strategy: SectionStrategy::default(),
        }
    }
}

impl IngestConfig {
    /// core 설정에서 수집 설정을 생성합니다.
    ///
    /// 인식할 수 없는 정책 문자열은 기본값으로 대체됩니다
    /// (core 설정 검증을 거쳤다면 발생하지 않음).
    pub fn from_core(core: &benchwatch_core::BenchwatchConfig) -> Self {
        let status_policy = StatusPolicy::from_config_name(&core.classifier.status_policy)
            .unwrap_or_default();
        let section_strategy =
            SectionStrategy::from_config_name(&core.classifier.section_strategy)
                .unwrap_or_default();
        let initial_file = Some(core.watch.initial_file.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_owned);

        Self {
            results_dir: PathBuf::from(&core.watch.results_dir),
            environment: core.watch.environment.clone(),
            poll_interval_secs: core.watch.poll_interval_secs,
            initial_file,
            max_file_size: core.watch.max_file_size,
            status_policy,
            section_strategy,
        }
    }

    /// 폴링 주기를 `Duration`으로 반환합니다.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// 초기 파일의 전체 경로를 반환합니다.
    pub fn initial_file_path(&self) -> Option<PathBuf> {
        self.initial_file
            .as_ref()
            .map(|name| self.results_dir.join(name))
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// 상한값과 파일 이름 규칙은 core 설정 검증과 같은 것을 씁니다.
    ///
    /// # 검증 규칙
    ///
    /// - `poll_interval_secs`: 1-3600
    /// - `max_file_size`: 1-1073741824 (1GB)
    /// - `environment`: 비어있으면 안 됨
    /// - `results_dir`: 비어있으면 안 되며 `..` 컴포넌트 금지
    /// - `initial_file`: 경로 구분자 없는 파일 이름
    pub fn validate(&self) -> Result<(), ScanIngestError> {
        if self.poll_interval_secs == 0 || self.poll_interval_secs > MAX_POLL_INTERVAL_SECS {
            return Err(ScanIngestError::Config {
                field: "poll_interval_secs".to_owned(),
                reason: format!("must be 1-{MAX_POLL_INTERVAL_SECS}"),
            });
        }

        if self.max_file_size == 0 || self.max_file_size > MAX_FILE_SIZE {
            return Err(ScanIngestError::Config {
                field: "max_file_size".to_owned(),
                reason: format!("must be 1-{MAX_FILE_SIZE}"),
            });
        }

        if self.environment.is_empty() {
            return Err(ScanIngestError::Config {
                field: "environment".to_owned(),
                reason: "environment label must not be empty".to_owned(),
            });
        }

        if self.results_dir.as_os_str().is_empty() {
            return Err(ScanIngestError::Config {
                field: "results_dir".to_owned(),
                reason: "results directory path must not be empty".to_owned(),
            });
        }

        // Path traversal 체크: Path::components()로 ParentDir 컴포넌트 검출
        if self
            .results_dir
            .components()
            .any(|c| c == std::path::Component::ParentDir)
        {
            return Err(ScanIngestError::Config {
                field: "results_dir".to_owned(),
                reason: format!(
                    "results directory '{}' contains path traversal pattern '..'",
                    self.results_dir.display()
                ),
            });
        }

        if let Some(name) = &self.initial_file {
            if !is_bare_file_name(name) {
                return Err(ScanIngestError::Config {
                    field: "initial_file".to_owned(),
                    reason: format!("'{name}' must be a bare file name"),
                });
            }
        }

        Ok(())
    }
}

/// [`IngestConfig`] 빌더
///
/// 유연한 설정 구성 및 빌드 시 유효성 검증을 제공합니다.
#[derive(Default)]
pub struct IngestConfigBuilder {
    config: IngestConfig,
}

impl IngestConfigBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 스캔 결과 디렉토리를 설정합니다.
    pub fn results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.results_dir = dir.into();
        self
    }

    /// 환경 레이블을 설정합니다.
    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.config.environment = environment.into();
        self
    }

    /// 폴링 주기(초)를 설정합니다.
    pub fn poll_interval_secs(mut self, secs: u64) -> Self {
        self.config.poll_interval_secs = secs;
        self
    }

    /// 초기 파일 이름을 설정합니다. `None`이면 초기 적재를 생략합니다.
    pub fn initial_file(mut self, name: Option<String>) -> Self {
        self.config.initial_file = name;
        self
    }

    /// 파일 최대 크기(바이트)를 설정합니다.
    pub fn max_file_size(mut self, size: usize) -> Self {
        self.config.max_file_size = size;
        self
    }

    /// 상태 판정 정책을 설정합니다.
    pub fn status_policy(mut self, policy: StatusPolicy) -> Self {
        self.config.status_policy = policy;
        self
    }

    /// 섹션 키 추출 전략을 설정합니다.
    pub fn section_strategy(mut self, strategy: SectionStrategy) -> Self {
        self.config.section_strategy = strategy;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 `ScanIngestError::Config` 반환
    pub fn build(self) -> Result<IngestConfig, ScanIngestError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
