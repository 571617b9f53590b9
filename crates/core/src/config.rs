//! 설정 관리: benchwatch.toml 파싱 및 런타임 설정
//!
//! [`BenchwatchConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`EXPORTER_PORT`, `ENVIRONMENT`, `INSPEC_RESULTS_DIR`,
//!    `BENCHWATCH_{SECTION}_{FIELD}` 형식)
//! 3. 설정 파일 (`benchwatch.toml`, 선택)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), benchwatch_core::error::BenchwatchError> {
//! use benchwatch_core::config::BenchwatchConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = BenchwatchConfig::load("benchwatch.toml").await?;
//!
//! // 파일 없이 기본값 + 환경변수만 사용
//! let config = BenchwatchConfig::from_env()?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = BenchwatchConfig::parse("[watch]\nenvironment = \"staging\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{BenchwatchError, ConfigError};

/// 스크레이프 포트 환경변수
pub const ENV_EXPORTER_PORT: &str = "EXPORTER_PORT";
/// 환경 레이블 환경변수
pub const ENV_ENVIRONMENT: &str = "ENVIRONMENT";
/// 감시 디렉토리 환경변수
pub const ENV_RESULTS_DIR: &str = "INSPEC_RESULTS_DIR";

/// 상태 판정 정책 허용값
pub const STATUS_POLICIES: [&str; 2] = ["fail_on_any_non_passed", "skip_unless_failed"];
/// 섹션 키 추출 전략 허용값
pub const SECTION_STRATEGIES: [&str; 2] = ["third_segment", "dot_prefix"];

/// 폴링 주기 상한 (초)
pub const MAX_POLL_INTERVAL_SECS: u64 = 3600;
const MAX_PATH_LEN: usize = 4096;
/// 스캔 파일 최대 크기 상한 (1 GB)
pub const MAX_FILE_SIZE: usize = 1024 * 1024 * 1024;

/// benchwatch 통합 설정
///
/// `benchwatch.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchwatchConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 메트릭 엔드포인트 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
    /// 디렉토리 감시 설정
    #[serde(default)]
    pub watch: WatchConfig,
    /// 컨트롤 분류 설정
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

impl BenchwatchConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, BenchwatchError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일 없이 기본값에 환경변수 오버라이드만 적용합니다.
    pub fn from_env() -> Result<Self, BenchwatchError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, BenchwatchError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BenchwatchError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                BenchwatchError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, BenchwatchError> {
        toml::from_str(toml_str).map_err(|e| {
            BenchwatchError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    pub fn apply_env_overrides(&mut self) {
        // 배포 스크립트와 호환되는 이름
        override_u16(&mut self.metrics.port, ENV_EXPORTER_PORT);
        override_string(&mut self.watch.environment, ENV_ENVIRONMENT);
        override_string(&mut self.watch.results_dir, ENV_RESULTS_DIR);

        // General
        override_string(&mut self.general.log_level, "BENCHWATCH_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "BENCHWATCH_GENERAL_LOG_FORMAT");

        // Metrics
        override_bool(&mut self.metrics.enabled, "BENCHWATCH_METRICS_ENABLED");
        override_string(
            &mut self.metrics.listen_addr,
            "BENCHWATCH_METRICS_LISTEN_ADDR",
        );

        // Watch
        override_u64(
            &mut self.watch.poll_interval_secs,
            "BENCHWATCH_WATCH_POLL_INTERVAL_SECS",
        );
        override_string(
            &mut self.watch.initial_file,
            "BENCHWATCH_WATCH_INITIAL_FILE",
        );
        override_usize(
            &mut self.watch.max_file_size,
            "BENCHWATCH_WATCH_MAX_FILE_SIZE",
        );

        // Classifier
        override_string(
            &mut self.classifier.status_policy,
            "BENCHWATCH_CLASSIFIER_STATUS_POLICY",
        );
        override_string(
            &mut self.classifier.section_strategy,
            "BENCHWATCH_CLASSIFIER_SECTION_STRATEGY",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), BenchwatchError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.metrics.enabled {
            if self.metrics.port == 0 {
                return Err(invalid("metrics.port", "must be 1-65535".to_owned()));
            }
            if self.metrics.listen_addr.is_empty() {
                return Err(invalid(
                    "metrics.listen_addr",
                    "must not be empty when metrics are enabled".to_owned(),
                ));
            }
        }

        if self.watch.results_dir.is_empty() {
            return Err(invalid(
                "watch.results_dir",
                "results directory must not be empty".to_owned(),
            ));
        }

        if Path::new(&self.watch.results_dir)
            .components()
            .any(|c| c == std::path::Component::ParentDir)
        {
            return Err(invalid(
                "watch.results_dir",
                format!(
                    "results directory '{}' contains path traversal pattern '..'",
                    self.watch.results_dir
                ),
            ));
        }

        if self.watch.results_dir.len() > MAX_PATH_LEN {
            return Err(invalid(
                "watch.results_dir",
                format!("exceeds maximum length {MAX_PATH_LEN}"),
            ));
        }

        if self.watch.environment.is_empty() {
            return Err(invalid(
                "watch.environment",
                "environment label must not be empty".to_owned(),
            ));
        }

        if self.watch.poll_interval_secs == 0
            || self.watch.poll_interval_secs > MAX_POLL_INTERVAL_SECS
        {
            return Err(invalid(
                "watch.poll_interval_secs",
                format!("must be 1-{MAX_POLL_INTERVAL_SECS}"),
            ));
        }

        if self.watch.max_file_size == 0 || self.watch.max_file_size > MAX_FILE_SIZE {
            return Err(invalid(
                "watch.max_file_size",
                format!("must be 1-{MAX_FILE_SIZE}"),
            ));
        }

        // 초기 파일은 감시 디렉토리 안의 파일 이름이어야 함 (빈 값은 초기 적재 생략)
        let initial_file = self.watch.initial_file.trim();
        if !initial_file.is_empty() && !is_bare_file_name(initial_file) {
            return Err(invalid(
                "watch.initial_file",
                format!("'{initial_file}' must be a bare file name inside the results directory"),
            ));
        }

        if !STATUS_POLICIES.contains(&self.classifier.status_policy.as_str()) {
            return Err(invalid(
                "classifier.status_policy",
                format!("must be one of: {}", STATUS_POLICIES.join(", ")),
            ));
        }

        if !SECTION_STRATEGIES.contains(&self.classifier.section_strategy.as_str()) {
            return Err(invalid(
                "classifier.section_strategy",
                format!("must be one of: {}", SECTION_STRATEGIES.join(", ")),
            ));
        }

        Ok(())
    }
}

/// `.`, `..`, 경로 구분자가 섞인 이름을 걸러냅니다.
pub fn is_bare_file_name(name: &str) -> bool {
    !name.contains('\\') && Path::new(name).file_name().is_some_and(|f| f == name)
}

fn invalid(field: &str, reason: String) -> BenchwatchError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 메트릭 엔드포인트 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 바인드 주소
    pub listen_addr: String,
    /// 스크레이프 포트
    pub port: u16,
    /// 엔드포인트 경로
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            listen_addr: "0.0.0.0".to_owned(),
            port: 9090,
            endpoint: "/metrics".to_owned(),
        }
    }
}

/// 디렉토리 감시 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// 스캔 결과 JSON이 놓이는 디렉토리
    pub results_dir: String,
    /// 프로파일/심각도 게이지에 붙는 환경 레이블
    pub environment: String,
    /// 폴링 주기 (초)
    pub poll_interval_secs: u64,
    /// 시작 시 먼저 적재할 파일 이름 (results_dir 기준)
    pub initial_file: String,
    /// 스캔 파일 최대 크기 (바이트)
    pub max_file_size: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            results_dir: "reports".to_owned(),
            environment: "production".to_owned(),
            poll_interval_secs: 10,
            initial_file: "inspec_aws_report.json".to_owned(),
            max_file_size: 50 * 1024 * 1024, // 50 MB
        }
    }
}

/// 컨트롤 분류 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// 상태 판정 정책 (fail_on_any_non_passed, skip_unless_failed)
    pub status_policy: String,
    /// 섹션 키 추출 전략 (third_segment, dot_prefix)
    pub section_strategy: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            status_policy: "fail_on_any_non_passed".to_owned(),
            section_strategy: "third_segment".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}
