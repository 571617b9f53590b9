//! benchwatch 공통 크레이트
//!
//! 보안 벤치마크 스캔 결과를 정규화한 도메인 모델과, 워크스페이스 전체가
//! 공유하는 에러/설정/메트릭 이름을 제공합니다.
//!
//! # Module Structure
//!
//! - [`types`]: 정규화 모델 (`ControlRecord`, `ProfileSummary`, `Severity`, ...)
//! - [`error`]: 최상위 에러 (`BenchwatchError`, `ConfigError`, `IngestError`)
//! - [`config`]: `benchwatch.toml` + 환경변수 설정 (`BenchwatchConfig`)
//! - [`metrics`]: 메트릭 이름/레이블 상수와 설명 등록

pub mod config;
pub mod error;
pub mod metrics;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{BenchwatchError, ConfigError, IngestError};

// 설정
pub use config::BenchwatchConfig;

// 도메인 타입
pub use types::{
    ControlRecord, ControlStatus, ProfileSummary, ResultEntry, Severity, SeverityCounts,
};
