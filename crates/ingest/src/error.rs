//! 스캔 수집 에러 타입
//!
//! [`ScanIngestError`]는 수집 파이프라인 내에서 발생할 수 있는 모든 에러를 나타냅니다.
//! `From<ScanIngestError> for BenchwatchError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 전파됩니다.
//!
//! # 에러 카테고리와 처리 방침
//!
//! - **`MalformedDocument`**: 해당 파일만 실패, 로그 후 처리 완료로 표시
//! - **`MalformedControl`**: 해당 컨트롤만 집계에서 제외, 형제 컨트롤은 계속
//! - **`PublishFailure`**: 해당 게이지만 실패, 나머지 게이지는 계속 기록
//! - **`DirectoryUnavailable`**: 이번 폴링 주기는 "새 파일 없음"으로 처리
//! - **`Io`**, **`FileTooBig`**: 해당 파일만 실패, 처리 완료로 표시
//! - **`Config`**: 빌드 시점 검증 실패
//!
//! 어떤 에러도 프로세스 종료로 이어지지 않습니다.

use benchwatch_core::error::{BenchwatchError, IngestError};

/// 스캔 수집 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ScanIngestError {
    /// JSON이 아니거나 최상위 구조를 인식할 수 없는 문서
    #[error("malformed document: {source_name}: {reason}")]
    MalformedDocument {
        /// 문서 출처 (파일 경로 등)
        source_name: String,
        /// 실패 사유
        reason: String,
    },

    /// 식별자를 문자열로 해석할 수 없는 컨트롤
    #[error("malformed control #{index} in profile '{profile}': {reason}")]
    MalformedControl {
        /// 소속 프로파일 이름
        profile: String,
        /// 프로파일 내 컨트롤 위치 (0부터)
        index: usize,
        /// 실패 사유
        reason: String,
    },

    /// 게이지 하나의 기록 실패
    #[error("publish failure: {metric}: {reason}")]
    PublishFailure {
        /// 메트릭 이름
        metric: String,
        /// 실패 사유
        reason: String,
    },

    /// 감시 디렉토리 목록 조회 실패
    #[error("directory unavailable: {path}: {source}")]
    DirectoryUnavailable {
        /// 디렉토리 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },

    /// 파일 I/O 에러
    #[error("io error: {path}: {source}")]
    Io {
        /// 관련 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },

    /// 파일 크기 초과
    #[error("file too large: {path}: {size} bytes (max: {max})")]
    FileTooBig {
        /// 파일 경로
        path: String,
        /// 실제 크기 (바이트)
        size: u64,
        /// 허용 최대 크기 (바이트)
        max: usize,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },
}

impl From<ScanIngestError> for BenchwatchError {
    fn from(err: ScanIngestError) -> Self {
        match err {
            ScanIngestError::MalformedDocument { .. } => {
                BenchwatchError::Ingest(IngestError::MalformedDocument(err.to_string()))
            }
            ScanIngestError::MalformedControl { .. } => {
                BenchwatchError::Ingest(IngestError::MalformedControl(err.to_string()))
            }
            ScanIngestError::PublishFailure { .. } => {
                BenchwatchError::Ingest(IngestError::PublishFailure(err.to_string()))
            }
            ScanIngestError::DirectoryUnavailable { .. } => {
                BenchwatchError::Ingest(IngestError::DirectoryUnavailable(err.to_string()))
            }
            ScanIngestError::Io { source, .. } => BenchwatchError::Io(source),
            ScanIngestError::FileTooBig { .. } => {
                BenchwatchError::Ingest(IngestError::MalformedDocument(err.to_string()))
            }
            ScanIngestError::Config { field, reason } => BenchwatchError::Config(
                benchwatch_core::error::ConfigError::InvalidValue { field, reason },
            ),
        }
    }
}
