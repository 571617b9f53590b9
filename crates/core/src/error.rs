//! 에러 타입: 도메인별 에러 정의

/// benchwatch 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum BenchwatchError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 스캔 수집 파이프라인 에러
    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 스캔 수집 파이프라인 에러 (카테고리 수준)
///
/// 세부 컨텍스트(파일 경로, 컨트롤 인덱스 등)는 `benchwatch-ingest`의
/// 모듈 에러가 담고, 이 타입은 상위 전파용 요약만 유지합니다.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// 스캔 문서 형식 오류 (JSON 아님, 또는 최상위 구조 인식 불가)
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// 식별자를 해석할 수 없는 컨트롤
    #[error("malformed control: {0}")]
    MalformedControl(String),

    /// 게이지 기록 실패
    #[error("publish failure: {0}")]
    PublishFailure(String),

    /// 감시 디렉토리 접근 불가
    #[error("directory unavailable: {0}")]
    DirectoryUnavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_to_top_level() {
        let err: BenchwatchError = ConfigError::InvalidValue {
            field: "watch.poll_interval_secs".to_owned(),
            reason: "must be 1-3600".to_owned(),
        }
        .into();
        assert!(matches!(err, BenchwatchError::Config(_)));
        assert!(err.to_string().contains("watch.poll_interval_secs"));
    }

    #[test]
    fn ingest_error_display_includes_category() {
        let err: BenchwatchError =
            IngestError::MalformedDocument("reports/x.json: not json".to_owned()).into();
        assert_eq!(
            err.to_string(),
            "ingest error: malformed document: reports/x.json: not json"
        );
    }

    #[test]
    fn io_error_converts_to_top_level() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: BenchwatchError = io.into();
        assert!(matches!(err, BenchwatchError::Io(_)));
    }
}
