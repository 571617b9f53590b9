//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 퍼블리셔와 수집 루프는 이 상수를 사용하여 `metrics::gauge!()`,
//! `metrics::counter!()`, `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 컴플라이언스 상태 게이지: `cis_` 접두어 (대시보드/알림 규칙과 호환)
//! - 익스포터 자체 동작 메트릭: `cis_exporter_` 접두어
//! - 접미어: `_total` (counter), `_seconds` (histogram), 없음 (gauge)
//!
//! # 카디널리티
//!
//! [`CONTROL_STATUS`]는 `control_id`를 레이블로 가지므로 프로세스 수명 동안
//! 관측된 서로 다른 컨트롤 ID 수만큼 시계열이 늘어나며 줄지 않습니다.
//! 벤치마크 프로파일이 자주 바뀌는 환경에서는 주기적인 재시작으로 정리해야 합니다.

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 환경 레이블 키 (production, staging, ...)
pub const LABEL_ENVIRONMENT: &str = "environment";

/// 프로파일 이름 레이블 키
pub const LABEL_PROFILE: &str = "profile";

/// 심각도 레이블 키 (critical, high, medium, low)
pub const LABEL_SEVERITY: &str = "severity";

/// 컨트롤 ID 레이블 키
pub const LABEL_CONTROL_ID: &str = "control_id";

/// 컨트롤 제목 레이블 키 (최대 [`TITLE_LABEL_MAX_CHARS`]자)
pub const LABEL_TITLE: &str = "title";

/// 섹션 레이블 키
pub const LABEL_SECTION: &str = "section";

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

/// 익스포터 버전 레이블 키
pub const LABEL_VERSION: &str = "version";

/// 익스포터 이름 레이블 키
pub const LABEL_EXPORTER: &str = "exporter";

/// 제목 레이블 최대 길이 (문자 수)
pub const TITLE_LABEL_MAX_CHARS: usize = 50;

// ─── 컴플라이언스 상태 게이지 ──────────────────────────────────────

/// 프로파일 컴플라이언스 점수 (gauge, 0–100, labels: environment, profile)
pub const COMPLIANCE_SCORE: &str = "cis_compliance_score";

/// 프로파일 전체 컨트롤 수 (gauge, labels: environment, profile)
pub const CONTROLS_TOTAL: &str = "cis_controls_total";

/// 통과 컨트롤 수 (gauge, labels: environment, profile)
pub const CONTROLS_PASSED: &str = "cis_controls_passed";

/// 실패 컨트롤 수 (gauge, labels: environment, profile)
pub const CONTROLS_FAILED: &str = "cis_controls_failed";

/// 건너뛴 컨트롤 수 (gauge, labels: environment, profile)
pub const CONTROLS_SKIPPED: &str = "cis_controls_skipped";

/// 마지막 스캔 발행 시각 (gauge, Unix epoch 초, labels: environment, profile)
pub const LAST_SCAN_TIMESTAMP: &str = "cis_last_scan_timestamp";

/// 심각도별 실패 컨트롤 수 (gauge, labels: severity, environment)
pub const VIOLATIONS_BY_SEVERITY: &str = "cis_violations_by_severity";

/// 개별 컨트롤 상태 (gauge, 1/0/-1, labels: control_id, title, severity, section)
pub const CONTROL_STATUS: &str = "cis_control_status";

/// 스캔 익스포터 정보 (gauge, 항상 1, labels: version, environment, exporter)
pub const SCAN_INFO: &str = "cis_scan_info";

// ─── 익스포터 동작 메트릭 ──────────────────────────────────────────

/// 수집 완료된 스캔 파일 수 (counter)
pub const EXPORTER_FILES_INGESTED_TOTAL: &str = "cis_exporter_files_ingested_total";

/// 처리 실패한 스캔 파일 수 (counter)
pub const EXPORTER_FILE_ERRORS_TOTAL: &str = "cis_exporter_file_errors_total";

/// 게이지 기록 실패 수 (counter)
pub const EXPORTER_PUBLISH_FAILURES_TOTAL: &str = "cis_exporter_publish_failures_total";

/// 스캔 파일 1건 처리 시간 (histogram, 초)
pub const EXPORTER_INGEST_DURATION_SECONDS: &str = "cis_exporter_ingest_duration_seconds";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 수집 처리 시간 히스토그램 버킷 (초)
///
/// 1ms ~ 10s 범위 (대형 프로파일 JSON 파싱 포함)
pub const INGEST_DURATION_BUCKETS: [f64; 8] = [0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 10.0];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
/// 일반적으로 `benchwatch-daemon`의 시작 시점에서 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    describe_gauge!(COMPLIANCE_SCORE, "Overall CIS compliance score");
    describe_gauge!(CONTROLS_TOTAL, "Total number of controls");
    describe_gauge!(CONTROLS_PASSED, "Number of passed controls");
    describe_gauge!(CONTROLS_FAILED, "Number of failed controls");
    describe_gauge!(CONTROLS_SKIPPED, "Number of skipped controls");
    describe_gauge!(LAST_SCAN_TIMESTAMP, "Timestamp of last scan");
    describe_gauge!(
        VIOLATIONS_BY_SEVERITY,
        "Number of violations by severity"
    );
    describe_gauge!(
        CONTROL_STATUS,
        "Status of individual control (1=pass, 0=fail, -1=skipped)"
    );
    describe_gauge!(
        SCAN_INFO,
        "Information about the compliance exporter (always 1)"
    );

    describe_counter!(
        EXPORTER_FILES_INGESTED_TOTAL,
        "Total number of scan result files ingested"
    );
    describe_counter!(
        EXPORTER_FILE_ERRORS_TOTAL,
        "Total number of scan result files that failed to ingest"
    );
    describe_counter!(
        EXPORTER_PUBLISH_FAILURES_TOTAL,
        "Total number of gauge writes that failed"
    );
    describe_histogram!(
        EXPORTER_INGEST_DURATION_SECONDS,
        "Time to parse, classify and publish a single scan file in seconds"
    );
}
