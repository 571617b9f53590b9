//! benchwatch.toml 통합 설정 테스트
//!
//! - benchwatch.toml.example 파싱 테스트
//! - 부분 설정 (일부 섹션만) 로딩 테스트
//! - 환경변수 우선순위 테스트
//! - 빈 파일 / 잘못된 형식 에러 테스트

use benchwatch_core::config::BenchwatchConfig;
use benchwatch_core::error::{BenchwatchError, ConfigError};

const EXAMPLE: &str = include_str!("../../../benchwatch.toml.example");

// =============================================================================
// benchwatch.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_and_validates() {
    let config = BenchwatchConfig::parse(EXAMPLE).expect("example config should parse");
    config
        .validate()
        .expect("example config should pass validation");

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.watch.initial_file, "inspec_aws_report.json");
    assert_eq!(config.classifier.section_strategy, "third_segment");
}

#[test]
fn example_config_matches_code_defaults() {
    let from_file = BenchwatchConfig::parse(EXAMPLE).expect("should parse");
    let from_code = BenchwatchConfig::default();

    assert_eq!(from_file.general.log_level, from_code.general.log_level);
    assert_eq!(from_file.general.log_format, from_code.general.log_format);

    assert_eq!(from_file.metrics.enabled, from_code.metrics.enabled);
    assert_eq!(from_file.metrics.listen_addr, from_code.metrics.listen_addr);
    assert_eq!(from_file.metrics.port, from_code.metrics.port);
    assert_eq!(from_file.metrics.endpoint, from_code.metrics.endpoint);

    assert_eq!(from_file.watch.results_dir, from_code.watch.results_dir);
    assert_eq!(from_file.watch.environment, from_code.watch.environment);
    assert_eq!(
        from_file.watch.poll_interval_secs,
        from_code.watch.poll_interval_secs
    );
    assert_eq!(from_file.watch.initial_file, from_code.watch.initial_file);
    assert_eq!(from_file.watch.max_file_size, from_code.watch.max_file_size);

    assert_eq!(
        from_file.classifier.status_policy,
        from_code.classifier.status_policy
    );
    assert_eq!(
        from_file.classifier.section_strategy,
        from_code.classifier.section_strategy
    );
}

// =============================================================================
// 부분 설정 로딩 테스트
// =============================================================================

#[test]
fn partial_config_watch_only() {
    let toml = r#"
[watch]
results_dir = "/srv/inspec"
environment = "staging"
"#;
    let config = BenchwatchConfig::parse(toml).expect("should parse");
    config.validate().expect("should validate");

    assert_eq!(config.watch.results_dir, "/srv/inspec");
    assert_eq!(config.watch.environment, "staging");
    // 나머지는 기본값
    assert_eq!(config.watch.poll_interval_secs, 10);
    assert_eq!(config.metrics.port, 9090);
    assert_eq!(config.classifier.status_policy, "fail_on_any_non_passed");
}

#[test]
fn partial_config_classifier_only() {
    let toml = r#"
[classifier]
status_policy = "skip_unless_failed"
section_strategy = "dot_prefix"
"#;
    let config = BenchwatchConfig::parse(toml).expect("should parse");
    config.validate().expect("should validate");

    assert_eq!(config.classifier.status_policy, "skip_unless_failed");
    assert_eq!(config.classifier.section_strategy, "dot_prefix");
    assert_eq!(config.general.log_level, "info");
}

#[test]
fn partial_config_metrics_disabled_allows_empty_listen_addr() {
    let toml = r#"
[metrics]
enabled = false
listen_addr = ""
port = 0
"#;
    let config = BenchwatchConfig::parse(toml).expect("should parse");
    config
        .validate()
        .expect("disabled metrics skip address checks");
}

// =============================================================================
// 파일 로딩 테스트
// =============================================================================

#[tokio::test]
async fn from_file_reads_toml_on_disk() {
    let file = tempfile::NamedTempFile::new().expect("temp file");
    std::fs::write(file.path(), "[watch]\npoll_interval_secs = 60\n").expect("write");

    let config = BenchwatchConfig::from_file(file.path())
        .await
        .expect("should load");
    assert_eq!(config.watch.poll_interval_secs, 60);
}

#[tokio::test]
async fn from_file_missing_path_is_file_not_found() {
    let err = BenchwatchConfig::from_file("/nonexistent/benchwatch.toml")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BenchwatchError::Config(ConfigError::FileNotFound { .. })
    ));
}

#[tokio::test]
async fn from_file_rejects_invalid_values() {
    let file = tempfile::NamedTempFile::new().expect("temp file");
    std::fs::write(file.path(), "[watch]\nresults_dir = \"../outside\"\n").expect("write");

    let err = BenchwatchConfig::from_file(file.path()).await.unwrap_err();
    assert!(matches!(
        err,
        BenchwatchError::Config(ConfigError::InvalidValue { .. })
    ));
}

// =============================================================================
// 환경변수 우선순위 테스트
// =============================================================================

#[test]
#[serial_test::serial]
fn env_override_beats_toml_value() {
    let toml = r#"
[watch]
environment = "staging"
"#;

    let original = std::env::var("ENVIRONMENT").ok();
    // SAFETY: #[serial]로 환경변수를 만지는 테스트끼리 직렬 실행됩니다.
    unsafe {
        std::env::set_var("ENVIRONMENT", "dr-site");
    }

    let mut config = BenchwatchConfig::parse(toml).expect("should parse");
    config.apply_env_overrides();
    let result = config.watch.environment.clone();

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("ENVIRONMENT", val),
            None => std::env::remove_var("ENVIRONMENT"),
        }
    }

    assert_eq!(result, "dr-site");
}

#[test]
#[serial_test::serial]
fn env_override_classifier_section() {
    let original = std::env::var("BENCHWATCH_CLASSIFIER_SECTION_STRATEGY").ok();
    // SAFETY: #[serial]로 환경변수를 만지는 테스트끼리 직렬 실행됩니다.
    unsafe {
        std::env::set_var("BENCHWATCH_CLASSIFIER_SECTION_STRATEGY", "dot_prefix");
    }

    let mut config = BenchwatchConfig::parse("").expect("should parse");
    config.apply_env_overrides();
    let result = config.classifier.section_strategy.clone();

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("BENCHWATCH_CLASSIFIER_SECTION_STRATEGY", val),
            None => std::env::remove_var("BENCHWATCH_CLASSIFIER_SECTION_STRATEGY"),
        }
    }

    assert_eq!(result, "dot_prefix");
}

#[test]
#[serial_test::serial]
fn env_override_invalid_number_keeps_toml_value() {
    let toml = r#"
[watch]
poll_interval_secs = 30
"#;

    let original = std::env::var("BENCHWATCH_WATCH_POLL_INTERVAL_SECS").ok();
    // SAFETY: #[serial]로 환경변수를 만지는 테스트끼리 직렬 실행됩니다.
    unsafe {
        std::env::set_var("BENCHWATCH_WATCH_POLL_INTERVAL_SECS", "soon");
    }

    let mut config = BenchwatchConfig::parse(toml).expect("should parse");
    config.apply_env_overrides();
    let result = config.watch.poll_interval_secs;

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("BENCHWATCH_WATCH_POLL_INTERVAL_SECS", val),
            None => std::env::remove_var("BENCHWATCH_WATCH_POLL_INTERVAL_SECS"),
        }
    }

    assert_eq!(result, 30);
}

// =============================================================================
// 빈 파일 / 잘못된 형식 에러 테스트
// =============================================================================

#[test]
fn empty_string_parses_with_defaults() {
    let config = BenchwatchConfig::parse("").expect("empty string should parse");
    config.validate().expect("should validate");
    assert_eq!(config.general.log_level, "info");
    assert!(config.metrics.enabled);
}

#[test]
fn comments_only_parses_with_defaults() {
    let toml = r#"
# 주석만 있는 파일
# [watch]
"#;
    let config = BenchwatchConfig::parse(toml).expect("comments-only should parse");
    config.validate().expect("should validate");
}

#[test]
fn malformed_toml_returns_parse_error() {
    let result = BenchwatchConfig::parse("[watch");
    assert!(matches!(
        result.unwrap_err(),
        BenchwatchError::Config(ConfigError::ParseFailed { .. })
    ));
}

#[test]
fn wrong_type_for_numeric_field() {
    let toml = r#"
[watch]
poll_interval_secs = "ten"
"#;
    assert!(matches!(
        BenchwatchConfig::parse(toml).unwrap_err(),
        BenchwatchError::Config(ConfigError::ParseFailed { .. })
    ));
}

#[test]
fn unknown_section_is_ignored() {
    let toml = r#"
[watch]
environment = "qa"

[elasticsearch]
url = "http://localhost:9200"
"#;
    let config = BenchwatchConfig::parse(toml).expect("unknown sections are ignored");
    assert_eq!(config.watch.environment, "qa");
}

#[test]
fn validation_rejects_unknown_section_strategy() {
    let toml = r#"
[classifier]
section_strategy = "by_title"
"#;
    let config = BenchwatchConfig::parse(toml).expect("should parse");
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("classifier.section_strategy"));
}
