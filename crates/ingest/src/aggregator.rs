//! 프로파일 집계
//!
//! 분류된 컨트롤 레코드를 프로파일 단위 요약([`ProfileSummary`])으로 접습니다.
//! 입력 순서를 보존하고 부수효과가 없으므로 같은 입력에 대해 항상 같은 결과를 냅니다.

use benchwatch_core::types::{ControlRecord, ControlStatus, ProfileSummary, SeverityCounts};

/// 통과율(%)을 소수 둘째 자리로 반올림해 계산합니다.
///
/// `total`이 0이면 0을 반환합니다.
pub fn compliance_score(passed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = passed as f64 / total as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

/// 레코드 목록을 프로파일 요약으로 집계합니다.
///
/// 심각도 분포는 실패한 컨트롤만 셉니다.
pub fn aggregate(profile_name: impl Into<String>, controls: Vec<ControlRecord>) -> ProfileSummary {
    let mut passed = 0;
    let mut failed = 0;
    let mut skipped = 0;
    let mut severity_counts = SeverityCounts::default();

    for control in &controls {
        match control.status {
            ControlStatus::Passed => passed += 1,
            ControlStatus::Failed => {
                failed += 1;
                severity_counts.increment(control.severity);
            }
            ControlStatus::Skipped => skipped += 1,
        }
    }

    let total = controls.len();
    ProfileSummary {
        profile_name: profile_name.into(),
        total,
        passed,
        failed,
        skipped,
        score_percent: compliance_score(passed, total),
        severity_counts,
        controls,
    }
}

#[cfg(test)]
mod tests {
    use benchwatch_core::types::Severity;

    use super::*;

    fn record(id: &str, status: ControlStatus, severity: Severity) -> ControlRecord {
        ControlRecord {
            id: id.to_owned(),
            title: format!("title {id}"),
            impact: 0.5,
            status,
            severity,
            section: "1".to_owned(),
            results: Vec::new(),
        }
    }

    #[test]
    fn empty_profile_scores_zero() {
        let summary = aggregate("empty", Vec::new());
        assert_eq!(summary.total, 0);
        assert_eq!(summary.score_percent, 0.0);
        assert_eq!(summary.severity_counts.total(), 0);
        assert_eq!(summary.severity_counts.iter().count(), 4);
    }

    #[test]
    fn eight_of_ten_passing() {
        let mut controls: Vec<_> = (0..8)
            .map(|i| record(&format!("cis-aws-1.{i}"), ControlStatus::Passed, Severity::Low))
            .collect();
        controls.push(record("cis-aws-2.1", ControlStatus::Failed, Severity::Critical));
        controls.push(record("cis-aws-2.2", ControlStatus::Failed, Severity::High));

        let summary = aggregate("aws", controls);
        assert_eq!(summary.total, 10);
        assert_eq!(summary.passed, 8);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.score_percent, 80.0);
        assert_eq!(summary.severity_counts.critical, 1);
        assert_eq!(summary.severity_counts.high, 1);
        assert_eq!(summary.severity_counts.medium, 0);
        assert_eq!(summary.severity_counts.low, 0);
    }

    #[test]
    fn counts_add_up_to_total() {
        let controls = vec![
            record("a-b-1", ControlStatus::Passed, Severity::Low),
            record("a-b-2", ControlStatus::Skipped, Severity::High),
            record("a-b-3", ControlStatus::Failed, Severity::Medium),
        ];
        let summary = aggregate("p", controls);
        assert_eq!(summary.passed + summary.failed + summary.skipped, summary.total);
        assert_eq!(summary.severity_counts.total(), summary.failed);
    }

    #[test]
    fn skipped_controls_do_not_count_toward_severity() {
        let controls = vec![record("a-b-1", ControlStatus::Skipped, Severity::Critical)];
        let summary = aggregate("p", controls);
        assert_eq!(summary.severity_counts.critical, 0);
    }

    #[test]
    fn score_rounds_to_two_decimals() {
        assert_eq!(compliance_score(1, 3), 33.33);
        assert_eq!(compliance_score(2, 3), 66.67);
        assert_eq!(compliance_score(3, 3), 100.0);
        assert_eq!(compliance_score(0, 5), 0.0);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let controls = vec![
            record("a-b-1", ControlStatus::Passed, Severity::Low),
            record("a-b-2", ControlStatus::Failed, Severity::High),
        ];
        let first = aggregate("p", controls.clone());
        let second = aggregate("p", controls);
        assert_eq!(first, second);
    }

    #[test]
    fn preserves_input_order() {
        let controls = vec![
            record("z-z-9", ControlStatus::Passed, Severity::Low),
            record("a-a-1", ControlStatus::Passed, Severity::Low),
        ];
        let summary = aggregate("p", controls);
        assert_eq!(summary.controls[0].id, "z-z-9");
        assert_eq!(summary.controls[1].id, "a-a-1");
    }
}
