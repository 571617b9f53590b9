//! 도메인 타입: 스캔 결과 정규화 모델
//!
//! 분류기와 집계기가 생성하고, 메트릭 퍼블리셔와 리포트 렌더러가 소비하는
//! 불변 구조체를 정의합니다. 외부 협력자(리포트 생성, 검색 백엔드 전송)는
//! 이 타입들만 보고 동작할 수 있어야 하므로 직렬화 형태를 안정적으로 유지합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 심각도 레벨
///
/// 컨트롤의 `impact` 값(0.0–1.0)에서 파생되는 위험 구간입니다.
/// `Ord` 구현으로 비교가 가능합니다 (`Low < Medium < High < Critical`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// impact < 0.4
    Low,
    /// 0.4 <= impact < 0.7
    Medium,
    /// 0.7 <= impact < 0.9
    High,
    /// impact >= 0.9
    Critical,
}

impl Severity {
    /// 모든 심각도 (높은 순)
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    /// impact 값으로 심각도를 결정합니다.
    ///
    /// 각 구간의 하한은 포함입니다 (0.9 → critical, 0.7 → high, 0.4 → medium).
    pub fn from_impact(impact: f64) -> Self {
        if impact >= 0.9 {
            Self::Critical
        } else if impact >= 0.7 {
            Self::High
        } else if impact >= 0.4 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// 메트릭 레이블에 쓰는 소문자 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 컨트롤 판정 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlStatus {
    /// 모든 결과가 통과
    Passed,
    /// 실패로 판정
    Failed,
    /// 실행 결과 없음 (또는 정책상 건너뜀)
    Skipped,
}

impl ControlStatus {
    /// 컨트롤 게이지 값 (1 = passed, 0 = failed, -1 = skipped)
    pub fn gauge_value(&self) -> f64 {
        match self {
            Self::Passed => 1.0,
            Self::Failed => 0.0,
            Self::Skipped => -1.0,
        }
    }

    /// 소문자 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for ControlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 개별 체크 실행 결과 (원본 그대로 보존, 리포트 렌더링용)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    /// 원본 상태 문자열 (`passed`, `failed`, `skipped` 등)
    pub status: Option<String>,
    /// 스캐너 메시지
    pub message: Option<String>,
    /// 체크 설명
    pub code_desc: Option<String>,
}

/// 분류된 컨트롤 레코드
///
/// 분류 패스마다 새로 만들어지며 생성 후 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlRecord {
    /// 컨트롤 식별자 (예: `cis-aws-1.1`)
    pub id: String,
    /// 컨트롤 제목
    pub title: String,
    /// 영향도 (0.0–1.0)
    pub impact: f64,
    /// 판정 결과
    pub status: ControlStatus,
    /// 심각도
    pub severity: Severity,
    /// 식별자에서 파생된 섹션 키
    pub section: String,
    /// 원본 실행 결과
    #[serde(default)]
    pub results: Vec<ResultEntry>,
}

/// 심각도별 실패 컨트롤 수
///
/// 네 구간 모두 항상 존재하므로 레이블 집합이 매 발행마다 완전합니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityCounts {
    /// 해당 심각도의 카운트를 1 증가시킵니다.
    pub fn increment(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
        }
    }

    /// 해당 심각도의 카운트를 반환합니다.
    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    /// 네 구간을 (심각도, 개수) 쌍으로 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (Severity, usize)> + '_ {
        Severity::ALL.into_iter().map(|s| (s, self.get(s)))
    }

    /// 전체 실패 수
    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

/// 프로파일 단위 집계 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    /// 프로파일 이름
    pub profile_name: String,
    /// 집계된 컨트롤 수
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// passed / total * 100, 소수 둘째 자리 반올림 (total = 0이면 0)
    pub score_percent: f64,
    /// 실패 컨트롤의 심각도 분포
    pub severity_counts: SeverityCounts,
    /// 입력 순서를 유지한 컨트롤 레코드
    pub controls: Vec<ControlRecord>,
}

impl ProfileSummary {
    /// 실패한 컨트롤 ID 목록 (입력 순서)
    pub fn failed_control_ids(&self) -> Vec<&str> {
        self.controls_with_status(ControlStatus::Failed)
            .map(|c| c.id.as_str())
            .collect()
    }

    /// 주어진 상태의 컨트롤만 순회합니다.
    pub fn controls_with_status(
        &self,
        status: ControlStatus,
    ) -> impl Iterator<Item = &ControlRecord> + '_ {
        self.controls.iter().filter(move |c| c.status == status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_thresholds() {
        assert_eq!(Severity::from_impact(0.95), Severity::Critical);
        assert_eq!(Severity::from_impact(0.75), Severity::High);
        assert_eq!(Severity::from_impact(0.5), Severity::Medium);
        assert_eq!(Severity::from_impact(0.1), Severity::Low);
    }

    #[test]
    fn severity_boundaries_map_to_higher_bucket() {
        assert_eq!(Severity::from_impact(0.9), Severity::Critical);
        assert_eq!(Severity::from_impact(0.7), Severity::High);
        assert_eq!(Severity::from_impact(0.4), Severity::Medium);
        assert_eq!(Severity::from_impact(0.0), Severity::Low);
        assert_eq!(Severity::from_impact(1.0), Severity::Critical);
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
    }

    #[test]
    fn status_gauge_values() {
        assert_eq!(ControlStatus::Passed.gauge_value(), 1.0);
        assert_eq!(ControlStatus::Failed.gauge_value(), 0.0);
        assert_eq!(ControlStatus::Skipped.gauge_value(), -1.0);
    }

    #[test]
    fn severity_counts_iter_covers_all_buckets() {
        let mut counts = SeverityCounts::default();
        counts.increment(Severity::High);
        counts.increment(Severity::High);
        let pairs: Vec<_> = counts.iter().collect();
        assert_eq!(
            pairs,
            vec![
                (Severity::Critical, 0),
                (Severity::High, 2),
                (Severity::Medium, 0),
                (Severity::Low, 0),
            ]
        );
        assert_eq!(counts.total(), 2);
    }

    fn record(id: &str, status: ControlStatus) -> ControlRecord {
        ControlRecord {
            id: id.to_owned(),
            title: String::new(),
            impact: 0.5,
            status,
            severity: Severity::Medium,
            section: "unknown".to_owned(),
            results: Vec::new(),
        }
    }

    #[test]
    fn failed_control_ids_preserves_order() {
        let summary = ProfileSummary {
            profile_name: "p".to_owned(),
            total: 3,
            passed: 1,
            failed: 2,
            skipped: 0,
            score_percent: 33.33,
            severity_counts: SeverityCounts::default(),
            controls: vec![
                record("b-1", ControlStatus::Failed),
                record("a-1", ControlStatus::Passed),
                record("c-1", ControlStatus::Failed),
            ],
        };
        assert_eq!(summary.failed_control_ids(), vec!["b-1", "c-1"]);
    }
}
