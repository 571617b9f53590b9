//! 컨트롤 분류기
//!
//! 원본 컨트롤 노드를 [`ControlRecord`]로 정규화하는 순수 함수 모음입니다.
//! 상태(passed/failed/skipped), 심각도, 섹션 키를 결정하며 부수효과가 없습니다.
//! 경고 로그는 호출자(수집 루프)가 반환된 에러를 보고 남깁니다.
//!
//! # 상태 판정 정책
//!
//! 원본 스캔 도구 주변의 두 생산자가 "결과는 있지만 전부 통과는 아니고,
//! 명시적 실패도 없는" 경우(예: skipped + passed 혼합)를 다르게 판정합니다.
//! 두 규칙 모두 [`StatusPolicy`]로 제공합니다.
//!
//! | 결과                     | `FailOnAnyNonPassed` | `SkipUnlessFailed` |
//! |--------------------------|----------------------|--------------------|
//! | 없음                     | skipped              | skipped            |
//! | 전부 `passed`            | passed               | passed             |
//! | `failed` 하나 이상       | failed               | failed             |
//! | 그 외 (`skipped` 혼합 등) | failed               | skipped            |

use serde::{Deserialize, Serialize};
use serde_json::Value;

use benchwatch_core::types::{ControlRecord, ControlStatus, ResultEntry, Severity};

use crate::config::IngestConfig;
use crate::document::{RawControl, RawProfile, RawResult};
use crate::error::ScanIngestError;

/// impact 누락 시 기본값
pub const DEFAULT_IMPACT: f64 = 0.5;

/// 섹션을 도출할 수 없을 때의 키
pub const UNKNOWN_SECTION: &str = "unknown";

/// 상태 판정 정책
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusPolicy {
    /// 전부 통과가 아니면 실패 (메트릭 익스포터 규칙)
    #[default]
    FailOnAnyNonPassed,
    /// 명시적 `failed`가 있을 때만 실패, 나머지는 건너뜀 (리포트 생성기 규칙)
    SkipUnlessFailed,
}

impl StatusPolicy {
    /// 설정 이름(`STATUS_POLICIES`)에서 정책을 찾습니다.
    pub fn from_config_name(name: &str) -> Option<Self> {
        match name {
            "fail_on_any_non_passed" => Some(Self::FailOnAnyNonPassed),
            "skip_unless_failed" => Some(Self::SkipUnlessFailed),
            _ => None,
        }
    }
}

/// 섹션 키 추출 전략
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStrategy {
    /// `-`로 나눈 세 번째 조각 그대로 (`cis-aws-1.1` → `1.1`)
    #[default]
    ThirdSegment,
    /// 세 번째 조각에서 첫 `.` 앞부분만 (`cis-aws-1.1` → `1`)
    DotPrefix,
}

impl SectionStrategy {
    /// 설정 이름(`SECTION_STRATEGIES`)에서 전략을 찾습니다.
    pub fn from_config_name(name: &str) -> Option<Self> {
        match name {
            "third_segment" => Some(Self::ThirdSegment),
            "dot_prefix" => Some(Self::DotPrefix),
            _ => None,
        }
    }
}

/// 결과 목록으로 컨트롤 상태를 판정합니다.
pub fn classify_status(results: &[RawResult], policy: StatusPolicy) -> ControlStatus {
    let status_is = |r: &RawResult, expected: &str| r.status.as_deref() == Some(expected);

    if results.is_empty() {
        return ControlStatus::Skipped;
    }
    if results.iter().all(|r| status_is(r, "passed")) {
        return ControlStatus::Passed;
    }

    match policy {
        StatusPolicy::FailOnAnyNonPassed => ControlStatus::Failed,
        StatusPolicy::SkipUnlessFailed => {
            if results.iter().any(|r| status_is(r, "failed")) {
                ControlStatus::Failed
            } else {
                ControlStatus::Skipped
            }
        }
    }
}

/// 컨트롤 ID에서 섹션 키를 도출합니다.
///
/// `-`로 나눈 조각이 세 개 이상이면 세 번째 조각을 쓰고, 아니면 `"unknown"`입니다.
pub fn section_key(id: &str, strategy: SectionStrategy) -> String {
    let Some(segment) = id.split('-').nth(2) else {
        return UNKNOWN_SECTION.to_owned();
    };

    match strategy {
        SectionStrategy::ThirdSegment => segment.to_owned(),
        SectionStrategy::DotPrefix => segment
            .split('.')
            .next()
            .unwrap_or(segment)
            .to_owned(),
    }
}

/// 컨트롤 ID 값을 문자열로 해석합니다.
///
/// 문자열은 빈 문자열까지 그대로, 정수는 10진 문자열로 바꿉니다.
/// null, 실수, 배열, 객체는 해석할 수 없습니다.
pub fn resolve_id(id: Option<&Value>) -> Result<String, String> {
    match id {
        None | Some(Value::Null) => Err("missing id".to_owned()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
        Some(other) => Err(format!("id is not a string: {other}")),
    }
}

/// 프로파일 하나의 분류 결과
#[derive(Debug)]
pub struct ClassifiedProfile {
    /// 프로파일 이름
    pub name: String,
    /// 분류된 레코드 (입력 순서)
    pub records: Vec<ControlRecord>,
    /// 집계에서 제외된 컨트롤
    pub rejected: Vec<ScanIngestError>,
}

/// 컨트롤 분류기
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classifier {
    status_policy: StatusPolicy,
    section_strategy: SectionStrategy,
}

impl Classifier {
    /// 정책을 지정해 분류기를 생성합니다.
    pub fn new(status_policy: StatusPolicy, section_strategy: SectionStrategy) -> Self {
        Self {
            status_policy,
            section_strategy,
        }
    }

    /// 수집 설정의 정책으로 분류기를 생성합니다.
    pub fn from_config(config: &IngestConfig) -> Self {
        Self::new(config.status_policy, config.section_strategy)
    }

    pub fn status_policy(&self) -> StatusPolicy {
        self.status_policy
    }

    pub fn section_strategy(&self) -> SectionStrategy {
        self.section_strategy
    }

    /// 컨트롤 하나를 분류합니다.
    ///
    /// # Errors
    ///
    /// `id`를 문자열로 해석할 수 없으면 `ScanIngestError::MalformedControl`
    pub fn classify(
        &self,
        profile: &str,
        index: usize,
        control: &RawControl,
    ) -> Result<ControlRecord, ScanIngestError> {
        let id = resolve_id(control.id.as_ref()).map_err(|reason| {
            ScanIngestError::MalformedControl {
                profile: profile.to_owned(),
                index,
                reason,
            }
        })?;

        let impact = control
            .impact
            .filter(|v| v.is_finite())
            .unwrap_or(DEFAULT_IMPACT);

        Ok(ControlRecord {
            section: section_key(&id, self.section_strategy),
            title: control.title.clone().unwrap_or_default(),
            impact,
            status: classify_status(&control.results, self.status_policy),
            severity: Severity::from_impact(impact),
            results: control
                .results
                .iter()
                .map(|r| ResultEntry {
                    status: r.status.clone(),
                    message: r.message.clone(),
                    code_desc: r.code_desc.clone(),
                })
                .collect(),
            id,
        })
    }

    /// 프로파일의 모든 컨트롤을 분류합니다.
    ///
    /// 해석할 수 없는 컨트롤은 `rejected`로 모으고 나머지는 계속 분류합니다.
    pub fn classify_profile(&self, profile: &RawProfile) -> ClassifiedProfile {
        let name = profile.name_or_unknown().to_owned();
        let mut records = Vec::with_capacity(profile.controls.len());
        let mut rejected = Vec::new();

        for (index, control) in profile.controls.iter().enumerate() {
            match self.classify(&name, index, control) {
                Ok(record) => records.push(record),
                Err(e) => rejected.push(e),
            }
        }

        ClassifiedProfile {
            name,
            records,
            rejected,
        }
    }
}
