//! 스캔 문서 파서
//!
//! 스캔 도구가 남긴 JSON 트리(profiles → controls → results)를 메모리 구조로 적재합니다.
//! 입력은 신뢰할 수 없으므로 스키마 검증은 하지 않고 필드 단위로 최선을 다해 읽습니다:
//! 누락되었거나 타입이 맞지 않는 필드는 `None`/빈 목록으로 떨어지고,
//! 문서 전체를 거부하는 경우는 최상위 구조를 인식할 수 없을 때뿐입니다.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::ScanIngestError;
use crate::report::ComplianceSummary;

/// 파싱된 스캔 문서
#[derive(Debug, Clone, PartialEq)]
pub enum ScanDocument {
    /// 프로파일 목록을 가진 원본 스캔 결과
    Profiles(RawScanDocument),
    /// 리포트 생성기가 남긴 점수 요약 (발행할 게이지 없음)
    ScoreSummary(ComplianceSummary),
}

impl ScanDocument {
    /// 프로파일 목록을 반환합니다. 점수 요약 문서는 빈 슬라이스입니다.
    pub fn profiles(&self) -> &[RawProfile] {
        match self {
            Self::Profiles(doc) => &doc.profiles,
            Self::ScoreSummary(_) => &[],
        }
    }
}

/// 원본 스캔 문서
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawScanDocument {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub profiles: Vec<RawProfile>,
}

/// 원본 프로파일 노드
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawProfile {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub controls: Vec<RawControl>,
}

impl RawProfile {
    /// 프로파일 이름 (없으면 `"unknown"`)
    pub fn name_or_unknown(&self) -> &str {
        self.name.as_deref().unwrap_or("unknown")
    }
}

/// 원본 컨트롤 노드
///
/// `id`는 분류기가 문자열로 해석할 수 있는지 판단해야 하므로 원본 값 그대로 둡니다.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawControl {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub impact: Option<f64>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub results: Vec<RawResult>,
}

/// 원본 체크 결과 노드
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawResult {
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub code_desc: Option<String>,
}

/// JSON 문자열을 스캔 문서로 파싱합니다.
///
/// # 최상위 구조 판별
///
/// 1. `profiles` 키가 있으면 원본 스캔 결과 (`profiles`가 배열이 아니면 거부)
/// 2. `compliance_score` 키가 있으면 점수 요약
/// 3. 그 외는 `MalformedDocument`
pub fn parse_document(content: &str, source_name: &str) -> Result<ScanDocument, ScanIngestError> {
    parse_document_bytes(content.as_bytes(), source_name)
}

/// 파일에서 읽은 바이트를 스캔 문서로 파싱합니다.
///
/// UTF-8이 아닌 입력은 JSON이 아니므로 `MalformedDocument`입니다.
pub fn parse_document_bytes(
    content: &[u8],
    source_name: &str,
) -> Result<ScanDocument, ScanIngestError> {
    let malformed = |reason: String| ScanIngestError::MalformedDocument {
        source_name: source_name.to_owned(),
        reason,
    };

    let value: Value =
        serde_json::from_slice(content).map_err(|e| malformed(format!("invalid JSON: {e}")))?;

    let Value::Object(map) = value else {
        return Err(malformed("top-level value is not an object".to_owned()));
    };

    if let Some(profiles) = map.get("profiles") {
        if !profiles.is_array() {
            return Err(malformed("'profiles' is not an array".to_owned()));
        }
        let doc: RawScanDocument = serde_json::from_value(Value::Object(map))
            .map_err(|e| malformed(format!("unreadable profiles: {e}")))?;
        return Ok(ScanDocument::Profiles(doc));
    }

    if map.contains_key("compliance_score") {
        let summary: ComplianceSummary = serde_json::from_value(Value::Object(map))
            .map_err(|e| malformed(format!("unreadable score summary: {e}")))?;
        return Ok(ScanDocument::ScoreSummary(summary));
    }

    Err(malformed(
        "unrecognized top-level shape: expected 'profiles' or 'compliance_score'".to_owned(),
    ))
}

// --- 관대한 필드 역직렬화 헬퍼 ---

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// 배열이 아니면 빈 목록, 읽을 수 없는 원소는 기본값으로 대체합니다.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_profiles_document() {
        let json = r#"{
            "profiles": [{
                "name": "aws-cis",
                "controls": [{
                    "id": "cis-aws-1.1",
                    "title": "Avoid root account",
                    "impact": 1.0,
                    "results": [{"status": "passed", "code_desc": "root has no keys"}]
                }]
            }]
        }"#;
        let doc = parse_document(json, "test.json").unwrap();
        let profiles = doc.profiles();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].name_or_unknown(), "aws-cis");
        let control = &profiles[0].controls[0];
        assert_eq!(control.id, Some(Value::String("cis-aws-1.1".to_owned())));
        assert_eq!(control.impact, Some(1.0));
        assert_eq!(control.results[0].status.as_deref(), Some("passed"));
        assert_eq!(
            control.results[0].code_desc.as_deref(),
            Some("root has no keys")
        );
        assert!(control.results[0].message.is_none());
    }

    #[test]
    fn missing_fields_degrade_to_defaults() {
        let json = r#"{"profiles": [{"controls": [{"id": "x"}]}]}"#;
        let doc = parse_document(json, "test.json").unwrap();
        let profile = &doc.profiles()[0];
        assert_eq!(profile.name_or_unknown(), "unknown");
        let control = &profile.controls[0];
        assert!(control.title.is_none());
        assert!(control.impact.is_none());
        assert!(control.results.is_empty());
    }

    #[test]
    fn wrong_field_types_are_tolerated() {
        let json = r#"{"profiles": [{
            "name": 42,
            "controls": [
                {"id": "a-b-c", "title": ["not", "a", "string"], "impact": "0.7", "results": "nope"},
                "not-an-object"
            ]
        }]}"#;
        let doc = parse_document(json, "test.json").unwrap();
        let profile = &doc.profiles()[0];
        assert!(profile.name.is_none());
        assert_eq!(profile.controls.len(), 2);
        assert!(profile.controls[0].title.is_none());
        assert_eq!(profile.controls[0].impact, Some(0.7));
        assert!(profile.controls[0].results.is_empty());
        // 객체가 아닌 컨트롤은 id 없는 기본값이 됨
        assert_eq!(profile.controls[1], RawControl::default());
    }

    #[test]
    fn unknown_shape_is_malformed() {
        let err = parse_document(r#"{"not_a_known_field": 1}"#, "odd.json").unwrap_err();
        assert!(matches!(err, ScanIngestError::MalformedDocument { .. }));
        assert!(err.to_string().contains("odd.json"));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = parse_document("{ this is not json", "broken.json").unwrap_err();
        assert!(matches!(err, ScanIngestError::MalformedDocument { .. }));
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        let err = parse_document_bytes(b"{\"profiles\": [{\"name\": \"\xff\"}]}", "bin.json")
            .unwrap_err();
        assert!(matches!(err, ScanIngestError::MalformedDocument { .. }));
        assert!(err.to_string().contains("bin.json"));
    }

    #[test]
    fn bytes_and_str_parse_identically() {
        let json = r#"{"profiles": [{"name": "p", "controls": []}]}"#;
        assert_eq!(
            parse_document_bytes(json.as_bytes(), "a.json").unwrap(),
            parse_document(json, "a.json").unwrap()
        );
    }

    #[test]
    fn non_object_top_level_is_malformed() {
        let err = parse_document("[1, 2, 3]", "array.json").unwrap_err();
        assert!(matches!(err, ScanIngestError::MalformedDocument { .. }));
    }

    #[test]
    fn non_array_profiles_is_malformed() {
        let err = parse_document(r#"{"profiles": {"name": "x"}}"#, "p.json").unwrap_err();
        assert!(err.to_string().contains("'profiles' is not an array"));
    }

    #[test]
    fn score_summary_is_recognized() {
        let json = r#"{
            "compliance_score": 80.0,
            "total_controls": 10,
            "passed": 8,
            "failed": 2,
            "skipped": 0,
            "timestamp": "2026-10-01T12:00:00+00:00",
            "profile": "aws-cis",
            "failed_control_ids": ["cis-aws-2.1", "cis-aws-2.2"]
        }"#;
        let doc = parse_document(json, "compliance_summary.json").unwrap();
        match &doc {
            ScanDocument::ScoreSummary(summary) => {
                assert_eq!(summary.compliance_score, 80.0);
                assert_eq!(summary.failed_control_ids.len(), 2);
            }
            other => panic!("expected score summary, got {other:?}"),
        }
        assert!(doc.profiles().is_empty());
    }

    #[test]
    fn empty_profiles_array_is_valid() {
        let doc = parse_document(r#"{"profiles": []}"#, "empty.json").unwrap();
        assert!(doc.profiles().is_empty());
        assert!(matches!(doc, ScanDocument::Profiles(_)));
    }
}
