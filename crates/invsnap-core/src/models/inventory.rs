//! 인벤토리 항목/레코드 모델.

use serde::{Deserialize, Serialize};

/// 내용 없음 센티넬 이름
pub const SENTINEL_NONE: &str = "NONE";
/// 추출 실패 센티넬 이름
pub const SENTINEL_ERROR: &str = "ERROR";

/// 타일 하나에서 추출한 항목
///
/// 모델 응답 JSON(`item_name`, `required_count`, `available_count`)과 같은 모양.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedItem {
    pub item_name: String,
    #[serde(default)]
    pub required_count: Option<i64>,
    #[serde(default)]
    pub available_count: Option<i64>,
}

impl ExtractedItem {
    pub fn new(
        item_name: impl Into<String>,
        required_count: Option<i64>,
        available_count: Option<i64>,
    ) -> Self {
        Self {
            item_name: item_name.into(),
            required_count,
            available_count,
        }
    }

    /// `NONE` 센티넬 (타일에 내용 없음)
    pub fn none() -> Self {
        Self::new(SENTINEL_NONE, None, None)
    }

    /// `ERROR` 센티넬 (추출 실패)
    pub fn error() -> Self {
        Self::new(SENTINEL_ERROR, None, None)
    }

    /// 영속 대상에서 제외되는 이름인지 (빈 이름, NONE, ERROR)
    pub fn is_sentinel(&self) -> bool {
        is_sentinel_name(&self.item_name)
    }
}

/// 빈 이름 / 센티넬 이름 판정 (앞뒤 공백 무시)
pub fn is_sentinel_name(name: &str) -> bool {
    let name = name.trim();
    name.is_empty() || name == SENTINEL_NONE || name == SENTINEL_ERROR
}

/// 저장된 인벤토리 한 행 (item_name 기준 유일)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// 마지막 갱신 시각 (`YYYY-MM-DDTHH:MM:SS`, 로컬)
    pub timestamp: String,
    pub item_name: String,
    pub available_count: Option<i64>,
    pub required_count: Option<i64>,
}

impl InventoryRecord {
    pub fn from_item(item: &ExtractedItem, timestamp: &str) -> Self {
        Self {
            timestamp: timestamp.to_string(),
            item_name: item.item_name.trim().to_string(),
            available_count: item.available_count,
            required_count: item.required_count,
        }
    }
}

/// upsert 결과 요약
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertSummary {
    /// 기존 키를 덮어쓴 수
    pub updated: usize,
    /// 새로 추가된 수
    pub added: usize,
    /// 쓰기 후 전체 행 수
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_are_detected() {
        assert!(ExtractedItem::none().is_sentinel());
        assert!(ExtractedItem::error().is_sentinel());
        assert!(ExtractedItem::new("  ", Some(1), None).is_sentinel());
        assert!(ExtractedItem::new(" ERROR ", None, None).is_sentinel());
        assert!(!ExtractedItem::new("Wood", Some(10), Some(50)).is_sentinel());
        // 대소문자는 구분
        assert!(!ExtractedItem::new("none", None, None).is_sentinel());
    }

    #[test]
    fn missing_counts_deserialize_as_none() {
        let item: ExtractedItem = serde_json::from_str(r#"{"item_name": "Stone"}"#).unwrap();
        assert_eq!(item, ExtractedItem::new("Stone", None, None));

        let item: ExtractedItem = serde_json::from_str(
            r#"{"item_name": "Wood", "required_count": 10, "available_count": null}"#,
        )
        .unwrap();
        assert_eq!(item.required_count, Some(10));
        assert_eq!(item.available_count, None);
    }

    #[test]
    fn record_trims_name() {
        let record = InventoryRecord::from_item(
            &ExtractedItem::new(" Wood ", Some(10), Some(50)),
            "2026-01-01T00:00:00",
        );
        assert_eq!(record.item_name, "Wood");
        assert_eq!(record.available_count, Some(50));
        assert_eq!(record.required_count, Some(10));
    }
}
