//! # invsnap-core
//!
//! invsnap 도메인 모델, 포트(trait) 정의, 에러 타입.
//! 모든 크레이트가 공유하는 핵심 타입과 인터페이스를 제공한다.
//!
//! ## 구조
//!
//! - [`models`] — 캡처 태스크, 타일, 인벤토리 항목/레코드
//! - [`ports`] — 텍스트 감지, 항목 추출, 저장소, 화면 소스 포트
//! - [`error`] — `CoreError` (태스크 실패와 타일 단위 실패 구분)
//! - [`config`] — 캡처/그리드/비전 API/저장소/워커 설정
//! - [`config_manager`] — `config.json` 로드, 기본값 생성, 검증 후 저장

pub mod config;
pub mod config_manager;
pub mod error;
pub mod models;
pub mod ports;

#[cfg(test)]
mod tests {
    use crate::models::inventory::{ExtractedItem, UpsertSummary};

    #[test]
    fn extracted_item_serde_roundtrip() {
        let item = ExtractedItem::new("Wood", Some(10), Some(50));
        let json = serde_json::to_string(&item).unwrap();
        let deserialized: ExtractedItem = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, item);
    }

    #[test]
    fn summary_default_is_zero() {
        let summary = UpsertSummary::default();
        assert_eq!((summary.updated, summary.added, summary.total), (0, 0, 0));
    }

    #[test]
    fn config_defaults() {
        let config = crate::config::AppConfig::default_config();
        assert_eq!(config.grid.rows, 2);
        assert_eq!(config.grid.cols, 4);
        assert_eq!(
            config.vision_api.endpoint,
            "http://localhost:11434/api/generate"
        );
        assert_eq!(config.vision_api.model, "qwen3-vl:8b");
        assert_eq!(config.worker.poll_interval_ms, 1_000);
        let crop = config.capture.crop_region.unwrap();
        assert_eq!((crop.left, crop.top, crop.width, crop.height), (835, 900, 1360, 300));
    }
}
