//! OCR 프리스크린.
//!
//! 읽을 수 있는 텍스트가 없는 타일을 비전 모델 호출 전에 걸러낸다.
//! 감지 실패 시에는 타일을 통과시킨다 (fail-open).

use invsnap_core::models::capture::Tile;
use invsnap_core::ports::text_detector::TextDetector;
use std::sync::Arc;
use tracing::{debug, warn};

/// 텍스트 감지 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// 인식된 원문 텍스트 (빈 문자열 가능)
    Text(String),
    /// 감지 실패 사유
    Failed(String),
}

impl Detection {
    /// 타일 통과 여부. 실패는 통과로 취급한다.
    pub fn passes(&self) -> bool {
        match self {
            Detection::Text(text) => has_alphanumeric(text),
            Detection::Failed(_) => true,
        }
    }
}

/// 공백 제거 후 영숫자가 하나라도 있는지
pub fn has_alphanumeric(text: &str) -> bool {
    text.trim().chars().any(char::is_alphanumeric)
}

/// 타일 프리스크리너
///
/// `detector`가 None이면 (프리스크린 비활성) 모든 타일을 통과시킨다.
pub struct Prescreener {
    detector: Option<Arc<dyn TextDetector>>,
}

impl Prescreener {
    /// 감지기를 사용하는 프리스크리너
    pub fn new(detector: Arc<dyn TextDetector>) -> Self {
        Self {
            detector: Some(detector),
        }
    }

    /// 모든 타일을 통과시키는 프리스크리너
    pub fn disabled() -> Self {
        Self { detector: None }
    }

    /// 활성 여부
    pub fn is_enabled(&self) -> bool {
        self.detector.is_some()
    }

    /// 타일 하나에 대해 감지 실행
    pub async fn detect(&self, tile: &Tile) -> Detection {
        let Some(detector) = &self.detector else {
            return Detection::Text(String::new());
        };

        match detector.detect_text(tile).await {
            Ok(text) => Detection::Text(text),
            Err(e) => Detection::Failed(e.to_string()),
        }
    }

    /// 타일에 읽을 수 있는 텍스트가 있는지
    pub async fn has_text(&self, tile: &Tile) -> bool {
        if !self.is_enabled() {
            return true;
        }

        let detection = self.detect(tile).await;
        match &detection {
            Detection::Text(text) => {
                debug!(
                    "타일 ({}, {}) OCR: {:?} → {}",
                    tile.row,
                    tile.col,
                    text.trim(),
                    detection.passes()
                );
            }
            Detection::Failed(reason) => {
                warn!(
                    "타일 ({}, {}) 텍스트 감지 실패, 통과 처리: {}",
                    tile.row, tile.col, reason
                );
            }
        }
        detection.passes()
    }

    /// 텍스트가 있는 타일만 원래 순서대로 남긴다
    pub async fn filter(&self, tiles: Vec<Tile>) -> Vec<Tile> {
        if !self.is_enabled() {
            return tiles;
        }

        let total = tiles.len();
        let mut kept = Vec::with_capacity(total);
        for tile in tiles {
            if self.has_text(&tile).await {
                kept.push(tile);
            }
        }

        debug!("프리스크린: {}/{} 타일 통과", kept.len(), total);
        kept
    }
}
