//! 타일 단위 항목 추출기.
//!
//! 추출 실패는 배치를 중단하지 않는다. 로그를 남기고 `ERROR` 센티넬로 대체.
//! 재시도 없음.

use std::sync::Arc;
use tracing::{error, warn};

use invsnap_core::models::capture::Tile;
use invsnap_core::models::inventory::ExtractedItem;
use invsnap_core::ports::item_extractor::ItemExtractor;

/// 센티넬 대체 추출기
pub struct Extractor {
    client: Arc<dyn ItemExtractor>,
}

impl Extractor {
    pub fn new(client: Arc<dyn ItemExtractor>) -> Self {
        Self { client }
    }

    /// 타일 하나 추출. 실패 시 `ERROR` 센티넬
    pub async fn extract(&self, tile: &Tile) -> ExtractedItem {
        match self.client.extract_item(tile).await {
            Ok(item) => item,
            Err(e) if e.is_extraction_failure() => {
                warn!("타일 ({}, {}) 추출 실패: {}", tile.row, tile.col, e);
                ExtractedItem::error()
            }
            Err(e) => {
                error!("타일 ({}, {}) 추출 중 예상치 못한 에러: {}", tile.row, tile.col, e);
                ExtractedItem::error()
            }
        }
    }

    /// 타일들을 순서대로 하나씩 추출 (출력 순서 = 입력 순서)
    pub async fn extract_all(&self, tiles: &[Tile]) -> Vec<ExtractedItem> {
        let mut items = Vec::with_capacity(tiles.len());
        for tile in tiles {
            items.push(self.extract(tile).await);
        }
        items
    }
}
