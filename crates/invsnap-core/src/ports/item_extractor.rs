//! 항목 추출 포트.
//!
//! 구현: `invsnap-network` crate (reqwest, Ollama `/api/generate`)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::capture::Tile;
use crate::models::inventory::ExtractedItem;

/// 비전 모델 기반 항목 추출기
///
/// 타일 하나당 요청 하나. 실패는 `Err`로 그대로 돌려주고 센티넬 대체는 호출자가 한다.
#[async_trait]
pub trait ItemExtractor: Send + Sync {
    /// 타일에서 항목 추출
    async fn extract_item(&self, tile: &Tile) -> Result<ExtractedItem, CoreError>;
}
