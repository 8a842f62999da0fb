//! 인벤토리 저장소 포트.
//!
//! 구현: `invsnap-storage` crate (CSV 파일)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::inventory::{ExtractedItem, InventoryRecord, UpsertSummary};

/// item_name 기준 merge-on-write 저장소
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// 항목들을 병합 후 전체 재기록
    ///
    /// 센티넬/빈 이름은 건너뛴다. 쓰기 실패는 `CoreError::StoreWrite`.
    async fn upsert_all(&self, items: &[ExtractedItem]) -> Result<UpsertSummary, CoreError>;

    /// 현재 레코드 전체 (item_name 오름차순)
    async fn load(&self) -> Result<Vec<InventoryRecord>, CoreError>;
}
