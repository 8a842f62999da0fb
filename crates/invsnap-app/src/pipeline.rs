//! 캡처 처리 파이프라인.
//!
//! 타일 분할 → 프리스크린 → 타일별 추출 → 저장소 병합.

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use invsnap_core::config::GridConfig;
use invsnap_core::error::CoreError;
use invsnap_core::models::capture::CaptureTask;
use invsnap_core::models::inventory::{UpsertSummary, SENTINEL_ERROR};
use invsnap_core::ports::inventory_store::InventoryStore;
use invsnap_network::extractor::Extractor;
use invsnap_vision::debug_images::save_debug_image;
use invsnap_vision::prescreen::Prescreener;
use invsnap_vision::tiler;

use crate::queue::TaskHandler;

/// 태스크 처리 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// 프리스크린을 통과한 타일 없음
    NoContent,
    /// 추출 후 저장 완료
    Stored {
        /// 추출 요청 수 (= 통과 타일 수)
        extracted: usize,
        /// 그중 ERROR 센티넬로 대체된 수
        failed: usize,
        summary: UpsertSummary,
    },
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskOutcome::NoContent => write!(f, "감지된 내용 없음"),
            TaskOutcome::Stored {
                extracted,
                failed,
                summary,
            } => {
                write!(
                    f,
                    "{} 갱신, {} 추가 (전체 {}, 타일 {}",
                    summary.updated, summary.added, summary.total, extracted
                )?;
                if *failed > 0 {
                    write!(f, ", 추출 실패 {failed}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// 캡처 한 장을 처리하는 파이프라인
pub struct CapturePipeline {
    grid: GridConfig,
    prescreener: Prescreener,
    extractor: Extractor,
    store: Arc<dyn InventoryStore>,
    /// 디버그 이미지 디렉토리 (None이면 저장 안 함)
    debug_dir: Option<PathBuf>,
}

impl CapturePipeline {
    pub fn new(
        grid: GridConfig,
        prescreener: Prescreener,
        extractor: Extractor,
        store: Arc<dyn InventoryStore>,
    ) -> Self {
        Self {
            grid,
            prescreener,
            extractor,
            store,
            debug_dir: None,
        }
    }

    /// 캡처 원본과 타일을 디렉토리에 저장
    pub fn with_debug_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.debug_dir = Some(dir.into());
        self
    }

    /// 태스크 하나 처리
    pub async fn process(&self, task: &CaptureTask) -> Result<TaskOutcome, CoreError> {
        if let Some(dir) = &self.debug_dir {
            save_debug_image(&task.image, dir, &format!("task{}_capture", task.id));
        }

        let tiles = tiler::split(&task.image, self.grid.rows, self.grid.cols)?;

        if let Some(dir) = &self.debug_dir {
            for tile in &tiles {
                let prefix = format!("task{}_tile_{}", task.id, tile.index(self.grid.cols));
                save_debug_image(&tile.image, dir, &prefix);
            }
        }

        let tiles = self.prescreener.filter(tiles).await;
        debug!(
            "태스크 #{}: 프리스크린 통과 {}/{}",
            task.id,
            tiles.len(),
            self.grid.tile_count()
        );
        if tiles.is_empty() {
            return Ok(TaskOutcome::NoContent);
        }

        let items = self.extractor.extract_all(&tiles).await;
        let failed = items
            .iter()
            .filter(|item| item.item_name == SENTINEL_ERROR)
            .count();
        debug!("태스크 #{}: 타일 {}개 추출, 실패 {}", task.id, items.len(), failed);

        let summary = self.store.upsert_all(&items).await?;

        Ok(TaskOutcome::Stored {
            extracted: items.len(),
            failed,
            summary,
        })
    }
}

#[async_trait]
impl TaskHandler for CapturePipeline {
    async fn handle(&self, task: CaptureTask) -> Result<TaskOutcome, CoreError> {
        self.process(&task).await
    }
}
