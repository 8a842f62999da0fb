//! 텍스트 감지 포트.
//!
//! 구현: `invsnap-vision` crate (rusty-tesseract)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::capture::Tile;

/// 로컬 텍스트 감지기 (OCR)
///
/// 인식한 원문 텍스트를 그대로 반환한다. 판정(영숫자 포함 여부)은 프리스크리너 몫.
#[async_trait]
pub trait TextDetector: Send + Sync {
    /// 타일에서 텍스트 인식
    async fn detect_text(&self, tile: &Tile) -> Result<String, CoreError>;

    /// 감지기 이름 (로그용)
    fn detector_name(&self) -> &str;
}
