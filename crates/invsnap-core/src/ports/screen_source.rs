//! 스크린 캡처 포트.
//!
//! 구현: `invsnap-vision` crate (xcap). 블로킹 호출이므로 `spawn_blocking`에서 사용.

use image::RgbaImage;

use crate::error::CoreError;

/// 캡처 이미지 공급자
pub trait ScreenSource: Send + Sync {
    /// 설정된 모니터/영역을 캡처
    fn capture(&self) -> Result<RgbaImage, CoreError>;
}
