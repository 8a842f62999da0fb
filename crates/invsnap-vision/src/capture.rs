//! 스크린 캡처.
//!
//! xcap 기반. 설정된 모니터를 캡처한 뒤 크롭 영역을 잘라낸다.

use image::{imageops, RgbaImage};
use invsnap_core::config::{CaptureConfig, CropRegion};
use invsnap_core::error::CoreError;
use invsnap_core::ports::screen_source::ScreenSource;
use tracing::{debug, warn};
use xcap::Monitor;

/// 스크린 캡처 — xcap 기반
pub struct ScreenCapture {
    monitor_index: usize,
    crop_region: Option<CropRegion>,
}

impl ScreenCapture {
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            monitor_index: config.monitor_index,
            crop_region: config.crop_region,
        }
    }

    /// 인덱스의 모니터, 없으면 주 모니터
    fn select_monitor(&self) -> Result<Monitor, CoreError> {
        let monitors = Monitor::all()
            .map_err(|e| CoreError::Capture(format!("모니터 목록 조회 실패: {e}")))?;
        let count = monitors.len();

        if self.monitor_index < count {
            return monitors
                .into_iter()
                .nth(self.monitor_index)
                .ok_or_else(|| CoreError::Capture("모니터를 찾을 수 없음".to_string()));
        }

        warn!(
            "모니터 인덱스 {} 없음 (모니터 {}개), 주 모니터 사용",
            self.monitor_index, count
        );
        if monitors.is_empty() {
            return Err(CoreError::Capture("모니터를 찾을 수 없음".to_string()));
        }
        let mut monitors = monitors;
        let primary = monitors
            .iter()
            .position(|m| m.is_primary().unwrap_or(false))
            .unwrap_or(0);
        Ok(monitors.swap_remove(primary))
    }
}

impl ScreenSource for ScreenCapture {
    fn capture(&self) -> Result<RgbaImage, CoreError> {
        let monitor = self.select_monitor()?;
        let image = monitor
            .capture_image()
            .map_err(|e| CoreError::Capture(format!("스크린 캡처 실패: {e}")))?;

        debug!("스크린 캡처 완료: {}x{}", image.width(), image.height());
        Ok(apply_crop(image, self.crop_region))
    }
}

/// 크롭 영역 적용. 영역이 모니터를 벗어나면 전체 이미지를 그대로 쓴다.
pub fn apply_crop(image: RgbaImage, crop: Option<CropRegion>) -> RgbaImage {
    let Some(crop) = crop else {
        return image;
    };

    let (width, height) = image.dimensions();
    let fits = crop.width > 0
        && crop.height > 0
        && crop.left.checked_add(crop.width).is_some_and(|r| r <= width)
        && crop.top.checked_add(crop.height).is_some_and(|b| b <= height);

    if !fits {
        warn!(
            "크롭 영역 {:?}이 모니터 {}x{} 밖, 전체 화면 사용",
            crop, width, height
        );
        return image;
    }

    imageops::crop_imm(&image, crop.left, crop.top, crop.width, crop.height).to_image()
}
