//! 디버그 이미지 저장.
//!
//! 파일 이름: `<prefix>_<YYYYmmdd-HHMMSS>.png`. 실패는 로그만 남긴다.

use image::RgbaImage;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 디버그 이미지 파일 경로
pub fn debug_image_path(dir: &Path, prefix: &str) -> PathBuf {
    let ts = chrono::Local::now().format("%Y%m%d-%H%M%S");
    dir.join(format!("{prefix}_{ts}.png"))
}

/// 이미지를 PNG로 저장. 성공 시 경로 반환
pub fn save_debug_image(image: &RgbaImage, dir: &Path, prefix: &str) -> Option<PathBuf> {
    if let Err(e) = fs::create_dir_all(dir) {
        warn!("디버그 디렉토리 생성 실패: {}: {e}", dir.display());
        return None;
    }

    let path = debug_image_path(dir, prefix);
    match image.save(&path) {
        Ok(()) => {
            debug!("디버그 이미지 저장: {}", path.display());
            Some(path)
        }
        Err(e) => {
            warn!("디버그 이미지 저장 실패: {}: {e}", path.display());
            None
        }
    }
}
