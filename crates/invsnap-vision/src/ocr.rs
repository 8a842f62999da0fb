//! Tesseract 텍스트 감지기.
//!
//! `rusty-tesseract`는 시스템 `tesseract` CLI를 호출한다.
//! 바이너리가 없으면 감지 실패로 보고되고, 프리스크린은 fail-open으로 처리한다.

use async_trait::async_trait;
use image::DynamicImage;
use invsnap_core::error::CoreError;
use invsnap_core::models::capture::Tile;
use invsnap_core::ports::text_detector::TextDetector;
use rusty_tesseract::{Args, Image};
use std::collections::HashMap;
use tracing::debug;

/// Tesseract 기반 감지기
pub struct TesseractDetector {
    /// Tesseract 언어 코드 (예: "eng")
    language: String,
}

impl TesseractDetector {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    fn args(&self) -> Args {
        Args {
            lang: self.language.clone(),
            config_variables: HashMap::new(),
            dpi: Some(150),
            psm: Some(3),
            oem: Some(3),
        }
    }

    /// 그레이스케일 변환 후 OCR 실행 (동기)
    pub fn recognize(&self, image: &DynamicImage) -> Result<String, CoreError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(CoreError::Detection("빈 이미지: 너비 또는 높이가 0".to_string()));
        }

        let gray = DynamicImage::ImageLuma8(image.to_luma8());
        let tess_image = Image::from_dynamic_image(&gray)
            .map_err(|e| CoreError::Detection(format!("OCR 이미지 변환 실패: {e}")))?;

        let text = rusty_tesseract::image_to_string(&tess_image, &self.args())
            .map_err(|e| CoreError::Detection(format!("Tesseract 실행 실패: {e}")))?;

        Ok(text)
    }
}

#[async_trait]
impl TextDetector for TesseractDetector {
    async fn detect_text(&self, tile: &Tile) -> Result<String, CoreError> {
        let image = DynamicImage::ImageRgba8(tile.image.clone());
        let detector = TesseractDetector::new(self.language.clone());

        // Tesseract는 프로세스 호출이므로 블로킹 스레드에서 실행
        let text = tokio::task::spawn_blocking(move || detector.recognize(&image))
            .await
            .map_err(|e| CoreError::Detection(format!("OCR 작업 조인 실패: {e}")))??;

        debug!("OCR 완료 ({}, {}): {} chars", tile.row, tile.col, text.len());
        Ok(text)
    }

    fn detector_name(&self) -> &str {
        "tesseract"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_image_is_detection_error() {
        let detector = TesseractDetector::new("eng");
        let image = DynamicImage::new_rgba8(0, 0);
        assert!(matches!(
            detector.recognize(&image),
            Err(CoreError::Detection(_))
        ));
    }

    #[test]
    fn args_use_configured_language() {
        let detector = TesseractDetector::new("kor");
        let args = detector.args();
        assert_eq!(args.lang, "kor");
        assert_eq!(args.psm, Some(3));
        assert_eq!(detector.detector_name(), "tesseract");
    }
}
