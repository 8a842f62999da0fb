//! PNG 인코더.
//!
//! 비전 모델 요청에 싣는 타일 이미지를 PNG + Base64로 만든다.

use base64::{engine::general_purpose::STANDARD as B64, Engine};
use image::{ImageFormat, RgbaImage};
use invsnap_core::error::CoreError;
use std::io::Cursor;
use tracing::debug;

/// PNG 인코딩
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CoreError> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| CoreError::Image(format!("PNG 인코딩 실패: {e}")))?;

    let bytes = buf.into_inner();
    debug!(
        "PNG 인코딩: {}x{} → {} bytes",
        image.width(),
        image.height(),
        bytes.len()
    );
    Ok(bytes)
}

/// PNG 인코딩 후 Base64 반환
pub fn encode_png_base64(image: &RgbaImage) -> Result<String, CoreError> {
    let bytes = encode_png(image)?;
    Ok(B64.encode(&bytes))
}
