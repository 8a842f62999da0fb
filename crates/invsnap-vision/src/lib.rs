//! # invsnap-vision
//!
//! 이미지 처리 크레이트.
//! 스크린 캡처, 그리드 타일 분할, OCR 프리스크린, PNG 인코딩,
//! 디버그 이미지 저장을 담당한다.

pub mod capture;
pub mod debug_images;
pub mod encoder;
pub mod ocr;
pub mod prescreen;
pub mod tiler;
