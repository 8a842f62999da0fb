//! # invsnap-network
//!
//! 비전 모델 엔드포인트 어댑터.
//!
//! - [`vision_client`] — Ollama `/api/generate` 호환 클라이언트 (`ItemExtractor` 구현)
//! - [`extractor`] — 타일 단위 실패를 `ERROR` 센티넬로 대체하는 추출기

pub mod extractor;
pub mod vision_client;
