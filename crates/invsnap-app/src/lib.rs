//! # invsnap-app
//!
//! 캡처 작업 큐, 단일 워커, 처리 파이프라인, 주기 캡처, 종료 제어.
//! `invsnap` 바이너리가 이 모듈들을 와이어링한다.

pub mod capture_trigger;
pub mod lifecycle;
pub mod pipeline;
pub mod queue;
