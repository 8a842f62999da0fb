//! invsnap 도메인 모델.
//!
//! 캡처 태스크/타일(메모리 전용)과 인벤토리 항목/레코드(영속)를 정의한다.

pub mod capture;
pub mod inventory;
