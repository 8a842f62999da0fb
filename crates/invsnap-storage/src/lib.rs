//! # invsnap-storage
//!
//! 인벤토리 저장소 어댑터.
//! item_name 기준으로 한 행씩 유지하는 CSV 테이블을 merge-on-write로 갱신한다.

pub mod csv_codec;
pub mod csv_store;
