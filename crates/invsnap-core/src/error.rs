//! invsnap 핵심 에러 타입.
//!
//! 모든 어댑터 crate는 이 타입을 그대로 반환한다.
//! 변형마다 복구 정책이 다르다 (타일 단위 복구 / 태스크 단위 실패).

use thiserror::Error;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 이미지가 요청한 그리드보다 작음 — 해당 태스크만 중단
    #[error("이미지 크기 부족 — {width}x{height} 이미지를 {rows}x{cols} 그리드로 분할할 수 없음")]
    InvalidDimensions {
        /// 이미지 너비 (픽셀)
        width: u32,
        /// 이미지 높이 (픽셀)
        height: u32,
        /// 요청 행 수
        rows: u32,
        /// 요청 열 수
        cols: u32,
    },

    /// 텍스트 감지 실패 — 프리스크린에서 fail-open으로 복구
    #[error("텍스트 감지 실패: {0}")]
    Detection(String),

    /// 네트워크 에러 (연결 실패, 타임아웃, 비정상 상태 코드)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 모델 응답 파싱 실패
    #[error("응답 파싱 실패: {0}")]
    Parse(String),

    /// 저장소 읽기 실패 — 빈 테이블로 간주하고 계속
    #[error("저장소 읽기 실패: {0}")]
    StoreLoad(String),

    /// 저장소 쓰기 실패 — 해당 태스크 실패
    #[error("저장소 쓰기 실패: {0}")]
    StoreWrite(String),

    /// 스크린 캡처 실패
    #[error("스크린 캡처 실패: {0}")]
    Capture(String),

    /// 이미지 인코딩/디코딩 실패
    #[error("이미지 처리 실패: {0}")]
    Image(String),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 작업 큐가 닫힘 (워커 종료 후 enqueue)
    #[error("작업 큐가 닫혀 있음")]
    QueueClosed,

    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),
}

impl CoreError {
    /// 타일 단위로 복구 가능한 추출 에러인지 (센티넬 대체 대상)
    pub fn is_extraction_failure(&self) -> bool {
        matches!(
            self,
            CoreError::Network(_) | CoreError::Parse(_) | CoreError::Image(_)
        )
    }
}
