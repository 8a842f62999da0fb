//! 캡처 태스크와 타일 모델.

use chrono::{DateTime, Utc};
use image::RgbaImage;

/// 큐에 들어간 캡처 한 장
///
/// enqueue 시점에 id가 부여되며, 워커가 꺼내간 뒤에는 워커가 소유한다.
#[derive(Debug, Clone)]
pub struct CaptureTask {
    /// 시퀀스 id (1부터 단조 증가)
    pub id: u64,
    /// 캡처 이미지 (RGBA)
    pub image: RgbaImage,
    /// enqueue 시각
    pub enqueued_at: DateTime<Utc>,
}

impl CaptureTask {
    pub fn new(id: u64, image: RgbaImage) -> Self {
        Self {
            id,
            image,
            enqueued_at: Utc::now(),
        }
    }

    /// 이미지 크기 (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// 그리드 한 칸
#[derive(Debug, Clone)]
pub struct Tile {
    /// 잘라낸 이미지 조각
    pub image: RgbaImage,
    /// 행 (0부터)
    pub row: u32,
    /// 열 (0부터)
    pub col: u32,
}

impl Tile {
    /// row-major 순서의 선형 인덱스
    pub fn index(&self, cols: u32) -> u32 {
        self.row * cols + self.col
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_index_is_row_major() {
        let tile = Tile {
            image: RgbaImage::new(1, 1),
            row: 1,
            col: 2,
        };
        assert_eq!(tile.index(4), 6);
    }

    #[test]
    fn task_keeps_dimensions() {
        let task = CaptureTask::new(7, RgbaImage::new(40, 20));
        assert_eq!(task.id, 7);
        assert_eq!(task.dimensions(), (40, 20));
    }
}
