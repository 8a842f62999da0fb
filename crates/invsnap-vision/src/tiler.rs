//! 그리드 타일 분할.
//!
//! 타일 크기 = floor(W / cols) x floor(H / rows). 오른쪽/아래 나머지 픽셀은 버린다.

use image::{imageops, RgbaImage};
use invsnap_core::error::CoreError;
use invsnap_core::models::capture::Tile;
use tracing::debug;

/// 이미지를 rows x cols 그리드로 분할 (row-major 순서)
pub fn split(image: &RgbaImage, rows: u32, cols: u32) -> Result<Vec<Tile>, CoreError> {
    let (width, height) = image.dimensions();

    if rows == 0 || cols == 0 || width < cols || height < rows {
        return Err(CoreError::InvalidDimensions {
            width,
            height,
            rows,
            cols,
        });
    }

    let tile_w = width / cols;
    let tile_h = height / rows;

    let mut tiles = Vec::with_capacity((rows * cols) as usize);
    for row in 0..rows {
        for col in 0..cols {
            let tile = imageops::crop_imm(image, col * tile_w, row * tile_h, tile_w, tile_h);
            tiles.push(Tile {
                image: tile.to_image(),
                row,
                col,
            });
        }
    }

    debug!(
        "타일 분할: {}x{} → {}x{} 그리드 ({}x{} 타일)",
        width, height, rows, cols, tile_w, tile_h
    );

    Ok(tiles)
}
