//! 파이프라인 통합 테스트.
//!
//! 큐 → 워커 → 타일 분할 → 프리스크린 → 비전 API(mockito) → CSV 저장소 cross-crate 연동.

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use invsnap_app::pipeline::{CapturePipeline, TaskOutcome};
use invsnap_app::queue::{QueueProcessor, WorkerState};
use invsnap_core::config::{GridConfig, VisionApiConfig, WorkerConfig};
use invsnap_core::error::CoreError;
use invsnap_core::models::capture::{CaptureTask, Tile};
use invsnap_core::ports::text_detector::TextDetector;
use invsnap_network::extractor::Extractor;
use invsnap_network::vision_client::OllamaVisionClient;
use invsnap_storage::csv_store::CsvInventoryStore;
use invsnap_vision::encoder::encode_png_base64;
use invsnap_vision::prescreen::Prescreener;
use invsnap_vision::tiler;
use mockito::Matcher;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const GRID: GridConfig = GridConfig { rows: 2, cols: 4 };
const HEADER: &str = "timestamp,item_name,available_count,required_count";

/// 선형 인덱스가 `passing`에 있는 타일에만 텍스트를 돌려주는 감지기
struct IndexDetector {
    passing: HashSet<u32>,
}

#[async_trait]
impl TextDetector for IndexDetector {
    async fn detect_text(&self, tile: &Tile) -> Result<String, CoreError> {
        if self.passing.contains(&tile.index(GRID.cols)) {
            Ok("12 (34)".to_string())
        } else {
            Ok("  ".to_string())
        }
    }

    fn detector_name(&self) -> &str {
        "index"
    }
}

/// 타일마다 다른 색으로 채운 1360x300 캡처 (요청 본문으로 타일 구분용)
fn inventory_capture() -> RgbaImage {
    RgbaImage::from_fn(1360, 300, |x, y| {
        let idx = (y / 150) * 4 + x / 340;
        Rgba([(idx * 30) as u8, 255 - (idx * 20) as u8, 7, 255])
    })
}

/// 해당 타일의 PNG Base64
fn tile_b64(image: &RgbaImage, index: usize) -> String {
    let tiles = tiler::split(image, GRID.rows, GRID.cols).unwrap();
    encode_png_base64(&tiles[index].image).unwrap()
}

fn fast_worker() -> WorkerConfig {
    WorkerConfig {
        poll_interval_ms: 20,
        stop_grace_secs: 5,
    }
}

fn build_pipeline(endpoint: String, csv: &Path, passing: &[u32]) -> CapturePipeline {
    let detector = Arc::new(IndexDetector {
        passing: passing.iter().copied().collect(),
    });
    let client = OllamaVisionClient::new(&VisionApiConfig {
        endpoint,
        model: "test-vl".to_string(),
        timeout_secs: 5,
        prompt: None,
    })
    .unwrap();

    CapturePipeline::new(
        GRID,
        Prescreener::new(detector),
        Extractor::new(Arc::new(client)),
        Arc::new(CsvInventoryStore::new(csv)),
    )
}

/// 타일 1 → Wood, 타일 3 → Stone, 타일 5 → 매칭 mock 없음(501)
async fn mock_inventory_endpoint(
    server: &mut mockito::ServerGuard,
    image: &RgbaImage,
) -> Vec<mockito::Mock> {
    let wood = server
        .mock("POST", "/api/generate")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "images": [tile_b64(image, 1)]
        })))
        .with_status(200)
        .with_body(r#"{"response":"{\"item_name\":\"Wood\",\"required_count\":10,\"available_count\":50}"}"#)
        .expect(1)
        .create_async()
        .await;

    let stone = server
        .mock("POST", "/api/generate")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "images": [tile_b64(image, 3)]
        })))
        .with_status(200)
        .with_body(r#"{"response":"```json\n{\"item_name\":\"Stone\",\"required_count\":2,\"available_count\":null}\n```"}"#)
        .expect(1)
        .create_async()
        .await;

    vec![wood, stone]
}

fn data_rows(content: &str) -> Vec<Vec<String>> {
    content
        .lines()
        .skip(1)
        .map(|l| l.split(',').map(String::from).collect())
        .collect()
}

#[tokio::test]
async fn capture_to_table_end_to_end() {
    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("inventory_log.csv");
    let image = inventory_capture();

    let mut server = mockito::Server::new_async().await;
    let mocks = mock_inventory_endpoint(&mut server, &image).await;

    let pipeline = build_pipeline(format!("{}/api/generate", server.url()), &csv, &[1, 3, 5]);
    let outcome = pipeline
        .process(&CaptureTask::new(1, image.clone()))
        .await
        .unwrap();

    match outcome {
        TaskOutcome::Stored {
            extracted,
            failed,
            summary,
        } => {
            assert_eq!(extracted, 3);
            assert_eq!(failed, 1);
            assert_eq!((summary.updated, summary.added, summary.total), (0, 2, 2));
        }
        other => panic!("예상치 못한 결과: {other:?}"),
    }
    for mock in &mocks {
        mock.assert_async().await;
    }

    let content = std::fs::read_to_string(&csv).unwrap();
    assert_eq!(content.lines().next().unwrap(), HEADER);
    let rows = data_rows(&content);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][1..], ["Stone", "", "2"]);
    assert_eq!(rows[1][1..], ["Wood", "50", "10"]);
    assert!(!content.contains("ERROR"));
}

#[tokio::test]
async fn stale_row_replaced_in_place() {
    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("inventory_log.csv");
    std::fs::write(
        &csv,
        format!("{HEADER}\n2020-01-01T00:00:00,Clay,5,5\n2020-01-01T00:00:00,Wood,1,1\n"),
    )
    .unwrap();
    let image = inventory_capture();

    let mut server = mockito::Server::new_async().await;
    let _mocks = mock_inventory_endpoint(&mut server, &image).await;

    let pipeline = build_pipeline(format!("{}/api/generate", server.url()), &csv, &[1, 3, 5]);
    pipeline
        .process(&CaptureTask::new(1, image.clone()))
        .await
        .unwrap();

    let rows = data_rows(&std::fs::read_to_string(&csv).unwrap());
    let names: Vec<&str> = rows.iter().map(|r| r[1].as_str()).collect();
    assert_eq!(names, vec!["Clay", "Stone", "Wood"]);

    let wood = &rows[2];
    assert_ne!(wood[0], "2020-01-01T00:00:00");
    assert_eq!(wood[2..], ["50", "10"]);
    // 건드리지 않은 행은 그대로
    assert_eq!(rows[0][0], "2020-01-01T00:00:00");
}

#[tokio::test]
async fn no_passing_tiles_skips_model_and_store() {
    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("inventory_log.csv");

    let mut server = mockito::Server::new_async().await;
    let never = server
        .mock("POST", "/api/generate")
        .expect(0)
        .create_async()
        .await;

    let pipeline = build_pipeline(format!("{}/api/generate", server.url()), &csv, &[]);
    let outcome = pipeline
        .process(&CaptureTask::new(1, inventory_capture()))
        .await
        .unwrap();

    assert_eq!(outcome, TaskOutcome::NoContent);
    never.assert_async().await;
    assert!(!csv.exists());
}

#[tokio::test]
async fn worker_survives_bad_task_and_processes_next() {
    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("inventory_log.csv");
    let image = inventory_capture();

    let mut server = mockito::Server::new_async().await;
    let _mocks = mock_inventory_endpoint(&mut server, &image).await;

    let pipeline = build_pipeline(format!("{}/api/generate", server.url()), &csv, &[1, 3]);
    let queue = QueueProcessor::new(Arc::new(pipeline), fast_worker());

    // 그리드보다 작은 이미지 → InvalidDimensions로 해당 태스크만 실패
    assert_eq!(queue.enqueue(RgbaImage::new(3, 1)).unwrap(), 1);
    assert_eq!(queue.enqueue(image).unwrap(), 2);

    assert!(queue.start().await);
    queue.drain().await;
    assert_eq!(queue.state(), WorkerState::Idle);
    assert!(queue.stop().await);

    let rows = data_rows(&std::fs::read_to_string(&csv).unwrap());
    assert_eq!(rows.len(), 2);
}
