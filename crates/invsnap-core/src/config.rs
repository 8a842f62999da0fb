//! 애플리케이션 설정 구조체.
//!
//! 캡처 영역, 그리드 크기, 프리스크린, 비전 API, 저장소 경로, 워커 주기,
//! 디버그 이미지 설정을 정의한다. `ConfigManager`를 통해 JSON 파일에서 로드.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 스크린 캡처 설정
    #[serde(default)]
    pub capture: CaptureConfig,
    /// 타일 그리드 설정
    #[serde(default)]
    pub grid: GridConfig,
    /// OCR 프리스크린 설정
    #[serde(default)]
    pub prescreen: PrescreenConfig,
    /// 비전 모델 API 설정
    #[serde(default)]
    pub vision_api: VisionApiConfig,
    /// 인벤토리 저장소 설정
    #[serde(default)]
    pub storage: StorageConfig,
    /// 백그라운드 워커 설정
    #[serde(default)]
    pub worker: WorkerConfig,
    /// 디버그 이미지 저장 설정
    #[serde(default)]
    pub debug: DebugConfig,
}

// ============================================================
// 캡처 설정
// ============================================================

/// 모니터 원점 기준 크롭 영역 (픽셀)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// 스크린 캡처 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// 캡처할 모니터 인덱스 (범위 밖이면 주 모니터)
    #[serde(default)]
    pub monitor_index: usize,
    /// 크롭 영역 (None이면 모니터 전체)
    #[serde(default = "default_crop_region")]
    pub crop_region: Option<CropRegion>,
    /// 주기 캡처 간격 (초)
    #[serde(default = "default_capture_interval_secs")]
    pub interval_secs: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            monitor_index: 0,
            crop_region: default_crop_region(),
            interval_secs: default_capture_interval_secs(),
        }
    }
}

// ============================================================
// 그리드 / 프리스크린 설정
// ============================================================

/// 타일 그리드 설정 (기본 2행 x 4열 = 8타일)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_grid_rows")]
    pub rows: u32,
    #[serde(default = "default_grid_cols")]
    pub cols: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: default_grid_rows(),
            cols: default_grid_cols(),
        }
    }
}

impl GridConfig {
    /// 그리드 전체 타일 수
    pub fn tile_count(&self) -> u32 {
        self.rows * self.cols
    }
}

/// OCR 프리스크린 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescreenConfig {
    /// 프리스크린 활성화 (false면 모든 타일 통과)
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Tesseract 언어 코드
    #[serde(default = "default_ocr_language")]
    pub language: String,
}

impl Default for PrescreenConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: default_ocr_language(),
        }
    }
}

// ============================================================
// 비전 API 설정
// ============================================================

/// 비전 모델 엔드포인트 설정 (Ollama `/api/generate` 호환)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionApiConfig {
    /// API URL
    #[serde(default = "default_vision_endpoint")]
    pub endpoint: String,
    /// 모델 이름
    #[serde(default = "default_vision_model")]
    pub model: String,
    /// 요청 타임아웃 (초)
    #[serde(default = "default_vision_timeout_secs")]
    pub timeout_secs: u64,
    /// 프롬프트 오버라이드 (None이면 내장 프롬프트)
    #[serde(default)]
    pub prompt: Option<String>,
}

impl Default for VisionApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_vision_endpoint(),
            model: default_vision_model(),
            timeout_secs: default_vision_timeout_secs(),
            prompt: None,
        }
    }
}

impl VisionApiConfig {
    /// 요청 단위 타임아웃
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ============================================================
// 저장소 / 워커 / 디버그 설정
// ============================================================

/// 인벤토리 저장소 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// CSV 파일 경로
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
        }
    }
}

/// 백그라운드 워커 설정
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// 큐 폴링 타임아웃 (밀리초) — 종료 신호 확인 주기
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// stop() 대기 한도 (초)
    #[serde(default = "default_stop_grace_secs")]
    pub stop_grace_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            stop_grace_secs: default_stop_grace_secs(),
        }
    }
}

impl WorkerConfig {
    /// 큐 폴링 타임아웃을 Duration으로 반환
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// 종료 대기 한도를 Duration으로 반환
    pub fn stop_grace(&self) -> Duration {
        Duration::from_secs(self.stop_grace_secs)
    }
}

/// 디버그 이미지 저장 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugConfig {
    /// 캡처 원본 + 타일 PNG 저장 여부
    #[serde(default)]
    pub save_images: bool,
    /// 저장 디렉토리
    #[serde(default = "default_debug_dir")]
    pub dir: PathBuf,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            save_images: false,
            dir: default_debug_dir(),
        }
    }
}

// ============================================================
// AppConfig impl
// ============================================================

impl AppConfig {
    /// 기본 설정값 반환
    pub fn default_config() -> Self {
        Self {
            capture: CaptureConfig::default(),
            grid: GridConfig::default(),
            prescreen: PrescreenConfig::default(),
            vision_api: VisionApiConfig::default(),
            storage: StorageConfig::default(),
            worker: WorkerConfig::default(),
            debug: DebugConfig::default(),
        }
    }

    /// 설정값 유효성 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.grid.rows == 0 || self.grid.cols == 0 {
            return Err(CoreError::Config(format!(
                "그리드 크기는 0일 수 없음: {}x{}",
                self.grid.rows, self.grid.cols
            )));
        }
        if self.vision_api.endpoint.trim().is_empty() {
            return Err(CoreError::Config("비전 API 엔드포인트 미설정".to_string()));
        }
        if self.vision_api.model.trim().is_empty() {
            return Err(CoreError::Config("비전 모델 이름 미설정".to_string()));
        }
        if self.vision_api.timeout_secs == 0 {
            return Err(CoreError::Config(
                "비전 API 타임아웃은 0보다 커야 함".to_string(),
            ));
        }
        if let Some(crop) = self.capture.crop_region {
            if crop.width == 0 || crop.height == 0 {
                return Err(CoreError::Config(format!(
                    "크롭 영역 크기는 0일 수 없음: {}x{}",
                    crop.width, crop.height
                )));
            }
        }
        Ok(())
    }

    /// 주기 캡처 간격을 Duration으로 반환
    pub fn capture_interval(&self) -> Duration {
        Duration::from_secs(self.capture.interval_secs.max(1))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

// ============================================================
// 기본값 함수
// ============================================================

fn default_true() -> bool {
    true
}

/// 2560x1440 해상도 기준 인벤토리 패널 영역
fn default_crop_region() -> Option<CropRegion> {
    Some(CropRegion {
        left: 835,
        top: 900,
        width: 1360,
        height: 300,
    })
}
fn default_capture_interval_secs() -> u64 {
    10
}
fn default_grid_rows() -> u32 {
    2
}
fn default_grid_cols() -> u32 {
    4
}
fn default_ocr_language() -> String {
    "eng".to_string()
}
fn default_vision_endpoint() -> String {
    "http://localhost:11434/api/generate".to_string()
}
fn default_vision_model() -> String {
    "qwen3-vl:8b".to_string()
}
fn default_vision_timeout_secs() -> u64 {
    90
}
fn default_csv_path() -> PathBuf {
    PathBuf::from("inventory_log.csv")
}
fn default_poll_interval_ms() -> u64 {
    1_000
}
fn default_stop_grace_secs() -> u64 {
    30
}
fn default_debug_dir() -> PathBuf {
    PathBuf::from("debug")
}
