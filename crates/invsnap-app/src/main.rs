//! # invsnap
//!
//! 인벤토리 스크린샷 수집기 바이너리 진입점.
//! 설정 로드, DI 와이어링, 워커/주기 캡처 라이프사이클.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use invsnap_app::capture_trigger::PeriodicCapture;
use invsnap_app::lifecycle::ShutdownController;
use invsnap_app::pipeline::CapturePipeline;
use invsnap_app::queue::QueueProcessor;
use invsnap_core::config::AppConfig;
use invsnap_core::config_manager::{ConfigManager, CONFIG_FILE_NAME};
use invsnap_core::ports::inventory_store::InventoryStore;
use invsnap_network::extractor::Extractor;
use invsnap_network::vision_client::OllamaVisionClient;
use invsnap_storage::csv_store::CsvInventoryStore;
use invsnap_vision::capture::ScreenCapture;
use invsnap_vision::ocr::TesseractDetector;
use invsnap_vision::prescreen::Prescreener;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// 인벤토리 스크린샷 → CSV 수집기
#[derive(Parser, Debug)]
#[command(name = "invsnap")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리의 config.json)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,

    /// 상세 로그 (--log-level debug와 동일)
    #[arg(long, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 주기 캡처 실행 (기본)
    Run,
    /// 이미지 파일들을 처리하고 종료
    Process {
        /// 처리할 이미지 파일
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
    /// 현재 인벤토리 테이블 출력
    Show,
}

/// 설정 파일 경로 결정 (CLI 인자 또는 플랫폼별 기본 경로)
///
/// # 플랫폼별 기본 경로:
/// - macOS: `~/Library/Application Support/com.invsnap.invsnap/config.json`
/// - Windows: `%APPDATA%\invsnap\invsnap\config\config.json`
/// - Linux: `~/.config/invsnap/config.json`
fn resolve_config_path(config: Option<PathBuf>) -> PathBuf {
    config
        .or_else(|| {
            ProjectDirs::from("com", "invsnap", "invsnap")
                .map(|p| p.config_dir().join(CONFIG_FILE_NAME))
        })
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

/// 설정값으로 파이프라인 구성
fn build_pipeline(
    config: &AppConfig,
    store: Arc<dyn InventoryStore>,
) -> Result<CapturePipeline> {
    let prescreener = if config.prescreen.enabled {
        Prescreener::new(Arc::new(TesseractDetector::new(
            config.prescreen.language.clone(),
        )))
    } else {
        info!("프리스크린 비활성: 모든 타일을 추출");
        Prescreener::disabled()
    };

    let client = OllamaVisionClient::new(&config.vision_api)?;
    let extractor = Extractor::new(Arc::new(client));

    let mut pipeline = CapturePipeline::new(config.grid, prescreener, extractor, store);
    if config.debug.save_images {
        info!("디버그 이미지 저장: {}", config.debug.dir.display());
        pipeline = pipeline.with_debug_dir(config.debug.dir.clone());
    }
    Ok(pipeline)
}

/// 현재 테이블 출력
async fn show_table(store: &CsvInventoryStore) -> Result<()> {
    let records = store.load().await?;
    if records.is_empty() {
        println!("(비어 있음) {}", store.path().display());
        return Ok(());
    }

    let opt = |v: Option<i64>| v.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string());
    println!(
        "{:<20} {:<28} {:>10} {:>10}",
        "timestamp", "item_name", "available", "required"
    );
    for record in &records {
        println!(
            "{:<20} {:<28} {:>10} {:>10}",
            record.timestamp,
            record.item_name,
            opt(record.available_count),
            opt(record.required_count)
        );
    }
    println!("전체 {}개", records.len());
    Ok(())
}

/// 이미지 파일들을 큐에 넣고 모두 처리될 때까지 대기
async fn process_files(queue: &QueueProcessor, images: &[PathBuf]) -> Result<()> {
    if !queue.start().await {
        return Err(anyhow!("워커 시작 실패"));
    }

    for path in images {
        match image::open(path) {
            Ok(img) => {
                let id = queue.enqueue(img.to_rgba8())?;
                info!("태스크 #{id}: {}", path.display());
            }
            Err(e) => warn!("이미지 열기 실패, 건너뜀: {}: {e}", path.display()),
        }
    }

    queue.drain().await;
    if !queue.stop().await {
        return Err(anyhow!("워커가 제때 종료되지 않음"));
    }
    Ok(())
}

/// 주기 캡처 → 시그널 대기 → 순차 종료
async fn run_capture(config: &AppConfig, queue: Arc<QueueProcessor>) -> Result<()> {
    let shutdown = ShutdownController::new();
    let source = Arc::new(ScreenCapture::new(&config.capture));
    let trigger = PeriodicCapture::new(source, queue.clone(), config.capture_interval());

    if !queue.start().await {
        return Err(anyhow!("워커 시작 실패"));
    }

    let shutdown_rx = shutdown.subscribe();
    let trigger_task = tokio::spawn(async move { trigger.run(shutdown_rx).await });

    info!("실행 중, Ctrl+C로 종료");
    let reason = shutdown
        .wait_for_signal()
        .await
        .context("시그널 핸들러 등록 실패")?;
    info!("{reason} 수신, 종료 중");

    if let Err(e) = trigger_task.await {
        warn!("주기 캡처 태스크 종료 실패: {e}");
    }
    if !queue.stop().await {
        warn!("대기 태스크 {}개를 남기고 종료", queue.queue_size());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        "debug"
    } else {
        args.log_level.as_str()
    };
    let log_filter = format!(
        "invsnap={level},invsnap_app={level},invsnap_core={level},invsnap_vision={level},invsnap_network={level},invsnap_storage={level}"
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .init();

    let config_path = resolve_config_path(args.config);
    let config_manager = ConfigManager::with_path(config_path)?;
    let config = config_manager.get();
    config.validate()?;
    info!(
        "설정 로드: {} ({:?})",
        config_manager.config_path().display(),
        config_manager.source()
    );

    let store = Arc::new(CsvInventoryStore::new(config.storage.csv_path.clone()));

    match args.command.unwrap_or(Command::Run) {
        Command::Show => show_table(&store).await,
        Command::Process { images } => {
            let pipeline = build_pipeline(&config, store)?;
            let queue = QueueProcessor::new(Arc::new(pipeline), config.worker);
            process_files(&queue, &images).await
        }
        Command::Run => {
            let pipeline = build_pipeline(&config, store)?;
            let queue = Arc::new(QueueProcessor::new(Arc::new(pipeline), config.worker));
            run_capture(&config, queue).await
        }
    }
}
