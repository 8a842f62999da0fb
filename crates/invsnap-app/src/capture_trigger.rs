//! 주기 캡처 트리거.
//!
//! `capture.interval_secs`마다 화면을 캡처해 큐에 넣는다. 캡처 실패는 로그 후 건너뛴다.

use invsnap_core::error::CoreError;
use invsnap_core::ports::screen_source::ScreenSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::queue::QueueProcessor;

/// 주기 캡처기
pub struct PeriodicCapture {
    source: Arc<dyn ScreenSource>,
    queue: Arc<QueueProcessor>,
    interval: Duration,
}

impl PeriodicCapture {
    pub fn new(source: Arc<dyn ScreenSource>, queue: Arc<QueueProcessor>, interval: Duration) -> Self {
        Self {
            source,
            queue,
            interval,
        }
    }

    /// 한 번 캡처해서 enqueue, 태스크 id 반환
    pub async fn capture_once(&self) -> Result<u64, CoreError> {
        let source = self.source.clone();
        let image = tokio::task::spawn_blocking(move || source.capture())
            .await
            .map_err(|e| CoreError::Capture(format!("캡처 작업 조인 실패: {e}")))??;

        self.queue.enqueue(image)
    }

    /// 종료 신호까지 주기 캡처
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) {
        info!("주기 캡처 시작: {}초 간격", self.interval.as_secs());

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.capture_once().await {
                        Ok(id) => debug!("캡처 → 태스크 #{id} (대기 {})", self.queue.queue_size()),
                        Err(e) => warn!("캡처 건너뜀: {e}"),
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        info!("주기 캡처 종료");
    }
}
