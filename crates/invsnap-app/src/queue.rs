//! 캡처 작업 큐 + 단일 백그라운드 워커.
//!
//! enqueue는 블로킹 없이 id를 돌려주고, 워커 하나가 FIFO 순서로 태스크를 처리한다.
//! 종료는 협조적: 진행 중인 태스크는 끝까지 처리하고 새 태스크는 꺼내지 않는다.

use async_trait::async_trait;
use image::RgbaImage;
use invsnap_core::config::WorkerConfig;
use invsnap_core::error::CoreError;
use invsnap_core::models::capture::CaptureTask;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::pipeline::TaskOutcome;

/// 태스크 처리기 (워커가 태스크마다 호출)
#[async_trait]
pub trait TaskHandler: Send + Sync {
    async fn handle(&self, task: CaptureTask) -> Result<TaskOutcome, CoreError>;
}

/// 워커 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// 큐 폴링 중
    Idle,
    /// 태스크 처리 중
    Processing,
    /// 종료 요청 수신, 현재 태스크 마무리 중
    Stopping,
    /// 종료됨 (또는 아직 시작 전)
    Stopped,
}

type TaskReceiver = mpsc::UnboundedReceiver<CaptureTask>;

/// 수신기 보관 위치
enum WorkerSlot {
    /// 워커 없음, 수신기 보관 중
    Parked(TaskReceiver),
    /// 워커 실행 중 (종료 시 수신기를 돌려줌)
    Running(JoinHandle<TaskReceiver>),
    /// 워커 비정상 종료로 수신기 유실
    Lost,
}

/// 작업 큐 처리기
pub struct QueueProcessor {
    handler: Arc<dyn TaskHandler>,
    config: WorkerConfig,
    sender: mpsc::UnboundedSender<CaptureTask>,
    /// id 부여와 send를 한 단위로 묶어 큐 순서 = id 순서 보장
    enqueue_lock: parking_lot::Mutex<()>,
    next_id: AtomicU64,
    pending: Arc<AtomicUsize>,
    stop_tx: watch::Sender<bool>,
    state_tx: Arc<watch::Sender<WorkerState>>,
    worker: Mutex<WorkerSlot>,
}

impl QueueProcessor {
    pub fn new(handler: Arc<dyn TaskHandler>, config: WorkerConfig) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (stop_tx, _) = watch::channel(false);
        let (state_tx, _) = watch::channel(WorkerState::Stopped);

        Self {
            handler,
            config,
            sender,
            enqueue_lock: parking_lot::Mutex::new(()),
            next_id: AtomicU64::new(1),
            pending: Arc::new(AtomicUsize::new(0)),
            stop_tx,
            state_tx: Arc::new(state_tx),
            worker: Mutex::new(WorkerSlot::Parked(receiver)),
        }
    }

    /// 이미지를 큐에 넣고 태스크 id 반환 (1부터 증가)
    pub fn enqueue(&self, image: RgbaImage) -> Result<u64, CoreError> {
        let _guard = self.enqueue_lock.lock();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        self.pending.fetch_add(1, Ordering::SeqCst);
        if self.sender.send(CaptureTask::new(id, image)).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            return Err(CoreError::QueueClosed);
        }

        debug!("태스크 #{id} enqueue (대기 {})", self.queue_size());
        Ok(id)
    }

    /// 대기 중인 태스크 수
    pub fn queue_size(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// 현재 워커 상태
    pub fn state(&self) -> WorkerState {
        *self.state_tx.borrow()
    }

    /// 상태 변경 구독
    pub fn subscribe_state(&self) -> watch::Receiver<WorkerState> {
        self.state_tx.subscribe()
    }

    /// 워커 시작. 이미 실행 중이면 아무것도 하지 않고 false
    pub async fn start(&self) -> bool {
        let mut slot = self.worker.lock().await;

        let receiver = match std::mem::replace(&mut *slot, WorkerSlot::Lost) {
            WorkerSlot::Running(handle) if !handle.is_finished() && !*self.stop_tx.borrow() => {
                *slot = WorkerSlot::Running(handle);
                debug!("워커가 이미 실행 중");
                return false;
            }
            // 이전 stop()이 시간 초과된 워커: 현재 태스크를 끝내고 나갈 때까지 기다린 뒤 새로 띄운다
            WorkerSlot::Running(handle) => match handle.await {
                Ok(receiver) => receiver,
                Err(e) => {
                    error!("이전 워커 비정상 종료: {e}");
                    return false;
                }
            },
            WorkerSlot::Parked(receiver) => receiver,
            WorkerSlot::Lost => {
                error!("작업 큐 수신기가 유실되어 워커를 시작할 수 없음");
                return false;
            }
        };

        self.stop_tx.send_replace(false);
        self.state_tx.send_replace(WorkerState::Idle);

        let worker = Worker {
            receiver,
            handler: self.handler.clone(),
            pending: self.pending.clone(),
            stop_rx: self.stop_tx.subscribe(),
            state_tx: self.state_tx.clone(),
            poll_interval: self.config.poll_interval(),
        };
        *slot = WorkerSlot::Running(tokio::spawn(worker.run()));

        info!("워커 시작");
        true
    }

    /// 워커 종료 요청 후 유예 시간 동안 대기
    ///
    /// 시간 안에 끝나지 않으면 경고 후 false. 워커는 계속 현재 태스크를 마무리한다.
    pub async fn stop(&self) -> bool {
        let mut slot = self.worker.lock().await;
        let WorkerSlot::Running(handle) = &mut *slot else {
            return true;
        };

        self.stop_tx.send_replace(true);
        self.state_tx.send_if_modified(|state| {
            if *state == WorkerState::Processing {
                *state = WorkerState::Stopping;
                true
            } else {
                false
            }
        });

        let grace = self.config.stop_grace();
        let joined = tokio::time::timeout(grace, handle).await;
        match joined {
            Ok(Ok(receiver)) => {
                *slot = WorkerSlot::Parked(receiver);
                info!("워커 종료 (대기 태스크 {})", self.queue_size());
                true
            }
            Ok(Err(e)) => {
                error!("워커 비정상 종료: {e}");
                *slot = WorkerSlot::Lost;
                self.state_tx.send_replace(WorkerState::Stopped);
                true
            }
            Err(_) => {
                warn!("워커가 {:?} 안에 종료되지 않음", grace);
                false
            }
        }
    }

    /// 대기 태스크가 모두 처리될 때까지 대기
    ///
    /// 워커가 없으면(Stopped) 남은 태스크와 상관없이 바로 반환한다.
    pub async fn drain(&self) {
        let mut state_rx = self.subscribe_state();
        loop {
            let state = *state_rx.borrow_and_update();
            if state == WorkerState::Stopped {
                if self.queue_size() > 0 {
                    warn!("워커 없음, 대기 태스크 {}개 남김", self.queue_size());
                }
                return;
            }
            if self.queue_size() == 0 && state == WorkerState::Idle {
                return;
            }
            let _ = tokio::time::timeout(self.config.poll_interval(), state_rx.changed()).await;
        }
    }
}

/// 워커 태스크 본체
struct Worker {
    receiver: TaskReceiver,
    handler: Arc<dyn TaskHandler>,
    pending: Arc<AtomicUsize>,
    stop_rx: watch::Receiver<bool>,
    state_tx: Arc<watch::Sender<WorkerState>>,
    poll_interval: Duration,
}

impl Worker {
    async fn run(mut self) -> TaskReceiver {
        loop {
            if *self.stop_rx.borrow_and_update() {
                break;
            }

            let polled = tokio::select! {
                biased;
                changed = self.stop_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                polled = tokio::time::timeout(self.poll_interval, self.receiver.recv()) => polled,
            };

            let task = match polled {
                // 폴링 타임아웃 — 종료 신호 재확인
                Err(_) => continue,
                Ok(None) => break,
                Ok(Some(task)) => task,
            };

            // Processing을 먼저 기록해야 drain()이 빈 큐 + Idle을 오판하지 않는다
            self.state_tx.send_if_modified(|state| {
                if *state == WorkerState::Idle {
                    *state = WorkerState::Processing;
                    true
                } else {
                    false
                }
            });
            self.pending.fetch_sub(1, Ordering::SeqCst);

            self.process(task).await;

            if *self.stop_rx.borrow() {
                break;
            }
            self.state_tx.send_replace(WorkerState::Idle);
        }

        self.state_tx.send_replace(WorkerState::Stopped);
        debug!("워커 루프 종료");
        self.receiver
    }

    /// 태스크 하나 처리. 에러와 패닉은 여기서 끝난다
    async fn process(&self, task: CaptureTask) {
        let id = task.id;
        let (width, height) = task.dimensions();
        let started = Instant::now();
        debug!("태스크 #{id} 처리 시작 ({width}x{height})");

        let handler = self.handler.clone();
        let result = tokio::spawn(async move { handler.handle(task).await }).await;
        let elapsed = started.elapsed().as_secs_f64();

        match result {
            Ok(Ok(outcome)) => info!("태스크 #{id} 완료 ({elapsed:.1}s): {outcome}"),
            Ok(Err(e)) => error!("태스크 #{id} 실패 ({elapsed:.1}s): {e}"),
            Err(e) if e.is_panic() => error!("태스크 #{id} 패닉: {e}"),
            Err(e) => error!("태스크 #{id} 취소됨: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invsnap_core::models::inventory::UpsertSummary;

    /// 처리한 id만 기록하는 처리기
    struct RecordingHandler {
        seen: parking_lot::Mutex<Vec<u64>>,
    }

    #[async_trait]
    impl TaskHandler for RecordingHandler {
        async fn handle(&self, task: CaptureTask) -> Result<TaskOutcome, CoreError> {
            self.seen.lock().push(task.id);
            Ok(TaskOutcome::Stored {
                extracted: 0,
                failed: 0,
                summary: UpsertSummary::default(),
            })
        }
    }

    fn fast_config() -> WorkerConfig {
        WorkerConfig {
            poll_interval_ms: 20,
            stop_grace_secs: 2,
        }
    }

    #[tokio::test]
    async fn ids_start_at_one_and_increase() {
        let handler = Arc::new(RecordingHandler {
            seen: parking_lot::Mutex::new(Vec::new()),
        });
        let queue = QueueProcessor::new(handler, fast_config());

        assert_eq!(queue.enqueue(RgbaImage::new(1, 1)).unwrap(), 1);
        assert_eq!(queue.enqueue(RgbaImage::new(1, 1)).unwrap(), 2);
        assert_eq!(queue.enqueue(RgbaImage::new(1, 1)).unwrap(), 3);
        assert_eq!(queue.queue_size(), 3);
        assert_eq!(queue.state(), WorkerState::Stopped);
    }

    #[tokio::test]
    async fn drains_in_fifo_order() {
        let handler = Arc::new(RecordingHandler {
            seen: parking_lot::Mutex::new(Vec::new()),
        });
        let queue = QueueProcessor::new(handler.clone(), fast_config());

        for _ in 0..5 {
            queue.enqueue(RgbaImage::new(1, 1)).unwrap();
        }
        assert!(queue.start().await);
        queue.drain().await;

        assert_eq!(*handler.seen.lock(), vec![1, 2, 3, 4, 5]);
        assert_eq!(queue.queue_size(), 0);
        assert!(queue.stop().await);
        assert_eq!(queue.state(), WorkerState::Stopped);
    }

    #[tokio::test]
    async fn second_start_is_noop() {
        let handler = Arc::new(RecordingHandler {
            seen: parking_lot::Mutex::new(Vec::new()),
        });
        let queue = QueueProcessor::new(handler, fast_config());

        assert!(queue.start().await);
        assert!(!queue.start().await);
        assert!(queue.stop().await);
        // 정지 후 재시작 가능
        assert!(queue.start().await);
        assert!(queue.stop().await);
    }

    #[tokio::test]
    async fn drain_without_worker_returns() {
        let handler = Arc::new(RecordingHandler {
            seen: parking_lot::Mutex::new(Vec::new()),
        });
        let queue = QueueProcessor::new(handler.clone(), fast_config());
        queue.enqueue(RgbaImage::new(1, 1)).unwrap();

        tokio::time::timeout(Duration::from_secs(1), queue.drain())
            .await
            .unwrap();
        assert_eq!(queue.queue_size(), 1);
        assert!(handler.seen.lock().is_empty());
    }

    #[tokio::test]
    async fn stop_without_start_is_ok() {
        let handler = Arc::new(RecordingHandler {
            seen: parking_lot::Mutex::new(Vec::new()),
        });
        let queue = QueueProcessor::new(handler, fast_config());
        assert!(queue.stop().await);
    }
}
