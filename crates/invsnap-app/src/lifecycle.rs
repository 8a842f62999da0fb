//! 종료 제어.
//!
//! OS 시그널을 받아 주기 캡처 같은 백그라운드 루프에 종료를 알린다.

use std::fmt;
use tokio::sync::watch;
use tracing::info;

/// 종료 원인
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    Interrupt,
    Terminate,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::Interrupt => write!(f, "SIGINT"),
            ShutdownReason::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// 종료 신호 브로드캐스터
pub struct ShutdownController {
    tx: watch::Sender<bool>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// 종료 수신기. 값이 true가 되면 루프를 빠져나간다
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// 구독자에게 종료 알림 (중복 호출 무시)
    pub fn trigger(&self, reason: ShutdownReason) {
        let first = self.tx.send_if_modified(|triggered| !std::mem::replace(triggered, true));
        if first {
            info!("종료 신호 ({reason})");
        }
    }

    /// SIGINT/SIGTERM(비 unix는 Ctrl+C)까지 대기 후 종료 알림
    pub async fn wait_for_signal(&self) -> std::io::Result<ShutdownReason> {
        #[cfg(unix)]
        let reason = {
            use tokio::signal::unix::{signal, SignalKind};
            let mut interrupt = signal(SignalKind::interrupt())?;
            let mut terminate = signal(SignalKind::terminate())?;
            tokio::select! {
                _ = interrupt.recv() => ShutdownReason::Interrupt,
                _ = terminate.recv() => ShutdownReason::Terminate,
            }
        };

        #[cfg(not(unix))]
        let reason = {
            tokio::signal::ctrl_c().await?;
            ShutdownReason::Interrupt
        };

        self.trigger(reason);
        Ok(reason)
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_untriggered() {
        let controller = ShutdownController::new();
        assert!(!*controller.subscribe().borrow());
    }

    #[tokio::test]
    async fn trigger_wakes_subscribers() {
        let controller = ShutdownController::new();
        let mut rx = controller.subscribe();

        controller.trigger(ShutdownReason::Interrupt);
        rx.changed().await.unwrap();
        assert!(*rx.borrow());

        // 두 번째 호출은 상태를 바꾸지 않음
        controller.trigger(ShutdownReason::Interrupt);
        assert!(*controller.subscribe().borrow());
        assert!(!rx.has_changed().unwrap());
    }
}
