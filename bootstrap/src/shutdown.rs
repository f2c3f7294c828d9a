//! Graceful Shutdown

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;
use tracing::info;

/// Shutdown 控制器
///
/// 触发后保持已关闭状态，之后再等待的调用会立即返回
#[derive(Clone)]
pub struct ShutdownController {
    notify: Arc<Notify>,
    triggered: Arc<AtomicBool>,
}

impl ShutdownController {
    pub fn new() -> Self {
        Self {
            notify: Arc::new(Notify::new()),
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 触发关闭
    pub fn shutdown(&self) {
        info!("Triggering shutdown");
        self.triggered.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_shutdown(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// 等待关闭信号
    pub async fn wait(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // 先登记再检查标志，避免错过 shutdown() 的通知
        notified.as_mut().enable();
        if self.is_shutdown() {
            return;
        }
        notified.await;
    }

    /// 创建一个可以交给服务器的关闭 future
    pub fn signal(&self) -> Pin<Box<dyn Future<Output = ()> + Send + 'static>> {
        let this = self.clone();
        Box::pin(async move { this.wait().await })
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}
