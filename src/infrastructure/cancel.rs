//! 取消令牌 - 基础设施层
//!
//! 每个对外调用都要能被发起方确定性地中止：
//! 令牌从触发动作的地方一路传到每个 HTTP 调用和轮询等待，
//! 取消后所有在途等待立即返回 `AppError::Cancelled`。

use std::future::Future;

use tokio::sync::watch;

use crate::error::{AppError, AppResult};

/// 取消句柄，由任务发起方持有
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// 发出取消信号
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// 取消令牌，随任务传递
#[derive(Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// 创建一个永远不会被取消的令牌
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    /// 是否已取消
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// 等待取消信号
    ///
    /// 句柄被丢弃且未取消时永远挂起（任务照常执行完）。
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// 在取消信号和给定 future 之间竞争
    ///
    /// # 返回
    /// 取消时返回 `AppError::Cancelled`，否则返回 future 的结果
    pub async fn guard<F, T>(&self, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        tokio::select! {
            // 取消信号优先于已经就绪的结果
            biased;
            _ = self.cancelled() => Err(AppError::Cancelled),
            result = fut => result,
        }
    }
}

/// 创建一对取消句柄和令牌
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}
