//! 状态轮询 - 业务能力层
//!
//! 只负责"等一个远程任务结束"这一件事：固定间隔查询状态，
//! 到达上限仍未完成则报超时。不关心任务是怎么提交的、结果怎么取。

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::CancelToken;
use crate::models::vendor::TaskStatus;

/// 状态查询能力的抽象，由具体厂商客户端实现
pub trait StatusSource {
    /// 查询一次任务状态
    fn fetch_status(
        &self,
        task_id: &str,
        conversation_id: &str,
    ) -> impl std::future::Future<Output = AppResult<TaskStatus>> + Send;
}

/// 状态轮询器
///
/// 职责：
/// - 固定间隔查询任务状态，直到完成、失败或超过次数上限
/// - 不做指数退避（上游任务完成时间本身就在分钟级）
/// - 取消令牌可以随时中止查询和间隔等待
pub struct StatusPoller {
    interval: Duration,
    max_attempts: u32,
}

impl StatusPoller {
    /// 从配置创建轮询器
    pub fn new(config: &Config) -> Self {
        Self {
            interval: Duration::from_millis(config.poll_interval_ms),
            max_attempts: config.poll_max_attempts,
        }
    }

    /// 使用自定义间隔和上限创建轮询器
    pub fn with_settings(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// 轮询直到任务完成
    ///
    /// # 参数
    /// - `source`: 状态查询实现
    /// - `task_id`: 任务标识
    /// - `conversation_id`: 会话标识
    /// - `cancel`: 取消令牌
    ///
    /// # 返回
    /// 任务完成时返回实际查询次数；
    /// 任务失败返回 `JobFailed`，超过上限返回 `PollTimeout`
    pub async fn wait_until_complete<S: StatusSource>(
        &self,
        source: &S,
        task_id: &str,
        conversation_id: &str,
        cancel: &CancelToken,
    ) -> AppResult<u32> {
        for attempt in 1..=self.max_attempts {
            let status = cancel
                .guard(source.fetch_status(task_id, conversation_id))
                .await?;

            debug!(
                "状态查询 {}/{}: {:?}",
                attempt, self.max_attempts, status
            );

            match status {
                TaskStatus::Completed => {
                    info!("✓ 任务完成，共查询 {} 次", attempt);
                    return Ok(attempt);
                }
                TaskStatus::Failed => {
                    warn!("⚠️ 任务进入失败状态 (第 {} 次查询)", attempt);
                    return Err(AppError::JobFailed {
                        status: "failed".to_string(),
                    });
                }
                // created / in_progress / 未知状态都继续等
                _ => {
                    if attempt < self.max_attempts {
                        cancel
                            .guard(async {
                                tokio::time::sleep(self.interval).await;
                                Ok(())
                            })
                            .await?;
                    }
                }
            }
        }

        warn!("⚠️ 状态查询超时，已尝试 {} 次", self.max_attempts);
        Err(AppError::PollTimeout {
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio_test::assert_ok;

    /// 按脚本返回状态序列的测试桩，记录查询次数
    struct ScriptedSource {
        script: Mutex<Vec<TaskStatus>>,
        calls: Mutex<u32>,
    }

    impl ScriptedSource {
        fn new(script: Vec<TaskStatus>) -> Self {
            let mut script = script;
            script.reverse();
            Self {
                script: Mutex::new(script),
                calls: Mutex::new(0),
            }
        }

        fn call_count(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    impl StatusSource for ScriptedSource {
        async fn fetch_status(
            &self,
            _task_id: &str,
            _conversation_id: &str,
        ) -> AppResult<TaskStatus> {
            *self.calls.lock().unwrap() += 1;
            // 脚本耗尽后一直返回最后一个状态
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                Ok(script.pop().unwrap())
            } else {
                Ok(script.last().cloned().unwrap_or(TaskStatus::InProgress))
            }
        }
    }

    fn fast_poller(max_attempts: u32) -> StatusPoller {
        StatusPoller::with_settings(Duration::from_millis(0), max_attempts)
    }

    #[tokio::test]
    async fn test_completes_after_exact_number_of_checks() {
        let source = ScriptedSource::new(vec![
            TaskStatus::Created,
            TaskStatus::InProgress,
            TaskStatus::Completed,
        ]);
        let poller = fast_poller(60);
        let cancel = CancelToken::never();

        let attempts =
            assert_ok!(poller.wait_until_complete(&source, "t-1", "c-1", &cancel).await);

        assert_eq!(attempts, 3);
        assert_eq!(source.call_count(), 3);
    }

    #[tokio::test]
    async fn test_times_out_after_max_attempts() {
        let source = ScriptedSource::new(vec![TaskStatus::InProgress]);
        let poller = fast_poller(60);
        let cancel = CancelToken::never();

        let result = poller
            .wait_until_complete(&source, "t-1", "c-1", &cancel)
            .await;

        assert!(matches!(result, Err(AppError::PollTimeout { attempts: 60 })));
        assert_eq!(source.call_count(), 60);
    }

    #[tokio::test]
    async fn test_unknown_status_keeps_polling() {
        let source = ScriptedSource::new(vec![
            TaskStatus::Other("queued".to_string()),
            TaskStatus::Completed,
        ]);
        let poller = fast_poller(10);
        let cancel = CancelToken::never();

        let attempts = poller
            .wait_until_complete(&source, "t-1", "c-1", &cancel)
            .await
            .unwrap();

        assert_eq!(attempts, 2);
    }

    #[tokio::test]
    async fn test_failed_status_is_terminal() {
        let source = ScriptedSource::new(vec![TaskStatus::InProgress, TaskStatus::Failed]);
        let poller = fast_poller(10);
        let cancel = CancelToken::never();

        let result = poller
            .wait_until_complete(&source, "t-1", "c-1", &cancel)
            .await;

        assert!(matches!(result, Err(AppError::JobFailed { .. })));
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let (handle, token) = crate::infrastructure::cancel_pair();
        handle.cancel();

        let source = ScriptedSource::new(vec![TaskStatus::InProgress]);
        let poller = fast_poller(10);

        let result = poller
            .wait_until_complete(&source, "t-1", "c-1", &token)
            .await;

        assert!(matches!(result, Err(AppError::Cancelled)));
    }
}
