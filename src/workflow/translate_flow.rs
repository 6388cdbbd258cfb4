//! 视频翻译流水线 - 流程层
//!
//! 核心职责：按固定顺序执行五个远程阶段，
//! 把上一阶段返回的标识喂给下一阶段的请求体。
//!
//! 流程顺序：下载 → 音频分离 → 语音转写 → 字幕翻译 → 字幕烧录
//!
//! 失败语义：任一阶段失败，整个任务立即终止，后续阶段不再发起请求，
//! 唯一的恢复方式是重新开始。没有重试，没有断点续传。

use tokio::sync::watch;
use tracing::{error, info};

use crate::error::AppResult;
use crate::infrastructure::CancelToken;
use crate::models::task::{PipelineProgress, PipelineStage, PipelineTask, StageOutput, TaskState};
use crate::models::vendor::StageReply;

/// 单个阶段执行能力的抽象，由视频厂商客户端实现
pub trait StageExecutor {
    /// 执行一个阶段
    ///
    /// # 参数
    /// - `stage`: 要执行的阶段
    /// - `input_ref`: 上一阶段的产出标识（第一阶段为源视频 URL）
    /// - `target_lang`: 目标语言
    fn execute(
        &self,
        stage: PipelineStage,
        input_ref: &str,
        target_lang: &str,
    ) -> impl std::future::Future<Output = AppResult<StageReply>> + Send;
}

/// 视频翻译流程
///
/// 职责：
/// - 编排五个阶段的先后顺序，串联阶段间的标识传递
/// - 每个阶段完成后发布进度（百分比 + 当前阶段）
/// - 不持有 HTTP 资源，只依赖 `StageExecutor` 能力
///
/// 同一个流程实例同时只跑一个任务。
pub struct TranslateFlow<E> {
    executor: E,
    progress_tx: watch::Sender<PipelineProgress>,
}

impl<E: StageExecutor> TranslateFlow<E> {
    /// 创建新的翻译流程
    pub fn new(executor: E) -> Self {
        let (progress_tx, _) = watch::channel(PipelineProgress::default());
        Self {
            executor,
            progress_tx,
        }
    }

    /// 订阅进度更新
    pub fn progress(&self) -> watch::Receiver<PipelineProgress> {
        self.progress_tx.subscribe()
    }

    /// 执行完整的翻译流水线
    ///
    /// # 参数
    /// - `source_url`: 源视频 URL
    /// - `target_lang`: 目标语言
    /// - `cancel`: 取消令牌
    ///
    /// # 返回
    /// 全部阶段完成的任务记录，最终产物见 `final_artifacts()`
    pub async fn run(
        &self,
        source_url: &str,
        target_lang: &str,
        cancel: &CancelToken,
    ) -> AppResult<PipelineTask> {
        let mut task = PipelineTask::new(source_url, target_lang);

        info!("🎬 开始视频翻译任务 {} (目标语言: {})", task.id, target_lang);

        // 第一阶段的输入就是源视频 URL
        let mut input_ref = source_url.to_string();

        for stage in PipelineStage::ORDER {
            task.state = TaskState::Running(stage);
            self.publish(&task, Some(stage), (stage.index() * 20) as u8);

            info!("▶️ [{}/5] {}...", stage.index() + 1, stage.label());

            let reply = match cancel
                .guard(self.executor.execute(stage, &input_ref, target_lang))
                .await
            {
                Ok(reply) => reply,
                Err(e) => {
                    // 阶段失败即整体终止，不再发起后续请求
                    error!("❌ {}: {}", stage.failure_message(), e);
                    task.state = TaskState::Failed(stage);
                    self.publish(&task, Some(stage), (stage.index() * 20) as u8);
                    return Err(e);
                }
            };

            input_ref = reply.output_id.clone();
            task.completed.push(StageOutput {
                stage,
                output_id: reply.output_id,
                artifact_urls: reply.artifact_urls,
            });

            self.publish(&task, Some(stage), stage.progress_after());
            info!("✓ {} 完成 (进度 {}%)", stage.label(), stage.progress_after());
        }

        task.state = TaskState::Completed;
        self.publish(&task, None, 100);

        info!(
            "🎉 翻译任务 {} 完成，产出 {} 个文件",
            task.id,
            task.final_artifacts().len()
        );

        Ok(task)
    }

    fn publish(&self, task: &PipelineTask, current: Option<PipelineStage>, percent: u8) {
        let _ = self.progress_tx.send(PipelineProgress {
            percent,
            current,
            state: task.state.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::error::AppError;

    /// 记录调用顺序、可在指定阶段失败的测试桩
    struct FakeExecutor {
        calls: Mutex<Vec<PipelineStage>>,
        fail_at: Option<PipelineStage>,
    }

    impl FakeExecutor {
        fn succeeding() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_at: None,
            }
        }

        fn failing_at(stage: PipelineStage) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_at: Some(stage),
            }
        }

        fn calls(&self) -> Vec<PipelineStage> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl StageExecutor for FakeExecutor {
        async fn execute(
            &self,
            stage: PipelineStage,
            input_ref: &str,
            _target_lang: &str,
        ) -> AppResult<StageReply> {
            self.calls.lock().unwrap().push(stage);

            if self.fail_at == Some(stage) {
                return Err(AppError::StageFailed { stage, status: 502 });
            }

            // 烧录阶段返回最终产物 URL
            let artifact_urls = if stage == PipelineStage::Burn {
                vec![
                    "https://cdn.example.com/result.mp4".to_string(),
                    "https://cdn.example.com/result.srt".to_string(),
                ]
            } else {
                Vec::new()
            };

            Ok(StageReply {
                output_id: format!("{}-out-{}", input_ref, stage.index()),
                artifact_urls,
            })
        }
    }

    #[tokio::test]
    async fn test_all_stages_succeed() {
        let flow = TranslateFlow::new(FakeExecutor::succeeding());
        let progress = flow.progress();
        let cancel = CancelToken::never();

        let task = flow
            .run("https://example.com/v.mp4", "en", &cancel)
            .await
            .unwrap();

        // 最终产物正是烧录阶段返回的 URL
        assert_eq!(
            task.final_artifacts(),
            &[
                "https://cdn.example.com/result.mp4".to_string(),
                "https://cdn.example.com/result.srt".to_string(),
            ]
        );
        assert_eq!(task.state, TaskState::Completed);
        assert_eq!(task.completed.len(), 5);

        // 进度到达 100%
        assert_eq!(progress.borrow().percent, 100);
        assert_eq!(progress.borrow().state, TaskState::Completed);
    }

    #[tokio::test]
    async fn test_stage_ids_are_chained() {
        let executor = FakeExecutor::succeeding();
        let flow = TranslateFlow::new(executor);
        let cancel = CancelToken::never();

        let task = flow
            .run("https://example.com/v.mp4", "ja", &cancel)
            .await
            .unwrap();

        // 每个阶段的输入是上一阶段的 output_id
        assert_eq!(task.completed[0].output_id, "https://example.com/v.mp4-out-0");
        assert_eq!(
            task.completed[1].output_id,
            "https://example.com/v.mp4-out-0-out-1"
        );
    }

    #[tokio::test]
    async fn test_failure_halts_pipeline_immediately() {
        // 第 3 个阶段（语音转写）失败
        let flow = TranslateFlow::new(FakeExecutor::failing_at(PipelineStage::Transcribe));
        let progress = flow.progress();
        let cancel = CancelToken::never();

        let result = flow.run("https://example.com/v.mp4", "en", &cancel).await;

        let err = result.unwrap_err();
        assert!(matches!(
            err,
            AppError::StageFailed {
                stage: PipelineStage::Transcribe,
                ..
            }
        ));
        assert_eq!(err.to_string(), "语音转写失败");

        // 恰好发出 3 次请求，失败阶段之后不再有请求
        assert_eq!(
            flow.executor.calls(),
            vec![
                PipelineStage::Download,
                PipelineStage::SeparateAudio,
                PipelineStage::Transcribe,
            ]
        );
        assert_eq!(
            progress.borrow().state,
            TaskState::Failed(PipelineStage::Transcribe)
        );
    }

    #[tokio::test]
    async fn test_first_stage_failure_issues_single_call() {
        let flow = TranslateFlow::new(FakeExecutor::failing_at(PipelineStage::Download));
        let cancel = CancelToken::never();

        let err = flow
            .run("https://example.com/v.mp4", "en", &cancel)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "视频下载失败");
        assert_eq!(flow.executor.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_stops_before_any_request() {
        let (handle, token) = crate::infrastructure::cancel_pair();
        handle.cancel();

        let flow = TranslateFlow::new(FakeExecutor::succeeding());
        let result = flow.run("https://example.com/v.mp4", "en", &token).await;

        assert!(matches!(result, Err(AppError::Cancelled)));
        assert!(flow.executor.calls().is_empty());
    }
}
