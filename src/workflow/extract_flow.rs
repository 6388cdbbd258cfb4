//! 多平台提取流程 - 流程层
//!
//! 编排一次完整的提取：提交任务 → 轮询状态 → 拉取结果 → 归一化，
//! 最后把这轮交互追加到会话存储。

use tracing::info;

use crate::error::AppResult;
use crate::infrastructure::CancelToken;
use crate::models::extract::ExtractedResult;
use crate::models::session::{ChatMessage, MessageRole};
use crate::models::vendor::JobSubmitReply;
use crate::services::normalizer::Normalizer;
use crate::services::poller::{StatusPoller, StatusSource};
use crate::store::SessionStore;
use crate::utils::logging::truncate_text;

/// 提取任务 API 的抽象，由对话式厂商客户端实现
pub trait ExtractJobApi: StatusSource {
    /// 提交提取任务
    fn submit_job(
        &self,
        share_url: &str,
    ) -> impl std::future::Future<Output = AppResult<JobSubmitReply>> + Send;

    /// 拉取任务结果正文
    fn fetch_result(
        &self,
        task_id: &str,
        conversation_id: &str,
    ) -> impl std::future::Future<Output = AppResult<String>> + Send;
}

/// 多平台提取流程
pub struct ExtractFlow<A, S> {
    api: A,
    poller: StatusPoller,
    normalizer: Normalizer,
    sessions: S,
}

impl<A: ExtractJobApi, S: SessionStore> ExtractFlow<A, S> {
    /// 创建新的提取流程
    pub fn new(api: A, poller: StatusPoller, normalizer: Normalizer, sessions: S) -> Self {
        Self {
            api,
            poller,
            normalizer,
            sessions,
        }
    }

    /// 执行一次完整的提取
    ///
    /// # 参数
    /// - `share_url`: 平台分享链接
    /// - `cancel`: 取消令牌
    ///
    /// # 返回
    /// 归一化后的提取结果
    pub async fn run(&self, share_url: &str, cancel: &CancelToken) -> AppResult<ExtractedResult> {
        info!("🔗 提交提取任务: {}", truncate_text(share_url, 80));

        let job = cancel.guard(self.api.submit_job(share_url)).await?;
        info!(
            "✓ 任务已提交 (task_id: {}, conversation_id: {})",
            job.task_id, job.conversation_id
        );

        // 等待远程任务完成
        self.poller
            .wait_until_complete(&self.api, &job.task_id, &job.conversation_id, cancel)
            .await?;

        let raw = cancel
            .guard(self.api.fetch_result(&job.task_id, &job.conversation_id))
            .await?;
        info!("✓ 已拉取结果 ({} 字符)", raw.chars().count());

        let result = self.normalizer.normalize(&raw)?;
        info!(
            "✓ 提取完成: {} / {}",
            result.platform,
            truncate_text(&result.title, 40)
        );

        // 追加到会话存储（一问一答）
        let session = self
            .sessions
            .create_session(&truncate_text(share_url, 60))
            .await?;
        self.sessions
            .append_message(session.id, ChatMessage::new(MessageRole::User, share_url))
            .await?;
        self.sessions
            .append_message(session.id, ChatMessage::new(MessageRole::Assistant, &raw))
            .await?;

        Ok(result)
    }
}
