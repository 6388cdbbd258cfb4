//! 提取任务 API 客户端
//!
//! 封装对话式厂商的三个调用：提交任务、查询状态、拉取结果。
//! 厂商的结果结构在这里一次性解码成 `ChatVendorReply`，
//! 流程层拿到的永远是纯文本。

use reqwest::Client;
use serde_json::json;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::vendor::{ChatVendorReply, JobStatusReply, JobSubmitReply, TaskStatus};
use crate::services::poller::StatusSource;
use crate::workflow::extract_flow::ExtractJobApi;

/// 提取任务客户端
pub struct ChatClient {
    http: Client,
    base_url: String,
    api_key: String,
    bot_id: String,
}

impl ChatClient {
    /// 创建新的提取任务客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(AppError::HttpClient)?;

        Ok(Self {
            http,
            base_url: config.chat_api_base_url.trim_end_matches('/').to_string(),
            api_key: config.chat_api_key.clone(),
            bot_id: config.chat_bot_id.clone(),
        })
    }

    /// 发起 POST 并把响应体读成字符串
    async fn post_json(&self, path: &str, body: serde_json::Value) -> AppResult<String> {
        let endpoint = format!("{}{}", self.base_url, path);
        debug!("POST {}", endpoint);

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::request_failed(&endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::BadStatus {
                endpoint,
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| AppError::request_failed(&endpoint, e))
    }
}

impl StatusSource for ChatClient {
    async fn fetch_status(&self, task_id: &str, conversation_id: &str) -> AppResult<TaskStatus> {
        let path = "/v1/task/status";
        let text = self
            .post_json(
                path,
                json!({
                    "task_id": task_id,
                    "conversation_id": conversation_id,
                }),
            )
            .await?;

        let reply: JobStatusReply = serde_json::from_str(&text)
            .map_err(|e| AppError::reply_decode(format!("{}{}", self.base_url, path), e))?;
        Ok(TaskStatus::parse(&reply.status))
    }
}

impl ExtractJobApi for ChatClient {
    async fn submit_job(&self, share_url: &str) -> AppResult<JobSubmitReply> {
        let path = "/v1/task/submit";
        let text = self
            .post_json(
                path,
                json!({
                    "bot_id": self.bot_id,
                    "query": share_url,
                    "stream": false,
                }),
            )
            .await?;

        serde_json::from_str(&text)
            .map_err(|e| AppError::reply_decode(format!("{}{}", self.base_url, path), e))
    }

    async fn fetch_result(&self, task_id: &str, conversation_id: &str) -> AppResult<String> {
        let path = "/v1/task/result";
        let text = self
            .post_json(
                path,
                json!({
                    "task_id": task_id,
                    "conversation_id": conversation_id,
                }),
            )
            .await?;

        let endpoint = format!("{}{}", self.base_url, path);
        let reply: ChatVendorReply = serde_json::from_str(&text)
            .map_err(|e| AppError::reply_decode(&endpoint, e))?;

        reply
            .content()
            .ok_or(AppError::EmptyReply { endpoint })
    }
}
