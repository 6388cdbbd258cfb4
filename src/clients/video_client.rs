//! 视频流水线 API 客户端
//!
//! 封装视频厂商的五个阶段端点。每个请求携带 Bearer 令牌，
//! 使用配置里的统一超时时间。

use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::task::PipelineStage;
use crate::models::vendor::StageReply;
use crate::workflow::translate_flow::StageExecutor;

/// 视频流水线客户端
pub struct VideoClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl VideoClient {
    /// 创建新的视频客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(AppError::HttpClient)?;

        Ok(Self {
            http,
            base_url: config.video_api_base_url.trim_end_matches('/').to_string(),
            api_key: config.video_api_key.clone(),
        })
    }

    /// 发起一个阶段请求
    async fn post_stage(&self, stage: PipelineStage, body: Value) -> AppResult<StageReply> {
        let endpoint = format!("{}{}", self.base_url, stage.endpoint_path());
        debug!("POST {} ({})", endpoint, stage.label());

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
            return Err(AppError::StageFailed {
                stage,
                status: status.as_u16(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::request_failed(&endpoint, e))?;
        let reply: StageReply =
            serde_json::from_str(&text).map_err(|e| AppError::reply_decode(&endpoint, e))?;

        debug!("{} 返回 output_id: {}", stage.label(), reply.output_id);
        Ok(reply)
    }
}

impl StageExecutor for VideoClient {
    async fn execute(
        &self,
        stage: PipelineStage,
        input_ref: &str,
        target_lang: &str,
    ) -> AppResult<StageReply> {
        // 每个阶段的请求体只携带上一阶段的产出标识
        let body = match stage {
            PipelineStage::Download => json!({ "url": input_ref }),
            PipelineStage::SeparateAudio => json!({ "video_id": input_ref }),
            PipelineStage::Transcribe => json!({ "audio_id": input_ref }),
            PipelineStage::Translate => json!({
                "subtitle_id": input_ref,
                "target_lang": target_lang,
            }),
            PipelineStage::Burn => json!({ "subtitle_id": input_ref }),
        };

        self.post_stage(stage, body).await
    }
}
