//! 应用程序错误类型
//!
//! 按照错误来源划分：HTTP 调用、流水线阶段、状态轮询、结果解析、存储、配置。
//! 所有错误都携带机器可读的上下文（端点、阶段、状态码），
//! 不再使用"操作失败"这类无法区分的字符串。

use thiserror::Error;

use crate::models::task::PipelineStage;

/// 应用程序错误
#[derive(Debug, Error)]
pub enum AppError {
    /// 网络请求失败（未收到响应）
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// API 返回非 2xx 状态码
    #[error("API返回错误状态 ({endpoint}): HTTP {status}")]
    BadStatus { endpoint: String, status: u16 },

    /// 响应体解析失败
    #[error("响应解析失败 ({endpoint}): {source}")]
    ReplyDecode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// 响应体为空或缺少内容字段
    #[error("API返回空结果: {endpoint}")]
    EmptyReply { endpoint: String },

    /// 流水线阶段失败（整个任务终止，只能重新开始）
    #[error("{}", .stage.failure_message())]
    StageFailed { stage: PipelineStage, status: u16 },

    /// 状态轮询超过重试上限
    #[error("任务状态查询超时 (已尝试 {attempts} 次)")]
    PollTimeout { attempts: u32 },

    /// 远程任务进入失败状态
    #[error("远程任务失败 (状态: {status})")]
    JobFailed { status: String },

    /// 严格模式下结果无法按固定结构解析
    #[error("结果解析失败: {reason}")]
    StrictDecode { reason: String },

    /// 正则表达式构建失败
    #[error("正则表达式错误: {0}")]
    Regex(#[from] regex::Error),

    /// 任务被调用方取消
    #[error("任务已取消")]
    Cancelled,

    /// 存储读写失败
    #[error("存储操作失败 ({path}): {source}")]
    StoreIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 会话不存在
    #[error("会话不存在: {id}")]
    SessionNotFound { id: String },

    /// JSON 序列化/反序列化失败
    #[error("JSON解析失败: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML 配置解析失败
    #[error("配置解析失败: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// HTTP 客户端构建失败
    #[error("HTTP客户端初始化失败: {0}")]
    HttpClient(#[source] reqwest::Error),
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建网络请求失败错误
    pub fn request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// 创建响应解析失败错误
    pub fn reply_decode(endpoint: impl Into<String>, source: serde_json::Error) -> Self {
        AppError::ReplyDecode {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// 创建存储读写失败错误
    pub fn store_io(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::StoreIo {
            path: path.into(),
            source,
        }
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
