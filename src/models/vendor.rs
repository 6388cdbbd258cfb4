//! 第三方 API 响应的边界类型
//!
//! 每种厂商响应在客户端边界解码成这里的带标签结构，
//! 内部代码不再对原始 JSON 做 `field || altField` 式的兜底取值。

use serde::Deserialize;

/// 流水线阶段响应
#[derive(Debug, Clone, Deserialize)]
pub struct StageReply {
    /// 下一阶段请求体中携带的标识
    pub output_id: String,
    /// 该阶段产出的文件 URL 列表
    #[serde(default)]
    pub artifact_urls: Vec<String>,
}

/// 提取任务提交响应
#[derive(Debug, Clone, Deserialize)]
pub struct JobSubmitReply {
    pub task_id: String,
    pub conversation_id: String,
}

/// 提取任务状态响应
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusReply {
    pub status: String,
}

/// 远程任务状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Created,
    InProgress,
    Completed,
    Failed,
    /// 厂商返回的未知状态值
    Other(String),
}

impl TaskStatus {
    /// 解析厂商状态字符串
    pub fn parse(s: &str) -> Self {
        match s {
            "created" => TaskStatus::Created,
            "in_progress" => TaskStatus::InProgress,
            "completed" => TaskStatus::Completed,
            "failed" => TaskStatus::Failed,
            other => TaskStatus::Other(other.to_string()),
        }
    }
}

/// 对话式厂商的结果响应
///
/// 不同厂商的结构不同：OpenAI 风格的 `choices` 数组，
/// 或 Coze 风格的 `messages` 数组。用 untagged 枚举在边界一次性解码。
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChatVendorReply {
    OpenAi { choices: Vec<OpenAiChoice> },
    Coze { messages: Vec<CozeMessage> },
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiChoice {
    pub message: OpenAiMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiMessage {
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CozeMessage {
    pub role: String,
    #[serde(rename = "type", default)]
    pub msg_type: String,
    pub content: String,
}

impl ChatVendorReply {
    /// 提取回复正文
    ///
    /// OpenAI 风格取第一个 choice 的 content；
    /// Coze 风格取第一条 `role == "assistant"` 且类型为 answer 的消息。
    pub fn content(&self) -> Option<String> {
        match self {
            ChatVendorReply::OpenAi { choices } => choices
                .first()
                .and_then(|c| c.message.content.clone())
                .map(|s| s.trim().to_string()),
            ChatVendorReply::Coze { messages } => messages
                .iter()
                .find(|m| m.role == "assistant" && (m.msg_type.is_empty() || m.msg_type == "answer"))
                .map(|m| m.content.trim().to_string()),
        }
    }
}
