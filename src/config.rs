use serde::{Deserialize, Serialize};

use crate::error::AppResult;

/// 程序配置
///
/// 三种来源，优先级从低到高：内置默认值 → TOML 配置文件 → 环境变量
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- 视频流水线 API 配置 ---
    pub video_api_base_url: String,
    pub video_api_key: String,
    // --- 提取任务（对话式）API 配置 ---
    pub chat_api_base_url: String,
    pub chat_api_key: String,
    /// 提取任务使用的 bot 标识
    pub chat_bot_id: String,
    // --- HTTP / 轮询参数 ---
    /// 单次 HTTP 请求的超时时间（秒）
    pub request_timeout_secs: u64,
    /// 状态轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 状态轮询最大次数
    pub poll_max_attempts: u32,
    // --- 本地存储 ---
    /// 会话与系统设置文件的存放目录
    pub data_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            video_api_base_url: "https://api.videolingo.cn".to_string(),
            video_api_key: String::new(),
            chat_api_base_url: "https://api.coze.cn".to_string(),
            chat_api_key: String::new(),
            chat_bot_id: "7368521734".to_string(),
            request_timeout_secs: 120,
            poll_interval_ms: 2000,
            poll_max_attempts: 60,
            data_dir: "data".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从环境变量加载配置，缺失的项使用默认值
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            video_api_base_url: std::env::var("VIDEO_API_BASE_URL").unwrap_or(default.video_api_base_url),
            video_api_key: std::env::var("VIDEO_API_KEY").unwrap_or(default.video_api_key),
            chat_api_base_url: std::env::var("CHAT_API_BASE_URL").unwrap_or(default.chat_api_base_url),
            chat_api_key: std::env::var("CHAT_API_KEY").unwrap_or(default.chat_api_key),
            chat_bot_id: std::env::var("CHAT_BOT_ID").unwrap_or(default.chat_bot_id),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            poll_interval_ms: std::env::var("POLL_INTERVAL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.poll_interval_ms),
            poll_max_attempts: std::env::var("POLL_MAX_ATTEMPTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.poll_max_attempts),
            data_dir: std::env::var("DATA_DIR").unwrap_or(default.data_dir),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 从 TOML 文件加载配置
    ///
    /// # 参数
    /// - `path`: 配置文件路径
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::error::AppError::store_io(path, e))?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
