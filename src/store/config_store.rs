//! 系统设置存储 - 存储层
//!
//! 运行时可编辑的设置对象（原来散落在浏览器本地存储的 `system_config`），
//! 读写经过互斥锁串行化，落盘采用先写临时文件再改名。

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::{AppError, AppResult};

/// 运行时可编辑的系统设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemSettings {
    /// 视频流水线 API 密钥
    pub video_api_key: String,
    /// 提取任务 API 密钥
    pub chat_api_key: String,
    /// 默认目标语言
    pub default_target_lang: String,
    /// 结果解析是否允许尽力模式（正则回落）
    pub best_effort_parsing: bool,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            video_api_key: String::new(),
            chat_api_key: String::new(),
            default_target_lang: "en".to_string(),
            best_effort_parsing: true,
        }
    }
}

/// 系统设置仓库接口
pub trait ConfigStore {
    /// 读取当前设置
    fn load(&self) -> impl std::future::Future<Output = AppResult<SystemSettings>> + Send;

    /// 整体保存设置
    fn save(
        &self,
        settings: &SystemSettings,
    ) -> impl std::future::Future<Output = AppResult<()>> + Send;
}

/// JSON 文件设置存储
pub struct JsonFileConfigStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }
}

impl ConfigStore for JsonFileConfigStore {
    async fn load(&self) -> AppResult<SystemSettings> {
        let _guard = self.lock.lock().await;
        if !self.path.exists() {
            return Ok(SystemSettings::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| AppError::store_io(self.path.display().to_string(), e))?;
        Ok(serde_json::from_str(&content)?)
    }

    async fn save(&self, settings: &SystemSettings) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| AppError::store_io(parent.display().to_string(), e))?;
            }
        }
        let content = serde_json::to_string_pretty(settings)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, content)
            .map_err(|e| AppError::store_io(tmp.display().to_string(), e))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| AppError::store_io(self.path.display().to_string(), e))?;
        Ok(())
    }
}
