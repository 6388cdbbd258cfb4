//! 应用主结构 - 编排层
//!
//! 解析命令、合并运行时设置、装配客户端和流程。

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::clients::{ChatClient, VideoClient};
use crate::config::Config;
use crate::infrastructure::cancel_pair;
use crate::services::{Normalizer, StatusPoller};
use crate::store::{ConfigStore, JsonFileConfigStore, JsonFileStore};
use crate::utils::logging;
use crate::workflow::{ExtractFlow, TranslateFlow};

/// 命令行命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 翻译一个视频：`translate <url> <target_lang>`
    Translate { url: String, target_lang: String },
    /// 提取一个分享链接：`extract <share_url>`
    Extract { share_url: String },
}

impl Command {
    /// 从命令行参数解析命令
    pub fn parse(args: &[String]) -> Option<Command> {
        match args.first().map(String::as_str) {
            Some("translate") => {
                let url = args.get(1)?.clone();
                let target_lang = args.get(2).cloned().unwrap_or_else(|| "en".to_string());
                Some(Command::Translate { url, target_lang })
            }
            Some("extract") => Some(Command::Extract {
                share_url: args.get(1)?.clone(),
            }),
            _ => None,
        }
    }

    /// 用法说明
    pub fn usage() -> &'static str {
        "用法:\n  ai_media_pipeline translate <视频URL> [目标语言]\n  ai_media_pipeline extract <分享链接>"
    }
}

/// 应用主结构
pub struct App {
    config: Config,
}

impl App {
    /// 初始化应用：合并运行时可编辑的系统设置
    pub async fn initialize(mut config: Config) -> Result<Self> {
        logging::log_startup(&config);

        // 运行时设置里的密钥优先于环境变量
        let settings_path = std::path::Path::new(&config.data_dir).join("settings.json");
        let settings = JsonFileConfigStore::new(settings_path)
            .load()
            .await
            .context("读取系统设置失败")?;

        if !settings.video_api_key.is_empty() {
            config.video_api_key = settings.video_api_key.clone();
        }
        if !settings.chat_api_key.is_empty() {
            config.chat_api_key = settings.chat_api_key.clone();
        }

        Ok(Self { config })
    }

    /// 执行一个命令
    pub async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Translate { url, target_lang } => self.run_translate(&url, &target_lang).await,
            Command::Extract { share_url } => self.run_extract(&share_url).await,
        }
    }

    /// 执行视频翻译流水线
    async fn run_translate(&self, url: &str, target_lang: &str) -> Result<()> {
        let client = VideoClient::new(&self.config)?;
        let flow = TranslateFlow::new(client);

        // Ctrl+C 触发取消，在途请求立即中止
        let (handle, token) = cancel_pair();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("⚠️ 收到中断信号，取消任务...");
                handle.cancel();
            }
        });

        // 进度观察
        let mut progress_rx = flow.progress();
        tokio::spawn(async move {
            while progress_rx.changed().await.is_ok() {
                let progress = progress_rx.borrow().clone();
                logging::log_progress(&progress);
            }
        });

        let task = flow
            .run(url, target_lang, &token)
            .await
            .context("视频翻译流水线执行失败")?;

        logging::log_artifacts(&task);
        Ok(())
    }

    /// 执行多平台提取
    async fn run_extract(&self, share_url: &str) -> Result<()> {
        let settings_path = std::path::Path::new(&self.config.data_dir).join("settings.json");
        let settings = JsonFileConfigStore::new(settings_path)
            .load()
            .await
            .context("读取系统设置失败")?;

        let normalizer = if settings.best_effort_parsing {
            Normalizer::best_effort()
        } else {
            Normalizer::strict()
        };

        let sessions_path = std::path::Path::new(&self.config.data_dir).join("sessions.json");
        let sessions = JsonFileStore::open(sessions_path).context("打开会话存储失败")?;

        let client = ChatClient::new(&self.config)?;
        let flow = ExtractFlow::new(
            client,
            StatusPoller::new(&self.config),
            normalizer,
            sessions,
        );

        let (handle, token) = cancel_pair();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("⚠️ 收到中断信号，取消任务...");
                handle.cancel();
            }
        });

        let result = flow
            .run(share_url, &token)
            .await
            .context("提取任务执行失败")?;

        logging::log_extract_result(&result);
        info!("✅ 提取完成");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_translate_command() {
        let cmd = Command::parse(&args(&["translate", "https://example.com/v.mp4", "ja"]));
        assert_eq!(
            cmd,
            Some(Command::Translate {
                url: "https://example.com/v.mp4".to_string(),
                target_lang: "ja".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_translate_default_lang() {
        let cmd = Command::parse(&args(&["translate", "https://example.com/v.mp4"]));
        assert_eq!(
            cmd,
            Some(Command::Translate {
                url: "https://example.com/v.mp4".to_string(),
                target_lang: "en".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_extract_command() {
        let cmd = Command::parse(&args(&["extract", "https://v.douyin.com/abc/"]));
        assert_eq!(
            cmd,
            Some(Command::Extract {
                share_url: "https://v.douyin.com/abc/".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(Command::parse(&args(&["frobnicate"])), None);
        assert_eq!(Command::parse(&args(&[])), None);
        // 缺少必需参数
        assert_eq!(Command::parse(&args(&["extract"])), None);
    }
}
