//! # AI Media Pipeline
//!
//! 视频翻译流水线与多平台提取工具
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/cancel` - 取消令牌，贯穿所有对外调用
//!
//! ### ② 客户端层（Clients）
//! - `VideoClient` - 视频厂商五个阶段端点
//! - `ChatClient` - 对话式厂商的任务提交/状态/结果
//!
//! ### ③ 业务能力层（Services）
//! - `StatusPoller` - 固定间隔轮询远程任务状态
//! - `Normalizer` - 把异构响应归一化成固定结构
//!
//! ### ④ 流程层（Workflow）
//! - `TranslateFlow` - 下载 → 音频分离 → 转写 → 翻译 → 烧录
//! - `ExtractFlow` - 提交 → 轮询 → 拉取 → 归一化
//!
//! ### ⑤ 存储层（Store）
//! - `SessionStore` / `ConfigStore` - 注入式存储后端，读写串行化
//!
//! ### ⑥ 编排层（App）
//! - `App` - 命令解析、设置合并、流程装配

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{cancel_pair, CancelToken};
pub use models::{ExtractedResult, PipelineStage, PipelineTask};
pub use services::{Normalizer, StatusPoller};
pub use workflow::{ExtractFlow, TranslateFlow};
