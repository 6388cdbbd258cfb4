//! 视频翻译流水线的任务模型
//!
//! 一个任务在任意时刻只有一个活动阶段，阶段按固定顺序推进，
//! 任一阶段失败即整个任务终止，没有断点续传。

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 流水线阶段
///
/// 固定顺序：下载 → 音频分离 → 语音转写 → 字幕翻译 → 字幕烧录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Download,
    SeparateAudio,
    Transcribe,
    Translate,
    Burn,
}

impl PipelineStage {
    /// 阶段的固定执行顺序
    pub const ORDER: [PipelineStage; 5] = [
        PipelineStage::Download,
        PipelineStage::SeparateAudio,
        PipelineStage::Transcribe,
        PipelineStage::Translate,
        PipelineStage::Burn,
    ];

    /// 阶段在顺序中的下标（0-based）
    pub fn index(&self) -> usize {
        Self::ORDER.iter().position(|s| s == self).unwrap_or(0)
    }

    /// 阶段的显示名称
    pub fn label(&self) -> &'static str {
        match self {
            PipelineStage::Download => "视频下载",
            PipelineStage::SeparateAudio => "音频提取",
            PipelineStage::Transcribe => "语音转写",
            PipelineStage::Translate => "字幕翻译",
            PipelineStage::Burn => "字幕烧录",
        }
    }

    /// 阶段失败时的错误消息
    pub fn failure_message(&self) -> &'static str {
        match self {
            PipelineStage::Download => "视频下载失败",
            PipelineStage::SeparateAudio => "音频提取失败",
            PipelineStage::Transcribe => "语音转写失败",
            PipelineStage::Translate => "字幕翻译失败",
            PipelineStage::Burn => "字幕烧录失败",
        }
    }

    /// 阶段对应的 API 路径
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            PipelineStage::Download => "/v1/video/download",
            PipelineStage::SeparateAudio => "/v1/video/separate",
            PipelineStage::Transcribe => "/v1/video/transcribe",
            PipelineStage::Translate => "/v1/video/translate",
            PipelineStage::Burn => "/v1/video/burn",
        }
    }

    /// 该阶段完成后的整体进度百分比
    pub fn progress_after(&self) -> u8 {
        ((self.index() + 1) * 100 / Self::ORDER.len()) as u8
    }
}

/// 任务状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskState {
    /// 尚未开始
    Pending,
    /// 正在执行某个阶段
    Running(PipelineStage),
    /// 全部阶段完成
    Completed,
    /// 某个阶段失败，任务终止
    Failed(PipelineStage),
}

/// 单个阶段的产出
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageOutput {
    pub stage: PipelineStage,
    /// 下一阶段请求体中携带的标识
    pub output_id: String,
    /// 该阶段产出的文件 URL（通常只有最后一个阶段返回）
    #[serde(default)]
    pub artifact_urls: Vec<String>,
}

/// 流水线任务
///
/// 每次调用创建一个新任务，阶段完成时原地追加产出记录。
/// 同一个运行器同时只处理一个任务。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineTask {
    pub id: Uuid,
    pub source_url: String,
    pub target_lang: String,
    /// 已完成阶段的产出，按完成顺序排列
    pub completed: Vec<StageOutput>,
    pub state: TaskState,
}

impl PipelineTask {
    /// 创建新任务
    pub fn new(source_url: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_url: source_url.into(),
            target_lang: target_lang.into(),
            completed: Vec::new(),
            state: TaskState::Pending,
        }
    }

    /// 最终产物 URL 列表（最后一个完成阶段返回的 URL）
    pub fn final_artifacts(&self) -> &[String] {
        self.completed
            .last()
            .map(|o| o.artifact_urls.as_slice())
            .unwrap_or(&[])
    }
}

/// 流水线进度，供调用方观察
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineProgress {
    /// 整体进度百分比（0-100）
    pub percent: u8,
    /// 当前正在执行的阶段
    pub current: Option<PipelineStage>,
    pub state: TaskState,
}

impl Default for PipelineProgress {
    fn default() -> Self {
        Self {
            percent: 0,
            current: None,
            state: TaskState::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order_and_progress() {
        assert_eq!(PipelineStage::ORDER.len(), 5);
        assert_eq!(PipelineStage::Download.progress_after(), 20);
        assert_eq!(PipelineStage::Transcribe.progress_after(), 60);
        assert_eq!(PipelineStage::Burn.progress_after(), 100);
    }

    #[test]
    fn test_failure_messages() {
        assert_eq!(PipelineStage::Download.failure_message(), "视频下载失败");
        assert_eq!(PipelineStage::SeparateAudio.failure_message(), "音频提取失败");
        assert_eq!(PipelineStage::Burn.failure_message(), "字幕烧录失败");
    }

    #[test]
    fn test_final_artifacts_empty_when_no_stage_done() {
        let task = PipelineTask::new("https://example.com/v.mp4", "en");
        assert!(task.final_artifacts().is_empty());
        assert_eq!(task.state, TaskState::Pending);
    }
}
