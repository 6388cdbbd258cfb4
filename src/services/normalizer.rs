//! 结果归一化 - 业务能力层
//!
//! 把上游千奇百怪的响应（干净 JSON、```json 代码块、纯文本）
//! 统一解析成固定的 `ExtractedResult` 结构。
//!
//! 解析优先级：
//! 1. ```json 代码块按固定结构解码
//! 2. 任意代码块按固定结构解码
//! 3. 响应整体按固定结构解码（已归一化的结果原样通过，保证幂等）
//! 4. （仅尽力模式）按中文标签正则提取统计数字和文案段落
//! 5. （仅尽力模式）整段文本当作文案，统计全部置 "-"
//!
//! 严格模式下 4、5 两步跳过，结构解码失败直接返回类型化错误，
//! 而不是悄悄降级。

use regex::Regex;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::extract::{ExtractStats, ExtractedResult};

/// 结果归一化器
pub struct Normalizer {
    /// 是否允许在结构解码失败后回落到正则提取
    best_effort: bool,
}

impl Normalizer {
    /// 创建严格模式归一化器（解码失败即报错）
    pub fn strict() -> Self {
        Self { best_effort: false }
    }

    /// 创建尽力模式归一化器（解码失败回落到正则提取）
    pub fn best_effort() -> Self {
        Self { best_effort: true }
    }

    /// 归一化一段上游响应
    ///
    /// # 参数
    /// - `raw`: 上游响应正文
    ///
    /// # 返回
    /// 固定结构的提取结果；严格模式下解码失败返回 `StrictDecode`
    pub fn normalize(&self, raw: &str) -> AppResult<ExtractedResult> {
        // 按优先级收集候选 JSON 片段
        for candidate in self.json_candidates(raw)? {
            match serde_json::from_str::<ExtractedResult>(&candidate) {
                Ok(result) => {
                    debug!("结构解码成功");
                    return Ok(result);
                }
                Err(e) => {
                    debug!("候选 JSON 解码失败: {}", e);
                }
            }
        }

        if !self.best_effort {
            return Err(AppError::StrictDecode {
                reason: "响应不包含可按固定结构解码的 JSON".to_string(),
            });
        }

        debug!("结构解码失败，回落到正则提取");
        self.extract_from_text(raw)
    }

    /// 收集候选 JSON 片段，优先级：```json 代码块 → 任意代码块 → 整体
    fn json_candidates(&self, raw: &str) -> AppResult<Vec<String>> {
        let mut candidates = Vec::new();

        let json_fence = Regex::new(r"(?s)```json\s*(.*?)```")?;
        for cap in json_fence.captures_iter(raw) {
            candidates.push(cap[1].trim().to_string());
        }

        let any_fence = Regex::new(r"(?s)```[a-zA-Z]*\s*(.*?)```")?;
        for cap in any_fence.captures_iter(raw) {
            let body = cap[1].trim().to_string();
            if !candidates.contains(&body) {
                candidates.push(body);
            }
        }

        let trimmed = raw.trim();
        if trimmed.starts_with('{') {
            candidates.push(trimmed.to_string());
        }

        // 只保留 JSON 对象，避免把普通文本喂给解码器
        candidates.retain(|c| c.starts_with('{'));
        Ok(candidates)
    }

    /// 从纯文本中按中文标签提取字段
    fn extract_from_text(&self, raw: &str) -> AppResult<ExtractedResult> {
        let mut result = ExtractedResult::default();
        let mut matched_any = false;

        if let Some(v) = self.labeled_line(raw, &["平台"])? {
            result.platform = v;
            matched_any = true;
        }
        if let Some(v) = self.labeled_line(raw, &["作者", "博主"])? {
            result.author = v;
            matched_any = true;
        }
        if let Some(v) = self.labeled_line(raw, &["标题"])? {
            result.title = v;
            matched_any = true;
        }
        if let Some(v) = self.labeled_line(raw, &["封面"])? {
            result.cover = v;
            matched_any = true;
        }

        result.stats = ExtractStats {
            likes: self.labeled_number(raw, &["点赞数量", "点赞数", "点赞"])?,
            comments: self.labeled_number(raw, &["评论数量", "评论数", "评论"])?,
            favorites: self.labeled_number(raw, &["收藏数量", "收藏数", "收藏"])?,
            shares: self.labeled_number(raw, &["分享数量", "转发数量", "分享", "转发"])?,
        };
        if result.stats != ExtractStats::default() {
            matched_any = true;
        }

        if let Some(copy) = self.section(raw, &["文案内容", "文案"])? {
            result.copy_text = copy;
            matched_any = true;
        }
        if let Some(transcript) = self.section(raw, &["视频文稿", "口播文稿"])? {
            result.transcript = transcript;
            matched_any = true;
        }

        // 什么都没提取到：整段响应当作文案
        if !matched_any {
            result.copy_text = raw.trim().to_string();
        }

        Ok(result)
    }

    /// 提取 "标签：值" 形式的单行字段
    fn labeled_line(&self, raw: &str, labels: &[&str]) -> AppResult<Option<String>> {
        for label in labels {
            let re = Regex::new(&format!(r"{}[：:]\s*(.+)", regex::escape(label)))?;
            if let Some(cap) = re.captures(raw) {
                let value = cap[1].trim().to_string();
                if !value.is_empty() {
                    return Ok(Some(value));
                }
            }
        }
        Ok(None)
    }

    /// 提取 "标签：数字" 形式的统计值，未找到返回 "-"
    fn labeled_number(&self, raw: &str, labels: &[&str]) -> AppResult<String> {
        for label in labels {
            let re = Regex::new(&format!(
                r"{}[：:]\s*([0-9][0-9,\.]*\s*[万亿wWkK]?\+?)",
                regex::escape(label)
            ))?;
            if let Some(cap) = re.captures(raw) {
                return Ok(cap[1].trim().to_string());
            }
        }
        Ok("-".to_string())
    }

    /// 提取 "标签：" 之后到下一个已知标签（或文本结尾）的整段内容
    fn section(&self, raw: &str, labels: &[&str]) -> AppResult<Option<String>> {
        for label in labels {
            let re = Regex::new(&format!(
                r"(?s){}[：:]\s*(.*?)(?:\n\s*(?:平台|作者|博主|标题|封面|点赞|评论|收藏|分享|转发|视频文稿|口播文稿|文案)[^\n：:]*[：:]|$)",
                regex::escape(label)
            ))?;
            if let Some(cap) = re.captures(raw) {
                let value = cap[1].trim().to_string();
                if !value.is_empty() {
                    return Ok(Some(value));
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_fence_with_defaults() {
        let raw = "提取结果如下：\n```json\n{\"title\":\"X\",\"stats\":{\"likes\":\"10\"}}\n```";
        let result = Normalizer::best_effort().normalize(raw).unwrap();

        assert_eq!(result.title, "X");
        assert_eq!(result.stats.likes, "10");
        assert_eq!(result.stats.comments, "-");
        assert_eq!(result.stats.favorites, "-");
        assert_eq!(result.stats.shares, "-");
    }

    #[test]
    fn test_unlabeled_fence_parsed_as_json() {
        let raw = "```\n{\"platform\":\"抖音\",\"author\":\"小王\"}\n```";
        let result = Normalizer::best_effort().normalize(raw).unwrap();

        assert_eq!(result.platform, "抖音");
        assert_eq!(result.author, "小王");
        assert_eq!(result.title, "-");
    }

    #[test]
    fn test_bare_json_body() {
        let raw = r#"{"title":"测试视频","stats":{"likes":994,"comments":"56"}}"#;
        let result = Normalizer::best_effort().normalize(raw).unwrap();

        assert_eq!(result.title, "测试视频");
        assert_eq!(result.stats.likes, "994");
        assert_eq!(result.stats.comments, "56");
    }

    #[test]
    fn test_chinese_label_extraction() {
        let raw = "视频数据统计：\n点赞数量：994 次\n评论数量：56 条\n收藏数量：120\n转发数量：8";
        let result = Normalizer::best_effort().normalize(raw).unwrap();

        assert_eq!(result.stats.likes, "994");
        assert_eq!(result.stats.comments, "56");
        assert_eq!(result.stats.favorites, "120");
        assert_eq!(result.stats.shares, "8");
        assert_eq!(result.author, "未知作者");
    }

    #[test]
    fn test_copy_text_section() {
        let raw = "作者：小李\n文案内容：今天带大家看看秋天的第一杯奶茶，\n记得点赞关注。\n点赞数量：10";
        let result = Normalizer::best_effort().normalize(raw).unwrap();

        assert_eq!(result.author, "小李");
        assert_eq!(
            result.copy_text,
            "今天带大家看看秋天的第一杯奶茶，\n记得点赞关注。"
        );
        assert_eq!(result.stats.likes, "10");
    }

    #[test]
    fn test_plain_prose_falls_back_to_copy_text() {
        let raw = "这是一段完全没有结构的回复。";
        let result = Normalizer::best_effort().normalize(raw).unwrap();

        assert_eq!(result.copy_text, "这是一段完全没有结构的回复。");
        assert_eq!(result.stats, ExtractStats::default());
    }

    #[test]
    fn test_strict_mode_fails_closed_on_prose() {
        let raw = "这是一段完全没有结构的回复。";
        let result = Normalizer::strict().normalize(raw);

        assert!(matches!(result, Err(AppError::StrictDecode { .. })));
    }

    #[test]
    fn test_strict_mode_accepts_fenced_json() {
        let raw = "```json\n{\"title\":\"X\"}\n```";
        let result = Normalizer::strict().normalize(raw).unwrap();
        assert_eq!(result.title, "X");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = "点赞数量：994 次\n文案内容：奶茶测评";
        let normalizer = Normalizer::best_effort();

        let first = normalizer.normalize(raw).unwrap();
        let serialized = serde_json::to_string(&first).unwrap();
        let second = normalizer.normalize(&serialized).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_stats_with_wan_suffix() {
        let raw = "点赞数量：1.2万 评论数量：3400";
        let result = Normalizer::best_effort().normalize(raw).unwrap();

        assert_eq!(result.stats.likes, "1.2万");
        assert_eq!(result.stats.comments, "3400");
    }
}
