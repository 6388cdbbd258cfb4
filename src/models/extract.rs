//! 多平台提取结果的固定结构
//!
//! 上游返回的内容五花八门（干净 JSON、markdown 代码块包裹的 JSON、纯文本），
//! 归一化之后统一落到这里的 `ExtractedResult`。缺失字段使用占位值
//! （统计数字为 "-"，作者为 "未知作者"），而不是 Option。

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

fn dash() -> String {
    "-".to_string()
}

fn unknown_author() -> String {
    "未知作者".to_string()
}

/// 统计字段的宽容反序列化：接受字符串或数字，空值回落到 "-"
fn de_stat<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::String(s) if !s.trim().is_empty() => s,
        Value::Number(n) => n.to_string(),
        _ => dash(),
    })
}

/// 互动数据统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractStats {
    #[serde(default = "dash", deserialize_with = "de_stat")]
    pub likes: String,
    #[serde(default = "dash", deserialize_with = "de_stat")]
    pub comments: String,
    #[serde(default = "dash", deserialize_with = "de_stat")]
    pub favorites: String,
    #[serde(default = "dash", deserialize_with = "de_stat")]
    pub shares: String,
}

impl Default for ExtractStats {
    fn default() -> Self {
        Self {
            likes: dash(),
            comments: dash(),
            favorites: dash(),
            shares: dash(),
        }
    }
}

/// 提取结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedResult {
    #[serde(default = "dash")]
    pub platform: String,
    #[serde(default = "unknown_author")]
    pub author: String,
    #[serde(default = "dash")]
    pub title: String,
    /// 封面图 URL
    #[serde(default = "dash")]
    pub cover: String,
    /// 文案内容
    #[serde(default = "dash")]
    pub copy_text: String,
    /// 视频文稿
    #[serde(default = "dash")]
    pub transcript: String,
    #[serde(default)]
    pub stats: ExtractStats,
}

impl Default for ExtractedResult {
    fn default() -> Self {
        Self {
            platform: dash(),
            author: unknown_author(),
            title: dash(),
            cover: dash(),
            copy_text: dash(),
            transcript: dash(),
            stats: ExtractStats::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_fall_back_to_placeholders() {
        let result: ExtractedResult =
            serde_json::from_str(r#"{"title":"X","stats":{"likes":"10"}}"#).unwrap();
        assert_eq!(result.title, "X");
        assert_eq!(result.author, "未知作者");
        assert_eq!(result.stats.likes, "10");
        assert_eq!(result.stats.comments, "-");
        assert_eq!(result.stats.favorites, "-");
        assert_eq!(result.stats.shares, "-");
    }

    #[test]
    fn test_numeric_stats_accepted() {
        let result: ExtractedResult =
            serde_json::from_str(r#"{"stats":{"likes":994,"comments":null}}"#).unwrap();
        assert_eq!(result.stats.likes, "994");
        assert_eq!(result.stats.comments, "-");
    }
}
