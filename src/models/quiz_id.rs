use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Display;

static ID_EPREUVE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)idEpreuve=(\d+)").expect("idEpreuve 正则"));

/// 试卷标识
///
/// 站点上的不透明数字编号，只接受纯数字
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuizId(String);

impl QuizId {
    /// 解析单行输入：纯数字直接接受，否则尝试提取 `idEpreuve=` 后的数字
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if line.chars().all(|c| c.is_ascii_digit()) {
            return Some(Self(line.to_string()));
        }
        ID_EPREUVE_RE
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| Self(m.as_str().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for QuizId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 解析多行输入，丢弃无法识别的行，去重并保持顺序
pub fn parse_identifiers(raw: &str) -> Vec<QuizId> {
    let mut seen = HashSet::new();
    raw.lines()
        .filter_map(QuizId::parse)
        .filter(|id| seen.insert(id.clone()))
        .collect()
}
