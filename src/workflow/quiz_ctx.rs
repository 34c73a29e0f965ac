//! 试卷处理上下文
//!
//! 封装"我正在处理第几张试卷"这一信息

use std::fmt::Display;

use crate::models::QuizId;

/// 试卷处理上下文
#[derive(Debug, Clone)]
pub struct QuizCtx {
    /// 试卷 ID
    pub identifier: QuizId,

    /// 试卷序号（从1开始，仅用于日志显示）
    pub position: usize,

    /// 本次导出的试卷总数
    pub total: usize,
}

impl QuizCtx {
    pub fn new(identifier: QuizId, position: usize, total: usize) -> Self {
        Self {
            identifier,
            position,
            total,
        }
    }
}

impl Display for QuizCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[试卷 {}/{} ID#{}]",
            self.position, self.total, self.identifier
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_position_and_identifier() {
        let ctx = QuizCtx::new(QuizId::parse("1914339").unwrap(), 2, 5);
        assert_eq!(ctx.to_string(), "[试卷 2/5 ID#1914339]");
    }
}
