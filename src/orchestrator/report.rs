//! 运行报告
//!
//! 按试卷记录状态消息，并收集生成的 PDF

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{Artifact, QuizId};
use crate::utils::sanitize_filename;

/// 消息级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

/// 一条面向用户的状态消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    /// 对应的试卷；运行级消息为 `None`
    pub identifier: Option<QuizId>,
    pub level: Level,
    pub text: String,
}

impl Display for StatusMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.level {
            Level::Info => "INFO",
            Level::Warning => "WARN",
            Level::Error => "ERROR",
        };
        match &self.identifier {
            Some(id) => write!(f, "[{}] {}: {}", tag, id, self.text),
            None => write!(f, "[{}] {}", tag, self.text),
        }
    }
}

/// 一次导出或转换的结果
#[derive(Debug, Default)]
pub struct RunReport {
    pub messages: Vec<StatusMessage>,
    pub artifacts: Vec<Artifact>,
    /// 处理过的试卷数
    pub quizzes: usize,
    /// 抓取到的题目总数
    pub questions: usize,
}

impl RunReport {
    pub fn info(&mut self, identifier: Option<&QuizId>, text: impl Into<String>) {
        self.push(identifier, Level::Info, text.into());
    }

    pub fn warning(&mut self, identifier: Option<&QuizId>, text: impl Into<String>) {
        self.push(identifier, Level::Warning, text.into());
    }

    pub fn error(&mut self, identifier: Option<&QuizId>, text: impl Into<String>) {
        self.push(identifier, Level::Error, text.into());
    }

    pub fn add_artifact(&mut self, artifact: Artifact) {
        self.artifacts.push(artifact);
    }

    /// 错误消息数量
    pub fn failures(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.level == Level::Error)
            .count()
    }

    /// 某个试卷的全部消息
    pub fn messages_for<'a>(&'a self, identifier: &'a QuizId) -> impl Iterator<Item = &'a StatusMessage> {
        self.messages
            .iter()
            .filter(move |m| m.identifier.as_ref() == Some(identifier))
    }

    /// 合并另一份报告
    pub fn merge(&mut self, other: RunReport) {
        self.messages.extend(other.messages);
        self.artifacts.extend(other.artifacts);
        self.quizzes += other.quizzes;
        self.questions += other.questions;
    }

    /// 把生成的 PDF 写入目录，返回写入的路径
    pub fn save_artifacts(&self, directory: &Path) -> AppResult<Vec<PathBuf>> {
        fs::create_dir_all(directory)
            .map_err(|e| AppError::io(directory.display().to_string(), e))?;

        let mut written = Vec::with_capacity(self.artifacts.len());
        for artifact in &self.artifacts {
            let path = directory.join(sanitize_filename(&artifact.name));
            fs::write(&path, &artifact.bytes)
                .map_err(|e| AppError::io(path.display().to_string(), e))?;
            info!("💾 已保存 PDF: {}", path.display());
            written.push(path);
        }
        Ok(written)
    }

    fn push(&mut self, identifier: Option<&QuizId>, level: Level, text: String) {
        let message = StatusMessage {
            identifier: identifier.cloned(),
            level,
            text,
        };
        match level {
            Level::Info => info!("{}", message),
            Level::Warning => warn!("{}", message),
            Level::Error => error!("{}", message),
        }
        self.messages.push(message);
    }
}
