use serde::Serialize;
use std::fmt::Display;

use super::QuizId;

pub const PDF_MIME: &str = "application/pdf";

/// 文档模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DocumentMode {
    /// 题目版：只有题干和选项
    Subject,
    /// 答案版：附带判定、解析和作答
    Corrected,
}

impl DocumentMode {
    pub const ALL: [DocumentMode; 2] = [DocumentMode::Subject, DocumentMode::Corrected];

    /// 文件名中的模式后缀
    pub fn suffix(self) -> &'static str {
        match self {
            DocumentMode::Subject => "subject",
            DocumentMode::Corrected => "corrected",
        }
    }

    /// 文档标题中的名称
    pub fn label(self) -> &'static str {
        match self {
            DocumentMode::Subject => "Sujet",
            DocumentMode::Corrected => "Corrigé",
        }
    }
}

impl Display for DocumentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.suffix())
    }
}

/// 渲染好的 HTML 文档，交给栅格化器使用一次
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub identifier: QuizId,
    pub mode: DocumentMode,
    pub html: String,
}

impl RenderedDocument {
    /// `<prefix>_<identifier>_<mode>.pdf`
    pub fn artifact_name(&self, prefix: &str) -> String {
        format!("{}_{}_{}.pdf", prefix, self.identifier, self.mode.suffix())
    }
}

/// 输出产物
#[derive(Debug, Clone)]
pub struct Artifact {
    pub name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn pdf(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: PDF_MIME,
            bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_names_are_deterministic() {
        let doc = RenderedDocument {
            identifier: QuizId::parse("1914339").unwrap(),
            mode: DocumentMode::Corrected,
            html: String::new(),
        };
        assert_eq!(doc.artifact_name("qcm"), "qcm_1914339_corrected.pdf");
    }
}
