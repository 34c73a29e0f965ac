//! 独立的 HTML → PDF 转换
//!
//! 每个文件生成一个 PDF，从不合并

use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;

use crate::error::{AppError, AppResult, PdfError};
use crate::models::Artifact;
use crate::orchestrator::RunReport;
use crate::services::Rasterizer;

static HTML_EXTENSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(?:html|htm)$").expect("扩展名正则"));

/// 按 UTF-8 解码，失败时按 Latin-1 逐字节解码
pub fn decode_html(raw: &[u8]) -> String {
    match std::str::from_utf8(raw) {
        Ok(text) => text.to_string(),
        Err(_) => raw.iter().map(|&b| char::from(b)).collect(),
    }
}

/// 去掉 `.html` / `.htm` 后缀，加上 `.pdf`
pub fn pdf_name(file_name: &str) -> String {
    format!("{}.pdf", HTML_EXTENSION_RE.replace(file_name, ""))
}

/// HTML 文件转换器
pub struct HtmlConverter<'a> {
    rasterizer: &'a dyn Rasterizer,
}

impl<'a> HtmlConverter<'a> {
    pub fn new(rasterizer: &'a dyn Rasterizer) -> Self {
        Self { rasterizer }
    }

    /// 转换一份 HTML 内容
    pub async fn convert_bytes(&self, file_name: &str, raw: &[u8]) -> AppResult<Artifact> {
        let html = decode_html(raw);
        let name = pdf_name(file_name);
        let bytes = self
            .rasterizer
            .render_html_to_pdf(&html)
            .await
            .map_err(|e| PdfError::RenderFailed {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        Ok(Artifact::pdf(name, bytes))
    }

    /// 逐个转换文件；单个文件失败不影响其他文件
    pub async fn convert_files<P: AsRef<Path>>(&self, paths: &[P]) -> AppResult<RunReport> {
        if paths.is_empty() {
            return Err(PdfError::NoInput.into());
        }

        let mut report = RunReport::default();
        for path in paths {
            let path = path.as_ref();
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());

            let raw = match fs::read(path) {
                Ok(raw) => raw,
                Err(e) => {
                    report.error(None, AppError::io(path.display().to_string(), e).to_string());
                    continue;
                }
            };

            match self.convert_bytes(&file_name, &raw).await {
                Ok(artifact) => {
                    report.info(None, format!("PDF généré : {}", artifact.name));
                    report.add_artifact(artifact);
                }
                Err(e) => report.error(None, e.to_string()),
            }
        }
        Ok(report)
    }
}
