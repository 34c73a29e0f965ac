//! 导出运行器 - 编排层
//!
//! ## 职责
//!
//! 1. **资源管理**：唯一持有浏览器会话，结束时无论成败都释放
//! 2. **登录**：失败则整个导出终止
//! 3. **逐卷抓取**：单卷失败只影响该卷
//! 4. **渲染与栅格化**：两种模式互相独立，失败只记录在该卷该模式上

use tracing::info;

use crate::browser::BrowserSession;
use crate::config::Config;
use crate::error::{AppError, AppResult, BrowserError, PdfError};
use crate::infrastructure::{JsExecutor, PageHandle};
use crate::models::{parse_identifiers, Artifact, CapturedSet, DocumentMode};
use crate::orchestrator::RunReport;
use crate::services::{render, Authenticator, ChromiumRasterizer, Rasterizer};
use crate::utils::logging::{log_quiz_start, log_startup};
use crate::workflow::{CaptureLoop, QuizCtx};

/// 导出运行器
pub struct ExportRunner {
    config: Config,
    rasterizer: Box<dyn Rasterizer>,
}

impl ExportRunner {
    /// 使用 Chromium 栅格化器
    pub fn new(config: Config) -> Self {
        let rasterizer = Box::new(ChromiumRasterizer::new(&config.browser));
        Self { config, rasterizer }
    }

    pub fn with_rasterizer(config: Config, rasterizer: Box<dyn Rasterizer>) -> Self {
        Self { config, rasterizer }
    }

    /// 打开浏览器会话并执行整个导出
    pub async fn run(&self) -> AppResult<RunReport> {
        let mut session = BrowserSession::open(&self.config.browser)
            .await
            .map_err(browser_error)?;

        let result = match session.new_page().await {
            Ok(page) => {
                let executor = JsExecutor::new(
                    page,
                    self.config.timing.interval(),
                    self.config.timing.settle(),
                );
                self.export_with(&executor).await
            }
            Err(e) => Err(browser_error(e)),
        };

        session.close().await;
        result
    }

    /// 在给定页面上执行导出
    ///
    /// 登录失败返回错误；其他失败都记录在报告里
    pub async fn export_with(&self, page: &dyn PageHandle) -> AppResult<RunReport> {
        let mut report = RunReport::default();
        let identifiers = parse_identifiers(&self.config.request.identifiers);
        if identifiers.is_empty() {
            report.error(None, "Aucun identifiant valide");
            return Ok(report);
        }

        log_startup(&self.config.request.base_url, identifiers.len());

        Authenticator::new(&self.config).authenticate(page).await?;
        report.info(None, "Connexion réussie");

        let capture = CaptureLoop::new(&self.config);
        let total = identifiers.len();

        for (index, identifier) in identifiers.into_iter().enumerate() {
            let ctx = QuizCtx::new(identifier, index + 1, total);
            log_quiz_start(ctx.position, ctx.total, ctx.identifier.as_str());
            report.quizzes += 1;

            let captured = match capture.run(page, &ctx).await {
                Ok(captured) => captured,
                Err(e) => {
                    report.error(Some(&ctx.identifier), AppError::from(e).to_string());
                    continue;
                }
            };

            if captured.is_empty() {
                report.warning(Some(&ctx.identifier), "Aucune question capturée");
                continue;
            }

            report.questions += captured.len();
            report.info(
                Some(&ctx.identifier),
                format!("{} question(s) capturée(s)", captured.len()),
            );
            self.publish(&captured, &mut report).await;
        }

        info!("导出结束：{} 个试卷，{} 道题", report.quizzes, report.questions);
        Ok(report)
    }

    /// 渲染并栅格化两种模式
    async fn publish(&self, captured: &CapturedSet, report: &mut RunReport) {
        let prefix = &self.config.output.prefix;

        for mode in DocumentMode::ALL {
            let document = render(&captured.identifier, captured.questions(), mode, prefix);
            let name = document.artifact_name(prefix);

            match self.rasterizer.render_html_to_pdf(&document.html).await {
                Ok(bytes) => {
                    report.info(Some(&captured.identifier), format!("PDF généré : {}", name));
                    report.add_artifact(Artifact::pdf(name, bytes));
                }
                Err(e) => {
                    let err = AppError::from(PdfError::RenderFailed {
                        name,
                        reason: e.to_string(),
                    });
                    report.error(Some(&captured.identifier), err.to_string());
                }
            }
        }
    }
}

/// 浏览器层的 anyhow 错误归入 `BrowserError`
fn browser_error(e: anyhow::Error) -> AppError {
    match e.downcast::<BrowserError>() {
        Ok(browser) => AppError::Browser(browser),
        Err(other) => AppError::Browser(BrowserError::LaunchFailed(other.to_string())),
    }
}
