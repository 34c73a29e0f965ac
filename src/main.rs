use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use qcm_export::config::Config;
use qcm_export::orchestrator::{ExportRunner, HtmlConverter, RunReport};
use qcm_export::services::ChromiumRasterizer;
use qcm_export::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::load(None)?;
    config.validate()?;

    let mut report = RunReport::default();

    // 导出试卷
    if config.has_export_request() {
        match ExportRunner::new(config.clone()).run().await {
            Ok(exported) => report.merge(exported),
            Err(e) => {
                let prefix = if e.is_fatal() { "Export interrompu" } else { "Erreur" };
                report.error(None, format!("{} : {}", prefix, e));
            }
        }
    }

    // 单独转换 HTML 文件
    if !config.convert.html_files.is_empty() {
        let rasterizer = ChromiumRasterizer::new(&config.browser);
        match HtmlConverter::new(&rasterizer)
            .convert_files(config.convert.html_files.as_slice())
            .await
        {
            Ok(converted) => report.merge(converted),
            Err(e) => report.error(None, e.to_string()),
        }
    }

    if !config.has_export_request() && config.convert.html_files.is_empty() {
        warn!("⚠️ config.toml 中没有导出任务，也没有需要转换的 HTML 文件，程序结束");
        return Ok(());
    }

    let written = report.save_artifacts(Path::new(&config.output.directory))?;
    info!("输出目录: {}", config.output.directory);

    logging::print_final_stats(
        report.quizzes,
        report.questions,
        written.len(),
        report.failures(),
    );

    Ok(())
}
