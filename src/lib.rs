//! # QCM Export
//!
//! 从需要登录、由 JavaScript 渲染的题库站点抓取试卷批改内容，
//! 生成题目版和答案版两份 PDF
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `PageHandle` - 导航 / 填写 / 点击 / 快照原语，所有组件显式传入
//! - `JsExecutor` - 唯一的 page owner，基于 chromiumoxide 实现 `PageHandle`
//! - `browser/` - 启动或连接浏览器，会话结束时释放
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，DOM 判断都是快照上的纯函数
//! - `Authenticator` - 识别登录页并登录
//! - `ViewLocator` - 进入并保持批改视图
//! - `fingerprint` / `extractor` - 指纹与题目抽取
//! - `Paginator` - 翻页并确认指纹变化
//! - `render` / `Rasterizer` - HTML 文档与 PDF
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一张试卷"的完整抓取流程
//! - `QuizCtx` - 上下文封装（试卷 ID + 序号）
//! - `CaptureLoop` - 定位 → 抽取 → 翻页，直到试卷结束
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/export_runner` - 浏览器会话、登录、逐卷抓取、生成 PDF
//! - `orchestrator/html_converter` - 独立的 HTML → PDF 转换
//! - `orchestrator/report` - 按试卷记录的状态消息和产物
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{ClickTarget, JsExecutor, PageHandle};
pub use models::{parse_identifiers, CapturedSet, DocumentMode, QuestionRecord, QuizId};
pub use orchestrator::{ExportRunner, HtmlConverter, RunReport};
pub use services::{ChromiumRasterizer, Rasterizer};
pub use workflow::{CaptureLoop, QuizCtx};
