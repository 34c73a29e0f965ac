//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责资源管理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `export_runner` - 导出运行器
//! - 持有浏览器会话（打开、登录、结束时释放）
//! - 按输入顺序逐个处理试卷
//! - 渲染两种模式并栅格化
//!
//! ### `html_converter` - HTML 文件转换
//! - 每个 HTML 文件生成一个 PDF
//!
//! ### `report` - 运行报告
//! - 按试卷记录状态消息
//! - 收集并写出 PDF
//!
//! ## 层次关系
//!
//! ```text
//! export_runner (处理 Vec<QuizId>)
//!     ↓
//! workflow::CaptureLoop (处理单个试卷)
//!     ↓
//! services (能力层：login / locate / extract / paginate / render)
//!     ↓
//! infrastructure (基础设施：PageHandle / JsExecutor)
//! ```

pub mod export_runner;
pub mod html_converter;
pub mod report;

pub use export_runner::ExportRunner;
pub use html_converter::HtmlConverter;
pub use report::{Level, RunReport, StatusMessage};
