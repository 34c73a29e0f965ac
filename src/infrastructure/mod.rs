pub mod js_executor;
pub mod page_handle;
pub mod scripts;

pub use js_executor::JsExecutor;
pub use page_handle::{ClickTarget, PageHandle};
