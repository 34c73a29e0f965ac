use thiserror::Error;

/// 应用程序错误类型
///
/// 只覆盖需要向上层报告的失败。抽取未命中和翻页停滞不是错误，
/// 分别以 `None` 和 `AdvanceOutcome` 表示。
#[derive(Debug, Error)]
pub enum AppError {
    /// 登录失败：整个导出终止
    #[error("登录失败: {0}")]
    Auth(#[from] AuthError),

    /// 单个试卷定位失败：跳过该试卷
    #[error("导航错误: {0}")]
    Navigation(#[from] NavigationError),

    /// PDF 生成失败：只影响当前试卷的当前模式
    #[error("PDF 错误: {0}")]
    Pdf(#[from] PdfError),

    /// 浏览器启动/连接失败
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 文件读写错误
    #[error("文件错误 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 登录错误
#[derive(Debug, Error)]
pub enum AuthError {
    /// 找不到用户名或密码输入框
    #[error("未找到登录表单字段 (用户名: {username_found}, 密码: {password_found})")]
    FormNotFound {
        username_found: bool,
        password_found: bool,
    },
    /// 提交后仍停留在登录页
    #[error("提交后仍在登录页: {url}")]
    StillOnLoginPage { url: String },
    /// 页面交互失败
    #[error("页面交互失败: {0}")]
    Interaction(String),
}

/// 导航错误
#[derive(Debug, Error)]
pub enum NavigationError {
    /// 无法进入批改视图
    #[error("无法进入试卷 {identifier} 的批改视图")]
    CorrectionViewUnreachable { identifier: String },
    /// 页面加载失败
    #[error("加载 {url} 失败: {reason}")]
    LoadFailed { url: String, reason: String },
}

/// PDF 生成错误
#[derive(Debug, Error)]
pub enum PdfError {
    /// 栅格化失败
    #[error("生成 {name} 失败: {reason}")]
    RenderFailed { name: String, reason: String },
    /// 没有输入
    #[error("未提供 HTML 文件")]
    NoInput,
}

/// 浏览器错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 启动无头浏览器失败
    #[error("启动浏览器失败: {0}")]
    LaunchFailed(String),
    /// 连接调试端口失败
    #[error("无法连接到浏览器 (端口: {port}): {reason}")]
    ConnectionFailed { port: u16, reason: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML 解析失败
    #[error("解析配置文件 {path} 失败: {reason}")]
    Parse { path: String, reason: String },
    /// 缺少必要字段
    #[error("缺少必要配置: {0}")]
    Missing(&'static str),
    /// 站点地址无法解析
    #[error("无效的 URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl AppError {
    /// 创建文件读写错误
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }

    /// 是否应终止整个导出
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AppError::Auth(_) | AppError::Browser(_) | AppError::Config(_)
        )
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_run_level_errors_are_fatal() {
        let auth: AppError = AuthError::StillOnLoginPage {
            url: "https://x/login".into(),
        }
        .into();
        let nav: AppError = NavigationError::CorrectionViewUnreachable {
            identifier: "1914339".into(),
        }
        .into();
        let pdf: AppError = PdfError::NoInput.into();

        assert!(auth.is_fatal());
        assert!(!nav.is_fatal());
        assert!(!pdf.is_fatal());
    }

    #[test]
    fn messages_carry_context() {
        let err: AppError = NavigationError::CorrectionViewUnreachable {
            identifier: "42".into(),
        }
        .into();
        assert!(err.to_string().contains("42"));
    }
}
