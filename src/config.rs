use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;
use crate::utils::PollPolicy;

/// 程序配置文件
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    /// 导出请求：站点、账号、试卷列表
    pub request: RequestConfig,
    /// 站点 URL 模板
    pub site: SiteConfig,
    /// 轮询与超时
    pub timing: TimingConfig,
    /// 浏览器
    pub browser: BrowserConfig,
    /// 输出
    pub output: OutputConfig,
    /// 独立 HTML → PDF 转换
    pub convert: ConvertConfig,
}

/// 导出请求
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct RequestConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// 原始试卷标识，每行一个（纯数字或含 `idEpreuve=` 的 URL）
    pub identifiers: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SiteConfig {
    /// 需要登录才能访问的页面，用于判断是否已登录
    pub protected_path: String,
    /// 题目页，`{id}` 替换为试卷标识
    pub quiz_path: String,
    /// 批改入口页，`{id}` 替换为试卷标识
    pub correction_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            protected_path: "/banque/qcm".to_string(),
            quiz_path: "/banque/qcm/qcmparqcm/idEpreuve={id}".to_string(),
            correction_path: "/banque/qcm/correction/commencer/fin=0/id={id}".to_string(),
        }
    }
}

impl SiteConfig {
    pub fn protected_url(&self, base_url: &str) -> Result<String, ConfigError> {
        join_url(base_url, &self.protected_path)
    }

    pub fn quiz_url(&self, base_url: &str, id: &str) -> Result<String, ConfigError> {
        join_url(base_url, &self.quiz_path.replace("{id}", id))
    }

    pub fn correction_url(&self, base_url: &str, id: &str) -> Result<String, ConfigError> {
        join_url(base_url, &self.correction_path.replace("{id}", id))
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TimingConfig {
    /// 轮询间隔
    pub poll_interval_ms: u64,
    /// 翻页后等待指纹变化的最大次数
    pub fingerprint_polls: u32,
    /// 回到批改视图后等待识别的最大次数
    pub ensure_polls: u32,
    /// 定位批改视图的超时，0 表示不限
    pub locate_timeout_secs: u64,
    /// 登录后等待跳转的超时，0 表示不限
    pub login_timeout_secs: u64,
    /// 页面加载后的额外等待
    pub settle_ms: u64,
    /// 没有任何翻页控件时是否尝试键盘翻页
    pub keyboard_fallback: bool,
    /// 单个试卷最多抓取的题目数
    pub max_questions: usize,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 250,
            fingerprint_polls: 20,
            ensure_polls: 20,
            locate_timeout_secs: 30,
            login_timeout_secs: 30,
            settle_ms: 300,
            keyboard_fallback: false,
            max_questions: 500,
        }
    }
}

impl TimingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn fingerprint_policy(&self) -> PollPolicy {
        PollPolicy::attempts(self.interval(), self.fingerprint_polls.max(1))
    }

    pub fn ensure_policy(&self) -> PollPolicy {
        PollPolicy::attempts(self.interval(), self.ensure_polls.max(1))
    }

    pub fn locate_policy(&self) -> PollPolicy {
        PollPolicy::deadline(self.interval(), seconds_or_unbounded(self.locate_timeout_secs))
    }

    pub fn login_policy(&self) -> PollPolicy {
        PollPolicy::deadline(self.interval(), seconds_or_unbounded(self.login_timeout_secs))
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BrowserConfig {
    /// 无头模式
    pub headless: bool,
    /// 设置后连接已有浏览器的调试端口，而不是启动新实例
    pub debug_port: Option<u16>,
    /// 浏览器可执行文件路径，留空自动查找
    pub chrome_executable: Option<String>,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            debug_port: None,
            chrome_executable: None,
            viewport_width: 1366,
            viewport_height: 900,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    /// PDF 输出目录
    pub directory: String,
    /// 文件名前缀：`<prefix>_<id>_<mode>.pdf`
    pub prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "PDF".to_string(),
            prefix: "qcm".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ConvertConfig {
    /// 需要单独转换为 PDF 的 HTML 文件
    pub html_files: Vec<String>,
}

impl Config {
    /// 读取配置文件，不存在时使用默认值
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = config_path.unwrap_or_else(|| Path::new("config.toml"));
        if path.exists() {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
            return Self::from_toml(&raw).map_err(|e| {
                ConfigError::Parse {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
                .into()
            });
        }
        Ok(Config::default())
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(raw)?;
        Ok(cfg)
    }

    /// 是否配置了导出任务（站点 + 账号）
    pub fn has_export_request(&self) -> bool {
        !self.request.base_url.trim().is_empty() && !self.request.identifiers.trim().is_empty()
    }
}

impl Config {
    /// 导出任务的必要字段
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.has_export_request() {
            return Ok(());
        }
        if self.request.username.trim().is_empty() {
            return Err(ConfigError::Missing("request.username"));
        }
        if self.request.password.is_empty() {
            return Err(ConfigError::Missing("request.password"));
        }
        self.site.protected_url(&self.request.base_url)?;
        Ok(())
    }
}

fn seconds_or_unbounded(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// 以站点地址为基准解析模板路径；相对路径挂在站点路径之下
fn join_url(base_url: &str, path: &str) -> Result<String, ConfigError> {
    let invalid = |e: url::ParseError| ConfigError::InvalidUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    };
    let mut base = Url::parse(base_url.trim()).map_err(invalid)?;
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }
    Ok(base.join(path).map_err(invalid)?.to_string())
}
