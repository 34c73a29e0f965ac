//! 登录 - 业务能力层
//!
//! 只做一次：识别登录页、填写账号密码、提交、等待离开登录页。
//! 失败直接返回错误，不重试。

use once_cell::sync::Lazy;
use phf::phf_set;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, info};
use url::Url;

use super::dom::{is_disabled, nth_of, sel, text_of};
use crate::config::{Config, RequestConfig, SiteConfig, TimingConfig};
use crate::error::{AppResult, AuthError};
use crate::infrastructure::{ClickTarget, PageHandle};
use crate::utils::poll_until;

/// URL 路径中表示登录页的关键字
static LOGIN_KEYWORDS: phf::Set<&'static str> = phf_set! {
    "login",
    "connexion",
    "signin",
    "auth",
    "sso",
    "cas",
};

/// 用户名输入框，按优先级
const USERNAME_FIELDS: &[&str] = &[
    "input[type=email]",
    "input[name=email]",
    "input[name=_username]",
    "input[name=username]",
    "input[name=login]",
    "input[id*=email]",
    "input[id*=user]",
    "input[autocomplete=username]",
    "input[type=text]",
];

/// 密码输入框，按优先级
const PASSWORD_FIELDS: &[&str] = &[
    "input[type=password][name=_password]",
    "input[type=password][name=password]",
    "input[type=password]",
];

const SUBMIT_CONTROLS: &str = "button[type=submit], input[type=submit], button";

static PASSWORD_INPUT: Lazy<Selector> = Lazy::new(|| sel("input[type=password]"));
static SUBMITS: Lazy<Selector> = Lazy::new(|| sel(SUBMIT_CONTROLS));

static LOGIN_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:se\s+connecter|connexion|s'identifier|login|log\s+in|sign\s+in)\b")
        .expect("登录按钮正则")
});

/// URL 路径是否包含登录关键字
pub fn url_looks_like_login(url: &str) -> bool {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_lowercase(),
        Err(_) => url.to_lowercase(),
    };
    path.split(|c: char| !c.is_ascii_alphanumeric())
        .any(|segment| LOGIN_KEYWORDS.contains(segment))
}

/// 提交控件的文本（按钮文字或 input 的 value）
fn control_label(el: scraper::ElementRef<'_>) -> String {
    match el.value().attr("value") {
        Some(value) if el.value().name() == "input" => value.trim().to_string(),
        _ => text_of(el),
    }
}

/// 分层判断：URL 关键字 或 密码框 或 登录字样的提交按钮
pub fn is_login_page(url: &str, html: &str) -> bool {
    if url_looks_like_login(url) {
        return true;
    }
    let doc = Html::parse_document(html);
    doc.select(&PASSWORD_INPUT).next().is_some()
        || doc.select(&SUBMITS).any(|el| LOGIN_LABEL_RE.is_match(&control_label(el)))
}

/// 按优先级找到第一个存在的输入框选择器
pub fn find_field(doc: &Html, candidates: &[&'static str]) -> Option<&'static str> {
    candidates
        .iter()
        .copied()
        .find(|css| doc.select(&sel(css)).any(|el| !is_disabled(el)))
}

/// 登录表单的提交按钮：优先 type=submit，其次登录字样的按钮
pub fn find_submit(doc: &Html) -> Option<ClickTarget> {
    let el = doc
        .select(&SUBMITS)
        .filter(|el| !is_disabled(*el))
        .find(|el| {
            matches!(el.value().attr("type"), Some("submit"))
                || LOGIN_LABEL_RE.is_match(&control_label(*el))
        })?;
    nth_of(doc, &SUBMITS, el).map(|nth| ClickTarget::new(SUBMIT_CONTROLS, nth))
}

/// 登录表单的定位结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub username: &'static str,
    pub password: &'static str,
    pub submit: Option<ClickTarget>,
}

/// 在快照中定位登录表单
pub fn locate_form(html: &str) -> Result<LoginForm, AuthError> {
    let doc = Html::parse_document(html);
    let password = find_field(&doc, PASSWORD_FIELDS);
    let username = find_field(&doc, USERNAME_FIELDS);
    match (username, password) {
        (Some(username), Some(password)) => Ok(LoginForm {
            username,
            password,
            submit: find_submit(&doc),
        }),
        _ => Err(AuthError::FormNotFound {
            username_found: username.is_some(),
            password_found: password.is_some(),
        }),
    }
}

/// 登录器
pub struct Authenticator {
    request: RequestConfig,
    site: SiteConfig,
    timing: TimingConfig,
}

impl Authenticator {
    pub fn new(config: &Config) -> Self {
        Self {
            request: config.request.clone(),
            site: config.site.clone(),
            timing: config.timing.clone(),
        }
    }

    /// 打开受保护页面，必要时登录
    pub async fn authenticate(&self, page: &dyn PageHandle) -> AppResult<()> {
        let protected = self.site.protected_url(&self.request.base_url)?;
        info!("🔐 打开受保护页面: {}", protected);

        page.goto(&protected).await.map_err(interaction)?;
        let _ = page.wait_until_idle().await;

        let url = page.current_url().await.map_err(interaction)?;
        let html = page.content().await.map_err(interaction)?;
        if !is_login_page(&url, &html) {
            info!("✓ 已处于登录状态");
            return Ok(());
        }

        info!("需要登录: {}", url);
        let form = locate_form(&html)?;
        debug!("登录表单: {:?}", form);

        page.fill(form.username, &self.request.username)
            .await
            .map_err(interaction)?;
        page.fill(form.password, &self.request.password)
            .await
            .map_err(interaction)?;

        let clicked = match &form.submit {
            Some(target) => page.click(target).await.is_ok(),
            None => false,
        };
        if !clicked {
            debug!("没有可点击的提交按钮，改用回车提交");
            page.press_key(Some(form.password), "Enter")
                .await
                .map_err(interaction)?;
        }
        let _ = page.wait_until_idle().await;

        let left_login = poll_until(self.timing.login_policy(), || async move {
            match page.current_url().await {
                Ok(url) => !url_looks_like_login(&url),
                Err(_) => false,
            }
        })
        .await;

        if !left_login {
            let url = page.current_url().await.unwrap_or_default();
            return Err(AuthError::StillOnLoginPage { url }.into());
        }

        info!("✓ 登录成功");
        Ok(())
    }
}

fn interaction(e: anyhow::Error) -> AuthError {
    AuthError::Interaction(e.to_string())
}
