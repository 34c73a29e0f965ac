//! 测试用的脚本化页面和栅格化器
#![allow(dead_code)]

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use qcm_export::config::Config;
use qcm_export::services::Rasterizer;
use qcm_export::{ClickTarget, PageHandle};

pub const BASE_URL: &str = "https://qcm.test";
pub const USERNAME: &str = "etudiant@example.org";
pub const PASSWORD: &str = "secret";

/// 超短间隔的测试配置
pub fn test_config(identifiers: &str) -> Config {
    let mut config = Config::default();
    config.request.base_url = BASE_URL.to_string();
    config.request.username = USERNAME.to_string();
    config.request.password = PASSWORD.to_string();
    config.request.identifiers = identifiers.to_string();
    config.timing.poll_interval_ms = 1;
    config.timing.fingerprint_polls = 3;
    config.timing.ensure_polls = 3;
    config.timing.locate_timeout_secs = 1;
    config.timing.login_timeout_secs = 1;
    config.timing.settle_ms = 0;
    config
}

/// 一道题的内容
#[derive(Debug, Clone)]
pub struct Fixture {
    pub prompt: &'static str,
    pub items: Vec<(&'static str, bool)>,
}

pub fn three_questions() -> Vec<Fixture> {
    vec![
        Fixture {
            prompt: "Douleur thoracique de l'adulte",
            items: vec![("Infarctus du myocarde", true), ("Reflux gastro-oesophagien", false)],
        },
        Fixture {
            prompt: "Dyspnée aiguë",
            items: vec![("Embolie pulmonaire", true), ("Crise d'angoisse", false), ("Pneumothorax", true)],
        },
        Fixture {
            prompt: "Fièvre au retour de voyage",
            items: vec![("Paludisme", true), ("Grippe", true)],
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Login,
    Home,
    Quiz,
    Correction,
}

#[derive(Debug)]
struct State {
    view: View,
    index: usize,
    url: String,
    logged_in: bool,
    filled: HashMap<String, String>,
    clicks: usize,
    reloads: usize,
    keys: Vec<String>,
    /// 已点击"下一题"，但页面要重新加载后才会显示
    pending_reload: bool,
}

/// 模拟题库站点：作答视图 / 批改视图来回切换
pub struct ScriptedPage {
    questions: Vec<Fixture>,
    state: Mutex<State>,
    /// 需要先登录
    require_login: bool,
    /// 为 false 时站点从不提供批改视图
    correction_available: bool,
    /// 在该题点击"下一题"没有效果
    stuck_at: Option<usize>,
    /// 在该题点击"下一题"后，需重新加载页面才会翻页
    frozen_until_reload: Option<usize>,
    /// "下一题"按钮点击失败，只能用方向键翻页
    keyboard_only: bool,
}

impl ScriptedPage {
    pub fn new(questions: Vec<Fixture>) -> Self {
        Self {
            questions,
            state: Mutex::new(State {
                view: View::Home,
                index: 0,
                url: "about:blank".to_string(),
                logged_in: false,
                filled: HashMap::new(),
                clicks: 0,
                reloads: 0,
                keys: Vec::new(),
                pending_reload: false,
            }),
            require_login: false,
            correction_available: true,
            stuck_at: None,
            frozen_until_reload: None,
            keyboard_only: false,
        }
    }

    pub fn requiring_login(mut self) -> Self {
        self.require_login = true;
        self
    }

    pub fn without_correction(mut self) -> Self {
        self.correction_available = false;
        self
    }

    pub fn stuck_at(mut self, index: usize) -> Self {
        self.stuck_at = Some(index);
        self
    }

    pub fn frozen_until_reload(mut self, index: usize) -> Self {
        self.frozen_until_reload = Some(index);
        self
    }

    pub fn keyboard_only(mut self) -> Self {
        self.keyboard_only = true;
        self
    }

    pub fn reloads(&self) -> usize {
        self.state.lock().unwrap().reloads
    }

    pub fn keys(&self) -> Vec<String> {
        self.state.lock().unwrap().keys.clone()
    }

    pub fn clicks(&self) -> usize {
        self.state.lock().unwrap().clicks
    }

    pub fn filled(&self, selector: &str) -> Option<String> {
        self.state.lock().unwrap().filled.get(selector).cloned()
    }

    fn render(&self, state: &State) -> String {
        match state.view {
            View::Login => LOGIN_HTML.to_string(),
            View::Home => "<html><body><h1>Banque QCM</h1><p>Bienvenue</p></body></html>".to_string(),
            View::Quiz => self.quiz_html(state.index),
            View::Correction => self.correction_html(state.index),
        }
    }

    fn quiz_html(&self, index: usize) -> String {
        let q = &self.questions[index];
        let mut items = String::new();
        for (i, (text, _)) in q.items.iter().enumerate() {
            let letter = (b'A' + i as u8) as char;
            items.push_str(&format!(
                r#"<div class="item-label">Item {letter}</div>
                <div class="row"><div class="col-md-10">{text}</div>
                <div class="col-md-2"><input type="checkbox" name="reponse[]" value="{letter}"></div></div>"#
            ));
        }
        let link = if self.correction_available {
            r#"<a id="lien-correction" href="/banque/qcm/correction/commencer/fin=0/id=1">Voir la correction</a>"#
        } else {
            ""
        };
        format!(
            r#"<html><body><div class="card-body"><h2 class="card-title">Question n°{n}</h2>
            <div class="enonce">{prompt}</div><form>{items}<button type="submit">Valider</button></form></div>
            {link}</body></html>"#,
            n = index + 1,
            prompt = q.prompt,
        )
    }

    fn correction_html(&self, index: usize) -> String {
        let q = &self.questions[index];
        let mut items = String::new();
        for (i, (text, correct)) in q.items.iter().enumerate() {
            let letter = (b'A' + i as u8) as char;
            let marker = if *correct {
                r#"<span class="vrai">Vrai</span>"#
            } else {
                r#"<span class="faux">Faux</span>"#
            };
            items.push_str(&format!(
                r#"<div class="item-label">Item {letter}</div>
                <div class="row">
                  <div class="col-md-5">{text}</div>
                  <div class="col-md-5">{marker} Explication {letter}</div>
                  <div class="col-md-2">Réponse {letter}</div>
                </div>"#
            ));
        }
        let next = if index + 1 < self.questions.len() {
            r#"<button id="btn-next">Question suivante</button>"#
        } else {
            ""
        };
        format!(
            r#"<html><body><div class="card-body"><h2 class="card-title">Question n°{n}</h2>
            <div class="enonce">{prompt}</div>{items}</div>{next}</body></html>"#,
            n = index + 1,
            prompt = q.prompt,
        )
    }
}

const LOGIN_HTML: &str = r#"<html><body><form method="post">
    <input type="email" name="email">
    <input type="password" name="password">
    <button type="submit">Se connecter</button>
</form></body></html>"#;

#[async_trait]
impl PageHandle for ScriptedPage {
    async fn goto(&self, url: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.url = url.to_string();

        if self.require_login && !state.logged_in {
            state.url = format!("{}/login", BASE_URL);
            state.view = View::Login;
            return Ok(());
        }

        if url.contains("/correction/") {
            state.view = if self.correction_available {
                View::Correction
            } else {
                View::Quiz
            };
        } else if url.contains("qcmparqcm") {
            state.index = 0;
            state.view = View::Quiz;
        } else {
            state.view = View::Home;
        }
        Ok(())
    }

    async fn evaluate(&self, js: &str) -> Result<Value> {
        if js.contains("document.readyState") {
            return Ok(Value::String("complete".to_string()));
        }
        Ok(Value::Null)
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.state.lock().unwrap().url.clone())
    }

    async fn content(&self) -> Result<String> {
        let state = self.state.lock().unwrap();
        Ok(self.render(&state))
    }

    async fn wait_until_idle(&self) -> Result<()> {
        Ok(())
    }

    async fn click(&self, target: &ClickTarget) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.clicks += 1;

        let view = state.view;
        match view {
            View::Login if target.selector.contains("submit") => {
                let password_ok = state.filled.values().any(|v| v == PASSWORD);
                let user_ok = state.filled.values().any(|v| v == USERNAME);
                if !(password_ok && user_ok) {
                    bail!("identifiants refusés");
                }
                state.logged_in = true;
                state.url = format!("{}/banque/qcm", BASE_URL);
                state.view = View::Home;
                Ok(())
            }
            View::Quiz if target.selector.contains("correction") && self.correction_available => {
                state.url = format!("{}/banque/qcm/correction/commencer/fin=0/id=1", BASE_URL);
                state.view = View::Correction;
                Ok(())
            }
            View::Correction if target.selector.contains("btn-next") => {
                if self.keyboard_only {
                    bail!("element is not clickable: {}", target);
                }
                if self.stuck_at == Some(state.index) {
                    return Ok(());
                }
                if self.frozen_until_reload == Some(state.index) {
                    state.pending_reload = true;
                    return Ok(());
                }
                if state.index + 1 >= self.questions.len() {
                    bail!("element not found: {}", target);
                }
                state.index += 1;
                state.view = View::Quiz;
                Ok(())
            }
            _ => Err(anyhow!("element not found: {}", target)),
        }
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.view != View::Login {
            bail!("element not found: {}", selector);
        }
        state.filled.insert(selector.to_string(), value.to_string());
        Ok(())
    }

    async fn press_key(&self, _selector: Option<&str>, key: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.keys.push(key.to_string());
        if self.keyboard_only
            && key == "ArrowRight"
            && state.view == View::Correction
            && state.index + 1 < self.questions.len()
        {
            state.index += 1;
            state.view = View::Quiz;
        }
        Ok(())
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.reloads += 1;
        if state.pending_reload {
            state.pending_reload = false;
            state.index += 1;
            state.view = View::Quiz;
        }
        Ok(())
    }
}

/// 记录收到的 HTML，返回假 PDF
#[derive(Clone, Default)]
pub struct RecordingRasterizer {
    pub documents: Arc<Mutex<Vec<String>>>,
    /// 答案版渲染失败
    pub fail_corrected: bool,
}

impl RecordingRasterizer {
    pub fn failing_corrected() -> Self {
        Self {
            fail_corrected: true,
            ..Default::default()
        }
    }

    pub fn documents(&self) -> Vec<String> {
        self.documents.lock().unwrap().clone()
    }
}

#[async_trait]
impl Rasterizer for RecordingRasterizer {
    async fn render_html_to_pdf(&self, html: &str) -> Result<Vec<u8>> {
        self.documents.lock().unwrap().push(html.to_string());
        if self.fail_corrected && html.contains("(Corrigé)") {
            bail!("impression interrompue");
        }
        Ok(format!("%PDF-fake {}", html.len()).into_bytes())
    }
}
