//! 注入页面执行的 JS 片段

use anyhow::Result;

use super::ClickTarget;

pub const READY_STATE_JS: &str = "document.readyState";

pub const SCROLL_BOTTOM_JS: &str = r#"
        (() => {
            window.scrollTo(0, document.body ? document.body.scrollHeight : 0);
            return true;
        })()
    "#;

/// 点击 `querySelectorAll(selector)[nth]`，找不到元素时返回 false
pub fn build_click_js(target: &ClickTarget) -> Result<String> {
    Ok(format!(
        r#"
        (() => {{
            const el = document.querySelectorAll({selector})[{nth}];
            if (!el) {{
                return false;
            }}
            el.scrollIntoView({{ block: 'center' }});
            el.click();
            return true;
        }})()
        "#,
        selector = serde_json::to_string(&target.selector)?,
        nth = target.nth
    ))
}

/// 填写输入框，找不到元素时返回 false
pub fn build_fill_js(selector: &str, value: &str) -> Result<String> {
    Ok(format!(
        r#"
        (() => {{
            const el = document.querySelector({selector});
            if (!el) {{
                return false;
            }}
            el.focus();
            el.value = {value};
            el.dispatchEvent(new Event('input', {{ bubbles: true }}));
            el.dispatchEvent(new Event('change', {{ bubbles: true }}));
            return true;
        }})()
        "#,
        selector = serde_json::to_string(selector)?,
        value = serde_json::to_string(value)?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_script_quotes_selector() {
        let js = build_click_js(&ClickTarget::new(r#"a[href*="correction"]"#, 2)).unwrap();
        assert!(js.contains(r#"querySelectorAll("a[href*=\"correction\"]")[2]"#));
    }

    #[test]
    fn fill_script_escapes_credentials() {
        let js = build_fill_js("input[type=password]", "p\"w'd\\").unwrap();
        assert!(js.contains(r#"el.value = "p\"w'd\\";"#));
    }
}
