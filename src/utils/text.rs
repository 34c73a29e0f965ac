use once_cell::sync::Lazy;
use phf::phf_set;
use regex::Regex;
use scraper::Html;
use url::Url;

static SUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<sup\b[^>]*>(.*?)</sup\s*>").expect("sup 正则"));

static BREAK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(?:p|div|li|tr|td|th|h[1-6])\s*>").expect("换行正则")
});

/// 标签或注释；只有已知的 HTML/SVG 元素名或自定义元素才按标签处理
static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<!--.*?-->|</?([A-Za-z][A-Za-z0-9-]*)[^<>]*>").expect("标签正则")
});

static HTML_TAGS: phf::Set<&'static str> = phf_set! {
    "a", "abbr", "address", "area", "article", "aside", "audio", "b", "bdi", "bdo",
    "big", "blockquote", "body", "br", "button", "canvas", "caption", "center", "cite",
    "code", "col", "colgroup", "data", "datalist", "dd", "del", "details", "dfn",
    "dialog", "div", "dl", "dt", "em", "embed", "fieldset", "figcaption", "figure",
    "font", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header",
    "hr", "html", "i", "iframe", "img", "input", "ins", "kbd", "label", "legend", "li",
    "link", "main", "map", "mark", "math", "meta", "meter", "nav", "noscript", "object",
    "ol", "optgroup", "option", "output", "p", "param", "picture", "pre", "progress",
    "q", "rp", "rt", "ruby", "s", "samp", "script", "section", "select", "small",
    "source", "span", "strike", "strong", "style", "sub", "summary", "sup", "svg",
    "table", "tbody", "td", "template", "textarea", "tfoot", "th", "thead", "time",
    "title", "tr", "track", "tt", "u", "ul", "var", "video", "wbr",
    "circle", "defs", "g", "line", "path", "polygon", "polyline", "rect", "use",
};

/// HTML 片段转纯文本
///
/// - `<sup>x</sup>` 变为 `^x`
/// - 去掉所有标签
/// - 解码 HTML 实体
/// - 连续空白折叠为单个空格
///
/// 反复处理直到结果不再变化，因此对输出再次调用结果不变。
/// 不构成标签的 `<`（如 `K<Na`）作为文本保留。
pub fn html_to_text(html: &str) -> String {
    let mut current = normalize_once(html);
    // 每轮长度不增，等长时只可能是空白被替换
    loop {
        let next = normalize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn normalize_once(input: &str) -> String {
    let with_carets = SUP_RE.replace_all(input, "^$1");
    let with_breaks = BREAK_RE.replace_all(&with_carets, " ");
    let markup = escape_stray_brackets(&with_breaks);

    let fragment = Html::parse_fragment(&markup);
    let raw: String = fragment.root_element().text().collect();

    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 把不属于已知标签的 `<` 转义，避免被解析器当作标签吞掉
fn escape_stray_brackets(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last = 0;
    for caps in TAG_RE.captures_iter(input) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        out.push_str(&input[last..whole.start].replace('<', "&lt;"));
        let known = caps.get(1).map_or(true, |name| {
            let name = name.as_str().to_ascii_lowercase();
            name.contains('-') || HTML_TAGS.contains(name.as_str())
        });
        let tag = &input[whole.clone()];
        if known {
            out.push_str(tag);
        } else {
            out.push_str(&tag.replace('<', "&lt;"));
        }
        last = whole.end;
    }
    out.push_str(&input[last..].replace('<', "&lt;"));
    out
}

/// 清理文件名中的非法字符
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_whitespace() => '_',
            _ => c,
        })
        .collect()
}

/// 文本转义后嵌入 HTML
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// 把页面里的 href 按当前页面地址解析为绝对 URL
pub fn resolve_href(current_url: &str, href: &str) -> Result<String, url::ParseError> {
    Ok(Url::parse(current_url)?.join(href.trim())?.to_string())
}
