//! Outgoing value sanitization.
//!
//! Values handed to the host pass through an [`HtmlSanitizer`] unless the
//! host turned sanitization off. [`BasicSanitizer`] works from allowlists:
//! elements that execute code are dropped with their content, other unknown
//! elements lose their tags but keep their content, and only known
//! attributes survive. URL attributes whose scheme is not known to be safe
//! are prefixed with `unsafe:`.

use std::sync::LazyLock;

use regex_lite::{Captures, Regex};

/// Turns editor markup into markup safe to hand to the host.
pub trait HtmlSanitizer {
    fn sanitize(&self, html: &str) -> String;
}

impl<F> HtmlSanitizer for F
where
    F: Fn(&str) -> String,
{
    fn sanitize(&self, html: &str) -> String {
        self(html)
    }
}

const SAFE_TAGS: &[&str] = &[
    "a", "abbr", "article", "aside", "b", "bdi", "bdo", "big", "blockquote", "br", "caption",
    "center", "cite", "code", "col", "colgroup", "dd", "del", "dfn", "div", "dl", "dt", "em",
    "figcaption", "figure", "font", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "i", "img", "ins", "kbd", "li", "mark", "ol", "p", "pre", "q", "s", "samp", "section",
    "small", "span", "strike", "strong", "sub", "sup", "table", "tbody", "td", "tfoot", "th",
    "thead", "tr", "tt", "u", "ul", "var",
];

const SAFE_ATTRIBUTES: &[&str] = &[
    "abbr", "align", "alt", "bgcolor", "border", "cellpadding", "cellspacing", "cite", "class",
    "color", "colspan", "datetime", "dir", "face", "headers", "height", "href", "hreflang", "id",
    "lang", "nowrap", "rel", "reversed", "rowspan", "scope", "size", "span", "src", "start",
    "style", "target", "title", "type", "valign", "width",
];

const URL_ATTRIBUTES: &[&str] = &["href", "src", "cite"];

const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto", "tel", "ftp", "sms"];

static COMMENTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->|<[!?][^>]*>").unwrap());

static EXECUTABLE_ELEMENTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<(script|style|iframe|object|embed|svg|math|template|noscript|frameset|applet)\b[^>]*>.*?</(script|style|iframe|object|embed|svg|math|template|noscript|frameset|applet)\s*>",
    )
    .unwrap()
});

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(/?)([a-zA-Z][a-zA-Z0-9-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#).unwrap()
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*("[^"]*"|'[^']*'|[^\s"'>]+))?"#).unwrap()
});

static NUMERIC_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(?:[xX]([0-9a-fA-F]+)|([0-9]+));?").unwrap());

static NAMED_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)&(tab|newline|colon|amp|lpar|rpar);").unwrap());

static SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z][a-z0-9+.\-]*):").unwrap());

static DATA_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^data:image/(png|gif|jpe?g|webp|bmp);base64,").unwrap());

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value)
}

/// Attribute value as the browser would interpret it: entities decoded,
/// whitespace and control characters dropped, lower-cased.
fn normalize_value(value: &str) -> String {
    let numeric = NUMERIC_ENTITY.replace_all(value, |c: &Captures<'_>| {
        let code = match (c.get(1), c.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (_, Some(dec)) => dec.as_str().parse().ok(),
            _ => None,
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });
    let named = NAMED_ENTITY.replace_all(&numeric, |c: &Captures<'_>| {
        match c[1].to_ascii_lowercase().as_str() {
            "tab" => "\t",
            "newline" => "\n",
            "colon" => ":",
            "amp" => "&",
            "lpar" => "(",
            "rpar" => ")",
            _ => "",
        }
    });
    named
        .chars()
        .filter(|c| !c.is_control() && !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

fn is_safe_url(value: &str) -> bool {
    let url = normalize_value(value);
    match SCHEME.captures(&url) {
        None => true,
        Some(caps) => SAFE_SCHEMES.contains(&&caps[1]) || DATA_IMAGE.is_match(&url),
    }
}

fn is_safe_style(value: &str) -> bool {
    let style = normalize_value(value);
    ["expression(", "javascript:", "url(", "behavior:", "-moz-binding"]
        .iter()
        .all(|needle| !style.contains(needle))
}

/// Allowlist sanitizer for the markup a contenteditable region produces.
#[derive(Debug, Clone, Default)]
pub struct BasicSanitizer {
    extra_tags: Vec<String>,
}

impl BasicSanitizer {
    /// Also keep these elements, e.g. the tags of configured custom classes.
    pub fn allow_tags<T: Into<String>>(mut self, tags: impl IntoIterator<Item = T>) -> Self {
        self.extra_tags
            .extend(tags.into_iter().map(|t| t.into().to_ascii_lowercase()));
        self
    }

    fn allows_tag(&self, name: &str) -> bool {
        SAFE_TAGS.contains(&name) || self.extra_tags.iter().any(|t| t == name)
    }

    fn clean_tag(&self, caps: &Captures<'_>) -> String {
        let name = caps[2].to_ascii_lowercase();
        if !self.allows_tag(&name) {
            return String::new();
        }
        if !caps[1].is_empty() {
            return format!("</{name}>");
        }

        let mut out = format!("<{name}");
        for attr in ATTRIBUTE.captures_iter(&caps[3]) {
            let attr_name = attr[1].to_ascii_lowercase();
            if !SAFE_ATTRIBUTES.contains(&attr_name.as_str()) {
                continue;
            }
            match attr.get(2).map(|v| unquote(v.as_str())) {
                Some(value) if URL_ATTRIBUTES.contains(&attr_name.as_str()) && !is_safe_url(value) => {
                    out.push_str(&format!(
                        r#" {attr_name}="unsafe:{}""#,
                        value.replace('"', "&quot;")
                    ));
                }
                Some(value) if attr_name == "style" && !is_safe_style(value) => {}
                _ => {
                    out.push(' ');
                    out.push_str(&attr[0]);
                }
            }
        }
        out.push('>');
        out
    }
}

impl HtmlSanitizer for BasicSanitizer {
    fn sanitize(&self, html: &str) -> String {
        let out = COMMENTS.replace_all(html, "");
        let out = EXECUTABLE_ELEMENTS.replace_all(&out, "");
        let out = TAG.replace_all(&out, |caps: &Captures<'_>| self.clean_tag(caps));

        if out != html {
            tracing::debug!(
                target: "scrivener::sanitize",
                before = html.len(),
                after = out.len(),
                "sanitizer removed unsafe markup"
            );
        }
        out.into_owned()
    }
}
