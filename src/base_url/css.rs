//! `url()` rewriting inside stylesheet text

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use url::Url;

use super::rewrite_href_base_url;

lazy_static! {
    static ref CSS_URL: Regex = Regex::new(r"url\(([^)]*)\)")
        .expect("BUG: hardcoded CSS url() regex is invalid");
}

/// Re-base every `url(...)` token in `css_text` from `old_base` to `new_base`
///
/// Quoting is preserved per token: `url("a.png")`, `url('a.png')` and
/// `url(a.png)` keep their delimiters.
#[must_use]
pub fn rewrite_css_text_base_url(css_text: &str, old_base: &Url, new_base: &Url) -> String {
    CSS_URL
        .replace_all(css_text, |caps: &Captures<'_>| {
            let inner = caps[1].trim();
            let (quote, path) = match inner.chars().next() {
                Some(q @ ('"' | '\'')) if inner.len() >= 2 && inner.ends_with(q) => {
                    (Some(q), &inner[1..inner.len() - 1])
                }
                _ => (None, inner),
            };
            let rewritten = rewrite_href_base_url(path, old_base, new_base);
            match quote {
                Some(q) => format!("url({q}{rewritten}{q})"),
                None => format!("url({rewritten})"),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_rewrites_relative_url_between_directories() {
        let css = "div { background: url(../x.png); }";
        let out = rewrite_css_text_base_url(
            css,
            &url("https://example.com/a/b.html"),
            &url("https://example.com/a/c/d.html"),
        );
        assert_eq!(out, "div { background: url(../../x.png); }");
    }

    #[test]
    fn test_preserves_quotes_and_absolute_urls() {
        let css = r#"a { b: url("img/x.png"); c: url('/abs.png'); d: url(data:image/png;base64,AA); e: url( 'y.png' ) }"#;
        let out = rewrite_css_text_base_url(
            css,
            &url("https://example.com/components/el.html"),
            &url("https://example.com/index.html"),
        );
        assert_eq!(
            out,
            r#"a { b: url("components/img/x.png"); c: url('/abs.png'); d: url(data:image/png;base64,AA); e: url('components/y.png') }"#
        );
    }

    #[test]
    fn test_templated_urls_untouched() {
        let css = "a { b: url({{path}}/x.png) }";
        let out = rewrite_css_text_base_url(
            css,
            &url("https://example.com/components/el.html"),
            &url("https://example.com/index.html"),
        );
        assert_eq!(out, css);
    }
}
