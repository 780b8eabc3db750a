//! Property tests for href re-basing

mod common;

use common::url;
use kodegen_tools_htmlbundle::{Document, rewrite_ast_base_url, rewrite_href_base_url, rewrite_css_text_base_url};
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    "[a-z]{1,4}"
}

/// A same-origin document URL such as `https://example.com/ab/c/page.html`
fn document_url() -> impl Strategy<Value = String> {
    (prop::collection::vec(segment(), 0..4), segment())
        .prop_map(|(dirs, file)| {
            let mut path = String::new();
            for dir in dirs {
                path.push_str(&dir);
                path.push('/');
            }
            format!("https://example.com/{path}{file}.html")
        })
}

/// A relative href mixing plain, `.` and `..` segments, ending in a file
fn relative_href() -> impl Strategy<Value = String> {
    let part = prop_oneof![
        3 => segment(),
        1 => Just(".".to_string()),
        1 => Just("..".to_string()),
    ];
    (prop::collection::vec(part, 0..5), segment())
        .prop_map(|(parts, file)| {
            let mut href = parts.join("/");
            if !href.is_empty() {
                href.push('/');
            }
            href.push_str(&file);
            href.push_str(".html");
            href
        })
}

proptest! {
    #[test]
    fn rebased_href_resolves_to_same_target(
        old_base in document_url(),
        new_base in document_url(),
        href in relative_href(),
    ) {
        let old_base = url(&old_base);
        let new_base = url(&new_base);

        let rebased = rewrite_href_base_url(&href, &old_base, &new_base);
        let expected = old_base.join(&href).unwrap();
        let actual = new_base.join(&rebased).unwrap();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn rebasing_onto_same_base_changes_nothing(
        base in document_url(),
        href in relative_href(),
    ) {
        let base = url(&base);
        let html = format!(
            r#"<body><a href="{href}">a</a><img src="{href}"><style>p {{ background: url({href}) }}</style></body>"#
        );
        let document = Document::parse(base.clone(), html);
        let before = document.serialize().unwrap();

        rewrite_ast_base_url(&document.ast, &base, &base, true);
        prop_assert_eq!(document.serialize().unwrap(), before);
        prop_assert_eq!(rewrite_href_base_url(&href, &base, &base), href);
    }
}

#[test]
fn test_cross_origin_rebase_is_absolute() {
    let rebased = rewrite_href_base_url(
        "img/x.png",
        &url("https://cdn.example.org/lib/el.html"),
        &url("https://example.com/index.html"),
    );
    assert_eq!(rebased, "https://cdn.example.org/lib/img/x.png");
}

#[test]
fn test_css_rebase_from_nested_import() {
    let css = rewrite_css_text_base_url(
        "div { background: url(../x.png); }",
        &url("https://example.com/a/b.html"),
        &url("https://example.com/a/c/d.html"),
    );
    assert_eq!(css, "div { background: url(../../x.png); }");
}

#[test]
fn test_absolute_and_templated_hrefs_untouched() {
    let old_base = url("https://example.com/a/b.html");
    let new_base = url("https://example.com/index.html");
    for href in ["/root.css", "#frag", "mailto:x@example.com", "{{base}}/x.png", "[[src]]"] {
        assert_eq!(rewrite_href_base_url(href, &old_base, &new_base), href);
    }
}
