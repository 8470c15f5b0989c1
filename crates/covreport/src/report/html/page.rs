//! Page chrome: head, breadcrumb and footer.

use super::resources::{RESOURCES_DIR, STYLESHEET};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use std::fmt::Write;

/// One breadcrumb entry; the last entry is the current page
#[derive(Debug, Clone)]
pub struct Crumb {
    pub label: String,
    pub href: Option<String>,
}

impl Crumb {
    pub fn link(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: Some(href.into()),
        }
    }

    pub fn current(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: None,
        }
    }
}

/// Settings shared by every page
#[derive(Debug, Clone)]
pub struct PageContext<'a> {
    pub charset: &'a str,
    pub language: &'a str,
    pub footer: &'a str,
}

/// Wrap `body` in a complete page
///
/// `depth` is the number of directories between the page and the report
/// root, used to build relative links to shared resources.
pub fn render_page(
    ctx: &PageContext<'_>,
    depth: usize,
    title: &str,
    crumbs: &[Crumb],
    body: &str,
) -> String {
    let base = "../".repeat(depth);
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n");
    let _ = writeln!(html, r#"<html lang="{}">"#, attr(ctx.language));
    html.push_str("<head>\n");
    let _ = writeln!(html, r#"<meta charset="{}"/>"#, attr(ctx.charset));
    let _ = writeln!(
        html,
        r#"<link rel="stylesheet" href="{base}{RESOURCES_DIR}/{STYLESHEET}" type="text/css"/>"#
    );
    let _ = writeln!(html, "<title>{}</title>", text(title));
    html.push_str("</head>\n<body>\n");

    html.push_str(r#"<div class="breadcrumb">"#);
    let _ = write!(
        html,
        r#"<span class="info"><a href="{base}jacoco-sessions.html">Sessions</a></span>"#
    );
    for (i, crumb) in crumbs.iter().enumerate() {
        if i > 0 {
            html.push_str(" &gt; ");
        }
        match &crumb.href {
            Some(href) => {
                let _ = write!(html, r#"<a href="{}">{}</a>"#, attr(href), text(&crumb.label));
            }
            None => {
                let _ = write!(html, r#"<span class="el_current">{}</span>"#, text(&crumb.label));
            }
        }
    }
    html.push_str("</div>\n");

    let _ = writeln!(html, "<h1>{}</h1>", text(title));
    html.push_str(body);
    html.push_str(r#"<div class="footer">"#);
    let _ = write!(
        html,
        r#"<span class="right">Created with covreport {}</span>"#,
        env!("CARGO_PKG_VERSION")
    );
    html.push_str(&text(ctx.footer));
    html.push_str("</div>\n</body>\n</html>\n");
    html
}
