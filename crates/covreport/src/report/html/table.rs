//! Coverage tables of the index, package and class pages.

use crate::analysis::{Counter, Counters};
use crate::report::locale::NumberLocale;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use std::fmt::Write;

/// One table row
#[derive(Debug, Clone)]
pub struct Row {
    pub label: String,
    pub href: Option<String>,
    pub counters: Counters,
}

impl Row {
    pub fn new(label: impl Into<String>, href: Option<String>, counters: Counters) -> Self {
        Self {
            label: label.into(),
            href,
            counters,
        }
    }
}

/// Renders rows plus a total footer
#[derive(Debug, Clone, Copy)]
pub struct CoverageTable<'a> {
    locale: &'a NumberLocale,
    with_classes: bool,
}

impl<'a> CoverageTable<'a> {
    pub const fn new(locale: &'a NumberLocale, with_classes: bool) -> Self {
        Self {
            locale,
            with_classes,
        }
    }

    pub fn render(&self, rows: &[Row], total: &Counters) -> String {
        let mut html = String::from(r#"<table class="coverage" cellspacing="0" id="coveragetable">"#);
        html.push_str("\n<thead><tr><td>Element</td>");
        html.push_str("<td>Missed Instructions</td><td>Cov.</td>");
        html.push_str("<td>Missed Branches</td><td>Cov.</td>");
        html.push_str("<td>Missed</td><td>Cxty</td>");
        html.push_str("<td>Missed</td><td>Lines</td>");
        html.push_str("<td>Missed</td><td>Methods</td>");
        if self.with_classes {
            html.push_str("<td>Missed</td><td>Classes</td>");
        }
        html.push_str("</tr></thead>\n");

        html.push_str("<tfoot><tr><td>Total</td>");
        self.cells(&mut html, total);
        html.push_str("</tr></tfoot>\n<tbody>\n");

        for row in rows {
            html.push_str("<tr><td>");
            match &row.href {
                Some(href) => {
                    let _ = write!(html, r#"<a href="{}">{}</a>"#, attr(href), text(&row.label));
                }
                None => html.push_str(&text(&row.label)),
            }
            html.push_str("</td>");
            self.cells(&mut html, &row.counters);
            html.push_str("</tr>\n");
        }
        html.push_str("</tbody>\n</table>\n");
        html
    }

    fn cells(&self, html: &mut String, counters: &Counters) {
        self.ratio_cells(html, counters.instruction);
        self.ratio_cells(html, counters.branch);
        self.missed_total_cells(html, counters.complexity);
        self.missed_total_cells(html, counters.line);
        self.missed_total_cells(html, counters.method);
        if self.with_classes {
            self.missed_total_cells(html, counters.class);
        }
    }

    fn ratio_cells(&self, html: &mut String, counter: Counter) {
        let _ = write!(
            html,
            r#"<td class="bar">{} of {}</td><td class="ctr2">{}</td>"#,
            self.locale.format_integer(counter.missed),
            self.locale.format_integer(counter.total()),
            self.locale.format_percent(counter.covered_ratio())
        );
    }

    fn missed_total_cells(&self, html: &mut String, counter: Counter) {
        let _ = write!(
            html,
            r#"<td class="ctr1">{}</td><td class="ctr2">{}</td>"#,
            self.locale.format_integer(counter.missed),
            self.locale.format_integer(counter.total())
        );
    }
}
