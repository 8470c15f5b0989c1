//! Annotated source listing.

use crate::analysis::{CoverageStatus, LineCounters, LineMap};
use html_escape::encode_text as text;
use std::fmt::Write;

const fn line_class(status: CoverageStatus) -> Option<&'static str> {
    match status {
        CoverageStatus::Empty => None,
        CoverageStatus::NotCovered => Some("nc"),
        CoverageStatus::PartlyCovered => Some("pc"),
        CoverageStatus::FullyCovered => Some("fc"),
    }
}

/// Branch marker class and tooltip of a line, if it has branches
fn branch_marker(line: &LineCounters) -> Option<(&'static str, String)> {
    let b = line.branches;
    match b.status() {
        CoverageStatus::Empty => None,
        CoverageStatus::NotCovered => Some(("bnc", format!("All {} branches missed.", b.total()))),
        CoverageStatus::PartlyCovered => Some((
            "bpc",
            format!("{} of {} branches missed.", b.missed, b.total()),
        )),
        CoverageStatus::FullyCovered => {
            Some(("bfc", format!("All {} branches covered.", b.total())))
        }
    }
}

/// Render source text with per-line coverage highlighting
///
/// Every line gets an anchor `L<nr>`; lines with code are highlighted by
/// status and lines with branches carry a tooltip.
pub fn render_source(source: &str, lines: &LineMap) -> String {
    let mut html = String::from(r#"<pre class="source linenums">"#);
    html.push('\n');
    for (index, content) in source.lines().enumerate() {
        let nr = index as u32 + 1;
        let escaped = text(content);
        let counters = lines.get(&nr);
        match counters.and_then(|l| line_class(l.status()).map(|c| (l, c))) {
            Some((line, class)) => match branch_marker(line) {
                Some((marker, title)) => {
                    let _ = writeln!(
                        html,
                        r#"<span class="{class} {marker}" id="L{nr}" title="{title}">{escaped}</span>"#
                    );
                }
                None => {
                    let _ = writeln!(html, r#"<span class="{class}" id="L{nr}">{escaped}</span>"#);
                }
            },
            None => {
                let _ = writeln!(html, r#"<span id="L{nr}">{escaped}</span>"#);
            }
        }
    }
    html.push_str("</pre>\n");
    html
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::analysis::Counter;

    fn line(mi: u64, ci: u64, mb: u64, cb: u64) -> LineCounters {
        LineCounters {
            instructions: Counter::new(mi, ci),
            branches: Counter::new(mb, cb),
        }
    }

    #[test]
    fn test_line_highlighting() {
        let mut lines = LineMap::new();
        let _ = lines.insert(1, line(0, 2, 0, 0));
        let _ = lines.insert(2, line(0, 2, 1, 1));
        let _ = lines.insert(3, line(3, 0, 2, 0));
        let html = render_source("a();\nif (x) {\nb();\n}", &lines);
        assert!(html.contains(r#"<span class="fc" id="L1">a();</span>"#));
        assert!(html.contains(r#"<span class="pc bpc" id="L2" title="1 of 2 branches missed.">if (x) {</span>"#));
        assert!(html.contains(r#"<span class="nc bnc" id="L3" title="All 2 branches missed.">b();</span>"#));
        assert!(html.contains(r#"<span id="L4">}</span>"#));
    }

    #[test]
    fn test_source_escaped() {
        let html = render_source("if (a < b && c) {}", &LineMap::new());
        assert!(html.contains("a &lt; b &amp;&amp; c"));
    }
}
