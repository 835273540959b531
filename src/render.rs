//! Markdown-to-HTML conversion for browser responses, plus the small page
//! shells around it. Headers, bold, italic, and `- ` lists only; the input is
//! entity-escaped first so report text cannot inject markup.

use once_cell::sync::OnceCell;
use regex::Regex;

use crate::config::APP_VERSION;
use crate::sectors::title_case;

fn re_h(level: usize) -> &'static Regex {
    static RES: OnceCell<Vec<Regex>> = OnceCell::new();
    &RES.get_or_init(|| {
        (1..=4)
            .map(|l| Regex::new(&format!(r"(?m)^{} (.+)$", "#".repeat(l))).unwrap())
            .collect()
    })[level - 1]
}

fn re_bold() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").unwrap())
}

fn re_italic() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\*(.+?)\*").unwrap())
}

/// Convert report markdown into an HTML fragment.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut html = html_escape::encode_text(markdown).to_string();

    // Headers deepest-first so `#### x` is not eaten by the `#` rule.
    for level in (1..=4).rev() {
        html = re_h(level)
            .replace_all(&html, format!("<h{level}>$1</h{level}>"))
            .to_string();
    }
    html = re_bold().replace_all(&html, "<strong>$1</strong>").to_string();
    html = re_italic().replace_all(&html, "<em>$1</em>").to_string();

    // Lists and paragraphs, line by line.
    let mut out = Vec::new();
    let mut in_list = false;
    for line in html.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("- ") {
            if !in_list {
                out.push("<ul>".to_string());
                in_list = true;
            }
            out.push(format!("<li>{}</li>", rest.trim()));
        } else {
            if in_list {
                out.push("</ul>".to_string());
                in_list = false;
            }
            if trimmed.is_empty() {
                out.push("<br>".to_string());
            } else if trimmed.starts_with("<h") {
                out.push(trimmed.to_string());
            } else {
                out.push(format!("<p>{line}</p>"));
            }
        }
    }
    if in_list {
        out.push("</ul>".to_string());
    }
    out.join("\n")
}

/// Report page: meta strip + converted report body.
pub fn report_page(
    sector: &str,
    generated_at: &str,
    data_sources: usize,
    session_id: &str,
    report_html: &str,
) -> String {
    let title = title_case(sector);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Market Analysis Report - {title} Sector</title>
<style>
body {{ font-family: 'Segoe UI', sans-serif; line-height: 1.7; color: #333; margin: 0; padding: 20px; background: #f4f5fb; }}
.container {{ max-width: 1000px; margin: 0 auto; background: white; border-radius: 12px; padding: 40px; box-shadow: 0 4px 16px rgba(0,0,0,0.08); }}
.meta {{ color: #666; border-bottom: 1px solid #e1e5ff; padding-bottom: 15px; margin-bottom: 25px; }}
h1 {{ border-bottom: 3px solid #667eea; padding-bottom: 10px; }}
h2 {{ border-left: 4px solid #667eea; padding-left: 12px; }}
a.json {{ float: right; color: #667eea; text-decoration: none; font-weight: bold; }}
</style>
</head>
<body>
<div class="container">
<a class="json" href="?format=json">View JSON</a>
<h1>Market Analysis Report: {title} Sector</h1>
<div class="meta">
Generated: {generated_at} &middot; Data sources: {data_sources} &middot; Session: {session_id}
</div>
{report_html}
</div>
</body>
</html>"#
    )
}

/// Landing page with endpoint pointers; served without auth.
pub fn landing_page() -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Sector Analysis API</title>
<style>
body {{ font-family: 'Segoe UI', sans-serif; color: #333; max-width: 800px; margin: 40px auto; padding: 0 20px; line-height: 1.6; }}
code {{ background: #f0f1fa; padding: 2px 6px; border-radius: 4px; }}
.sector {{ display: inline-block; background: #667eea; color: white; padding: 4px 12px; border-radius: 14px; margin: 3px; font-size: 0.9rem; }}
</style>
</head>
<body>
<h1>Sector Analysis API</h1>
<p>AI-powered market intelligence for Indian sectors. Version {APP_VERSION}.</p>
<h2>Endpoints</h2>
<ul>
<li><code>GET /health</code> &mdash; service status, no auth</li>
<li><code>GET /analyze/{{sector}}</code> &mdash; sector analysis; needs <code>x-api-key</code> header or <code>?api_key=</code></li>
</ul>
<h2>Try it</h2>
<p><a href="/analyze/technology?api_key=demo-key-123">/analyze/technology?api_key=demo-key-123</a></p>
<h2>Supported sectors</h2>
<div>
<span class="sector">Pharmaceuticals</span><span class="sector">Technology</span><span class="sector">Banking</span>
<span class="sector">Automotive</span><span class="sector">Agriculture</span><span class="sector">Energy</span>
<span class="sector">Steel</span><span class="sector">Cement</span><span class="sector">FMCG</span><span class="sector">Telecom</span>
</div>
<p><i>Other sector names are accepted too; they run without a company roster.</i></p>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_headers_by_level() {
        let html = markdown_to_html("# One\n## Two\n### Three\n#### Four");
        assert!(html.contains("<h1>One</h1>"));
        assert!(html.contains("<h2>Two</h2>"));
        assert!(html.contains("<h3>Three</h3>"));
        assert!(html.contains("<h4>Four</h4>"));
    }

    #[test]
    fn converts_bold_and_italic() {
        let html = markdown_to_html("**strong** and *soft*");
        assert!(html.contains("<strong>strong</strong>"));
        assert!(html.contains("<em>soft</em>"));
    }

    #[test]
    fn wraps_list_runs_in_ul() {
        let html = markdown_to_html("intro\n- a\n- b\noutro");
        assert!(html.contains("<ul>\n<li>a</li>\n<li>b</li>\n</ul>"));
        assert!(html.contains("<p>intro</p>"));
        assert!(html.contains("<p>outro</p>"));
    }

    #[test]
    fn closes_trailing_list() {
        let html = markdown_to_html("- only\n- items");
        assert!(html.trim_end().ends_with("</ul>"));
    }

    #[test]
    fn escapes_raw_html_in_report_text() {
        let html = markdown_to_html("hello <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn blank_lines_become_breaks() {
        let html = markdown_to_html("a\n\nb");
        assert!(html.contains("<br>"));
    }

    #[test]
    fn report_page_embeds_meta_and_body() {
        let page = report_page("banking", "2026-08-29", 4, "anonymous_1", "<p>x</p>");
        assert!(page.contains("Banking Sector"));
        assert!(page.contains("Data sources: 4"));
        assert!(page.contains("<p>x</p>"));
    }

    #[test]
    fn landing_page_lists_endpoints() {
        let page = landing_page();
        assert!(page.contains("/health"));
        assert!(page.contains("/analyze/"));
    }
}
