use std::io;
use std::io::ErrorKind;

use markdown::{CompileOptions, Options, ParseOptions};

/// Markdown to HTML with GitHub flavoured extensions.
///
/// Output is NOT sanitized: raw HTML and any link protocol in the body are emitted as written.
/// That is only acceptable because posts come from the author's own content directory.
pub struct MarkdownRenderer {}

impl MarkdownRenderer {
    pub fn render(md_text: &str) -> io::Result<String> {
        if md_text.trim().is_empty() {
            return Ok(String::new());
        }

        match markdown::to_html_with_options(md_text, &Self::options()) {
            Ok(x) => Ok(x),
            Err(e) => Err(io::Error::new(ErrorKind::InvalidInput, e.reason.as_str())),
        }
    }

    fn options() -> Options {
        Options {
            parse: ParseOptions::gfm(),
            compile: CompileOptions {
                allow_dangerous_html: true,
                allow_dangerous_protocol: true,
                gfm_tagfilter: false,
                ..CompileOptions::gfm()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_gfm() {
        let html = MarkdownRenderer::render("## Title\n\n| a | b |\n| - | - |\n| 1 | 2 |\n\n~~old~~\n").unwrap();
        assert!(html.contains("<h2>Title</h2>"));
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>old</del>"));
    }

    #[test]
    fn test_raw_html_is_not_escaped() {
        let html = MarkdownRenderer::render("<div class=\"callout\">hi</div>\n\n<script>alert(1)</script>\n").unwrap();
        assert!(html.contains("<div class=\"callout\">hi</div>"));
        assert!(html.contains("<script>alert(1)</script>"));
        assert!(!html.contains("&lt;div"));
        assert!(!html.contains("&lt;script"));
    }

    #[test]
    fn test_tag_filter_is_off() {
        let html = MarkdownRenderer::render("<style>p { color: red; }</style>

<iframe src=\"/demo\"></iframe>
").unwrap();
        assert!(html.contains("<style>p { color: red; }</style>"));
        assert!(html.contains("<iframe src=\"/demo\"></iframe>"));
    }

    #[test]
    fn test_empty_body_renders_empty() {
        assert_eq!(MarkdownRenderer::render("").unwrap(), "");
        assert_eq!(MarkdownRenderer::render("\n\n  \n").unwrap(), "");
    }
}
