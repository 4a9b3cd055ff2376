/*
 * page.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Full HTML page shown by the output surface.
 */

//! Full HTML page shown by the output surface.
//!
//! The page carries the stylesheet, a refresh control, the error banner
//! (if any) and the rendered content. A live page also polls the surface
//! for a new revision and reloads itself; a static page (written to a
//! file) has no script.

use crate::escape::escape_html;
use crate::transform::PreviewOutput;

pub const PAGE_TITLE: &str = "SQL Preview";

const STYLESHEET: &str = include_str!("../resources/preview.css");

/// Path the refresh control posts to.
pub const REFRESH_PATH: &str = "/refresh";
/// Path serving the current content revision.
pub const REVISION_PATH: &str = "/revision";

const REFRESH_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 16 16" fill="currentColor"><path d="M14.9 8c0-3.9-3.1-7-7-7s-7 3.1-7 7c0 3.9 3.1 7 7 7v-2c-2.8 0-5-2.2-5-5s2.2-5 5-5 5 2.2 5 5h-2l3 3 3-3h-2z"/></svg>"#;

/// How the page talks back to its surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    /// Written once; no refresh control or polling.
    Static,
    /// Served live; `revision` is the content revision embedded in the page.
    Live { revision: u64 },
}

/// Render the complete page for one transformation output.
pub fn render_page(output: &PreviewOutput, mode: PageMode) -> String {
    let mut html = String::with_capacity(output.content.len() + STYLESHEET.len() + 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html.push_str(&format!("<title>{PAGE_TITLE}</title>\n"));
    html.push_str("<style>\n");
    html.push_str(STYLESHEET);
    html.push_str("</style>\n</head>\n<body>\n");

    if let PageMode::Live { .. } = mode {
        html.push_str("<div class=\"preview-header\">");
        html.push_str("<button class=\"refresh-button\" onclick=\"refreshPreview()\">");
        html.push_str(REFRESH_ICON);
        html.push_str(" Refresh</button></div>\n");
    }

    if let Some(banner) = output.banner() {
        html.push_str(&format!(
            "<div class=\"sql-preview-error sql-preview-banner\">{}</div>\n",
            escape_html(&banner)
        ));
    }
    html.push_str(&output.content);

    if let PageMode::Live { revision } = mode {
        html.push_str(&live_script(revision));
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn live_script(revision: u64) -> String {
    format!(
        r#"<script>
const currentRevision = {revision};
function refreshPreview() {{
    fetch("{REFRESH_PATH}", {{ method: "POST" }});
}}
setInterval(async () => {{
    try {{
        const response = await fetch("{REVISION_PATH}");
        const revision = parseInt(await response.text(), 10);
        if (revision !== currentRevision) {{
            window.location.reload();
        }}
    }} catch (e) {{}}
}}, 1000);
</script>
"#
    )
}
