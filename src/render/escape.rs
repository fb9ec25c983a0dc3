// src/render/escape.rs

use std::path::Path;

use minijinja::AutoEscape;

/// Extensions whose output is markup and must be HTML-escaped.
const MARKUP_EXTENSIONS: &[&str] = &["html", "htm", "xml"];

/// Auto-escape mode for a template name.
///
/// Matching is case-insensitive so `INDEX.HTML` is escaped too.
pub fn escape_mode_for(name: &str) -> AutoEscape {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext {
        Some(ext) if MARKUP_EXTENSIONS.contains(&ext.as_str()) => AutoEscape::Html,
        _ => AutoEscape::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_extensions_are_escaped() {
        for name in ["index.html", "page.htm", "feed.xml", "LEGACY.HTML", "partials/nav.html"] {
            assert!(matches!(escape_mode_for(name), AutoEscape::Html), "{name}");
        }
    }

    #[test]
    fn other_extensions_are_raw() {
        for name in ["robots.txt", "style.css", "README", "data.json", "index.html.bak"] {
            assert!(matches!(escape_mode_for(name), AutoEscape::None), "{name}");
        }
    }
}
