//! Best-effort library detection over raw token code.
//!
//! Token code is third-party, often minified JavaScript, so detection is pattern matching rather
//! than parsing. Known false negatives:
//! - bundles that inline p5 without its `p5.js vX.Y.Z` banner or file name,
//! - scripts injected at runtime (`document.createElement("script")` with a computed URL),
//! - libraries loaded through relative paths other than p5 itself.
//!
//! A miss is reported as "No p5.js found" / "No other libraries found", never as an error.

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

pub const NO_P5: &str = "No p5.js found";
pub const NO_OTHER_LIBRARIES: &str = "No other libraries found";
pub const UNKNOWN_VERSION: &str = "unknown";

static P5_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bp5(?:\.min)?\.js\b|\bp5@\d").expect("p5 reference pattern")
});

// p5@1.9.0 (jsdelivr/unpkg), p5.js/1.4.0 (cdnjs), "p5.js v1.9.0" (file banner)
static P5_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bp5(?:@|\.js/|(?:\.min)?\.js v)(\d+\.\d+\.\d+)").expect("p5 version pattern")
});

static SCRIPT_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^"'\s<>(),;]+\.js\b"#).expect("script url pattern"));

static BANNER_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bv(\d+(?:\.\d+)+)").expect("banner version pattern"));

static P5_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^p5(?:\.min)?\.js$").expect("p5 file pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibrarySummary {
    pub p5_versions: String,
    pub other_libraries: String,
}

impl LibrarySummary {
    pub fn not_found() -> Self {
        Self {
            p5_versions: NO_P5.to_string(),
            other_libraries: NO_OTHER_LIBRARIES.to_string(),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct LibraryExtractor;

impl LibraryExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, content: &str) -> LibrarySummary {
        if content.trim().is_empty() {
            return LibrarySummary::not_found();
        }

        let p5_versions = if P5_REFERENCE.is_match(content) {
            let versions = unique(
                P5_VERSION
                    .captures_iter(content)
                    .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string())),
            );
            if versions.is_empty() {
                UNKNOWN_VERSION.to_string()
            } else {
                versions.join(" / ")
            }
        } else {
            NO_P5.to_string()
        };

        let others = unique(
            SCRIPT_URL
                .find_iter(content)
                .map(|m| m.as_str().to_string())
                .filter(|url| !is_p5_file(url)),
        );
        let other_libraries = if others.is_empty() {
            NO_OTHER_LIBRARIES.to_string()
        } else {
            others.join(" / ")
        };

        LibrarySummary {
            p5_versions,
            other_libraries,
        }
    }

    /// `src` attributes of every `<script>` element, in document order.
    pub fn script_sources(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let Ok(selector) = Selector::parse("script[src]") else {
            return Vec::new();
        };
        document
            .select(&selector)
            .filter_map(|element| element.value().attr("src"))
            .map(|src| src.trim().to_string())
            .filter(|src| !src.is_empty())
            .collect()
    }

    /// Version from a library banner such as `/*! p5.js v1.9.0 ... */`.
    pub fn banner_version(&self, script: &str) -> Option<String> {
        BANNER_VERSION
            .captures(script)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

/// True when the last path segment is `p5.js` or `p5.min.js`.
pub fn is_p5_file(src: &str) -> bool {
    let path = src.split(['?', '#']).next().unwrap_or(src);
    path.rsplit('/')
        .next()
        .map(|file| P5_FILE.is_match(file))
        .unwrap_or(false)
}

fn unique(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for item in items {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}
