use crate::domain::model::PLACEHOLDER;
use regex::Regex;
use scraper::{Html, Selector};

pub const URI_FIELDS: [&str; 4] = ["artifactUri", "displayUri", "thumbnailUri", "generativeUri"];

/// Fields recovered from the public artwork page when the token API has nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageScrape {
    pub description: String,
    pub ipfs_link: String,
    pub artifact_uri: String,
    pub display_uri: String,
    pub thumbnail_uri: String,
    pub generative_uri: String,
}

impl PageScrape {
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        let inline_scripts = inline_scripts(&document);

        let [artifact_uri, display_uri, thumbnail_uri, generative_uri] =
            URI_FIELDS.map(|field| find_uri(&inline_scripts, field));

        Self {
            description: description(&document),
            ipfs_link: ipfs_link(&document),
            artifact_uri,
            display_uri,
            thumbnail_uri,
            generative_uri,
        }
    }

    /// Nothing that leads to the token code was found.
    pub fn is_empty(&self) -> bool {
        self.ipfs_link == PLACEHOLDER && self.generative_uri == PLACEHOLDER
    }
}

fn select_first<'a>(document: &'a Html, css: &str) -> Option<scraper::ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

fn description(document: &Html) -> String {
    select_first(document, r#"div[class*="GenerativeDisplay_description"]"#)
        .map(|element| {
            element
                .text()
                .flat_map(|chunk| chunk.split_whitespace())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn ipfs_link(document: &Html) -> String {
    select_first(document, r#"a[href*="ipfs"]"#)
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| href.split(',').next())
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn inline_scripts(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("script") else {
        return Vec::new();
    };
    document
        .select(&selector)
        .map(|element| element.text().collect::<String>())
        .filter(|text| !text.is_empty())
        .collect()
}

fn find_uri(scripts: &[String], field: &str) -> String {
    let pattern = format!(r#""{}":"(ipfs://[^"]+)""#, regex::escape(field));
    let Ok(re) = Regex::new(&pattern) else {
        return PLACEHOLDER.to_string();
    };
    scripts
        .iter()
        .filter(|script| script.contains(field))
        .find_map(|script| re.captures(script).and_then(|caps| caps.get(1)))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}
