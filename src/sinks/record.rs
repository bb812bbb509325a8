// src/sinks/record.rs
//! Record body shared by all sinks: keyword, author, profile URL, post URL,
//! cleaned and truncated post text, and the post date.

use once_cell::sync::OnceCell;
use regex::Regex;

use crate::types::{Keyword, SearchResultItem};

pub const NOT_AVAILABLE: &str = "Not available";

/// Decode entities, strip tags, collapse whitespace.
pub fn clean_text(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[a-z][^>]*>").expect("tag regex"));
    let stripped = re_tags.replace_all(&decoded, " ");

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"));
    re_ws.replace_all(&stripped, " ").trim().to_string()
}

/// Cut to `max` characters, appending `...` when something was cut.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyStyle {
    /// `**Label:** value` lines.
    Markdown,
    /// `Label: value` lines.
    Plain,
}

/// Normalized record content for one (item, keyword) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordBody {
    pub keyword: String,
    pub author: String,
    pub profile_url: String,
    pub post_url: String,
    pub content: Option<String>,
    pub posted_at: Option<String>,
}

impl RecordBody {
    pub fn new(item: &SearchResultItem, keyword: &Keyword, max_content_chars: usize) -> Self {
        let content = clean_text(&item.text);
        Self {
            keyword: keyword.text.clone(),
            author: item
                .author_name
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            profile_url: item
                .author_profile_url
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            post_url: item.url.clone(),
            content: (!content.is_empty()).then(|| truncate_chars(&content, max_content_chars)),
            posted_at: item.created_at.clone(),
        }
    }

    /// Task / deal title.
    pub fn title(&self) -> String {
        format!("{} - LinkedIn post ({})", self.author, self.keyword)
    }

    pub fn render(&self, style: BodyStyle) -> String {
        let line = |label: &str, value: &str| match style {
            BodyStyle::Markdown => format!("**{label}:** {value}\n"),
            BodyStyle::Plain => format!("{label}: {value}\n"),
        };
        let mut out = match style {
            BodyStyle::Markdown => "**LinkedIn post**\n\n".to_string(),
            BodyStyle::Plain => format!("LinkedIn post found by keyword: {}\n\n", self.keyword),
        };
        if style == BodyStyle::Markdown {
            out.push_str(&line("Keyword", &self.keyword));
        }
        out.push_str(&line("Author", &self.author));
        out.push_str(&line("Profile URL", &self.profile_url));
        out.push_str(&line("Post URL", &self.post_url));
        out.push('\n');
        if let Some(c) = &self.content {
            match style {
                BodyStyle::Markdown => out.push_str(&format!("**Content:**\n{c}\n\n")),
                BodyStyle::Plain => out.push_str(&format!("Content:\n{c}\n\n")),
            }
        }
        if let Some(d) = &self.posted_at {
            out.push_str(&line("Date", d));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LocaleTag;

    fn item(text: &str) -> SearchResultItem {
        SearchResultItem {
            url: "https://www.linkedin.com/posts/abc".into(),
            text: text.into(),
            author_name: Some("Ana Ruiz".into()),
            author_profile_url: None,
            created_at: Some("2025-03-01".into()),
            location_hint: Some("CDMX".into()),
            location: LocaleTag::Target,
            origin_keyword: "fintech".into(),
        }
    }

    #[test]
    fn clean_text_strips_markup() {
        assert_eq!(
            clean_text("<p>Hola&nbsp;&amp; <b>bienvenidos</b></p>\n\n a  todos"),
            "Hola & bienvenidos a todos"
        );
        assert_eq!(clean_text("2 < 3 and 5 > 4"), "2 < 3 and 5 > 4");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("ñandú", 3), "ñan...");
        assert_eq!(truncate_chars("abc", 3), "abc");
    }

    #[test]
    fn body_embeds_all_fields() {
        let kw = Keyword::new("t1", "fintech");
        let b = RecordBody::new(&item(&"x".repeat(600)), &kw, 500);
        let md = b.render(BodyStyle::Markdown);
        assert!(md.contains("**Keyword:** fintech"));
        assert!(md.contains("**Author:** Ana Ruiz"));
        assert!(md.contains("**Profile URL:** Not available"));
        assert!(md.contains("**Post URL:** https://www.linkedin.com/posts/abc"));
        assert!(md.contains(&format!("{}...", "x".repeat(500))));
        assert!(md.contains("**Date:** 2025-03-01"));

        let plain = b.render(BodyStyle::Plain);
        assert!(plain.starts_with("LinkedIn post found by keyword: fintech"));
        assert!(plain.contains("Post URL: https://www.linkedin.com/posts/abc"));
        assert_eq!(b.title(), "Ana Ruiz - LinkedIn post (fintech)");
    }

    #[test]
    fn empty_text_has_no_content_section() {
        let kw = Keyword::new("t1", "fintech");
        let b = RecordBody::new(&item("   "), &kw, 500);
        assert!(b.content.is_none());
        assert!(!b.render(BodyStyle::Plain).contains("Content:"));
    }
}
