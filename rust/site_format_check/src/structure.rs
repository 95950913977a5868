use lazy_static::lazy_static;
use regex::Regex;

pub const ISSUE_BAD_ORDER: &str =
    "index.html has an unexpected order of <html>, <head>, and <body> tags.";
pub const ISSUE_NO_CSS_LINK: &str = "index.html does not link to a CSS file.";

const SECTION_TAGS: [&str; 3] = ["html", "head", "body"];

lazy_static! {
    // Double-quoted href only; single-quoted and bare values are not matched.
    static ref CSS_LINK: Regex = Regex::new(r#"(?i)<link[^>]+href="[^"]+\.css""#).unwrap();
}

/// Presence and ordering of the `<html>`, `<head>` and `<body>` pairs.
///
/// Searches are plain first-occurrence substring lookups on the lowercased
/// text, so markers inside comments or scripts count too.
pub fn check_basic_structure(content: &str) -> Vec<String> {
    let lowered = content.to_lowercase();
    let mut issues = Vec::new();

    for tag in SECTION_TAGS {
        if !lowered.contains(&format!("<{tag}")) {
            issues.push(format!("index.html is missing <{tag}> tag."));
        }
        if !lowered.contains(&format!("</{tag}>")) {
            issues.push(format!("index.html is missing </{tag}> closing tag."));
        }
    }

    let open = |tag: &str| lowered.find(&format!("<{tag}"));
    let close = |tag: &str| lowered.find(&format!("</{tag}>"));

    let positions = [
        open("html"),
        open("head"),
        close("head"),
        open("body"),
        close("body"),
        close("html"),
    ];

    // Order is only judged when every marker is present.
    let found: Option<Vec<usize>> = positions.into_iter().collect();
    if let Some(found) = found {
        if !found.windows(2).all(|w| w[0] < w[1]) {
            issues.push(ISSUE_BAD_ORDER.to_string());
        }
    }

    issues
}

pub fn has_css_link(content: &str) -> bool {
    CSS_LINK.is_match(content)
}

/// Returns the CSS-link issue when the page references no stylesheet.
pub fn check_css_link(content: &str) -> Option<String> {
    (!has_css_link(content)).then(|| ISSUE_NO_CSS_LINK.to_string())
}
