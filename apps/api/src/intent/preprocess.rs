//! Cheap, LLM-free classification of raw input: which URLs it carries and which
//! supported marketplaces they point at. Used for log context only.

use std::sync::LazyLock;

use regex::Regex;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://[^\s]+").expect("URL pattern is valid"));

static PLATFORM_RULES: LazyLock<Vec<(Platform, Regex)>> = LazyLock::new(|| {
    [
        (Platform::Taobao, r"(?i)(taobao\.com|tb\.cn)"),
        (Platform::Alibaba1688, r"(?i)1688\.com"),
        (Platform::Weidian, r"(?i)weidian\.com"),
    ]
    .into_iter()
    .map(|(platform, pattern)| (platform, Regex::new(pattern).expect("platform pattern is valid")))
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Taobao,
    Alibaba1688,
    Weidian,
}

impl Platform {
    /// Returns the first platform whose host pattern matches `url`.
    pub fn detect(url: &str) -> Option<Platform> {
        PLATFORM_RULES
            .iter()
            .find(|(_, re)| re.is_match(url))
            .map(|(platform, _)| *platform)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Taobao => "taobao",
            Platform::Alibaba1688 => "1688",
            Platform::Weidian => "weidian",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Url,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedInput {
    pub kind: InputKind,
    pub urls: Vec<String>,
    pub platforms: Vec<Platform>,
}

/// Returns every `http://` / `https://` URL in `text`, in order of appearance.
pub fn extract_urls(text: &str) -> Vec<String> {
    URL_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

pub fn classify_input(text: &str) -> ClassifiedInput {
    let urls = extract_urls(text);

    let mut platforms = Vec::new();
    for platform in urls.iter().filter_map(|u| Platform::detect(u)) {
        if !platforms.contains(&platform) {
            platforms.push(platform);
        }
    }

    ClassifiedInput {
        kind: if urls.is_empty() {
            InputKind::Text
        } else {
            InputKind::Url
        },
        urls,
        platforms,
    }
}
