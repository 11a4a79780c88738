use std::time::Duration;

use itertools::Itertools;
use serde_json::from_slice;

use crate::error::SourceError;
use crate::target_text::TargetText;

pub const DEFAULT_WORD_API_URL: &str = "https://random-word-api.herokuapp.com/word";

/// Built-in words used whenever the remote source is unavailable.
pub const FALLBACK_WORDS: [&str; 31] = [
    "the", "quick", "brown", "fox", "jumps", "over", "the", "lazy", "dog", "a", "pack", "my",
    "box", "with", "five", "dozen", "liquor", "jugs", "how", "vexingly", "quick", "daft",
    "zebras", "jump", "sphinx", "of", "black", "quartz", "judge", "my", "vow",
];

/// Anything that can produce a list of words for a session.
pub trait WordSource: Send + Sync {
    fn fetch_words(&self) -> Result<Vec<String>, SourceError>;

    /// Short label used in log lines.
    fn name(&self) -> &'static str;
}

/// Fetches random words from an HTTP endpoint returning a JSON array.
#[derive(Debug, Clone)]
pub struct RemoteWordSource {
    base_url: String,
    word_count: usize,
    timeout: Duration,
}

impl RemoteWordSource {
    pub fn new(base_url: impl Into<String>, word_count: usize, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            word_count,
            timeout,
        }
    }
}

impl WordSource for RemoteWordSource {
    fn fetch_words(&self) -> Result<Vec<String>, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("typeclock/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let resp = client
            .get(&self.base_url)
            .query(&[("number", self.word_count)])
            .send()?;

        if !resp.status().is_success() {
            return Err(SourceError::Status(resp.status().as_u16()));
        }

        let body = resp.bytes()?;
        parse_word_payload(&body)
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

/// Serves the words of a fixed piece of text, e.g. a `--prompt` argument.
#[derive(Debug, Clone)]
pub struct StaticWordSource {
    words: Vec<String>,
}

impl StaticWordSource {
    pub fn new(text: &str) -> Self {
        Self {
            words: text.split_whitespace().map(str::to_owned).collect(),
        }
    }
}

impl WordSource for StaticWordSource {
    fn fetch_words(&self) -> Result<Vec<String>, SourceError> {
        if self.words.is_empty() {
            return Err(SourceError::Empty);
        }
        Ok(self.words.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Always serves the built-in list.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackWordSource;

impl WordSource for FallbackWordSource {
    fn fetch_words(&self) -> Result<Vec<String>, SourceError> {
        Ok(FALLBACK_WORDS.iter().map(|w| w.to_string()).collect())
    }

    fn name(&self) -> &'static str {
        "fallback"
    }
}

/// Decode a word service response: a JSON array of strings.
///
/// Blank entries are dropped; a payload without any usable word is
/// rejected so the caller falls back instead of showing an empty prompt.
pub fn parse_word_payload(body: &[u8]) -> Result<Vec<String>, SourceError> {
    let raw: Vec<String> = from_slice(body)?;
    let words: Vec<String> = raw
        .into_iter()
        .map(|w| w.trim().to_owned())
        .filter(|w| !w.is_empty())
        .collect();

    if words.is_empty() {
        return Err(SourceError::Empty);
    }
    Ok(words)
}

pub fn fallback_text() -> TargetText {
    TargetText::new(FALLBACK_WORDS.iter().join(" "))
}

/// Turns a [`WordSource`] into session text, degrading to the fallback
/// list on any failure. Never returns an error.
pub struct WordProvider {
    source: Box<dyn WordSource>,
}

impl WordProvider {
    pub fn new(source: Box<dyn WordSource>) -> Self {
        Self { source }
    }

    pub fn fetch_text(&self) -> TargetText {
        match self.source.fetch_words() {
            Ok(words) => {
                tracing::debug!(source = self.source.name(), words = words.len(), "words fetched");
                TargetText::new(words.iter().join(" "))
            }
            Err(e) => {
                tracing::warn!(source = self.source.name(), error = %e, "word fetch failed, using fallback words");
                fallback_text()
            }
        }
    }
}
