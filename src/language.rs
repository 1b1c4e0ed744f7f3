use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Recognition/translation/synthesis locale exposed to the user.
///
/// The selected language determines the locale tag passed to the *next*
/// provider call; events already emitted are never rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Italian,
}

impl Language {
    /// Locale tag consumed by all three provider adapters.
    pub fn tag(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Italian => "it",
        }
    }

    /// The language translations are directed at: English text goes to
    /// Italian and vice versa.
    pub fn counterpart(&self) -> Language {
        match self {
            Language::English => Language::Italian,
            Language::Italian => Language::English,
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::English
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => write!(f, "English"),
            Language::Italian => write!(f, "Italian"),
        }
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "it" | "italian" => Ok(Language::Italian),
            other => anyhow::bail!("unsupported language: {}", other),
        }
    }
}
