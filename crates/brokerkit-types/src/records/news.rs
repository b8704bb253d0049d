//! News article record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A news article with the symbols it mentions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsRecord {
    /// Upstream article identifier.
    pub id: i64,
    /// Headline.
    pub headline: String,
    /// Publisher (e.g. `benzinga`).
    pub source: Option<String>,
    /// Author.
    pub author: Option<String>,
    /// Short summary.
    pub summary: Option<String>,
    /// Full content, possibly HTML.
    pub content: Option<String>,
    /// Link to the original article.
    pub url: Option<String>,
    /// Symbols mentioned.
    pub symbols: Vec<String>,
    /// Image URLs.
    pub image_urls: Option<Vec<String>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl NewsRecord {
    /// Returns true if the article mentions `symbol` (case-insensitive).
    #[must_use]
    pub fn mentions(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s.eq_ignore_ascii_case(symbol))
    }
}
