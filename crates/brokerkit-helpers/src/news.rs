//! News helper.

use brokerkit_fetch::{Endpoint, RawClient, RawRequest};
use brokerkit_normalize::normalize_as;
use brokerkit_types::{NewsRecord, RangeQuery, Result};
use chrono::Utc;

use crate::config::HelperConfig;
use crate::support::Clock;

/// Lookback for [`NewsHelper::latest_news`].
const LATEST_DAYS_BACK: u32 = 1;

/// Parameters for a news request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsQuery {
    /// Symbols to filter on; empty means all.
    pub symbols: Vec<String>,
    /// Time window; an empty query falls back to the configured lookback.
    pub range: RangeQuery,
    /// Maximum number of articles.
    pub limit: Option<u32>,
    /// Include the full article body.
    pub include_content: bool,
    /// Skip articles without a body.
    pub exclude_contentless: bool,
}

impl NewsQuery {
    /// Creates a query for all symbols.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to the given symbols.
    #[must_use]
    pub fn symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symbols = symbols.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the time window.
    #[must_use]
    pub fn range(mut self, range: RangeQuery) -> Self {
        self.range = range;
        self
    }

    /// Sets the article limit.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Requests full article bodies.
    #[must_use]
    pub const fn include_content(mut self, include: bool) -> Self {
        self.include_content = include;
        self
    }

    /// Skips articles without a body.
    #[must_use]
    pub const fn exclude_contentless(mut self, exclude: bool) -> Self {
        self.exclude_contentless = exclude;
        self
    }
}

/// News articles, newest first.
#[derive(Debug, Clone)]
pub struct NewsHelper<C> {
    client: C,
    config: HelperConfig,
    clock: Clock,
}

impl<C: RawClient> NewsHelper<C> {
    /// Creates the helper.
    pub fn new(client: C, config: HelperConfig) -> Self {
        Self {
            client,
            config,
            clock: Utc::now,
        }
    }

    /// Replaces the clock used to resolve relative ranges.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Articles matching `query`.
    ///
    /// # Errors
    ///
    /// Propagates transport and normalization errors.
    pub fn news(&self, query: &NewsQuery) -> Result<Vec<NewsRecord>> {
        let range = if query.range.is_empty() {
            RangeQuery::new().days_back(self.config.news_days_back)
        } else {
            query.range.clone()
        };

        let mut request = RawRequest::new(Endpoint::News)
            .with_symbols(query.symbols.iter().cloned())
            .with_range(range.resolve((self.clock)()))
            .with_limit(query.limit)
            .with_param("sort", "desc");
        if query.include_content {
            request = request.with_param("include_content", true);
        }
        if query.exclude_contentless {
            request = request.with_param("exclude_contentless", true);
        }

        tracing::debug!(symbols = request.symbols.len(), limit = ?request.limit, "submitting news request");
        let items = self.client.submit(&request)?.into_list()?;
        let articles = items
            .iter()
            .map(normalize_as::<NewsRecord>)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(articles)
    }

    /// Articles mentioning `symbol` in the last `days_back` days, or the
    /// configured lookback.
    ///
    /// # Errors
    ///
    /// See [`Self::news`].
    pub fn news_for_symbol(
        &self,
        symbol: &str,
        days_back: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Vec<NewsRecord>> {
        let query = NewsQuery {
            symbols: vec![symbol.to_string()],
            range: RangeQuery::new().days_back(days_back.unwrap_or(self.config.news_days_back)),
            limit,
            ..NewsQuery::default()
        };
        self.news(&query)
    }

    /// Articles from the last day.
    ///
    /// # Errors
    ///
    /// See [`Self::news`].
    pub fn latest_news<S: AsRef<str>>(&self, symbols: &[S], limit: Option<u32>) -> Result<Vec<NewsRecord>> {
        let query = NewsQuery {
            symbols: symbols.iter().map(|s| s.as_ref().to_string()).collect(),
            range: RangeQuery::new().days_back(LATEST_DAYS_BACK),
            limit,
            ..NewsQuery::default()
        };
        self.news(&query)
    }

    /// Articles from the last `hours_back` hours.
    ///
    /// # Errors
    ///
    /// See [`Self::news`].
    pub fn breaking_news<S: AsRef<str>>(
        &self,
        symbols: &[S],
        hours_back: u32,
        limit: Option<u32>,
    ) -> Result<Vec<NewsRecord>> {
        let query = NewsQuery {
            symbols: symbols.iter().map(|s| s.as_ref().to_string()).collect(),
            range: RangeQuery::new().hours_back(hours_back),
            limit,
            ..NewsQuery::default()
        };
        self.news(&query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockClient, fixed_now, object};
    use brokerkit_fetch::RawResponse;
    use brokerkit_types::BrokerError;
    use chrono::TimeDelta;
    use serde_json::json;

    fn article(id: i64) -> brokerkit_normalize::RawItem {
        object(json!({
            "id": id,
            "headline": format!("Headline {id}"),
            "source": "benzinga",
            "symbols": ["AAPL", "MSFT"],
            "created_at": "2024-06-14T12:00:00Z",
            "updated_at": "2024-06-14T12:05:00Z"
        }))
    }

    fn helper(client: &MockClient) -> NewsHelper<&MockClient> {
        NewsHelper::new(client, HelperConfig::default()).with_clock(fixed_now)
    }

    #[test]
    fn test_open_query_uses_configured_lookback() {
        let client = MockClient::new().respond(Endpoint::News, RawResponse::List(vec![article(1), article(2)]));
        let articles = helper(&client).news(&NewsQuery::new()).unwrap();
        assert_eq!(articles.len(), 2);
        assert!(articles[0].mentions("msft"));

        let request = client.last_request().unwrap();
        assert_eq!(request.range.start, Some(fixed_now() - TimeDelta::days(7)));
        assert_eq!(request.range.end, Some(fixed_now()));
        assert_eq!(request.param("sort"), Some("desc"));
        assert_eq!(request.param("include_content"), None);
    }

    #[test]
    fn test_news_for_symbol() {
        let client = MockClient::new().respond(Endpoint::News, RawResponse::List(vec![article(1)]));
        helper(&client).news_for_symbol("AAPL", Some(3), Some(10)).unwrap();
        let request = client.last_request().unwrap();
        assert_eq!(request.symbols, vec!["AAPL"]);
        assert_eq!(request.limit, Some(10));
        assert_eq!(request.range.start, Some(fixed_now() - TimeDelta::days(3)));
    }

    #[test]
    fn test_latest_and_breaking() {
        let client = MockClient::new().respond(Endpoint::News, RawResponse::List(vec![]));
        let news = helper(&client);

        assert!(news.latest_news(&["AAPL"], None).unwrap().is_empty());
        assert_eq!(
            client.last_request().unwrap().range.start,
            Some(fixed_now() - TimeDelta::days(1))
        );

        news.breaking_news(&["TSLA"], 2, Some(5)).unwrap();
        assert_eq!(
            client.last_request().unwrap().range.start,
            Some(fixed_now() - TimeDelta::hours(2))
        );
    }

    #[test]
    fn test_content_flags() {
        let client = MockClient::new().respond(Endpoint::News, RawResponse::List(vec![]));
        helper(&client)
            .news(&NewsQuery::new().include_content(true).exclude_contentless(true).limit(3))
            .unwrap();
        let request = client.last_request().unwrap();
        assert_eq!(request.param("include_content"), Some("true"));
        assert_eq!(request.param("exclude_contentless"), Some("true"));
    }

    #[test]
    fn test_malformed_article_fails_the_call() {
        let mut bad = article(3);
        bad.remove("headline");
        let client = MockClient::new().respond(Endpoint::News, RawResponse::List(vec![article(1), bad]));
        let err = helper(&client).news(&NewsQuery::new()).unwrap_err();
        assert!(matches!(err, BrokerError::Normalize(_)));
        assert!(err.is_missing_field());
    }
}
