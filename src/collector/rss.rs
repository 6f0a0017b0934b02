//! RSS Feed Source
//!
//! Reads `<account>/rss` feeds from a list of mirrors, in order, and returns
//! the items of the first feed that has any.

use super::*;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// RSS feed reader over several mirrors
pub struct RssSource {
    client: Client,
    feeds: Vec<String>,
    account: String,
    include_replies: bool,
}

impl RssSource {
    pub fn new(client: Client, feeds: Vec<String>, account: &str, include_replies: bool) -> Self {
        Self {
            client,
            feeds,
            account: account.to_string(),
            include_replies,
        }
    }

    async fn fetch_feed(&self, url: &str) -> CollectorResult<Vec<ScrapedTweet>> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(CollectorError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        parse_feed(&body, &self.account, self.include_replies)
    }
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
}

/// Parse an RSS document into scraped tweets.
///
/// Titles lose their `"Display Name (@account): "` prefix. Items whose title
/// starts with `"R to @"` are replies and are dropped unless
/// `include_replies` is set.
pub fn parse_feed(
    xml: &str,
    account: &str,
    include_replies: bool,
) -> CollectorResult<Vec<ScrapedTweet>> {
    let rss: Rss = quick_xml::de::from_str(xml).map_err(|e| CollectorError::Parse(e.to_string()))?;
    let prefix = format!("(@{}): ", account);

    let tweets = rss
        .channel
        .items
        .into_iter()
        .filter(|item| include_replies || !is_reply(&item.title))
        .map(|item| {
            let content = match item.title.find(&prefix) {
                Some(pos) => &item.title[pos + prefix.len()..],
                None => item.title.as_str(),
            };

            ScrapedTweet {
                tweet_id: extract_status_id(&item.link),
                content: content.trim().to_string(),
                link: item.link.clone(),
            }
        })
        .collect();

    Ok(tweets)
}

fn is_reply(title: &str) -> bool {
    title.starts_with("R to @")
}

#[async_trait]
impl TweetSource for RssSource {
    fn name(&self) -> &str {
        "rss"
    }

    async fn fetch(&self) -> Result<Vec<ScrapedTweet>, CollectorError> {
        let mut failures = Vec::new();

        for url in &self.feeds {
            match self.fetch_feed(url).await {
                Ok(tweets) if !tweets.is_empty() => {
                    tracing::debug!(
                        source = "rss",
                        url = %url,
                        count = tweets.len(),
                        "Fetched feed"
                    );
                    return Ok(tweets);
                }
                Ok(_) => {
                    tracing::warn!(url = %url, "RSS feed has no items");
                    failures.push(format!("{}: empty", url));
                }
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "RSS feed failed");
                    failures.push(format!("{}: {}", url, e));
                }
            }
        }

        if failures.is_empty() {
            return Err(CollectorError::NoSources);
        }
        Err(CollectorError::AllSourcesFailed(failures.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss xmlns:atom="http://www.w3.org/2005/Atom" xmlns:dc="http://purl.org/dc/elements/1.1/" version="2.0">
  <channel>
    <atom:link href="https://xcancel.com/elonmusk/rss" rel="self" type="application/rss+xml" />
    <title>Elon Musk / @elonmusk</title>
    <link>https://xcancel.com/elonmusk</link>
    <description>Twitter feed for: @elonmusk.</description>
    <item>
      <title>Elon Musk (@elonmusk): Falcon lands again</title>
      <dc:creator>@elonmusk</dc:creator>
      <pubDate>Fri, 20 Feb 2026 06:06:54 GMT</pubDate>
      <link>https://xcancel.com/elonmusk/status/2024727442427171118#m</link>
    </item>
    <item>
      <title>R to @someone: Exactly</title>
      <dc:creator>@elonmusk</dc:creator>
      <link>https://xcancel.com/elonmusk/status/2024723187251236967#m</link>
    </item>
    <item>
      <title><![CDATA[Plain title & more]]></title>
      <link>https://xcancel.com/elonmusk/status/2023880206721970544#m</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_feed_strips_prefix() {
        let tweets = parse_feed(FEED, "elonmusk", true).unwrap();
        assert_eq!(tweets.len(), 3);
        assert_eq!(tweets[0].content, "Falcon lands again");
        assert_eq!(tweets[0].tweet_id.as_deref(), Some("2024727442427171118"));
        assert_eq!(tweets[1].content, "R to @someone: Exactly");
        assert_eq!(tweets[2].content, "Plain title & more");
    }

    #[test]
    fn test_parse_feed_skips_replies() {
        let tweets = parse_feed(FEED, "elonmusk", false).unwrap();
        assert_eq!(tweets.len(), 2);
        assert!(tweets.iter().all(|t| !t.content.starts_with("R to @")));
    }

    #[test]
    fn test_parse_feed_without_items() {
        let xml = r#"<rss version="2.0"><channel><title>empty</title></channel></rss>"#;
        assert!(parse_feed(xml, "elonmusk", true).unwrap().is_empty());
    }

    #[test]
    fn test_parse_feed_rejects_garbage() {
        assert!(matches!(
            parse_feed("<html><body>blocked", "elonmusk", true),
            Err(CollectorError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_falls_back_past_failing_feed() {
        use axum::{http::StatusCode, routing::get, Router};

        let base = crate::test_support::serve_locally(
            Router::new()
                .route("/down/rss", get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }))
                .route("/up/rss", get(|| async { FEED })),
        )
        .await;

        let source = RssSource::new(
            Client::new(),
            vec![format!("{}/down/rss", base), format!("{}/up/rss", base)],
            "elonmusk",
            false,
        );
        let tweets = source.fetch().await.unwrap();
        assert_eq!(tweets.len(), 2);

        let feeds = vec![format!("{}/down/rss", base)];
        let source = RssSource::new(Client::new(), feeds, "elonmusk", false);
        match source.fetch().await {
            Err(CollectorError::AllSourcesFailed(msg)) => assert!(msg.contains("503")),
            other => panic!("expected all sources to fail, got {:?}", other.map(|t| t.len())),
        }
    }

    #[tokio::test]
    async fn test_fetch_without_feeds() {
        let source = RssSource::new(Client::new(), Vec::new(), "elonmusk", true);
        assert!(matches!(source.fetch().await, Err(CollectorError::NoSources)));
    }
}
