//! Nitter Timeline Source
//!
//! Scrapes the public HTML timeline served by Nitter front-ends
//! (`https://xcancel.com/<account>`). Tweet bodies live in
//! `div.tweet-content`; the matching permalinks are the `a.tweet-link`
//! anchors, paired by position.

use super::*;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};

/// HTML timeline scraper
pub struct NitterSource {
    client: Client,
    base_url: String,
    account: String,
}

impl NitterSource {
    pub fn new(client: Client, base_url: &str, account: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            account: account.to_string(),
        }
    }

    /// URL of the account's timeline page
    pub fn timeline_url(&self) -> String {
        format!("{}/{}", self.base_url, self.account)
    }
}

/// Parse a timeline page into scraped tweets.
///
/// Relative permalinks are resolved against `base_url`. A tweet without a
/// matching link keeps an empty link and no status ID.
pub fn parse_timeline(html: &str, base_url: &str) -> CollectorResult<Vec<ScrapedTweet>> {
    let content_selector = Selector::parse("div.tweet-content")
        .map_err(|e| CollectorError::Parse(format!("invalid selector: {:?}", e)))?;
    let link_selector = Selector::parse("a.tweet-link")
        .map_err(|e| CollectorError::Parse(format!("invalid selector: {:?}", e)))?;

    let document = Html::parse_document(html);
    let base_url = base_url.trim_end_matches('/');

    let links: Vec<&str> = document
        .select(&link_selector)
        .map(|a| a.value().attr("href").unwrap_or(""))
        .collect();

    let tweets = document
        .select(&content_selector)
        .enumerate()
        .map(|(i, div)| {
            let content = div.text().collect::<String>().trim().to_string();
            let href = links.get(i).copied().unwrap_or("");
            let link = if href.starts_with('/') {
                format!("{}{}", base_url, href)
            } else {
                href.to_string()
            };

            ScrapedTweet {
                tweet_id: extract_status_id(href),
                content,
                link,
            }
        })
        .collect();

    Ok(tweets)
}

#[async_trait]
impl TweetSource for NitterSource {
    fn name(&self) -> &str {
        "nitter"
    }

    async fn fetch(&self) -> Result<Vec<ScrapedTweet>, CollectorError> {
        let url = self.timeline_url();
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(CollectorError::Status {
                url,
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        let tweets = parse_timeline(&body, &self.base_url)?;

        tracing::debug!(source = "nitter", url = %url, count = tweets.len(), "Fetched timeline");
        Ok(tweets)
    }
}
