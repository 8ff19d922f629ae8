// src/sources/news_page.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::sources::types::{NewsArticle, NewsSource};

fn re(cell: &'static OnceCell<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).unwrap())
}

static RE_ARTICLE: OnceCell<Regex> = OnceCell::new();
static RE_TIME: OnceCell<Regex> = OnceCell::new();
static RE_TITLE_LINK: OnceCell<Regex> = OnceCell::new();
static RE_LEAD: OnceCell<Regex> = OnceCell::new();
static RE_THUMB: OnceCell<Regex> = OnceCell::new();
static RE_TAGS: OnceCell<Regex> = OnceCell::new();
static RE_WS: OnceCell<Regex> = OnceCell::new();

/// Strip markup from an extracted fragment: entity decode, drop tags,
/// collapse whitespace, trim.
fn clean_fragment(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s).to_string();
    let no_tags = re(&RE_TAGS, r"(?is)</?[^>]+>").replace_all(&decoded, "");
    re(&RE_WS, r"\s+")
        .replace_all(&no_tags, " ")
        .trim()
        .to_string()
}

/// Extract one record per `<article>` element of the listing page.
/// Articles missing the time, title, or lead are skipped.
pub fn parse_listing(html: &str) -> Vec<NewsArticle> {
    let t0 = std::time::Instant::now();

    let re_article = re(&RE_ARTICLE, r"(?is)<article\b.*?</article>");
    let re_time = re(&RE_TIME, r#"(?is)<span[^>]*class="[^"]*\btt\b[^"]*"[^>]*>(.*?)</span>"#);
    let re_title_link = re(
        &RE_TITLE_LINK,
        r#"(?is)<h3[^>]*class="[^"]*\btit-news\b[^"]*"[^>]*>.*?<a[^>]*href="([^"]*)"[^>]*>(.*?)</a>"#,
    );
    let re_lead = re(&RE_LEAD, r#"(?is)<p[^>]*class="[^"]*\blead\b[^"]*"[^>]*>(.*?)</p>"#);
    let re_thumb = re(
        &RE_THUMB,
        r#"(?is)<figure[^>]*class="[^"]*\bimg-con\b[^"]*"[^>]*>.*?<img[^>]*src="([^"]*)""#,
    );

    let mut out = Vec::new();
    for block in re_article.find_iter(html) {
        let block = block.as_str();

        let Some(time) = re_time.captures(block) else {
            tracing::debug!("article without span.tt skipped");
            continue;
        };
        let Some(title_link) = re_title_link.captures(block) else {
            tracing::debug!("article without h3.tit-news link skipped");
            continue;
        };
        let Some(lead) = re_lead.captures(block) else {
            tracing::debug!("article without p.lead skipped");
            continue;
        };

        let created_at = clean_fragment(&time[1]);
        let link = clean_fragment(&title_link[1]);
        let title = clean_fragment(&title_link[2]);
        let subtitle = clean_fragment(&lead[1]);
        if created_at.is_empty() || title.is_empty() {
            continue;
        }

        let thumbnail_url = re_thumb
            .captures(block)
            .map(|c| clean_fragment(&c[1]))
            .filter(|s| !s.is_empty());

        out.push(NewsArticle {
            created_at,
            title,
            link,
            subtitle,
            thumbnail_url,
        });
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("collector_fetch_ms").record(ms);
    counter!("collector_fetched_total").increment(out.len() as u64);
    out
}

pub struct NewsPageSource {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl NewsPageSource {
    pub fn from_fixture(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn from_url(url: String) -> Self {
        let client = reqwest::Client::new();
        Self {
            mode: Mode::Http { url, client },
        }
    }
}

#[async_trait]
impl NewsSource for NewsPageSource {
    async fn fetch_latest(&self) -> Result<Vec<NewsArticle>> {
        match &self.mode {
            Mode::Fixture(s) => Ok(parse_listing(s)),

            Mode::Http { url, client } => {
                let body = match client.get(url).send().await {
                    Ok(resp) => resp
                        .error_for_status()
                        .context("news page non-2xx")?
                        .text()
                        .await
                        .context("news page .text()")?,
                    Err(e) => {
                        tracing::warn!(error = ?e, source = "news-page", "source http error");
                        counter!("collector_source_errors_total").increment(1);
                        return Err(e).context("news page get()");
                    }
                };
                Ok(parse_listing(&body))
            }
        }
    }

    fn name(&self) -> &'static str {
        "news-page"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_cleanup_decodes_and_collapses() {
        let s = " <b>폭우&nbsp;경보</b>\n  발령 ";
        assert_eq!(clean_fragment(s), "폭우 경보 발령");
    }

    #[test]
    fn article_without_lead_is_skipped() {
        let html = r#"
            <article>
              <span class="tt">03-15 14:30</span>
              <h3 class="tit-news"><a href="https://news.example/a1">첫 기사</a></h3>
            </article>"#;
        assert!(parse_listing(html).is_empty());
    }
}
