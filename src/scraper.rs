use chrono::NaiveDate;
use log::{debug, info};
use reqwest::blocking::{Client, Response};
use reqwest::{StatusCode, header};
use url::Url;

use crate::config::Config;
use crate::document::{HtmlDocument, QueryNode};
use crate::error::{ExtractError, FetchError};
use crate::rating::Rating;
use crate::review::{Review, Reviews, sort_newest_first};

/// Date format of `.review-date`, e.g. `2016年3月9日`. Month and day may be unpadded.
pub const DATE_FORMAT: &str = "%Y年%m月%d日";

const DETAILS_PATH: &str = "/store/apps/details";

mod selectors {
    pub const REVIEW: &str = ".single-review";
    pub const AUTHOR: &str = ".review-header .review-info span.author-name";
    pub const PERMALINK: &str = ".review-header .review-info .reviews-permalink";
    pub const DATE: &str = ".review-header .review-info .review-date";
    pub const TITLE: &str = ".review-body .review-title";
    pub const BODY: &str = ".review-body";
    pub const FULL_REVIEW_LINK: &str = ".review-link";
    pub const RATING: &str = ".review-info-star-rating .tiny-star";
}

/// Issues the unauthenticated GET for an app's details page.
pub struct Fetcher {
    client: Client,
    base_url: Url,
}

impl Fetcher {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let language = header::HeaderValue::from_str(&config.accept_language)
            .map_err(|_| FetchError::AcceptLanguage(config.accept_language.clone()))?;
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT_LANGUAGE, language);
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// `BASE_URL` followed by the details path; a path prefix on the base is kept.
    pub fn details_url(&self, app_id: &str) -> Result<Url, FetchError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}{DETAILS_PATH}"))?;
        url.query_pairs_mut().append_pair("id", app_id);
        Ok(url)
    }

    fn get_details(&self, app_id: &str) -> Result<(Url, Response), FetchError> {
        let url = self.details_url(app_id)?;
        let res = self
            .client
            .get(url.clone())
            .send()
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;
        match res.status() {
            StatusCode::NOT_FOUND => Err(FetchError::NotFound {
                app_id: app_id.to_string(),
                url,
            }),
            status if !status.is_success() => Err(FetchError::Status { url, status }),
            _ => Ok((url, res)),
        }
    }

    /// Fails with [`FetchError::NotFound`] when the storefront does not know `app_id`.
    pub fn ensure_app_exists(&self, app_id: &str) -> Result<(), FetchError> {
        self.get_details(app_id).map(|_| ())
    }

    pub fn fetch_listing(&self, app_id: &str) -> Result<String, FetchError> {
        let (url, res) = self.get_details(app_id)?;
        let body = res
            .text()
            .map_err(|source| FetchError::Request { url: url.clone(), source })?;
        info!("fetched {url} ({} bytes)", body.len());
        Ok(body)
    }
}

fn select_text<N: QueryNode>(node: &N, selector: &str) -> Result<String, ExtractError> {
    Ok(node
        .select_first(selector)?
        .map(|n| n.text().trim().to_string())
        .unwrap_or_default())
}

// `.review-body` also holds the title and a trailing "full review" link.
fn review_body<N: QueryNode>(node: &N, title: &str) -> Result<String, ExtractError> {
    let Some(body) = node.select_first(selectors::BODY)? else {
        return Ok(String::new());
    };
    let raw = body.text();
    let mut text = raw.trim();
    if let Some(link) = body.select_first(selectors::FULL_REVIEW_LINK)? {
        let link_text = link.text();
        text = text.strip_suffix(link_text.trim()).unwrap_or(text).trim_end();
    }
    if !title.is_empty() {
        text = text.strip_prefix(title).unwrap_or(text).trim_start();
    }
    Ok(text.to_string())
}

/// Returns `None` for nodes that cannot become a review: no permalink, or a
/// date that does not match [`DATE_FORMAT`].
fn parse_review<N: QueryNode>(node: &N) -> Result<Option<Review>, ExtractError> {
    let author_key = node
        .select_first(selectors::PERMALINK)?
        .and_then(|link| link.attr("href"))
        .map(|href| href.trim().to_string())
        .unwrap_or_default();
    if author_key.is_empty() {
        debug!("dropping review without permalink");
        return Ok(None);
    }

    let author = select_text(node, selectors::AUTHOR)?;
    let date_text = select_text(node, selectors::DATE)?;
    let updated_at = match NaiveDate::parse_from_str(&date_text, DATE_FORMAT) {
        Ok(date) => date,
        Err(e) => {
            debug!("dropping review {author_key}: bad date {date_text:?} ({e})");
            return Ok(None);
        }
    };

    let title = select_text(node, selectors::TITLE)?;
    let body = review_body(node, &title)?;
    let label = node
        .select_first(selectors::RATING)?
        .and_then(|star| star.attr("aria-label"))
        .unwrap_or_default();

    Ok(Some(Review {
        id: 0,
        author,
        author_key,
        title,
        body,
        rating: Rating::from_label(&label),
        updated_at,
    }))
}

/// Extracts every well-formed review below `root`, newest first.
pub fn extract_reviews<N: QueryNode>(root: &N) -> Result<Reviews, ExtractError> {
    let nodes = root.select_all(selectors::REVIEW)?;
    let total = nodes.len();
    let mut reviews = Vec::with_capacity(total);
    for node in &nodes {
        if let Some(review) = parse_review(node)? {
            reviews.push(review);
        }
    }
    if reviews.len() < total {
        info!("dropped {} of {total} reviews", total - reviews.len());
    }
    sort_newest_first(&mut reviews);
    Ok(reviews)
}

pub fn extract_from_html(body: &str) -> Result<Reviews, ExtractError> {
    let document = HtmlDocument::parse(body)?;
    extract_reviews(&document.root())
}
