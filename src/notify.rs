use log::info;
use reqwest::blocking::Client;
use serde::Serialize;
use url::Url;

use crate::config::Config;
use crate::error::DeliveryError;
use crate::review::Review;

const EMOJI_STAR: &str = ":star:";
const UPDATED_AT_FORMAT: &str = "%Y-%m-%d";

/// Slack incoming-webhook message with legacy attachments.
#[derive(Debug, Serialize)]
pub struct SlackPayload {
    pub text: String,
    pub username: String,
    pub icon_emoji: String,
    pub attachments: Vec<SlackAttachment>,
}

#[derive(Debug, Serialize)]
pub struct SlackAttachment {
    pub title: String,
    pub title_link: String,
    pub text: String,
    pub fallback: String,
    pub fields: Vec<SlackAttachmentField>,
}

#[derive(Debug, Serialize)]
pub struct SlackAttachmentField {
    pub title: String,
    pub value: String,
    pub short: bool,
}

// Plain concatenation, so a path prefix on `BASE_URL` survives.
fn review_link(base_url: &Url, author_key: &str) -> String {
    format!("{}{author_key}", base_url.as_str().trim_end_matches('/'))
}

fn render_review(review: &Review, base_url: &Url) -> SlackAttachment {
    SlackAttachment {
        title: review.title.clone(),
        title_link: review_link(base_url, &review.author_key),
        text: review.body.clone(),
        fallback: format!("{} {}", review.title, review.author_key),
        fields: vec![
            SlackAttachmentField {
                title: "Rating".into(),
                value: review.rating.render(EMOJI_STAR),
                short: true,
            },
            SlackAttachmentField {
                title: "UpdatedAt".into(),
                value: review.updated_at.format(UPDATED_AT_FORMAT).to_string(),
                short: true,
            },
        ],
    }
}

/// Posts the newest new reviews to the Slack webhook as one message.
pub struct Notifier {
    client: Client,
    webhook_url: Url,
    base_url: Url,
    review_count: usize,
    bot_name: String,
    icon_emoji: String,
    message_text: String,
}

impl Notifier {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            webhook_url: config.webhook_url.clone(),
            base_url: config.base_url.clone(),
            review_count: config.review_count,
            bot_name: config.bot_name.clone(),
            icon_emoji: config.icon_emoji.clone(),
            message_text: config.message_text.clone(),
        }
    }

    /// Builds the message for the first `review_count` reviews, which are
    /// expected newest first. `None` when there is nothing to send.
    pub fn build_payload(&self, reviews: &[Review]) -> Option<SlackPayload> {
        if reviews.is_empty() {
            return None;
        }
        let attachments = reviews
            .iter()
            .take(self.review_count)
            .map(|review| render_review(review, &self.base_url))
            .collect();
        Some(SlackPayload {
            text: self.message_text.clone(),
            username: self.bot_name.clone(),
            icon_emoji: self.icon_emoji.clone(),
            attachments,
        })
    }

    /// Returns how many reviews went out; an empty batch makes no request.
    pub fn send(&self, reviews: &[Review]) -> Result<usize, DeliveryError> {
        let Some(payload) = self.build_payload(reviews) else {
            info!("no new reviews to post");
            return Ok(0);
        };

        let res = self
            .client
            .post(self.webhook_url.clone())
            .json(&payload)
            .send()
            .map_err(DeliveryError::Request)?;
        if !res.status().is_success() {
            return Err(DeliveryError::Status(res.status()));
        }

        info!("posted {} reviews to webhook", payload.attachments.len());
        Ok(payload.attachments.len())
    }
}
