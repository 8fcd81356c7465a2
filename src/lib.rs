//! Watches the Google Play review listing of one app and posts reviews it has
//! not seen before to a Slack incoming webhook.

pub mod config;
pub mod dedup;
pub mod document;
pub mod error;
pub mod notify;
pub mod pipeline;
pub mod rating;
pub mod review;
pub mod scraper;
pub mod storage;

pub use error::Error;
pub use rating::Rating;
pub use review::{Review, Reviews};
