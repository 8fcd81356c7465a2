use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::rating::Rating;

pub type ReviewId = u64;
pub type Reviews = Vec<Review>;

/// One user review as shown on the storefront page.
///
/// `id` stays `0` until the store persists the review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub author: String,
    /// Permalink of the review; the only identity used for deduplication.
    pub author_key: String,
    pub title: String,
    pub body: String,
    pub rating: Rating,
    pub updated_at: NaiveDate,
}

/// Orders reviews newest first. The sort is stable, so reviews posted on the
/// same day keep their page order.
pub fn sort_newest_first(reviews: &mut [Review]) {
    reviews.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}
