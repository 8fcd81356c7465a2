use log::{debug, info};

use crate::error::StoreError;
use crate::review::Reviews;
use crate::storage::ReviewStore;

/// Persists the reviews the store has not seen yet and returns them with
/// their assigned ids, in the order they were given.
///
/// A storage fault stops the batch; reviews inserted before it stay persisted.
pub fn persist_new_reviews<S>(reviews: Reviews, store: &S) -> Result<Reviews, StoreError>
where
    S: ReviewStore + ?Sized,
{
    let mut new_reviews = Vec::new();
    for mut review in reviews {
        if store.exists(&review.author_key)? {
            debug!("already seen {}", review.author_key);
            continue;
        }
        review.id = store.insert(&review)?;
        info!("new review #{} by {}: {}", review.id, review.author, review.title);
        new_reviews.push(review);
    }
    Ok(new_reviews)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use chrono::NaiveDate;

    use super::*;
    use crate::rating::Rating;
    use crate::review::{Review, ReviewId};
    use crate::storage::SledStore;

    fn review(key: &str, day: u32) -> Review {
        Review {
            id: 0,
            author: format!("author {key}"),
            author_key: key.into(),
            title: format!("title {key}"),
            body: String::new(),
            rating: Rating::Five,
            updated_at: NaiveDate::from_ymd_opt(2016, 3, day).unwrap(),
        }
    }

    #[test]
    fn only_unknown_keys_are_persisted() {
        let store = SledStore::temporary().unwrap();
        store.insert(&review("/reviews/abc", 1)).unwrap();

        let fresh = persist_new_reviews(
            vec![review("/reviews/abc", 2), review("/reviews/xyz", 1)],
            &store,
        )
        .unwrap();

        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].author_key, "/reviews/xyz");
        assert_eq!(fresh[0].id, 2);
        assert_eq!(store.len(), 2);
        // the stored copy of an edited review is never replaced
        let kept = store.get("/reviews/abc").unwrap().unwrap();
        assert_eq!(kept.updated_at.to_string(), "2016-03-01");
    }

    #[test]
    fn second_pass_is_empty() {
        let store = SledStore::temporary().unwrap();
        let batch = vec![review("/r/3", 3), review("/r/2", 2), review("/r/1", 1)];

        let first = persist_new_reviews(batch.clone(), &store).unwrap();
        let keys: Vec<_> = first.iter().map(|r| r.author_key.as_str()).collect();
        assert_eq!(keys, ["/r/3", "/r/2", "/r/1"]);
        let ids: Vec<_> = first.iter().map(|r| r.id).collect();
        assert_eq!(ids, [1, 2, 3]);

        assert!(persist_new_reviews(batch, &store).unwrap().is_empty());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn repeated_key_within_a_batch_is_kept_once() {
        let store = SledStore::temporary().unwrap();
        let fresh =
            persist_new_reviews(vec![review("/r/1", 2), review("/r/1", 1)], &store).unwrap();
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].updated_at.to_string(), "2016-03-02");
    }

    /// Fails every insert after the first `budget` ones.
    struct FlakyStore {
        budget: usize,
        rows: RefCell<HashMap<String, ReviewId>>,
    }

    impl ReviewStore for FlakyStore {
        fn exists(&self, author_key: &str) -> Result<bool, StoreError> {
            Ok(self.rows.borrow().contains_key(author_key))
        }

        fn next_id(&self) -> Result<ReviewId, StoreError> {
            Ok(self.rows.borrow().len() as ReviewId + 1)
        }

        fn insert(&self, review: &Review) -> Result<ReviewId, StoreError> {
            if self.rows.borrow().len() >= self.budget {
                return Err(StoreError::CorruptCounter(0));
            }
            let id = self.next_id()?;
            self.rows.borrow_mut().insert(review.author_key.clone(), id);
            Ok(id)
        }
    }

    #[test]
    fn storage_fault_aborts_without_rollback() {
        let store = FlakyStore {
            budget: 1,
            rows: RefCell::default(),
        };
        let err = persist_new_reviews(
            vec![review("/r/1", 3), review("/r/2", 2), review("/r/3", 1)],
            &store,
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::CorruptCounter(_)));
        assert!(store.exists("/r/1").unwrap());
        assert!(!store.exists("/r/2").unwrap());
    }
}
