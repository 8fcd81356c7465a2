use std::path::Path;

use log::debug;
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{Config, Db, Transactional, Tree};

use crate::error::StoreError;
use crate::review::{Review, ReviewId};

const REVIEW_TREE: &str = "review";
const META_TREE: &str = "meta";
const LAST_ID_KEY: &[u8] = b"last_id";

/// Persistent set of reviews that were already seen, keyed by `author_key`.
///
/// Records are write-once: there is no update or delete.
pub trait ReviewStore {
    fn exists(&self, author_key: &str) -> Result<bool, StoreError>;

    /// One more than the largest persisted id, or 1 for an empty store.
    fn next_id(&self) -> Result<ReviewId, StoreError>;

    /// Persists `review` under the id [`ReviewStore::next_id`] would return and
    /// hands that id back. A second insert for the same `author_key` is rejected.
    fn insert(&self, review: &Review) -> Result<ReviewId, StoreError>;

    fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

pub struct SledStore {
    db: Db,
    reviews: Tree,
    meta: Tree,
}

fn decode_id(raw: Option<&[u8]>) -> Result<ReviewId, StoreError> {
    match raw {
        None => Ok(0),
        Some(bytes) => bytes
            .try_into()
            .map(ReviewId::from_be_bytes)
            .map_err(|_| StoreError::CorruptCounter(bytes.len())),
    }
}

impl SledStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = Config::new()
            .path(path)
            .flush_every_ms(None) // no auto-flushing - the pipeline flushes after persisting.
            .open()?;
        Self::from_db(db)
    }

    /// In-memory database, removed when dropped.
    pub fn temporary() -> Result<Self, StoreError> {
        Self::from_db(Config::new().temporary(true).open()?)
    }

    fn from_db(db: Db) -> Result<Self, StoreError> {
        Ok(Self {
            reviews: db.open_tree(REVIEW_TREE)?,
            meta: db.open_tree(META_TREE)?,
            db,
        })
    }

    pub fn get(&self, author_key: &str) -> Result<Option<Review>, StoreError> {
        match self.reviews.get(author_key.as_bytes())? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }
}

impl ReviewStore for SledStore {
    fn exists(&self, author_key: &str) -> Result<bool, StoreError> {
        Ok(self.reviews.contains_key(author_key.as_bytes())?)
    }

    fn next_id(&self) -> Result<ReviewId, StoreError> {
        Ok(decode_id(self.meta.get(LAST_ID_KEY)?.as_deref())? + 1)
    }

    fn insert(&self, review: &Review) -> Result<ReviewId, StoreError> {
        let key = review.author_key.as_bytes();
        let result = (&self.reviews, &self.meta).transaction(|(reviews, meta)| {
            if reviews.get(key)?.is_some() {
                return Err(ConflictableTransactionError::Abort(
                    StoreError::DuplicateKey(review.author_key.clone()),
                ));
            }
            let id = decode_id(meta.get(LAST_ID_KEY)?.as_deref())
                .map_err(ConflictableTransactionError::Abort)?
                + 1;
            let stored = Review {
                id,
                ..review.clone()
            };
            let value = serde_json::to_vec(&stored)
                .map_err(|e| ConflictableTransactionError::Abort(e.into()))?;
            reviews.insert(key, value)?;
            meta.insert(LAST_ID_KEY, id.to_be_bytes().to_vec())?;
            Ok(id)
        });
        let id = result.map_err(|e| match e {
            TransactionError::Abort(e) => e,
            TransactionError::Storage(e) => StoreError::Sled(e),
        })?;
        debug!("stored review {} as #{id}", review.author_key);
        Ok(id)
    }

    fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }
}
