//! In-memory reference backend.
//!
//! Single-process `ViewStore` used by the tests, the conformance suite,
//! and the demo CLI. Version tokens are stringified values of a
//! monotonic counter, so every successful write observably changes the
//! token.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use taskview_core::TaskViewDocument;

use crate::error::StorageError;
use crate::traits::{Version, ViewStore};

#[derive(Default)]
struct Inner {
    /// Stored document and its current token, keyed by owning user id.
    views: HashMap<String, (TaskViewDocument, u64)>,
    next_token: u64,
}

/// In-memory `ViewStore` with compare-and-swap semantics.
#[derive(Default)]
pub struct MemoryViewStore {
    inner: Mutex<Inner>,
}

impl MemoryViewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Owning user ids of every stored document, sorted. Demo/test helper;
    /// not part of the `ViewStore` contract.
    pub fn user_ids(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        let mut ids: Vec<String> = inner.views.keys().cloned().collect();
        ids.sort();
        ids
    }
}

fn parse_token(version: &Version) -> Option<u64> {
    version.as_str().parse().ok()
}

#[async_trait]
impl ViewStore for MemoryViewStore {
    async fn read(
        &self,
        user_id: &str,
    ) -> Result<Option<(TaskViewDocument, Version)>, StorageError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .views
            .get(user_id)
            .map(|(doc, token)| (doc.clone(), Version::new(token.to_string()))))
    }

    async fn write(
        &self,
        doc: &TaskViewDocument,
        expected: Option<&Version>,
    ) -> Result<Version, StorageError> {
        let mut inner = self.inner.lock().unwrap();

        let stored = inner.views.get(&doc.id).map(|(_, token)| *token);
        match (expected, stored) {
            // Create: only while no document exists.
            (None, Some(_)) => {
                return Err(StorageError::VersionConflict {
                    user_id: doc.id.clone(),
                })
            }
            (None, None) => {}
            // Replace: only while the stored token still matches.
            (Some(expected), stored) => {
                if parse_token(expected) != stored {
                    return Err(StorageError::VersionConflict {
                        user_id: doc.id.clone(),
                    });
                }
            }
        }

        inner.next_token += 1;
        let token = inner.next_token;
        inner.views.insert(doc.id.clone(), (doc.clone(), token));
        Ok(Version::new(token.to_string()))
    }

    async fn delete(&self, user_id: &str, expected: &Version) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().unwrap();

        let stored = match inner.views.get(user_id) {
            Some((_, token)) => *token,
            None => {
                return Err(StorageError::NotFound {
                    user_id: user_id.to_string(),
                })
            }
        };
        if parse_token(expected) != Some(stored) {
            return Err(StorageError::VersionConflict {
                user_id: user_id.to_string(),
            });
        }

        inner.views.remove(user_id);
        Ok(())
    }
}
