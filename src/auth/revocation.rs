/// Spent refresh token tracking
///
/// Every refresh token may be exchanged exactly once. Exchanged tokens are
/// recorded in a process-wide set so a replay of the same token value fails
/// authentication. The set is add-only for the lifetime of the process and
/// stores SHA-256 digests rather than raw tokens, so each spent token costs
/// a fixed 64 bytes.
///
/// In a multi-process deployment this would have to move into a shared
/// external store; a single in-memory set is a documented limitation.

use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct RevocationList {
    spent: Mutex<HashSet<String>>,
}

impl RevocationList {
    pub fn new() -> Self {
        Self {
            spent: Mutex::new(HashSet::new()),
        }
    }

    fn digest(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Atomically record `token` as spent.
    ///
    /// Returns `true` if the token was fresh and is now revoked, `false` if
    /// it had already been spent. Check and insert happen under one lock
    /// acquisition, so two concurrent exchanges of the same token cannot
    /// both observe it as fresh.
    pub fn check_and_insert(&self, token: &str) -> bool {
        let mut spent = self.spent.lock().unwrap();
        spent.insert(Self::digest(token))
    }

    /// Whether `token` has already been spent.
    pub fn contains(&self, token: &str) -> bool {
        let spent = self.spent.lock().unwrap();
        spent.contains(&Self::digest(token))
    }

    /// Number of spent tokens recorded so far.
    pub fn len(&self) -> usize {
        self.spent.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
