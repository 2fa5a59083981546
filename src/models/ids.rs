//! Roster fingerprints.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Fingerprint of a roster: participant names and their picks, in draft order.
///
/// Two snapshots with the same roster ID were drafted from the same teams,
/// regardless of how many stages have been applied since.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RosterId(String);

impl RosterId {
    /// Hash a draft. Takes the first 16 hex characters of the SHA-256.
    pub fn from_draft<'a>(entries: impl IntoIterator<Item = (&'a str, Vec<&'a str>)>) -> Self {
        let mut hasher = Sha256::new();
        for (participant, picks) in entries {
            hasher.update(participant.as_bytes());
            hasher.update(b":");
            hasher.update(picks.join("|").as_bytes());
            hasher.update(b";");
        }
        let hash = hex::encode(hasher.finalize());
        Self(hash[..16].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RosterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for RosterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RosterId({})", self.0)
    }
}
