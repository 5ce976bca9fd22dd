//! Digest computation for snapshot documents.
//!
//! The digest is the SHA256 of the compact canonical rendering (sorted keys
//! at every level), so two caches holding the same records produce the same
//! digest regardless of how their files were formatted.

use crate::errors::Result;
use crate::snapshot::model::Snapshot;
use sha2::{Digest, Sha256};

/// Compute the digest of a snapshot.
///
/// ## Returns
///
/// Hex-encoded SHA256 digest (64 characters)
///
/// ## Errors
///
/// Returns `LayerWatchError::Serialization` if JSON serialization fails.
///
/// ## Example
///
/// ```
/// use layerwatch_core::snapshot::{compute_snapshot_digest, Snapshot};
///
/// let digest = compute_snapshot_digest(&Snapshot::new()).unwrap();
/// assert_eq!(digest.len(), 64);
/// ```
pub fn compute_snapshot_digest(snapshot: &Snapshot) -> Result<String> {
    let canonical = snapshot.to_json_vec(false)?;
    Ok(hash_bytes(&canonical))
}

fn hash_bytes(input: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hex::encode(hasher.finalize())
}
