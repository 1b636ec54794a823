//! `queryDigest = md5_b64(canonical(query))` (§3). See DESIGN.md for why
//! this uses `md5` rather than the `sha2` hashing used elsewhere.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reader_types::SearchQuery;

/// Computes the base64-encoded MD5 digest of `query`'s canonical form.
pub fn query_digest(query: &SearchQuery) -> String {
    let canonical = query.canonical();
    let digest = md5::compute(canonical.as_bytes());
    STANDARD.encode(digest.0)
}
