use sha2::{Digest, Sha256};

pub fn sha256_hex(s: &str) -> String {
    let mut h = Sha256::new();
    h.update(s.as_bytes());
    hex::encode(h.finalize())
}

/// Stable identity of a submission: same challenge plus same query text
/// (ignoring surrounding whitespace) gives the same hex digest. Callers use it
/// to spot resubmissions without storing the query itself.
pub fn submission(challenge_id: u32, query: &str) -> String {
    let parts = [
        format!("challenge_id={}", challenge_id),
        format!("query={}", query.trim()),
        format!("sqljudge_version={}", env!("CARGO_PKG_VERSION")),
    ];
    sha256_hex(&parts.join("\n"))
}
