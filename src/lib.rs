//! # Deckside
//!
//! `deckside` is the API behind a boat-detailing marketing site. A single
//! admin authenticates with a credential pair loaded from the environment and
//! receives a signed, time-limited bearer token. State-changing routes are
//! protected by two independent gates: the bearer token and a
//! double-submit-cookie CSRF token. Login attempts are rate limited per
//! client address. Blog posts live in an in-memory store; images are written
//! to local disk and served statically.

pub mod api;
pub mod cli;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(GIT_COMMIT_HASH.len() >= 7);
    }
}
