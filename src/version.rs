//! The `--version` string.

/// Commit the binary was built from, or `release` outside of a git checkout.
const GIT_HASH: &str = git_version::git_version!(
    args = ["--broken", "--always", "--exclude", "*"],
    prefix = "git:",
    fallback = "release"
);

/// Package version followed by the commit it was built from, e.g. `0.1.0 (git:1a2b3c4)`.
pub fn long_version() -> String {
    format!("{} ({GIT_HASH})", env!("CARGO_PKG_VERSION"))
}
