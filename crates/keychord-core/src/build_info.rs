//! Build metadata embedded by the build script.

/// Short git commit hash at build time, suffixed with `-dirty` when the
/// working tree had local changes. `unknown` outside a git checkout.
pub const GIT_HASH: &str = env!("KEYCHORD_GIT_HASH");

/// The build profile (`debug` or `release`).
pub const BUILD_PROFILE: &str = env!("KEYCHORD_BUILD_PROFILE");

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// [`version_string`] as a constant, for `--version`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("KEYCHORD_GIT_HASH"),
    ", ",
    env!("KEYCHORD_BUILD_PROFILE"),
    ")"
);

/// Version string including git hash and profile, e.g. `"0.1.0 (abc1234, debug)"`.
pub fn version_string() -> String {
    format!("{VERSION} ({GIT_HASH}, {BUILD_PROFILE})")
}
