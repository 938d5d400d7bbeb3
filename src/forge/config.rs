//! Configuration for the release hosting forge connection.
use secrecy::SecretString;

/// Maximum number of assets the hosting service allows on one release.
pub const MAX_ASSETS_PER_RELEASE: usize = 1000;
/// Separator between a base tag and the number of a continuation release.
pub const EXTRA_RELEASE_INFIX: &str = "-extra";
/// Default asset name of the generated listing manifest.
pub const DEFAULT_LISTING_FILE: &str = "listing_files.csv";
/// Default host used to build release links.
pub const DEFAULT_HOST: &str = "github.com";

/// Remote repository connection configuration handed to the `gh` CLI.
#[derive(Debug, Clone, Default)]
pub struct RemoteConfig {
    /// Repository in `OWNER/REPO` or `HOST/OWNER/REPO` form. `gh` infers
    /// the repository from the working directory when `None`.
    pub repo: Option<String>,
    /// Access token exported as `GH_TOKEN`. `gh` falls back to its own
    /// authentication when `None`.
    pub token: Option<SecretString>,
}

/// Options that change how the forge manager treats mutating calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForgeOptions {
    pub dry_run: bool,
}

/// Tag of the `number`th continuation release of `base`.
pub fn extra_release_tag(base: &str, number: usize) -> String {
    format!("{base}{EXTRA_RELEASE_INFIX}{number}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_remote_config() {
        let remote = RemoteConfig::default();
        assert!(remote.repo.is_none());
        assert!(remote.token.is_none());
    }

    #[test]
    fn builds_extra_release_tags() {
        assert_eq!(extra_release_tag("data-v1", 1), "data-v1-extra1");
        assert_eq!(extra_release_tag("data-v1", 12), "data-v1-extra12");
    }
}
