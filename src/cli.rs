//! CLI argument parsing and command dispatch.
use clap::{Parser, Subcommand};
use git_url_parse::GitUrl;
use log::*;
use secrecy::SecretString;
use std::path::PathBuf;

use crate::{
    Result,
    config::{Config, validate_max_assets},
    error::AssetError,
    files::Extension,
    forge::{
        config::{DEFAULT_HOST, RemoteConfig},
        manager::ForgeManager,
    },
};

pub mod command;
pub mod common;
pub mod types;

use command::{
    delete::{self, DeleteOptions},
    download::{self, DownloadOptions},
    generate_lists::{self, ListingOptions},
    upload::{self, UploadOptions},
};
use types::Report;

/// Global CLI arguments for repository selection and debugging.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(short = 'g', long, global = true)]
    /// Repository as OWNER/REPO, HOST/OWNER/REPO or an http(s) URL. Inferred
    /// by gh from the current directory when omitted.
    pub repo: Option<String>,

    #[arg(long, default_value = "", global = true)]
    /// Access token handed to gh. Falls back to gh's own authentication.
    pub token: String,

    #[arg(long, global = true)]
    /// Configuration file. Defaults to release-assets.toml when present.
    pub config: Option<PathBuf>,

    #[arg(long, default_value_t = false, global = true)]
    /// Log what would change without uploading, creating or deleting.
    pub dry_run: bool,

    #[arg(long, default_value_t = false, global = true)]
    /// Enable debug logging.
    pub debug: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Release asset subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List assets of a release and its extra releases and upload the
    /// listing to the base release.
    GenerateLists {
        #[arg(short, long)]
        /// Tag of the base release.
        release: String,

        #[arg(short, long = "extension", required = true, value_parser = parse_extension)]
        /// Asset extension to include. Repeat for several.
        extensions: Vec<Extension>,

        #[arg(long)]
        /// Also write the listing to this local path.
        output: Option<PathBuf>,
    },

    /// Upload local files, skipping or overwriting assets that already
    /// exist anywhere in the release sequence.
    UploadToRelease {
        #[arg(short, long)]
        /// Tag of the base release.
        release: String,

        #[arg(short = 'd', long)]
        /// Folder containing the files to upload.
        folder: PathBuf,

        #[arg(short, long = "extension", required = true, value_parser = parse_extension)]
        /// Extension of the files to upload. Repeat for several.
        extensions: Vec<Extension>,

        #[arg(long, default_value_t = false)]
        /// Replace assets that already exist.
        overwrite: bool,

        #[arg(short = 'x', long, default_value_t = false)]
        /// Create a new -extra release when the last one is full.
        create_extra_releases: bool,

        #[arg(long)]
        /// Asset ceiling per release (1 to 1000).
        max_assets: Option<usize>,
    },

    /// Download assets from whichever release in the sequence holds them.
    DownloadFromRelease {
        #[arg(short, long)]
        /// Tag of the base release.
        release: String,

        #[arg(short, long)]
        /// Text file with one asset name per line.
        file_list: Option<PathBuf>,

        #[arg(short = 'd', long)]
        /// Directory to save files into. Defaults to the current directory.
        output_dir: Option<PathBuf>,

        #[arg(long, default_value_t = false)]
        /// Skip files that already exist in the output directory.
        skip_existing: bool,

        /// Asset names to download.
        names: Vec<String>,
    },

    /// Delete assets from every release in the sequence that holds them.
    DeleteFromRelease {
        #[arg(short, long)]
        /// Tag of the base release.
        release: String,

        #[arg(short, long)]
        /// Text file with one asset name per line.
        file_list: Option<PathBuf>,

        /// Asset names to delete.
        names: Vec<String>,
    },
}

fn parse_extension(value: &str) -> std::result::Result<Extension, String> {
    value.parse::<Extension>().map_err(|err| err.to_string())
}

impl Args {
    /// Configure the remote repository from CLI arguments, falling back to
    /// the configuration file.
    pub fn remote_config(&self, config: &Config) -> Result<RemoteConfig> {
        let mut token = self.token.clone();

        let repo = match self.repo.as_deref().or(config.repo.as_deref()) {
            Some(value) => {
                let (repo, url_token) = normalize_repo(value)?;

                if token.is_empty()
                    && let Some(url_token) = url_token
                {
                    token = url_token;
                }

                Some(repo)
            }
            None => None,
        };

        let token = if token.is_empty() {
            None
        } else {
            Some(SecretString::from(token))
        };

        Ok(RemoteConfig { repo, token })
    }
}

/// Validate repository URL uses HTTP or HTTPS scheme.
fn validate_scheme(scheme: git_url_parse::Scheme) -> Result<()> {
    match scheme {
        git_url_parse::Scheme::Http => Ok(()),
        git_url_parse::Scheme::Https => Ok(()),
        _ => Err(AssetError::invalid_args(
            "only http and https schemes are supported for repo urls",
        )),
    }
}

/// Normalise a repository argument to the `OWNER/REPO` form gh expects
/// (`HOST/OWNER/REPO` off github.com). Returns a token embedded in a URL.
pub fn normalize_repo(value: &str) -> Result<(String, Option<String>)> {
    let value = value.trim();

    if value.contains([':', '@']) {
        let parsed = GitUrl::parse(value)?;

        validate_scheme(parsed.scheme)?;

        let host = parsed.host.ok_or_else(|| {
            AssetError::invalid_args("unable to parse host from repo url")
        })?;

        let owner = parsed.owner.ok_or_else(|| {
            AssetError::invalid_args("unable to parse owner from repo url")
        })?;

        let repo = if host == DEFAULT_HOST {
            format!("{owner}/{}", parsed.name)
        } else {
            format!("{host}/{owner}/{}", parsed.name)
        };

        return Ok((repo, parsed.token));
    }

    let parts = value.split('/').collect::<Vec<_>>();

    if !(2..=3).contains(&parts.len()) || parts.iter().any(|p| p.is_empty())
    {
        return Err(AssetError::invalid_args(format!(
            "invalid repo '{value}': expected OWNER/REPO, HOST/OWNER/REPO or a repository url"
        )));
    }

    Ok((value.to_string(), None))
}

/// Run `command` against the forge, log its summary and return whether it
/// completed without failures.
pub async fn execute(
    forge_manager: &ForgeManager,
    command: Command,
    config: &Config,
) -> Result<bool> {
    let success = match command {
        Command::GenerateLists {
            release,
            extensions,
            output,
        } => {
            let opts = ListingOptions {
                release,
                extensions,
                listing_file: config.listing_file.clone(),
                output,
            };
            summarize(generate_lists::execute(forge_manager, &opts).await?)
        }
        Command::UploadToRelease {
            release,
            folder,
            extensions,
            overwrite,
            create_extra_releases,
            max_assets,
        } => {
            let max_assets = max_assets.unwrap_or(config.max_assets_per_release);
            validate_max_assets(max_assets)?;

            let opts = UploadOptions {
                release,
                folder,
                extensions,
                overwrite,
                create_extra_releases,
                max_assets,
                listing_file: config.listing_file.clone(),
                target: config.new_release_target.clone(),
            };
            summarize(upload::execute(forge_manager, &opts).await?)
        }
        Command::DownloadFromRelease {
            release,
            file_list,
            output_dir,
            skip_existing,
            names,
        } => {
            let opts = DownloadOptions {
                release,
                names,
                file_list,
                output_dir,
                skip_existing,
            };
            summarize(download::execute(forge_manager, &opts).await?)
        }
        Command::DeleteFromRelease {
            release,
            file_list,
            names,
        } => {
            let opts = DeleteOptions {
                release,
                names,
                file_list,
            };
            summarize(delete::execute(forge_manager, &opts).await?)
        }
    };

    if forge_manager.dry_run() {
        warn!("dry_run: no changes were made");
    }

    Ok(success)
}

fn summarize(report: impl Report) -> bool {
    report.log_summary();
    report.is_success()
}
