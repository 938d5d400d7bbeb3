//! Implements the Forge trait by shelling out to the GitHub CLI (`gh`).
use async_trait::async_trait;
use log::*;
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};
use tokio::process::Command;

use crate::{
    Result,
    error::AssetError,
    forge::{
        config::RemoteConfig,
        traits::Forge,
        types::{
            AssetRecord, CreateReleaseRequest, DownloadAssetRequest, Release,
            UploadAssetRequest,
        },
    },
};

const GH_PROGRAM: &str = "gh";
const GLOB_METACHARACTERS: [char; 4] = ['*', '?', '[', '\\'];

#[derive(Debug, Deserialize)]
struct GhRelease {
    #[serde(rename = "tagName")]
    tag_name: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GhReleaseAssets {
    #[serde(default)]
    assets: Vec<AssetRecord>,
}

/// Captured result of one `gh` invocation.
#[derive(Debug)]
struct GhOutput {
    success: bool,
    stdout: String,
    stderr: String,
}

impl GhOutput {
    /// Trimmed stderr, or a generic message when gh printed nothing.
    fn reason(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            "gh exited with a non-zero status".into()
        } else {
            stderr.to_string()
        }
    }
}

/// Forge backed by the `gh` executable found on `PATH`.
pub struct GhCli {
    program: PathBuf,
    config: RemoteConfig,
}

impl GhCli {
    /// Locate `gh` and build a client for the configured repository.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let program = which::which(GH_PROGRAM)?;
        debug!("using gh executable: {}", program.display());
        Ok(Self::with_program(program, config))
    }

    pub(crate) fn with_program(program: PathBuf, config: RemoteConfig) -> Self {
        Self { program, config }
    }

    /// Base command carrying repository selection and authentication.
    fn release_command<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = self.command(args);
        if let Some(repo) = &self.config.repo {
            cmd.arg("--repo").arg(repo);
        }
        cmd
    }

    fn command<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        cmd.env("GH_PROMPT_DISABLED", "1");
        if let Some(token) = &self.config.token {
            cmd.env("GH_TOKEN", token.expose_secret());
        }
        cmd.kill_on_drop(true);
        cmd
    }

    async fn run(&self, cmd: &mut Command) -> Result<GhOutput> {
        let description = describe(cmd);
        debug!("running: {description}");

        let output = cmd.output().await.map_err(|err| {
            AssetError::CommandFailed {
                command: description.clone(),
                stderr: err.to_string(),
            }
        })?;

        let result = GhOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !result.success {
            debug!("command failed: {description}: {}", result.stderr.trim());
        }

        Ok(result)
    }
}

#[async_trait]
impl Forge for GhCli {
    async fn repo_name(&self) -> Result<String> {
        if let Some(repo) = &self.config.repo {
            return Ok(repo.clone());
        }

        let mut cmd = self.command([
            "repo",
            "view",
            "--json",
            "nameWithOwner",
            "-q",
            ".nameWithOwner",
        ]);
        let output = self.run(&mut cmd).await?;

        if !output.success {
            return Err(AssetError::CommandFailed {
                command: describe(&cmd),
                stderr: output.reason(),
            });
        }

        Ok(output.stdout.trim().to_string())
    }

    async fn get_release(&self, tag: &str) -> Result<Option<Release>> {
        let mut cmd = self.release_command([
            "release", "view", tag, "--json", "tagName,name",
        ]);
        let output = self.run(&mut cmd).await?;

        release_from_output(tag, &output)
    }

    async fn list_assets(&self, tag: &str) -> Result<Vec<AssetRecord>> {
        let mut cmd =
            self.release_command(["release", "view", tag, "--json", "assets"]);
        let output = self.run(&mut cmd).await?;

        assets_from_output(tag, &output)
    }

    async fn upload_asset(&self, req: UploadAssetRequest) -> Result<()> {
        let mut args = vec![
            OsStr::new("release"),
            OsStr::new("upload"),
            OsStr::new(&req.tag),
            req.path.as_os_str(),
        ];
        if req.clobber {
            args.push(OsStr::new("--clobber"));
        }

        let mut cmd = self.release_command(args);
        let output = self.run(&mut cmd).await?;

        if !output.success {
            return Err(AssetError::UploadError {
                file: req.asset_name,
                tag: req.tag,
                reason: output.reason(),
            });
        }

        Ok(())
    }

    async fn create_release(&self, req: CreateReleaseRequest) -> Result<()> {
        let mut args = vec![
            "release",
            "create",
            req.tag.as_str(),
            "--title",
            req.title.as_str(),
            "--notes",
            req.notes.as_str(),
        ];
        if let Some(target) = &req.target {
            args.push("--target");
            args.push(target);
        }

        let mut cmd = self.release_command(args);
        let output = self.run(&mut cmd).await?;

        if !output.success {
            return Err(AssetError::release_creation(&req.tag, output.reason()));
        }

        Ok(())
    }

    async fn download_asset(&self, req: DownloadAssetRequest) -> Result<()> {
        // gh matches --pattern as a glob
        if req.asset_name.contains(GLOB_METACHARACTERS) {
            return Err(AssetError::DownloadError {
                asset: req.asset_name,
                tag: req.tag,
                reason: "name contains glob characters (*, ?, [, \\) that gh \
                         cannot match literally"
                    .into(),
            });
        }

        let mut args = vec![
            OsStr::new("release"),
            OsStr::new("download"),
            OsStr::new(&req.tag),
            OsStr::new("--pattern"),
            OsStr::new(&req.asset_name),
        ];
        if let Some(dir) = &req.output_dir {
            args.push(OsStr::new("--dir"));
            args.push(dir.as_os_str());
        }

        let mut cmd = self.release_command(args);
        let output = self.run(&mut cmd).await?;

        if !output.success {
            return Err(AssetError::DownloadError {
                asset: req.asset_name,
                tag: req.tag,
                reason: output.reason(),
            });
        }

        Ok(())
    }

    async fn delete_asset(&self, tag: &str, asset_name: &str) -> Result<()> {
        let mut cmd = self.release_command([
            "release",
            "delete-asset",
            tag,
            asset_name,
            "--yes",
        ]);
        let output = self.run(&mut cmd).await?;

        if !output.success {
            return Err(AssetError::DeleteError {
                asset: asset_name.to_string(),
                tag: tag.to_string(),
                reason: output.reason(),
            });
        }

        Ok(())
    }
}

/// Human readable command line, without the environment.
fn describe(cmd: &Command) -> String {
    let std_cmd = cmd.as_std();
    let program = Path::new(std_cmd.get_program())
        .file_name()
        .unwrap_or(std_cmd.get_program())
        .to_string_lossy()
        .to_string();

    std::iter::once(program)
        .chain(std_cmd.get_args().map(|a| a.to_string_lossy().to_string()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Release lookup result. A missing release is `None`, any other failure,
/// unparsable output included, is a fetch error.
fn release_from_output(tag: &str, output: &GhOutput) -> Result<Option<Release>> {
    if !output.success {
        if is_release_not_found(&output.stderr) {
            debug!("release not found: {tag}");
            return Ok(None);
        }
        return Err(AssetError::fetch(tag, output.reason()));
    }

    parse_release(&output.stdout)
        .map(Some)
        .map_err(|err| AssetError::fetch(tag, err.to_string()))
}

fn assets_from_output(tag: &str, output: &GhOutput) -> Result<Vec<AssetRecord>> {
    if !output.success {
        return Err(AssetError::fetch(tag, output.reason()));
    }

    parse_assets(&output.stdout)
        .map_err(|err| AssetError::fetch(tag, err.to_string()))
}

fn is_release_not_found(stderr: &str) -> bool {
    stderr.to_lowercase().contains("release not found")
}

fn parse_release(stdout: &str) -> Result<Release> {
    let release: GhRelease = serde_json::from_str(stdout)?;
    Ok(Release {
        tag: release.tag_name,
        title: release.name.unwrap_or_default(),
    })
}

fn parse_assets(stdout: &str) -> Result<Vec<AssetRecord>> {
    let release: GhReleaseAssets = serde_json::from_str(stdout)?;
    Ok(release.assets)
}
