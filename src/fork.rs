use crate::api::paper::PaperClient;
use crate::error::{SetupResult, ValidationError};
use crate::fetch::{Fetched, Fetcher};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

const TUINITY_URL: &str =
    "https://ci.codemc.io/job/Spottedleaf/job/Tuinity/lastSuccessfulBuild/artifact/tuinity-paperclip.jar";
const TUINITY_JAR: &str = "tuinity-paperclip.jar";

const AIRPLANE_URL: &str =
    "https://ci.tivy.ca/job/Airplane-1.16/lastSuccessfulBuild/artifact/launcher-airplane.jar";
const AIRPLANE_JAR: &str = "launcher-airplane.jar";

/// Server software distribution to install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fork {
    Paper,
    Tuinity,
    Airplane,
}

/// Where a fork's server jar comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub url: String,
}

impl Fork {
    /// Resolves the jar to install. Only Paper consults the catalog; the other forks
    /// track the last successful build of their CI job and ignore `version`.
    pub async fn artifact(&self, catalog: &PaperClient, version: &str) -> SetupResult<Artifact> {
        let artifact = match self {
            Fork::Paper => {
                let build = catalog.latest_artifact(version).await?;
                println!("🔎 Paper {} resolved to build {}", version, build.build);
                Artifact {
                    filename: build.filename,
                    url: build.url,
                }
            }
            Fork::Tuinity => Artifact {
                filename: TUINITY_JAR.to_string(),
                url: TUINITY_URL.to_string(),
            },
            Fork::Airplane => Artifact {
                filename: AIRPLANE_JAR.to_string(),
                url: AIRPLANE_URL.to_string(),
            },
        };
        debug!(fork = %self, ?artifact);
        Ok(artifact)
    }

    /// Fetches the fork's jar into `server_dir` and returns its path.
    pub async fn download(
        &self,
        catalog: &PaperClient,
        fetcher: &Fetcher,
        version: &str,
        server_dir: &Path,
    ) -> SetupResult<PathBuf> {
        let artifact = self.artifact(catalog, version).await?;
        let path = server_dir.join(&artifact.filename);
        match fetcher.fetch(&artifact.url, &path, false).await? {
            Fetched::Skipped => println!("📦 {} already downloaded", artifact.filename),
            Fetched::Downloaded { bytes } => debug!(bytes, "downloaded {}", artifact.filename),
        }
        Ok(path)
    }
}

impl FromStr for Fork {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "paper" => Ok(Fork::Paper),
            "tuinity" => Ok(Fork::Tuinity),
            "airplane" => Ok(Fork::Airplane),
            _ => Err(ValidationError::UnsupportedFork(s.to_string())),
        }
    }
}

impl fmt::Display for Fork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Fork::Paper => "paper",
            Fork::Tuinity => "tuinity",
            Fork::Airplane => "airplane",
        };
        f.write_str(name)
    }
}
