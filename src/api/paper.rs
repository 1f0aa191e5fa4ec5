use crate::error::{SetupError, SetupResult};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::Path;
use tracing::{debug, instrument};

pub const PAPER_API_BASE: &str = "https://api.papermc.io/v2/projects/paper";

#[derive(Deserialize)]
struct PaperVersions {
    versions: Vec<String>
}

#[derive(Deserialize)]
struct PaperBuilds {
    builds: Vec<u32>
}

#[derive(Deserialize)]
struct PaperBuild {
    downloads: PaperDownloads
}

#[derive(Deserialize)]
struct PaperDownloads {
    application: PaperApplication
}

#[derive(Deserialize)]
struct PaperApplication {
    name: String
}

/// A concrete Paper build and where to get its server jar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDescriptor {
    pub build: u32,
    pub filename: String,
    pub url: String,
}

/// Client for the PaperMC v2 project endpoints.
pub struct PaperClient {
    client: reqwest::Client,
    base: String,
}

impl PaperClient {
    pub fn new(client: reqwest::Client, base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self { client, base }
    }

    pub async fn list_versions(&self) -> SetupResult<BTreeSet<String>> {
        let response: PaperVersions = self.get_json(&self.base).await?;
        Ok(response.versions.into_iter().collect())
    }

    /// Highest build id published for `version`.
    pub async fn latest_build(&self, version: &str) -> SetupResult<u32> {
        let url = format!("{}/versions/{}", self.base, version);
        let response: PaperBuilds = self.get_json(&url).await?;

        response
            .builds
            .into_iter()
            .max()
            .ok_or_else(|| SetupError::NoBuilds(version.to_string()))
    }

    pub async fn resolve_artifact(&self, version: &str, build: u32) -> SetupResult<BuildDescriptor> {
        let build_url = format!("{}/versions/{}/builds/{}", self.base, version, build);
        let response: PaperBuild = self.get_json(&build_url).await?;
        let filename = response.downloads.application.name;
        if Path::new(&filename).file_name() != Some(OsStr::new(&filename)) {
            return Err(SetupError::BadArtifactName(filename));
        }
        let url = format!("{}/downloads/{}", build_url, filename);

        Ok(BuildDescriptor { build, filename, url })
    }

    pub async fn latest_artifact(&self, version: &str) -> SetupResult<BuildDescriptor> {
        let build = self.latest_build(version).await?;
        self.resolve_artifact(version, build).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> SetupResult<T> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        debug!(%status);
        if !status.is_success() {
            return Err(SetupError::Connectivity {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}
