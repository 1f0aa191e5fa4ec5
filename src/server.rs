use crate::api::paper::PaperClient;
use crate::error::{SetupError, SetupResult};
use crate::fetch::Fetcher;
use crate::fork::Fork;
use crate::plugin::{self, PLUGINS_DIR};
use anyhow::Result;
use dialoguer::Confirm;
use std::fs;
use std::path::{self, Path, PathBuf};
use tracing::{debug, info, instrument, warn};

pub const EULA_FILE: &str = "eula.txt";
pub const PROPERTIES_FILE: &str = "server.properties";
pub const EULA_URL: &str = "https://account.mojang.com/documents/minecraft_eula";

/// Everything one provisioning run needs, validated up front.
#[derive(Debug, Clone)]
pub struct ServerSetupConfig {
    pub fork: Fork,
    pub version: String,
    pub server_dir: PathBuf,
    pub link_name: PathBuf,
    pub port: u16,
    pub plugins: Vec<PathBuf>,
    pub disable_metrics: bool,
    pub eula_preaccepted: bool,
}

/// What a run did, for the closing summary.
#[derive(Debug)]
pub struct Provisioned {
    pub artifact: PathBuf,
    pub link: PathBuf,
    pub eula_accepted: bool,
    pub properties_written: bool,
    pub plugins: Vec<PathBuf>,
    pub metrics_disabled: bool,
}

type EulaPrompt = Box<dyn Fn() -> Result<bool>>;

pub struct Provisioner<'a> {
    catalog: &'a PaperClient,
    fetcher: &'a Fetcher,
    prompt: EulaPrompt,
}

impl<'a> Provisioner<'a> {
    pub fn new(catalog: &'a PaperClient, fetcher: &'a Fetcher) -> Self {
        Self {
            catalog,
            fetcher,
            prompt: Box::new(confirm_eula),
        }
    }

    /// Replaces the interactive EULA question.
    pub fn with_prompt(mut self, prompt: impl Fn() -> Result<bool> + 'static) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    /// Brings `config.server_dir` up to date. Each step checks what is already on disk,
    /// so an interrupted run can simply be repeated.
    pub async fn run(&self, config: &ServerSetupConfig) -> Result<Provisioned> {
        let dir = &config.server_dir;
        ensure_dir(dir)?;

        let artifact = config
            .fork
            .download(self.catalog, self.fetcher, &config.version, dir)
            .await?;

        let link = dir.join(&config.link_name);
        replace_link(&link, &artifact)?;

        let eula_accepted = accept_eula(dir, config.eula_preaccepted, &*self.prompt)?;

        let properties_written = write_properties(dir, &config.version, config.port)?;

        let plugins_dir = dir.join(PLUGINS_DIR);
        let plugins = plugin::copy_plugins(&plugins_dir, &config.plugins)?;

        let metrics_disabled = if config.disable_metrics {
            plugin::disable_bstats(&plugins_dir)?
        } else {
            false
        };

        Ok(Provisioned {
            artifact,
            link,
            eula_accepted,
            properties_written,
            plugins,
            metrics_disabled,
        })
    }
}

fn ensure_dir(dir: &Path) -> SetupResult<()> {
    if !dir.exists() {
        println!("📁 Creating server directory {}", dir.display());
    }
    fs::create_dir_all(dir).map_err(SetupError::io(dir))
}

/// Points `link` at the absolute path of `target`, removing whatever link or file
/// currently has that name.
#[instrument(level = "debug")]
pub fn replace_link(link: &Path, target: &Path) -> SetupResult<()> {
    if let Ok(meta) = fs::symlink_metadata(link) {
        if meta.is_dir() {
            return Err(SetupError::LinkIsDirectory(link.to_path_buf()));
        }
        fs::remove_file(link).map_err(SetupError::io(link))?;
        debug!("removed previous link");
    }

    let target = path::absolute(target).map_err(SetupError::io(target))?;
    println!("🔗 Linking {} to {}", target.display(), link.display());

    #[cfg(unix)]
    std::os::unix::fs::symlink(&target, link).map_err(SetupError::io(link))?;

    #[cfg(windows)]
    std::os::windows::fs::symlink_file(&target, link).map_err(SetupError::io(link))?;

    Ok(())
}

/// Settles the EULA question and persists a positive answer. Declining is not an
/// error; the server just won't start until the EULA is accepted.
pub fn accept_eula(server_dir: &Path, preaccepted: bool, prompt: &dyn Fn() -> Result<bool>) -> Result<bool> {
    let eula_file = server_dir.join(EULA_FILE);

    let accepted = if preaccepted {
        debug!("accepted via MC_EULA");
        true
    } else if previously_accepted(&eula_file)? {
        debug!("accepted in {}", eula_file.display());
        true
    } else {
        prompt()?
    };

    if accepted {
        fs::write(&eula_file, "eula=true").map_err(SetupError::io(&eula_file))?;
        info!("eula accepted");
    } else {
        warn!("eula not accepted, the server will refuse to start");
        println!("❌ Not agreed with the EULA");
    }

    Ok(accepted)
}

fn previously_accepted(eula_file: &Path) -> SetupResult<bool> {
    if !eula_file.is_file() {
        return Ok(false);
    }
    let content = fs::read_to_string(eula_file).map_err(SetupError::io(eula_file))?;
    Ok(content.lines().any(|line| line.contains("true")))
}

fn confirm_eula() -> Result<bool> {
    println!("📜 Confirm or set MC_EULA to agree with Mojang's EULA: {}", EULA_URL);
    let confirmed = Confirm::new()
        .with_prompt("Do you agree to the EULA?")
        .default(false)
        .interact()?;
    Ok(confirmed)
}

/// Writes a minimal `server.properties` unless one exists. Returns whether it was written.
pub fn write_properties(server_dir: &Path, version: &str, port: u16) -> SetupResult<bool> {
    let path = server_dir.join(PROPERTIES_FILE);
    if path.exists() {
        debug!("{} exists, leaving it alone", path.display());
        return Ok(false);
    }

    let properties = format!(
        "motd={} test server\nserver-port={}\nspawn-protection=0\n",
        version, port
    );
    fs::write(&path, properties).map_err(SetupError::io(&path))?;
    println!("⚙️  Wrote {}", path.display());
    Ok(true)
}
