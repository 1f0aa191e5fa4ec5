mod api;
mod error;
mod fetch;
mod fork;
mod plugin;
mod server;
#[cfg(test)]
mod testutil;
mod validate;

use crate::api::paper::{PAPER_API_BASE, PaperClient};
use crate::fetch::Fetcher;
use crate::fork::Fork;
use crate::server::{Provisioned, Provisioner, ServerSetupConfig};
use clap::{ArgAction, Parser};
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

// Environment variable whose presence accepts the EULA.
const EULA_ENV: &str = "MC_EULA";

#[derive(Debug, Parser)]
#[command(name = "paper-setup")]
#[command(about = "Provision a minecraft server directory for local plugin testing")]
#[command(version)]
pub struct Cli {
    /// Server fork (paper, tuinity, airplane)
    #[arg(short, long, default_value = "paper", value_name = "NAME", value_parser = validate::server_fork)]
    pub fork: Fork,
    /// Minecraft version, checked against the Paper API
    #[arg(short, long, default_value = "1.16.5", value_name = "VERSION", value_parser = validate::non_empty)]
    pub mc_version: String,
    /// Server directory
    #[arg(short = 'd', long, default_value = "server", value_name = "PATH", value_parser = validate::dir_path)]
    pub server_dir: PathBuf,
    /// Name of the link pointing at the server jar
    #[arg(short, long, default_value = "server.jar", value_name = "NAME", value_parser = validate::file_path)]
    pub link_name: PathBuf,
    /// Server port
    #[arg(short, long, default_value = "25565", value_parser = validate::network_port)]
    pub port: u16,
    /// Plugin jars (or single-match globs) to copy into the plugin directory
    #[arg(short = 'c', long, value_name = "PATH", num_args = 1.., action = ArgAction::Append, value_parser = validate::file_glob_path)]
    pub copy_plugins: Vec<PathBuf>,
    /// Leave bStats metrics untouched
    #[arg(long)]
    pub keep_metrics: bool,
    /// Base URL of the Paper project API
    #[arg(long, env = "PAPER_API_BASE", default_value = PAPER_API_BASE, value_name = "URL")]
    pub api_base: String,
    /// Change level of verbosity (apply multiple times to increase level)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    fn into_config(self, version: String, eula_preaccepted: bool) -> ServerSetupConfig {
        ServerSetupConfig {
            fork: self.fork,
            version,
            server_dir: self.server_dir,
            link_name: self.link_name,
            port: self.port,
            plugins: self.copy_plugins,
            disable_metrics: !self.keep_metrics,
            eula_preaccepted,
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run(Cli::parse()).await {
        eprintln!("Failed! err = {err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    init_tracing(cli.verbose);
    println!("args: {cli:?}");

    let client = reqwest::Client::builder()
        .user_agent(concat!("paper-setup/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let catalog = PaperClient::new(client.clone(), &cli.api_base);
    let fetcher = Fetcher::new(client);

    let version = validate::mc_version(&catalog, &cli.mc_version).await?;
    let eula_preaccepted = eula_preaccepted(|name| std::env::var_os(name));
    trace!(eula_preaccepted);

    let config = cli.into_config(version, eula_preaccepted);
    debug!(?config);

    println!("🚀 Setting up {} {} in {}", config.fork, config.version, config.server_dir.display());
    let done = Provisioner::new(&catalog, &fetcher).run(&config).await?;
    print_summary(&done);

    Ok(())
}

// Any value counts, even an empty one.
fn eula_preaccepted(var: impl Fn(&str) -> Option<OsString>) -> bool {
    var(EULA_ENV).is_some()
}

fn print_summary(done: &Provisioned) {
    println!("✅ Server ready!");
    println!(" - JAR: {}", done.artifact.display());
    println!(" - Link: {}", done.link.display());
    println!(" - EULA accepted: {}", done.eula_accepted);
    println!(" - server.properties written: {}", done.properties_written);
    println!(" - Plugins copied: {}", done.plugins.len());
    if done.metrics_disabled {
        println!(" - bStats disabled");
    }
}

// Default level from the -v count, RUST_LOG directives on top.
fn init_tracing(verbose: u8) {
    let level_filter = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["paper-setup"]).unwrap();
        assert_eq!(cli.fork, Fork::Paper);
        assert_eq!(cli.mc_version, "1.16.5");
        assert_eq!(cli.server_dir, PathBuf::from("server"));
        assert_eq!(cli.link_name, PathBuf::from("server.jar"));
        assert_eq!(cli.port, 25565);
        assert!(cli.copy_plugins.is_empty());
        assert!(!cli.keep_metrics);
    }

    #[test]
    fn fork_is_case_insensitive() {
        let cli = Cli::try_parse_from(["paper-setup", "--fork", "AirPlane"]).unwrap();
        assert_eq!(cli.fork, Fork::Airplane);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(Cli::try_parse_from(["paper-setup", "--fork", "spigot"]).is_err());
        assert!(Cli::try_parse_from(["paper-setup", "--port", "0"]).is_err());
        assert!(Cli::try_parse_from(["paper-setup", "--port", "65536"]).is_err());
        assert!(Cli::try_parse_from(["paper-setup", "--mc-version", ""]).is_err());
    }

    #[test]
    fn collects_plugins_across_flags() {
        let tmp = tempfile::TempDir::new().unwrap();
        let a = tmp.path().join("a.jar");
        let b = tmp.path().join("b.jar");
        let c = tmp.path().join("c.jar");
        for path in [&a, &b, &c] {
            std::fs::write(path, "jar").unwrap();
        }

        let arg = |path: &PathBuf| path.to_string_lossy().into_owned();
        let cli = Cli::try_parse_from([
            "paper-setup".to_string(),
            "-c".to_string(),
            arg(&a),
            arg(&b),
            "--copy-plugins".to_string(),
            arg(&c),
        ])
        .unwrap();

        assert_eq!(cli.copy_plugins, vec![a, b, c]);
    }

    #[test]
    fn eula_env_presence_accepts() {
        let env = |value: Option<&'static str>| {
            move |name: &str| {
                assert_eq!(name, "MC_EULA");
                value.map(OsString::from)
            }
        };
        assert!(eula_preaccepted(env(Some("1"))));
        assert!(eula_preaccepted(env(Some(""))));
        assert!(!eula_preaccepted(env(None)));
    }

    #[test]
    fn keep_metrics_flips_opt_out() {
        let cli = Cli::try_parse_from(["paper-setup", "--keep-metrics"]).unwrap();
        let config = cli.into_config("1.16.5".into(), false);
        assert!(!config.disable_metrics);
    }
}
