//! lldpmap entry point
//!
//! Polls one device and prints its LLDP neighbor table to stdout. Logs go to
//! stderr.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use lldpmap::{
    discover_neighbors, LldpError, LocalPortSemantic, OrphanPolicy, OutputFormat, PollerConfig,
    PrunePolicy, RemoteIndexLayout, RemotePortSemantic, SnmpWalker,
};

/// LLDP neighbor table of an SNMPv2c device
#[derive(Parser, Debug)]
#[command(name = "lldpmap")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// IP address of the target device
    #[arg(long = "ip", visible_alias = "target", value_name = "ADDR")]
    target: Option<String>,

    /// SNMP community [default: public]
    #[arg(short = 'c', long)]
    community: Option<String>,

    /// Output format [default: csv]
    #[arg(short = 'o', long = "format", value_enum)]
    format: Option<OutputFormat>,

    /// Local port label: name, description (desc), id, port-description (port-desc)
    #[arg(long = "lt", visible_alias = "local-port", value_name = "SEMANTIC")]
    local_port: Option<LocalPortSemantic>,

    /// Remote port label: id, description (desc)
    #[arg(long = "rt", visible_alias = "remote-port", value_name = "SEMANTIC")]
    remote_port: Option<RemotePortSemantic>,

    /// Do not output records without remote information (requires --prune-policy)
    #[arg(short = 'p', long)]
    prune: bool,

    /// Which records --prune removes
    #[arg(long, value_enum)]
    prune_policy: Option<PrunePolicy>,

    /// What to do with remote entries that match no local port
    #[arg(long, value_enum)]
    orphan_policy: Option<OrphanPolicy>,

    /// Position of the local port number in remote table indexes
    #[arg(long, value_enum)]
    remote_index_layout: Option<RemoteIndexLayout>,

    /// Per-request timeout in milliseconds [default: 1000]
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Retries per request [default: 3]
    #[arg(long)]
    retries: Option<u32>,

    /// GETBULK max-repetitions [default: 50]
    #[arg(long)]
    max_repetitions: Option<u32>,

    /// Quote CSV fields containing separators, quotes or line breaks
    #[arg(long)]
    csv_escape: bool,

    /// Indent JSON output
    #[arg(long)]
    pretty: bool,

    /// Configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Args {
    /// Overlays command line values on `config`.
    fn apply(&self, config: &mut PollerConfig) {
        if let Some(target) = &self.target {
            config.device.target = Some(target.clone());
        }
        if let Some(community) = &self.community {
            config.device.community = community.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.device.timeout_ms = timeout_ms;
        }
        if let Some(retries) = self.retries {
            config.device.retries = retries;
        }
        if let Some(max_repetitions) = self.max_repetitions {
            config.device.max_repetitions = max_repetitions;
        }
        if let Some(local_port) = self.local_port {
            config.fields.local_port = local_port;
        }
        if let Some(remote_port) = self.remote_port {
            config.fields.remote_port = remote_port;
        }
        if let Some(layout) = self.remote_index_layout {
            config.fields.remote_index_layout = layout;
        }
        if let Some(policy) = self.orphan_policy {
            config.correlation.orphan_policy = policy;
        }
        if self.prune {
            config.correlation.prune = true;
        }
        if let Some(policy) = self.prune_policy {
            config.correlation.prune_policy = Some(policy);
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if self.csv_escape {
            config.output.csv_escape = true;
        }
        if self.pretty {
            config.output.pretty = true;
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(output) => {
            let mut stdout = std::io::stdout().lock();
            if let Err(e) = stdout.write_all(output.as_bytes()).and_then(|_| stdout.flush()) {
                error!("Failed to write output: {}", e);
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            let code = e
                .downcast_ref::<LldpError>()
                .map(LldpError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

/// Stderr subscriber; `-v` selects debug unless RUST_LOG is set
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(args: &Args) -> anyhow::Result<PollerConfig> {
    let mut config = match &args.config {
        Some(path) => PollerConfig::load_file(path)?,
        None => PollerConfig::load()?,
    };
    args.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> anyhow::Result<String> {
    let config = load_config(args)?;
    debug!(
        device = config.device.target.as_deref().unwrap_or_default(),
        local = %config.fields.local_port,
        remote = %config.fields.remote_port,
        "Configuration loaded"
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let discovery = runtime.block_on(async {
        let settings = config.snmp_settings()?;
        let target = settings.socket_addr();
        let walker = SnmpWalker::connect(settings)
            .await
            .with_context(|| format!("Cannot open SNMP session to {target}"))?;
        let discovery = discover_neighbors(walker, &config).await?;
        Ok::<_, anyhow::Error>(discovery)
    })?;

    Ok(config.presenter().render(&discovery.table)?)
}
