use sesami_mcu::{unix_timestamp, Client, Command};
use sesami_proto::status::{HistoryEntry, LockStatus};
use std::path::Path;

#[derive(clap::Parser)]
#[command(name = "sesami")]
#[command(about = "Sesame smart lock cloud client")]
struct Cli {
    /// Config file (default: $SESAMI_HOME/config.json)
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Device UUID of the lock
    #[arg(long, global = true, env = "SESAMI_DEVICE_ID")]
    device: Option<String>,

    /// Cloud API key
    #[arg(long, global = true, env = "SESAMI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Lock secret key, 32 hex digits
    #[arg(long, global = true, env = "SESAMI_SECRET_KEY", hide_env_values = true)]
    secret_key: Option<String>,

    /// Cloud base URL
    #[arg(long, global = true, env = "SESAMI_BASE_URL")]
    base_url: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, global = true, env = "SESAMI_TIMEOUT_SECS")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Write the given credentials to a new config file
    Init {
        /// History label stored as the default for commands
        #[arg(long)]
        label: Option<String>,
    },
    /// Lock
    Lock {
        #[arg(long)]
        label: Option<String>,
    },
    /// Unlock
    Unlock {
        #[arg(long)]
        label: Option<String>,
    },
    /// Toggle between locked and unlocked
    Toggle {
        #[arg(long)]
        label: Option<String>,
    },
    /// Send a raw command code
    Cmd {
        code: i32,
        #[arg(long)]
        label: Option<String>,
    },
    /// Print the lock status
    Status {
        /// One line summary instead of the raw body
        #[arg(long)]
        summary: bool,
    },
    /// Print recent history
    History {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = sesami_mcu::HISTORY_PAGE_SIZE)]
        lg: u32,
        /// Decode history labels instead of printing the raw body
        #[arg(long)]
        labels: bool,
    },
    /// Print the command tag for a timestamp (default: now)
    Sign {
        #[arg(long)]
        timestamp: Option<u32>,
    },
}

fn main() {
    let cli: Cli = clap::Parser::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = match cli.config {
        Some(path) => path,
        None => sesami_cli::sesami_home()?.join(sesami_cli::config::CONFIG_FILE),
    };

    let mut overrides = sesami_cli::Overrides {
        device_id: cli.device,
        api_key: cli.api_key,
        secret_key: cli.secret_key,
        base_url: cli.base_url,
        history_label: None,
        timeout_secs: cli.timeout,
    };

    match cli.command {
        Commands::Init { label } => {
            overrides.history_label = label;
            let config = sesami_cli::Config::default().merge(overrides);
            sesami_cli::init_config(&config_path, &config)?;
            println!("Created config at {}", config_path.display());
            Ok(())
        }
        Commands::Lock { label } => send(&config_path, overrides, Command::Lock, label),
        Commands::Unlock { label } => send(&config_path, overrides, Command::Unlock, label),
        Commands::Toggle { label } => send(&config_path, overrides, Command::Toggle, label),
        Commands::Cmd { code, label } => send(&config_path, overrides, Command::from(code), label),
        Commands::Status { summary } => {
            let (config, mut client) = connect(&config_path, overrides)?;
            let body = client.get_status(config.device_id()?, config.api_key()?)?;
            if summary {
                println!("{}", LockStatus::from_body(&body)?.summary());
            } else {
                println!("{body}");
            }
            Ok(())
        }
        Commands::History { page, lg, labels } => {
            let (config, mut client) = connect(&config_path, overrides)?;
            let body =
                client.get_history_page(config.device_id()?, config.api_key()?, page, lg)?;
            if labels {
                for entry in HistoryEntry::list_from_body(&body)? {
                    println!(
                        "{}\t{}\t{}",
                        entry.timestamp.unwrap_or_default(),
                        entry.kind.unwrap_or_default(),
                        entry.label().unwrap_or_default()
                    );
                }
            } else {
                println!("{body}");
            }
            Ok(())
        }
        Commands::Sign { timestamp } => {
            let config = sesami_cli::Config::load(&config_path)?.merge(overrides);
            let timestamp = match timestamp {
                Some(t) => t,
                None => unix_timestamp()?,
            };
            println!("{}", sesami_proto::generate_tag(config.secret_key()?, timestamp)?);
            Ok(())
        }
    }
}

fn connect(
    config_path: &Path,
    overrides: sesami_cli::Overrides,
) -> anyhow::Result<(sesami_cli::Config, Client<sesami_cli::ReqwestTransport>)> {
    let config = sesami_cli::Config::load(config_path)?.merge(overrides);
    let client = Client::with_base_url(
        sesami_cli::ReqwestTransport::new(config.timeout()),
        config.base_url(),
    );
    Ok((config, client))
}

fn send(
    config_path: &Path,
    overrides: sesami_cli::Overrides,
    command: Command,
    label: Option<String>,
) -> anyhow::Result<()> {
    let (config, mut client) = connect(config_path, overrides)?;
    let label = label.unwrap_or_else(|| config.history_label().to_string());
    let timestamp = unix_timestamp()?;
    tracing::info!("sending {command} to {}", config.device_id()?);

    let body = client.send_command(
        timestamp,
        config.device_id()?,
        command,
        config.api_key()?,
        config.secret_key()?,
        &label,
    )?;
    if !body.is_empty() {
        println!("{body}");
    }
    Ok(())
}
