mod config_commands;
mod inspect_commands;
mod session_commands;

use std::path::PathBuf;

use {
    anyhow::{Context, Result},
    clap::{Parser, Subcommand},
    picker_config::PickerConfig,
    picker_protocol::TabId,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(
    name = "element-picker",
    version,
    about = "Element picker: select elements on a page and inspect them"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error). Defaults to `logging.level`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the standard locations.
    #[arg(long, global = true, env = "PICKER_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the details the picker would report for one element.
    Inspect {
        /// Page fixture (JSON or TOML).
        #[arg(long)]
        page: PathBuf,
        /// Select the element with this id.
        #[arg(long, conflicts_with = "at", required_unless_present = "at")]
        id: Option<String>,
        /// Select the topmost element under this viewport point, as `x,y`.
        #[arg(long, value_parser = parse_point)]
        at: Option<(f64, f64)>,
    },
    /// Run a full picking session against a page fixture.
    Session {
        /// Page fixture (JSON or TOML).
        #[arg(long)]
        page: PathBuf,
        /// Tab id the page is loaded in.
        #[arg(long, default_value_t = 1)]
        tab: TabId,
        /// Click at `x,y` while picking. Repeatable.
        #[arg(long = "click", value_parser = parse_point)]
        clicks: Vec<(f64, f64)>,
    },
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

fn parse_point(value: &str) -> Result<(f64, f64), String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{value}`"))?;
    let x = x.trim().parse().map_err(|e| format!("bad x in `{value}`: {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad y in `{value}`: {e}"))?;
    Ok((x, y))
}

fn load_config(cli: &Cli) -> Result<PickerConfig> {
    let mut config = match &cli.config {
        Some(path) => picker_config::load_config(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => picker_config::discover_and_load(),
    };
    picker_config::apply_env_overrides(&mut config);
    Ok(config)
}

fn init_telemetry(cli: &Cli, config: &PickerConfig) {
    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs || config.logging.json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match load_config(&cli) {
        Ok(config) => config,
        // `config check` reports the problem itself.
        Err(_) if matches!(cli.command, Commands::Config { .. }) => PickerConfig::default(),
        Err(e) => return Err(e),
    };
    init_telemetry(&cli, &config);

    info!(version = env!("CARGO_PKG_VERSION"), "element-picker starting");

    match cli.command {
        Commands::Inspect { page, id, at } => {
            inspect_commands::inspect(&config, &page, id.as_deref(), at)
        },
        Commands::Session { page, tab, clicks } => {
            session_commands::run_session(&config, &page, tab, &clicks).await
        },
        Commands::Config { action } => {
            config_commands::handle_config(action, cli.config.as_deref(), &config)
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn points_parse_with_spaces() {
        assert_eq!(parse_point("15,25").unwrap(), (15.0, 25.0));
        assert_eq!(parse_point(" 1.5 , -2 ").unwrap(), (1.5, -2.0));
        assert!(parse_point("15").is_err());
        assert!(parse_point("a,2").is_err());
    }

    #[test]
    fn inspect_needs_a_target() {
        assert!(Cli::try_parse_from(["element-picker", "inspect", "--page", "p.json"]).is_err());
        assert!(
            Cli::try_parse_from([
                "element-picker",
                "inspect",
                "--page",
                "p.json",
                "--id",
                "go",
                "--at",
                "1,2"
            ])
            .is_err()
        );
        let cli =
            Cli::try_parse_from(["element-picker", "inspect", "--page", "p.json", "--at", "1,2"])
                .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Inspect { at: Some((x, y)), .. } if x == 1.0 && y == 2.0
        ));
    }

    #[test]
    fn session_collects_clicks() {
        let cli = Cli::try_parse_from([
            "element-picker",
            "session",
            "--page",
            "p.json",
            "--tab",
            "7",
            "--click",
            "15,25",
            "--click",
            "0,0",
        ])
        .unwrap();
        match cli.command {
            Commands::Session { tab, clicks, .. } => {
                assert_eq!(tab, 7);
                assert_eq!(clicks, vec![(15.0, 25.0), (0.0, 0.0)]);
            },
            _ => panic!("expected session"),
        }
    }
}
