use anyhow::{bail, Context, Result};
use booker::{
    injection::LoadProfile, preflight, runner::LoadRunner, scenario::Scenario,
    suite::FunctionalSuite, BookerConfiguration, DEFAULT_BASE_URL,
};
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Load and functional checks against the restful-booker API.
#[derive(Parser, Debug)]
#[command(name = "restful-booker-load", version)]
struct Cli {
    /// Base URL of the booking API
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL, env = "BOOKER_BASE_URL")]
    base_url: String,

    /// Per-request timeout in seconds; unset uses the HTTP client default
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay the authenticate/create/read/update/delete chain for ramped virtual users
    Load {
        /// Number of virtual users
        #[arg(long, default_value_t = 1, env = "USERS")]
        users: u32,

        /// Seconds over which users are started
        #[arg(long, default_value_t = 10, env = "RAMP_DURATION")]
        ramp_duration: u64,

        /// Seconds before the first user starts
        #[arg(long, default_value_t = 5)]
        initial_delay: u64,

        /// Seconds between consecutive steps of a chain
        #[arg(long, default_value_t = 1)]
        pause: u64,

        /// Also assert status 200 on the authenticate and create steps
        #[arg(long, default_value_t = false)]
        strict_setup: bool,
    },
    /// Run the functional assertions once
    Suite,
    /// Check that the API answers
    Ping,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = BookerConfiguration::new(cli.base_url.as_str());
    config.set_request_timeout(cli.timeout.map(Duration::from_secs));
    config.validate().context("invalid configuration")?;
    info!("Target: {}", config.base_url());

    match cli.command {
        Command::Load {
            users,
            ramp_duration,
            initial_delay,
            pause,
            strict_setup,
        } => {
            config.set_load_profile(LoadProfile::new(
                users,
                Duration::from_secs(ramp_duration),
                Duration::from_secs(initial_delay),
            ));
            config.set_step_pause(Duration::from_secs(pause));
            config.set_strict_setup_steps(strict_setup);
            info!(
                "Load: {} users over {}s after {}s, {}s between steps",
                users, ramp_duration, initial_delay, pause
            );

            let scenario = Scenario::restful_booker(&config);
            let report = LoadRunner::new(config)
                .run(scenario)
                .await
                .context("load run failed to start")?;
            report.log_summary();

            if !report.is_ok() {
                bail!("{} requests failed", report.ko_count());
            }
        }
        Command::Suite => {
            info!("Running the functional suite");
            let suite = FunctionalSuite::restful_booker(&config)?;
            let report = suite.run(&config).await?;
            report.log_summary();

            if !report.is_ok() {
                bail!("{} cases failed", report.failed().count());
            }
        }
        Command::Ping => {
            preflight::ping(&config)
                .await
                .with_context(|| format!("{} is not answering", config.base_url()))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn load_arguments(cli: Cli) -> (u32, u64, u64, u64, bool) {
        match cli.command {
            Command::Load {
                users,
                ramp_duration,
                initial_delay,
                pause,
                strict_setup,
            } => (users, ramp_duration, initial_delay, pause, strict_setup),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    // the only test that touches USERS, RAMP_DURATION and BOOKER_BASE_URL
    #[test]
    fn load_defaults_and_environment_overrides() {
        env::remove_var("USERS");
        env::remove_var("RAMP_DURATION");
        env::remove_var("BOOKER_BASE_URL");

        let cli = Cli::try_parse_from(["restful-booker-load", "load"]).unwrap();
        assert_eq!(cli.base_url, DEFAULT_BASE_URL);
        assert_eq!(cli.timeout, None);
        assert_eq!(load_arguments(cli), (1, 10, 5, 1, false));

        env::set_var("USERS", "25");
        env::set_var("RAMP_DURATION", "60");
        env::set_var("BOOKER_BASE_URL", "http://localhost:3001");

        let cli = Cli::try_parse_from(["restful-booker-load", "load"]).unwrap();
        assert_eq!(cli.base_url, "http://localhost:3001");
        assert_eq!(load_arguments(cli), (25, 60, 5, 1, false));

        let cli = Cli::try_parse_from([
            "restful-booker-load",
            "load",
            "--users",
            "3",
            "--initial-delay",
            "0",
            "--strict-setup",
        ])
        .unwrap();
        assert_eq!(load_arguments(cli), (3, 60, 0, 1, true));

        env::remove_var("USERS");
        env::remove_var("RAMP_DURATION");
        env::remove_var("BOOKER_BASE_URL");
    }

    #[test]
    fn global_options_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "restful-booker-load",
            "suite",
            "--base-url",
            "http://127.0.0.1:8080",
            "--timeout",
            "30",
        ])
        .unwrap();

        assert_eq!(cli.base_url, "http://127.0.0.1:8080");
        assert_eq!(cli.timeout, Some(30));
        assert!(matches!(cli.command, Command::Suite));
    }

    #[test]
    fn non_numeric_users_are_rejected() {
        assert!(Cli::try_parse_from(["restful-booker-load", "load", "--users", "many"]).is_err());
    }
}
