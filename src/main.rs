use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;

use campus_e2e::driver::{PlaywrightFactory, SessionConfig};
use campus_e2e::load::{self, LoadProfile};
use campus_e2e::report;
use campus_e2e::runner;
use campus_e2e::suites::SuiteKind;
use campus_e2e::utils::config::{Credential, Credentials, HarnessConfig};

#[derive(Parser)]
#[command(name = "campus-e2e")]
#[command(version = "0.1.0")]
#[command(about = "Browser-driven end-to-end tests for the campus events app", long_about = None)]
struct Cli {
    #[command(flatten)]
    options: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalOptions {
    /// Base URL of the app under test
    #[arg(long, global = true, env = "APP_BASE_URL", default_value = "http://localhost:5173")]
    base_url: String,

    /// Run the browser without a window
    #[arg(long, global = true, env = "HEADLESS", default_value_t = true, action = ArgAction::Set,
        num_args = 0..=1, default_missing_value = "true", value_parser = BoolishValueParser::new())]
    headless: bool,

    /// Only warnings and verdicts on the console; silences browser logging
    #[arg(long, global = true, env = "QUIET", default_value_t = true, action = ArgAction::Set,
        num_args = 0..=1, default_missing_value = "true", value_parser = BoolishValueParser::new())]
    quiet: bool,

    /// Also run happy-path scenarios that create real accounts and events
    #[arg(long, global = true, env = "RUN_SUCCESS", default_value_t = false, action = ArgAction::Set,
        num_args = 0..=1, default_missing_value = "true", value_parser = BoolishValueParser::new())]
    run_success: bool,

    /// Treat ambiguous success signals as failures
    #[arg(long, global = true, env = "STRICT", default_value_t = false, action = ArgAction::Set,
        num_args = 0..=1, default_missing_value = "true", value_parser = BoolishValueParser::new())]
    strict: bool,

    #[arg(long, global = true, env = "ADMIN_EMAIL", default_value = "admin")]
    admin_email: String,

    #[arg(long, global = true, env = "ADMIN_PASSWORD", default_value = "admin1", hide_env_values = true)]
    admin_password: String,

    #[arg(long, global = true, env = "COMPANY_EMAIL", default_value = "testingsprint3@gmail.com")]
    company_email: String,

    #[arg(long, global = true, env = "COMPANY_PASSWORD", default_value = "testingsprint3", hide_env_values = true)]
    company_password: String,

    #[arg(long, global = true, env = "STUDENT_EMAIL", default_value = "student@gmail.com")]
    student_email: String,

    #[arg(long, global = true, env = "STUDENT_PASSWORD", default_value = "student1", hide_env_values = true)]
    student_password: String,

    /// Minutes ahead of now for generated event dates
    #[arg(long, global = true, env = "EVENT_MINUTES_AHEAD", default_value_t = 180)]
    event_minutes_ahead: i64,

    /// Directory for results.json and junit.xml per suite
    #[arg(short, long, global = true, env = "E2E_OUTPUT")]
    output: Option<PathBuf>,

    /// Chromium executable (discovered automatically when unset)
    #[arg(long, global = true, env = "PLAYWRIGHT_CHROMIUM_EXECUTABLE_PATH")]
    browser_path: Option<PathBuf>,
}

impl GlobalOptions {
    fn to_config(&self) -> HarnessConfig {
        let defaults = HarnessConfig::default();
        HarnessConfig {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            session: SessionConfig {
                headless: self.headless,
                suppress_logs: self.quiet,
                executable: self.browser_path.clone(),
                ..SessionConfig::default()
            },
            credentials: Credentials {
                admin: Credential::new(&self.admin_email, &self.admin_password),
                company: Credential::new(&self.company_email, &self.company_password),
                student: Credential::new(&self.student_email, &self.student_password),
            },
            run_success: self.run_success,
            strict: self.strict,
            event_minutes_ahead: self.event_minutes_ahead,
            output_dir: self.output.clone(),
            ..defaults
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run one suite in a single browser session
    Run {
        /// Suite name (see `suites`)
        suite: SuiteKind,
    },

    /// Run every suite in its own process, in order
    All,

    /// List available suites
    Suites,

    /// Generate HTTP load against the public routes
    Load {
        /// Concurrent virtual users
        #[arg(short, long, default_value_t = 10)]
        users: usize,

        /// Run time in seconds
        #[arg(short, long, default_value_t = 60)]
        duration: u64,
    },

    /// Re-render a saved results.json
    Report {
        /// Path to results.json
        results: PathBuf,

        /// Output format (junit, json)
        #[arg(short, long, default_value = "junit")]
        format: String,

        /// Output file path (stdout when omitted)
        #[arg(long)]
        to: Option<PathBuf>,
    },
}

fn init_logging(quiet: bool) {
    let level = if quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.options.quiet);
    let config = cli.options.to_config();

    let code = match cli.command {
        Commands::Run { suite } => run_suite(&config, suite).await?,

        Commands::All => {
            let names: Vec<&str> = SuiteKind::ALL.iter().map(|k| k.name()).collect();
            runner::run_all_suites(&config, &names).await?
        }

        Commands::Suites => {
            for kind in SuiteKind::ALL {
                println!("  {:<24} {}", kind.name().cyan(), kind.description());
            }
            0
        }

        Commands::Load { users, duration } => {
            let profile = LoadProfile::new(&config.base_url, users, Duration::from_secs(duration));
            load::run_load(&profile).await?;
            0
        }

        Commands::Report {
            results,
            format,
            to,
        } => {
            println!(
                "{} Generating {} report from: {}",
                "📊".to_string().blue(),
                format.cyan(),
                results.display()
            );
            report::generate_report(&results, &format, to.as_deref()).await?;
            0
        }
    };

    std::process::exit(code);
}

async fn run_suite(config: &HarnessConfig, suite: SuiteKind) -> anyhow::Result<i32> {
    log::info!("Base URL: {}", config.base_url);
    let scenarios = suite.scenarios(config);

    let outcome = match runner::run_suite(&PlaywrightFactory, config, suite.name(), &scenarios).await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            return Ok(1);
        }
    };

    let code = outcome.summary.exit_code();
    if let Some(ref dir) = config.output_dir {
        let written = report::write_reports(&outcome.into_report(), dir)?;
        log::info!("Reports written to {}", written.display());
    }
    Ok(code)
}
