use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

use ckan_essdive::app::{MigrateOptions, MigrateUseCase};
use ckan_essdive::constants::{DEFAULT_PACKAGE_LIMIT, DEFAULT_TAPIS_BASE_URL, ENV_CKAN_URL, ENV_ESSDIVE_URL};
use ckan_essdive::gateway::SubmissionOutcome;
use ckan_essdive::infra::http_client::HttpClient;
use ckan_essdive::infra::tapis;
use ckan_essdive::observability::init_logging;
use ckan_essdive::MigrationConfig;

#[derive(Parser)]
#[command(name = "ckan-essdive")]
#[command(about = "Move CKAN datasets into ESS-DIVE")]
#[command(version)]
struct Cli {
    /// TOML config file; environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for rotated JSON logs
    #[arg(long, global = true, default_value = "logs")]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List CKAN packages
    List {
        /// Free-text search
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = DEFAULT_PACKAGE_LIMIT)]
        limit: u32,
    },
    /// Show the mapped ESS-DIVE payload for a package
    Show {
        name_or_id: String,
        /// Print the full payload as JSON instead of the summary
        #[arg(long)]
        json: bool,
    },
    /// List required ESS-DIVE fields the package is missing
    Check { name_or_id: String },
    /// Download a package's resources into the staging directory
    Stage { name_or_id: String },
    /// Fetch, map, optionally stage, and submit a package
    Migrate {
        name_or_id: String,
        /// Stage resources before submitting
        #[arg(long)]
        stage: bool,
        /// Actually submit (dry run otherwise)
        #[arg(long)]
        live: bool,
        /// Do not submit while required fields are missing
        #[arg(long)]
        require_complete: bool,
    },
    /// Exchange Tapis credentials for a token usable as the CKAN API key
    Token {
        #[arg(long)]
        username: String,
        #[arg(long, env = "TAPIS_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value = DEFAULT_TAPIS_BASE_URL)]
        base_url: String,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<MigrationConfig> {
    let base = match path {
        Some(path) => MigrationConfig::from_file(path)?,
        None => MigrationConfig::new(
            &std::env::var(ENV_CKAN_URL).unwrap_or_default(),
            &std::env::var(ENV_ESSDIVE_URL).unwrap_or_default(),
        ),
    };
    Ok(base.apply_env(|key| std::env::var(key).ok()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = init_logging(&cli.log_dir);

    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Token {
            username,
            password,
            base_url,
        } => {
            let http = HttpClient::new()?;
            let token = tapis::fetch_token(&http, &base_url, &username, &password, config.timeouts.bridge)
                .await
                .context("Tapis token exchange failed")?;
            info!("Fetched Tapis token for {}", username);
            println!("{}", token);
        }
        Commands::List { search, limit } => {
            let use_case = MigrateUseCase::from_config(&config)?;
            let packages = use_case.list_packages(search.as_deref(), limit).await?;
            if packages.is_empty() {
                println!("No packages found");
            }
            for package in packages {
                println!(
                    "{}\t{}",
                    package.name.as_deref().unwrap_or("-"),
                    package.title.as_deref().unwrap_or("")
                );
            }
        }
        Commands::Show { name_or_id, json } => {
            let use_case = MigrateUseCase::from_config(&config)?;
            let inspection = use_case.inspect(&name_or_id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&inspection.payload)?);
            } else {
                println!("{}", inspection.summary);
            }
        }
        Commands::Check { name_or_id } => {
            let use_case = MigrateUseCase::from_config(&config)?;
            let inspection = use_case.inspect(&name_or_id).await?;
            if inspection.missing.is_empty() {
                println!("✅ {} has every required ESS-DIVE field", name_or_id);
            } else {
                println!("⚠️  {} is missing:", name_or_id);
                for field in &inspection.missing {
                    println!("   - {}", field);
                }
            }
        }
        Commands::Stage { name_or_id } => {
            let use_case = MigrateUseCase::from_config(&config)?;
            let staged = use_case.stage(&name_or_id).await?;
            println!(
                "📥 Staged {} file(s) into {}",
                staged.len(),
                use_case.stager().stage_dir().display()
            );
            for file in &staged {
                match &file.remote_path {
                    Some(remote) => println!("   {} -> {}", file.path.display(), remote),
                    None => println!("   {}", file.path.display()),
                }
            }
        }
        Commands::Migrate {
            name_or_id,
            stage,
            live,
            require_complete,
        } => {
            if live {
                config.dry_run = false;
            }
            let use_case = MigrateUseCase::from_config(&config)?;
            let options = MigrateOptions {
                stage_files: stage,
                require_complete,
            };
            match use_case.migrate(&name_or_id, options).await {
                Ok(report) => {
                    match &report.submission {
                        Some(SubmissionOutcome::Submitted { .. }) => {
                            println!("✅ Submitted {} to ESS-DIVE", report.source)
                        }
                        Some(SubmissionOutcome::Skipped { reason }) => {
                            println!("⏭️  Submission of {} skipped ({})", report.source, reason)
                        }
                        None => println!("⛔ {} withheld: required metadata missing", report.source),
                    }
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                Err(e) => {
                    error!("Migration of {} failed: {}", name_or_id, e);
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}
