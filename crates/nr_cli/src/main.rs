use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};

mod config;
mod logging;
mod pipeline;
mod schedule;

use config::{AppConfig, Settings};
use logging::{init_logging, parse_level, Logger};
use schedule::{duration_until, Schedule};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                let unit = match c {
                    's' => 1,
                    'm' => 60,
                    'h' => 3600,
                    'd' => 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                };
                total_seconds = num
                    .checked_mul(unit)
                    .and_then(|seconds| total_seconds.checked_add(seconds))
                    .ok_or_else(|| "Duration is too large".to_string())?;
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // A trailing bare number counts as seconds
        if !current_number.is_empty() {
            match current_number.parse::<u64>() {
                Ok(num) => {
                    total_seconds = total_seconds
                        .checked_add(num)
                        .ok_or_else(|| "Duration is too large".to_string())?;
                    has_unit = true;
                }
                Err(_) => return Err("Invalid number in duration".to_string()),
            }
        }

        if !has_unit {
            return Err("Duration must include a number".to_string());
        }
        if total_seconds == 0 {
            return Err("Duration must be greater than zero".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser)]
#[command(name = "ai-news", author, version, about = "Collects AI news and delivers a summarized report")]
struct Cli {
    /// Log at debug level regardless of LOG_LEVEL
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate and deliver one report now
    Run {
        /// Path to the YAML configuration (defaults to CONFIG_PATH)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Keep running and generate reports on the configured schedule
    Schedule {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Run every interval (e.g. "6h", "1d") instead of the calendar schedule
        #[arg(short, long)]
        interval: Option<HumanDuration>,
    },
    /// Check configuration and credentials without running
    Validate {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn load_config(settings: &Settings, path: Option<PathBuf>) -> Result<AppConfig> {
    let path = path.unwrap_or_else(|| settings.config_path.clone());
    AppConfig::load(&path).with_context(|| format!("Failed to load configuration from {}", path.display()))
}

async fn run_once(settings: &Settings, config: &AppConfig, logger: &Logger) -> Result<()> {
    let report = pipeline::run_report(settings, config, logger)
        .await
        .context("Report generation failed")?;
    logger.info(&format!(
        "🎉 Report '{}' finished with {} articles",
        report.title,
        report.article_count()
    ));
    Ok(())
}

async fn run_schedule(
    settings: &Settings,
    config: &AppConfig,
    interval: Option<Duration>,
    logger: &Logger,
) -> Result<()> {
    let logger = logger.clone().with_new_prefixes("[schedule]");

    if let Some(interval) = interval {
        logger.info(&format!("⏰ Running every {:?}", interval));
        loop {
            if let Err(e) = run_once(settings, config, &logger).await {
                logger.error(&format!("{:#}", e));
            }
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = tokio::signal::ctrl_c() => {
                    logger.info("Scheduler stopped");
                    return Ok(());
                }
            }
        }
    }

    if !config.schedule.enabled {
        logger.info("Scheduling is disabled in the configuration");
        return Ok(());
    }

    let schedule = Schedule::from_config(&config.schedule).context("Invalid schedule")?;
    logger.info(&format!("⏰ Scheduled {}", schedule));

    loop {
        let now = Utc::now();
        let next = schedule.next_run_from(now);
        logger.info(&format!("Next report at {}", next.to_rfc3339()));

        tokio::select! {
            _ = tokio::time::sleep(duration_until(next, now)) => {}
            _ = tokio::signal::ctrl_c() => {
                logger.info("Scheduler stopped");
                return Ok(());
            }
        }

        if let Err(e) = run_once(settings, config, &logger).await {
            logger.error(&format!("{:#}", e));
        }
    }
}

fn configured(value: bool) -> &'static str {
    if value {
        "configured"
    } else {
        "missing"
    }
}

fn validate(settings: &Settings, path: &Path, config: &AppConfig) -> Result<()> {
    println!("Configuration: {}", path.display());
    println!("  ANTHROPIC_API_KEY: {}", configured(!settings.anthropic_api_key.is_empty()));
    println!("  OPENAI_API_KEY:    {}", configured(!settings.openai_api_key.is_empty()));
    println!("  TAVILY_API_KEY:    {}", configured(!settings.tavily_api_key.is_empty()));
    println!("  SMTP credentials:  {}", configured(!settings.smtp.user.is_empty() && !settings.smtp.password.is_empty()));
    println!("  SLACK_WEBHOOK_URL: {}", configured(!settings.slack_webhook_url.is_empty()));
    println!();
    println!("Keywords: {}", config.keywords.len());
    println!("Sites:    {} ({} enabled)", config.sites.len(), config.enabled_sites().len());
    println!("LLM:      {}", config.llm.provider);

    let schedule = Schedule::from_config(&config.schedule).context("Invalid schedule")?;
    if config.schedule.enabled {
        println!("Schedule: {}", schedule);
    } else {
        println!("Schedule: disabled");
    }

    let provider = config.llm.provider.to_lowercase();
    if provider != "dummy" && settings.api_key_for(&provider).is_none() {
        anyhow::bail!("No API key configured for LLM provider {:?}", config.llm.provider);
    }
    println!("\nConfiguration is valid");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_env().context("Failed to read settings from the environment")?;

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        parse_level(&settings.log_level)
    };
    let logger = init_logging(level);
    logger.debug(&format!("{:?}", settings));

    match cli.command {
        Commands::Run { config } => {
            let config = load_config(&settings, config)?;
            run_once(&settings, &config, &logger).await?;
        }
        Commands::Schedule { config, interval } => {
            let config = load_config(&settings, config)?;
            run_schedule(&settings, &config, interval.map(|d| d.0), &logger).await?;
        }
        Commands::Validate { config } => {
            let path = config.unwrap_or_else(|| settings.config_path.clone());
            let app_config = load_config(&settings, Some(path.clone()))?;
            validate(&settings, &path, &app_config)?;
        }
    }

    Ok(())
}
