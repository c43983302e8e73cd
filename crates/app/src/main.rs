mod driver;
mod terminal;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use intake_core::model::QuestionBank;
use services::{AdequacyClassifier, AlwaysAdequate, ChatClient, Clock, LlmClassifier, QuestionnaireService};
use storage::repository::Storage;

use crate::driver::Driver;
use crate::terminal::TerminalUi;

#[derive(Debug, Parser)]
#[command(name = "intake", version, about = "Business requirements questionnaire with answer review")]
struct Cli {
    /// Question bank JSON document.
    #[arg(long, env = "INTAKE_BANK", default_value = "bpr.json")]
    bank: PathBuf,

    /// SQLite database used to keep answers between runs.
    #[arg(long, env = "INTAKE_DB_URL")]
    db: Option<String>,

    /// Directory for exported reports.
    #[arg(long, env = "INTAKE_REPORT_DIR", default_value = ".")]
    report_dir: PathBuf,

    /// Accept every answer without calling the review model.
    #[arg(long)]
    offline: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("INTAKE_LOG").unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn build_classifier(offline: bool) -> Result<Arc<dyn AdequacyClassifier>> {
    if offline {
        info!("offline mode, answers are not reviewed");
        return Ok(Arc::new(AlwaysAdequate));
    }
    let chat = ChatClient::from_env();
    if !chat.enabled() {
        bail!("INTAKE_AI_API_KEY is not set; export it or run with --offline");
    }
    Ok(Arc::new(LlmClassifier::new(chat)))
}

async fn open_storage(db: Option<&str>) -> Result<Storage> {
    let Some(raw) = db else {
        return Ok(Storage::in_memory());
    };
    if raw.trim().is_empty() {
        bail!("invalid --db value: {raw}");
    }
    let url = normalize_sqlite_url(raw);
    prepare_sqlite_file(&url)?;
    let storage = Storage::sqlite(&url)
        .await
        .with_context(|| format!("failed to open {url}"))?;
    info!(%url, "using sqlite storage");
    Ok(storage)
}

fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_owned();
    }

    let path = Path::new(trimmed.strip_prefix("sqlite:").unwrap_or(trimmed));
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<()> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let Some(path) = db_url.strip_prefix("sqlite://") else {
        bail!("invalid --db value: {db_url}");
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("invalid --db value: {db_url}");
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
    }

    Ok(())
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let bank = QuestionBank::load(&cli.bank)
        .with_context(|| format!("failed to load question bank {}", cli.bank.display()))?;
    info!(
        sections = bank.sections().len(),
        questions = bank.total_questions(),
        "question bank loaded"
    );

    let classifier = build_classifier(cli.offline)?;
    let storage = open_storage(cli.db.as_deref()).await?;

    let service = QuestionnaireService::new(Clock::system(), storage.responses, classifier);
    let mut session = service.resume(Arc::new(bank)).await?;

    let driver = Driver::new(service, cli.report_dir);
    driver.run(&mut TerminalUi::new(), &mut session).await
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{} {err:#}", console::style("error:").red().bold());
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_urls_are_made_absolute() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(normalize_sqlite_url("sqlite:///tmp/a.db"), "sqlite:///tmp/a.db");
        assert_eq!(normalize_sqlite_url("sqlite:/tmp/a.db"), "sqlite:///tmp/a.db");
        assert!(normalize_sqlite_url("answers.db").ends_with("/answers.db"));
    }

    #[test]
    fn prepare_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("answers.db");
        prepare_sqlite_file(&format!("sqlite://{}", path.display())).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["intake", "--offline"]);
        assert!(cli.offline);
        assert_eq!(cli.report_dir, PathBuf::from("."));
    }
}
