use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use digest_core::config::{expand_path, AppConfig, Config};
use digest_embed::get_default_embedder;
use digest_pdf::LopdfLoader;
use digest_pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "persona-digest")]
#[command(about = "Rank PDF sections against a persona and a job to be done")]
#[command(version)]
struct Cli {
    /// Directory scanned (non-recursively) for *.pdf files
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory the report is written to
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long)]
    persona: Option<String>,

    /// Job to be done, e.g. "Plan a trip of 4 days"
    #[arg(long = "job")]
    job_to_be_done: Option<String>,

    /// Extra TOML file merged over config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn apply(self, mut app: AppConfig) -> Result<AppConfig> {
        if let Some(dir) = self.input { app.input_dir = expand_path(dir.to_string_lossy()); }
        if let Some(dir) = self.output { app.output_dir = expand_path(dir.to_string_lossy()); }
        if let Some(persona) = self.persona { app.persona = persona; }
        if let Some(job) = self.job_to_be_done { app.job_to_be_done = job; }
        app.validate()?;
        Ok(app)
    }
}

fn run(cli: Cli) -> Result<PathBuf> {
    let config = Config::load_with(cli.config.as_deref())?;
    let app = cli.apply(config.app()?)?;
    info!(persona = %app.persona, job = %app.job_to_be_done, "Starting persona digest");

    let embedder = get_default_embedder(&app.embedding)?;
    let digest = Pipeline::new(&app, &LopdfLoader, embedder.as_ref()).run_and_write();
    digest
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(path) => info!("Done: {}", path.display()),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("persona-digest").chain(args.iter().copied())).expect("parse")
    }

    #[test]
    fn flags_override_config_values() {
        let cli = parse(&["--input", "pdfs", "-o", "out", "--persona", "Chef", "--job", "Plan a menu"]);
        let app = cli.apply(AppConfig::default()).expect("apply");
        assert_eq!(app.input_dir, PathBuf::from("pdfs"));
        assert_eq!(app.output_dir, PathBuf::from("out"));
        assert_eq!(app.persona, "Chef");
        assert_eq!(app.job_to_be_done, "Plan a menu");
    }

    #[test]
    fn directory_flags_expand_tilde() {
        let cli = parse(&["--input", "~/pdfs", "--output", "~/out"]);
        let app = cli.apply(AppConfig::default()).expect("apply");
        assert_eq!(app.input_dir, expand_path("~/pdfs"));
        assert_eq!(app.output_dir, expand_path("~/out"));
        if std::env::var_os("HOME").is_some() {
            assert!(!app.input_dir.starts_with("~"), "{}", app.input_dir.display());
        }
    }

    #[test]
    fn missing_flags_keep_config_values() {
        let app = parse(&[]).apply(AppConfig::default()).expect("apply");
        assert_eq!(app, AppConfig::default());
    }
}
