use env_logger::Env;
use kampusd::config::ImportConfig;
use kampusd::importer;
use log::{error, info};
use std::process::ExitCode;

fn run() -> anyhow::Result<()> {
    let cfg = ImportConfig::from_env()?;
    info!(
        "importing from {} into {}",
        cfg.root.to_string_lossy(),
        cfg.db_dir().to_string_lossy()
    );
    // Per-record failures are already logged and do not fail the run.
    importer::run_with_config(&cfg)?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("import aborted: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
