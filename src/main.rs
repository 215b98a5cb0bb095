use std::io::{self, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    init_logging();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let status = recent_files::cli::run(std::env::args_os(), &mut out)?;
    out.flush()?;

    Ok(ExitCode::from(status))
}
