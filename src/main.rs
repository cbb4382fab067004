use clap::Parser;
use tracing_subscriber::EnvFilter;

use job_shell::app::cli;
use job_shell::config::ShellConfig;
use job_shell::manager::job_manager::JobManager;

#[derive(Parser, Debug)]
#[command(name = "job-shell")]
#[command(version)]
#[command(about = "Interactive job-control shell with static-priority admission")]
struct Args {
    /// Number of job table slots (never reclaimed)
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
    max_jobs: u32,

    /// Maximum number of jobs running at once
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    max_running: u32,

    /// Prompt shown before each command
    #[arg(long)]
    prompt: Option<String>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = ShellConfig::new(args.max_jobs as usize, args.max_running as usize);
    if let Some(prompt) = args.prompt {
        config = config.with_prompt(prompt);
    }

    let mut manager = JobManager::with_os_processes(&config);
    cli::run_cli(&mut manager, &config);
}
