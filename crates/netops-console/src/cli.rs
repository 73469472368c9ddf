use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "netops-console",
    version,
    about = "Terminal console for the network automation backend"
)]
pub(crate) struct Args {
    #[arg(long, default_value = "config/config.toml")]
    pub(crate) config: PathBuf,
    /// Overrides `backend_url` from the config file.
    #[arg(long)]
    pub(crate) backend_url: Option<String>,
    /// Overrides `job_id` from the config file.
    #[arg(long)]
    pub(crate) job: Option<i64>,
    #[arg(long, default_value = "logs")]
    pub(crate) log_dir: PathBuf,
    #[arg(long, default_value_t = false)]
    pub(crate) log_to_stderr: bool,
    /// Fetch the latest results once, print the timeline to stdout and exit.
    #[arg(long, default_value_t = false)]
    pub(crate) once: bool,
}
