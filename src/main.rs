use clap::Parser;
use colored::Colorize;
use refresher::commands::refresh::{self, RefreshRequest};
use refresher::logging;
use refresher::validation::{clap_table_validator, clap_target_validator};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "impala-refresher")]
#[command(about = "Refresh Impala table metadata on every node of a cluster", long_about = None)]
#[command(version)]
#[command(after_help = "Example:\n  impala-refresher mytable node-01 node-02 node-03")]
struct Cli {
    /// Table to refresh (`table` or `database.table`)
    #[arg(value_parser = clap_table_validator)]
    table: Option<String>,

    /// Impala daemons to refresh (host or host:port)
    #[arg(value_parser = clap_target_validator)]
    nodes: Vec<String>,

    /// Seconds before a node's refresh is killed (default: 60)
    #[arg(short, long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Maximum number of nodes refreshed at once, 0 for all (default: 0)
    #[arg(short = 'p', long)]
    max_parallel: Option<usize>,

    /// TOML file with table, nodes and run settings
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// File listing nodes, one per line
    #[arg(short, long, value_name = "FILE")]
    nodes_file: Option<PathBuf>,

    /// Impala shell program to run (default: impala-shell)
    #[arg(long, value_name = "PATH")]
    impala_shell: Option<String>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

impl From<Cli> for RefreshRequest {
    fn from(cli: Cli) -> Self {
        Self {
            table: cli.table,
            nodes: cli.nodes,
            timeout_secs: cli.timeout,
            max_parallel: cli.max_parallel,
            config: cli.config,
            nodes_file: cli.nodes_file,
            impala_shell: cli.impala_shell,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match refresh::execute(cli.into()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {e:#}", "Error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
