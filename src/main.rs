use std::process::ExitCode;

use agent_sim::adapter::inbound::cli::command::Cli;
use agent_sim::adapter::inbound::cli::output::{self, OutputConfig};
use agent_sim::adapter::inbound::cli::run;
use agent_sim::infrastructure::config::load_env;
use clap::Parser;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    load_env();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    output::configure(OutputConfig::new(cli.json, cli.quiet));
    cli.logging().init();
    info!("agent-sim starting");

    match run::execute(&cli).await {
        Ok(()) => {
            info!("agent-sim stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Fatal error");
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
