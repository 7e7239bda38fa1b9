//! ECS Deployer - Entry Point
//!
//! Handles one pipeline job event read from a file or stdin.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use ecs_deployer::app::options::AppOptions;
use ecs_deployer::app::run::run;
use ecs_deployer::app::settings::Settings;
use ecs_deployer::app::state::AppState;
use ecs_deployer::errors::DeployError;
use ecs_deployer::filesys::file::File;
use ecs_deployer::logs::init_logging;
use ecs_deployer::utils::version_info;

use pipeline_api::JobEvent;
use tokio::io::AsyncReadExt;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    // Print version and exit
    let version = version_info();
    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to render version: {e}"),
        }
        return ExitCode::SUCCESS;
    }

    let options = AppOptions::default();
    let settings = match Settings::from_env(&options) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Invalid settings: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    if let Err(e) = init_logging(settings.log.clone()) {
        eprintln!("Failed to initialize logging: {e}");
    }
    info!("Running ECS deployer {}", version.version);

    let event = match read_event(cli_args.get("event").map(PathBuf::from)).await {
        Ok(event) => event,
        Err(e) => {
            error!(error.kind = e.kind(), "Unable to read job event: {e}");
            return ExitCode::FAILURE;
        }
    };

    let state = match AppState::from_settings(&settings, &options, cli_args.get("artifacts-dir").map(PathBuf::from)) {
        Ok(state) => state,
        Err(e) => {
            error!(error.kind = e.kind(), "Failed to initialize clients: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(event, &state, &settings, &options).await {
        Ok(report) => {
            info!(
                updated = report.updated.len(),
                skipped = report.skipped.len(),
                "Deployment succeeded"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error.kind = e.kind(), "Deployment failed: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Read the job event from `path`, or from stdin when no path is given
async fn read_event(path: Option<PathBuf>) -> Result<JobEvent, DeployError> {
    let data = match path {
        Some(path) => File::new(path).read_bytes().await?,
        None => {
            let mut data = Vec::new();
            tokio::io::stdin().read_to_end(&mut data).await?;
            data
        }
    };
    Ok(serde_json::from_slice(&data)?)
}
