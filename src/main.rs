use autodeploy::cli::commands::{
    CliArgs, Commands, DeployArgs, DetectArgs, GenerateArgs, HealthArgs,
};
use autodeploy::cli::output::{GenerateReport, HealthStatus, OutputFormatter};
use autodeploy::fs::RealFileSystem;
use autodeploy::runtime::docker::{is_docker_cli, ping_runtime};
use autodeploy::snapshot::RepositorySnapshot;
use autodeploy::synthesis::ArtifactWriter;
use autodeploy::util::logging::{parse_level, LoggingConfig};
use autodeploy::validation::StructureValidator;
use autodeploy::{DeployConfig, DeployError, DeploymentOrchestrator, StackDetector, VERSION};

use clap::Parser;
use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use tracing::{debug, error, info, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("autodeploy v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Deploy(deploy_args) => handle_deploy(deploy_args).await,
        Commands::Detect(detect_args) => handle_detect(detect_args),
        Commands::Generate(generate_args) => handle_generate(generate_args).await,
        Commands::Health(health_args) => handle_health(health_args).await,
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let level = if let Some(level_str) = &args.log_level {
        parse_level(level_str)
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        LoggingConfig::from_env().level
    };

    autodeploy::init_logging(LoggingConfig {
        level,
        ..LoggingConfig::from_env()
    });
}

fn print_output(rendered: anyhow::Result<String>) -> bool {
    match rendered {
        Ok(output) => {
            println!("{}", output);
            true
        }
        Err(e) => {
            error!("Failed to format output: {:#}", e);
            false
        }
    }
}

fn resolve_repository_path(path: Option<&PathBuf>) -> Result<PathBuf, i32> {
    let repo_path = match path {
        Some(path) => path.clone(),
        None => env::current_dir().map_err(|e| {
            error!("Failed to get current directory: {}", e);
            1
        })?,
    };
    debug!("Repository path: {}", repo_path.display());

    if !repo_path.is_dir() {
        error!(
            "Repository path does not exist or is not a directory: {}",
            repo_path.display()
        );
        return Err(1);
    }

    repo_path.canonicalize().map_err(|e| {
        error!("Failed to canonicalize repository path: {}", e);
        1
    })
}

async fn handle_deploy(args: &DeployArgs) -> i32 {
    let default_config = DeployConfig::default();
    let config = DeployConfig {
        clone_dir: args.clone_dir.clone().unwrap_or(default_config.clone_dir),
        readiness_url: args
            .readiness_url
            .clone()
            .unwrap_or(default_config.readiness_url),
        teardown_on_timeout: default_config.teardown_on_timeout && !args.keep_on_timeout,
        ..default_config
    };

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        eprintln!("\nPlease check your AUTODEPLOY_* environment variables and command-line arguments.");
        return 1;
    }
    debug!("Configuration:\n{}", config);

    let orchestrator = match DeploymentOrchestrator::from_config(config) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            error!("Failed to initialize deployment: {:#}", e);
            return 1;
        }
    };

    let result = orchestrator.run(&args.repository).await;

    let formatter = OutputFormatter::new(args.format.into());
    if !print_output(formatter.format_deployment(&result)) {
        return 1;
    }

    if result.is_ready() {
        0
    } else {
        1
    }
}

fn handle_detect(args: &DetectArgs) -> i32 {
    let repo_path = match resolve_repository_path(args.repository_path.as_ref()) {
        Ok(path) => path,
        Err(code) => return code,
    };

    let fs = RealFileSystem::new();
    let snapshot = RepositorySnapshot::capture(&fs, &repo_path);
    let validator = StructureValidator::new();
    if !validator.validate(&snapshot) {
        let err = DeployError::StructureInvalid {
            missing: validator.missing_roles(&snapshot),
        };
        eprintln!("{}", err.help_message());
        return 1;
    }

    let profile = StackDetector::new(&fs).detect(&snapshot);

    let formatter = OutputFormatter::new(args.format.into());
    if !print_output(formatter.format_profile(&profile)) {
        return 1;
    }

    match profile.first_unknown() {
        Some(axis) => {
            eprintln!("{}", DeployError::TechnologyUnknown { axis }.help_message());
            1
        }
        None => 0,
    }
}

async fn handle_generate(args: &GenerateArgs) -> i32 {
    let repo_path = match resolve_repository_path(args.repository_path.as_ref()) {
        Ok(path) => path,
        Err(code) => return code,
    };

    let orchestrator = match DeploymentOrchestrator::from_config(DeployConfig::default()) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            error!("Failed to initialize: {:#}", e);
            return 1;
        }
    };

    let context = match orchestrator.prepare(&repo_path).await {
        Ok(context) => context,
        Err(e) => {
            eprintln!("{}", e.help_message());
            return 1;
        }
    };

    let (Some(profile), Some(settings), Some(artifacts)) =
        (&context.profile, &context.settings, &context.artifacts)
    else {
        error!("Synthesis produced no artifacts");
        return 1;
    };

    let written = if args.dry_run {
        Vec::new()
    } else {
        match ArtifactWriter::new(&repo_path).write(artifacts) {
            Ok(written) => written,
            Err(e) => {
                error!("Failed to write artifacts: {:#}", e);
                return 1;
            }
        }
    };
    info!("Generated {} artifacts in {}", artifacts.len(), repo_path.display());

    let report = GenerateReport {
        profile,
        settings,
        artifacts,
        written,
        dry_run: args.dry_run,
    };
    let formatter = OutputFormatter::new(args.format.into());
    if print_output(formatter.format_generate(&report)) {
        0
    } else {
        1
    }
}

async fn handle_health(args: &HealthArgs) -> i32 {
    let config = DeployConfig::default();
    let mut results = BTreeMap::new();

    let git = match tokio::process::Command::new("git").arg("--version").output().await {
        Ok(output) if output.status.success() => {
            HealthStatus::available(String::from_utf8_lossy(&output.stdout).trim().to_string())
        }
        Ok(output) => {
            HealthStatus::unavailable(String::from_utf8_lossy(&output.stderr).trim().to_string())
        }
        Err(e) => HealthStatus::unavailable(format!("git: {}", e)),
    };
    results.insert("git".to_string(), git);

    let runtime = if !is_docker_cli(&config.docker_bin) {
        match tokio::process::Command::new(&config.docker_bin)
            .arg("--version")
            .output()
            .await
        {
            Ok(output) if output.status.success() => HealthStatus::available(
                String::from_utf8_lossy(&output.stdout).trim().to_string(),
            ),
            Ok(output) => HealthStatus::unavailable(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ),
            Err(e) => HealthStatus::unavailable(format!("{}: {}", config.docker_bin, e)),
        }
    } else {
        match ping_runtime().await {
            Ok(()) => HealthStatus::available("Docker daemon is reachable"),
            Err(message) => HealthStatus::unavailable(message),
        }
    };
    results.insert(config.docker_bin.clone(), runtime);

    let config_status = match config.validate() {
        Ok(()) => HealthStatus::available(format!("clone dir {}", config.clone_dir.display())),
        Err(e) => HealthStatus::unavailable(e.to_string()),
    };
    results.insert("config".to_string(), config_status);

    let all_available = results.values().all(|s| s.available);

    let formatter = OutputFormatter::new(args.format.into());
    if !print_output(formatter.format_health(&results)) {
        return 1;
    }

    if all_available {
        0
    } else {
        1
    }
}
