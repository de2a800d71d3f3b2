use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Detects a repository's web stack, generates container manifests and brings the stack up
#[derive(Parser, Debug)]
#[command(
    name = "autodeploy",
    about = "Detects a repository's web stack, generates container manifests and brings the stack up",
    version,
    author,
    long_about = "autodeploy clones a repository laid out as frontend/backend/database \
                  directories, detects the technology of each, writes Dockerfiles, a compose \
                  manifest and a reverse-proxy config into the tree, then builds and starts \
                  the stack and waits until it answers."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Clone, build and start a repository's stack",
        long_about = "Clones a public GitHub repository into the clone directory, detects its \
                      stack, generates the deployment artifacts, runs docker compose and polls \
                      the readiness URL.\n\n\
                      Examples:\n  \
                      autodeploy deploy https://github.com/acme/shop\n  \
                      autodeploy deploy https://github.com/acme/shop --format json"
    )]
    Deploy(DeployArgs),

    #[command(
        about = "Detect the stack of a local repository",
        long_about = "Validates the directory layout and reports the detected frontend, \
                      backend and database technologies with the evidence for each.\n\n\
                      Examples:\n  \
                      autodeploy detect\n  \
                      autodeploy detect /path/to/repo --format yaml"
    )]
    Detect(DetectArgs),

    #[command(
        about = "Generate deployment artifacts for a local repository",
        long_about = "Runs validation, detection and synthesis, then writes the Dockerfiles, \
                      docker-compose.yml, nginx.conf and .dockerignore into the repository. \
                      Nothing is built.\n\n\
                      Examples:\n  \
                      autodeploy generate /path/to/repo\n  \
                      autodeploy generate /path/to/repo --dry-run"
    )]
    Generate(GenerateArgs),

    #[command(about = "Check that git and the container runtime are reachable")]
    Health(HealthArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct DeployArgs {
    #[arg(value_name = "REPO_URL", help = "https://github.com/<owner>/<repo>")]
    pub repository: String,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(long, value_name = "DIR", help = "Override the clone directory")]
    pub clone_dir: Option<PathBuf>,

    #[arg(long, value_name = "URL", help = "Override the readiness URL")]
    pub readiness_url: Option<String>,

    #[arg(long, help = "Leave the stack running and the tree in place on readiness timeout")]
    pub keep_on_timeout: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DetectArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to repository (defaults to current directory)"
    )]
    pub repository_path: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to repository (defaults to current directory)"
    )]
    pub repository_path: Option<PathBuf>,

    #[arg(long, help = "Print the artifacts instead of writing them")]
    pub dry_run: bool,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct HealthArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_deploy_args() {
        let args = CliArgs::parse_from([
            "autodeploy",
            "deploy",
            "https://github.com/acme/shop",
            "--format",
            "json",
            "--keep-on-timeout",
        ]);
        match args.command {
            Commands::Deploy(deploy_args) => {
                assert_eq!(deploy_args.repository, "https://github.com/acme/shop");
                assert_eq!(deploy_args.format, OutputFormatArg::Json);
                assert!(deploy_args.keep_on_timeout);
                assert!(deploy_args.clone_dir.is_none());
            }
            _ => panic!("Expected Deploy command"),
        }
    }

    #[test]
    fn test_deploy_requires_repository() {
        assert!(CliArgs::try_parse_from(["autodeploy", "deploy"]).is_err());
    }

    #[test]
    fn test_default_detect_args() {
        let args = CliArgs::parse_from(["autodeploy", "detect"]);
        match args.command {
            Commands::Detect(detect_args) => {
                assert_eq!(detect_args.format, OutputFormatArg::Human);
                assert!(detect_args.repository_path.is_none());
            }
            _ => panic!("Expected Detect command"),
        }
    }

    #[test]
    fn test_generate_dry_run() {
        let args = CliArgs::parse_from(["autodeploy", "generate", "/tmp/repo", "--dry-run"]);
        match args.command {
            Commands::Generate(generate_args) => {
                assert!(generate_args.dry_run);
                assert_eq!(
                    generate_args.repository_path,
                    Some(PathBuf::from("/tmp/repo"))
                );
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from(["autodeploy", "-v", "--log-level", "trace", "health"]);
        assert!(args.verbose);
        assert!(!args.quiet);
        assert_eq!(args.log_level, Some("trace".to_string()));
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(CliArgs::try_parse_from(["autodeploy", "-q", "-v", "health"]).is_err());
    }
}
