use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::commands::{AssumeCommand, CompletionsCommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "rolecache", version, about = "Assume AWS IAM roles and reuse their sessions", long_about = None, arg_required_else_help = false)]
pub struct Cli {
    #[arg(
        short = 'p',
        long,
        global = true,
        default_value = "default",
        help = "AWS profile name"
    )]
    pub profile: String,

    #[arg(
        short = 'r',
        long,
        global = true,
        help = "AWS region for STS and the issued credentials"
    )]
    pub region: Option<String>,

    #[arg(short = 'v', long, global = true, action = ArgAction::Count, help = "Increase verbosity (-v info, -vv debug, -vvv trace)")]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    #[command(about = "Assume one or more IAM roles and print their credentials")]
    Assume(AssumeCommand),
    #[command(about = "Generate shell completion scripts for rolecache")]
    Completions(CompletionsCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let command = self
            .command
            .unwrap_or_else(|| Commands::Assume(AssumeCommand::default()));

        match command {
            Commands::Assume(cmd) => cmd.execute(&self.profile, self.region.as_deref()).await,
            Commands::Completions(cmd) => {
                cmd.execute();
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::OutputFormat;
    use clap::{CommandFactory, error::ErrorKind};

    #[test]
    fn test_no_command_defaults_to_assume() {
        let cli = Cli::try_parse_from(["rolecache"]).unwrap();
        assert!(cli.command.is_none());

        match cli
            .command
            .unwrap_or_else(|| Commands::Assume(AssumeCommand::default()))
        {
            Commands::Assume(cmd) => {
                assert!(cmd.role_arns.is_empty());
                assert_eq!(cmd.format, OutputFormat::Json);
            }
            _ => panic!("Expected Assume command as default"),
        }
    }

    #[test]
    fn test_assume_with_role_arns() {
        let cli = Cli::try_parse_from([
            "rolecache",
            "assume",
            "arn:aws:iam::123:role/Deployer",
            "arn:aws:iam::123:role/Reader",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Assume(cmd)) => {
                assert_eq!(
                    cmd.role_arns,
                    vec![
                        "arn:aws:iam::123:role/Deployer".to_string(),
                        "arn:aws:iam::123:role/Reader".to_string(),
                    ]
                );
            }
            _ => panic!("Expected Assume command"),
        }
    }

    #[test]
    fn test_assume_env_format() {
        let cli = Cli::try_parse_from(["rolecache", "assume", "--format", "env"]).unwrap();
        match cli.command {
            Some(Commands::Assume(cmd)) => assert_eq!(cmd.format, OutputFormat::Env),
            _ => panic!("Expected Assume command"),
        }
    }

    #[test]
    fn test_assume_invalid_format_fails() {
        let result = Cli::try_parse_from(["rolecache", "assume", "--format", "yaml"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_profile_default_value() {
        let cli = Cli::try_parse_from(["rolecache", "assume"]).unwrap();
        assert_eq!(cli.profile, "default");
    }

    #[test]
    fn test_profile_short_flag() {
        let cli = Cli::try_parse_from(["rolecache", "-p", "deploy", "assume"]).unwrap();
        assert_eq!(cli.profile, "deploy");
    }

    #[test]
    fn test_region_global_flag() {
        let cli = Cli::try_parse_from(["rolecache", "assume", "--region", "eu-west-1"]).unwrap();
        assert_eq!(cli.region.as_deref(), Some("eu-west-1"));

        let cli = Cli::try_parse_from(["rolecache", "-r", "ap-northeast-1"]).unwrap();
        assert_eq!(cli.region.as_deref(), Some("ap-northeast-1"));
    }

    #[test]
    fn test_region_default_none() {
        let cli = Cli::try_parse_from(["rolecache"]).unwrap();
        assert_eq!(cli.region, None);
    }

    #[test]
    fn test_completions_command_parsing() {
        let cli = Cli::try_parse_from(["rolecache", "completions", "zsh"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Completions(_))));
    }

    #[test]
    fn test_command_structure_validation() {
        let cmd = Cli::command();
        cmd.debug_assert();
    }

    #[test]
    fn test_invalid_command_fails() {
        let result = Cli::try_parse_from(["rolecache", "invalid"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_help_flag_works() {
        let result = Cli::try_parse_from(["rolecache", "--help"]);
        if let Err(e) = result {
            assert_eq!(e.kind(), ErrorKind::DisplayHelp);
        } else {
            panic!("Expected --help to short-circuit parsing");
        }
    }

    #[test]
    fn test_version_flag_works() {
        let result = Cli::try_parse_from(["rolecache", "--version"]);
        if let Err(e) = result {
            assert_eq!(e.kind(), ErrorKind::DisplayVersion);
        } else {
            panic!("Expected --version to short-circuit parsing");
        }
    }

    #[test]
    fn test_verbose_flag_multiple() {
        let cli = Cli::try_parse_from(["rolecache", "-vv", "assume"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_verbose_default_zero() {
        let cli = Cli::try_parse_from(["rolecache"]).unwrap();
        assert_eq!(cli.verbose, 0);
    }
}
