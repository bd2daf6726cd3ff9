use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::commands::Target;

#[derive(Parser)]
#[command(name = "brocade")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(
    about = "Declarative reconciler for Brocade vTM pools and traffic IP groups",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Connection settings file [default: ~/.config/brocade/config.toml]
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// State file [default: ~/.local/state/brocade/state.toml]
    #[arg(long, global = true, value_name = "PATH")]
    pub state: Option<PathBuf>,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Connection overrides; each beats the settings file.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Traffic manager REST endpoint, e.g. https://vtm:9070
    #[arg(long, global = true, env = "BROCADE_SERVER_URL")]
    pub server_url: Option<String>,

    /// REST API user
    #[arg(long, global = true, env = "BROCADE_USERNAME")]
    pub username: Option<String>,

    /// REST API password
    #[arg(long, global = true, env = "BROCADE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Verify the server certificate
    #[arg(
        long,
        global = true,
        env = "BROCADE_VERIFY_SSL",
        value_name = "BOOL",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub verify_ssl: Option<bool>,

    /// Skip certificate verification; wins over --verify-ssl and its env var
    #[arg(long, global = true)]
    pub insecure: bool,
}

impl ConnectionArgs {
    /// Effective certificate check override, if any.
    pub fn verify_ssl(&self) -> Option<bool> {
        if self.insecure {
            Some(false)
        } else {
            self.verify_ssl
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Make the traffic manager match the manifest
    Apply(ApplyArgs),

    /// Re-read tracked objects and update the state file
    Refresh(RefreshArgs),

    /// Show what apply would change
    Diff(DiffArgs),

    /// Delete one object and forget it
    Destroy(DestroyArgs),

    /// Show tracked objects and their last observed values
    Show(ShowArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Command Arguments
// ============================================================================

#[derive(Parser)]
pub struct ApplyArgs {
    /// Manifest file
    #[arg(short = 'f', long = "file", default_value = "brocade.toml")]
    pub manifest: PathBuf,

    /// Only apply matching objects: <kind> or <kind>.<name>
    pub target: Option<Target>,

    /// Show what would change without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Number of objects reconciled in parallel
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,

    /// Delete tracked objects that are no longer in the manifest
    #[arg(long)]
    pub prune: bool,

    /// Skip confirmation prompts
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Parser)]
pub struct RefreshArgs {
    /// Only refresh matching objects: <kind> or <kind>.<name>
    pub target: Option<Target>,

    /// Number of objects read in parallel
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,
}

#[derive(Parser)]
pub struct DiffArgs {
    /// Manifest file
    #[arg(short = 'f', long = "file", default_value = "brocade.toml")]
    pub manifest: PathBuf,

    /// Only diff matching objects: <kind> or <kind>.<name>
    pub target: Option<Target>,

    /// Number of objects read in parallel
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,
}

#[derive(Parser)]
pub struct DestroyArgs {
    /// Object to delete: <kind>.<name>
    pub target: reconcile::ResourceId,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Parser)]
pub struct ShowArgs {
    /// Only show matching objects: <kind> or <kind>.<name>
    pub target: Option<Target>,

    /// Also list fields that hold their default value
    #[arg(short, long)]
    pub all: bool,

    /// Print the state as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_apply() {
        let cli = Cli::try_parse_from([
            "brocade", "apply", "-f", "lb.toml", "pool.web", "--dry-run", "-j", "8",
        ])
        .unwrap();
        let Command::Apply(args) = cli.command else {
            panic!("expected apply");
        };
        assert_eq!(args.manifest, PathBuf::from("lb.toml"));
        assert!(args.dry_run);
        assert_eq!(args.jobs, 8);
        assert!(args.target.is_some());
    }

    #[test]
    fn test_insecure_overrides_verify() {
        let cli = Cli::try_parse_from(["brocade", "--insecure", "show"]).unwrap();
        assert_eq!(cli.connection.verify_ssl(), Some(false));

        let cli = Cli::try_parse_from(["brocade", "--verify-ssl", "yes", "show"]).unwrap();
        assert_eq!(cli.connection.verify_ssl(), Some(true));
    }

    #[test]
    fn test_insecure_wins_over_verify_ssl() {
        // BROCADE_VERIFY_SSL reaches clap the same way as the flag
        let cli = Cli::try_parse_from(["brocade", "--verify-ssl", "true", "--insecure", "show"])
            .unwrap();
        assert_eq!(cli.connection.verify_ssl, Some(true));
        assert_eq!(cli.connection.verify_ssl(), Some(false));
    }

    #[test]
    fn test_destroy_requires_name() {
        assert!(Cli::try_parse_from(["brocade", "destroy", "pool"]).is_err());
        assert!(Cli::try_parse_from(["brocade", "destroy", "pool.web"]).is_ok());
    }
}
