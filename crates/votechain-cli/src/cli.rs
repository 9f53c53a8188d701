use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "votechain",
    about = "VoteChain: tamper-evident hash-chained vote ledger",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a short in-memory voting session
    Demo,
    /// Create a new archive holding only the genesis block
    Init(InitArgs),
    /// Cast one vote and save the extended chain
    Cast(CastArgs),
    /// Check every block's digest and link
    Verify(StoreArgs),
    /// Show vote counts per subject
    Tally(TallyArgs),
    /// Print blocks from the chain
    Show(ShowArgs),
}

/// Where the chain lives and which subjects are open.
#[derive(Args, Clone, Debug)]
pub struct StoreArgs {
    #[arg(long, default_value = "votechain.json")]
    pub archive: PathBuf,
    /// Host configuration (TOML). Defaults to the demo election.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct InitArgs {
    #[command(flatten)]
    pub store: StoreArgs,
    /// Replace an existing archive.
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct CastArgs {
    #[command(flatten)]
    pub store: StoreArgs,
    #[arg(long)]
    pub actor: String,
    #[arg(long)]
    pub subject: String,
    #[arg(long)]
    pub choice: String,
}

#[derive(Args)]
pub struct TallyArgs {
    #[command(flatten)]
    pub store: StoreArgs,
    /// Limit output to one subject.
    #[arg(long)]
    pub subject: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub store: StoreArgs,
    /// Print only the block at this sequence number.
    #[arg(long)]
    pub sequence: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_demo() {
        let cli = Cli::try_parse_from(["votechain", "demo"]).unwrap();
        assert!(matches!(cli.command, Command::Demo));
    }

    #[test]
    fn parse_cast() {
        let cli = Cli::try_parse_from([
            "votechain",
            "cast",
            "--archive",
            "/tmp/chain.json",
            "--actor",
            "u1",
            "--subject",
            "e1",
            "--choice",
            "c1",
        ])
        .unwrap();
        if let Command::Cast(args) = cli.command {
            assert_eq!(args.store.archive, PathBuf::from("/tmp/chain.json"));
            assert_eq!(args.actor, "u1");
            assert_eq!(args.subject, "e1");
            assert_eq!(args.choice, "c1");
            assert!(args.store.config.is_none());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn cast_requires_all_fields() {
        assert!(Cli::try_parse_from(["votechain", "cast", "--actor", "u1"]).is_err());
    }

    #[test]
    fn parse_verify_defaults_archive() {
        let cli = Cli::try_parse_from(["votechain", "verify"]).unwrap();
        if let Command::Verify(store) = cli.command {
            assert_eq!(store.archive, PathBuf::from("votechain.json"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_tally_subject() {
        let cli = Cli::try_parse_from([
            "votechain",
            "tally",
            "--subject",
            "e1",
            "--config",
            "host.toml",
        ])
        .unwrap();
        if let Command::Tally(args) = cli.command {
            assert_eq!(args.subject, Some("e1".into()));
            assert_eq!(args.store.config, Some(PathBuf::from("host.toml")));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_show_sequence() {
        let cli = Cli::try_parse_from(["votechain", "show", "--sequence", "2"]).unwrap();
        if let Command::Show(args) = cli.command {
            assert_eq!(args.sequence, Some(2));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_verbose_and_json() {
        let cli = Cli::try_parse_from(["votechain", "--verbose", "--format", "json", "demo"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.format, OutputFormat::Json));
    }
}
