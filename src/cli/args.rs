//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::domain::AliasState;

/// Manage email aliases and mail items of a hosted mail service
#[derive(Parser, Debug)]
#[command(name = "mailroom")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output: -d info, -dd debug, -ddd trace
    #[arg(short = 'd', long = "debug", action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Print structured JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Show what would change without changing anything
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    /// Additional config file (layered over the global one)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage aliases
    Alias {
        #[command(subcommand)]
        command: AliasCommands,
    },

    /// Bulk operations on mail items
    Mail {
        #[command(subcommand)]
        command: MailCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Addresses one alias by id, or every alias of a domain.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Alias id
    pub id: Option<String>,

    /// Apply to all aliases of this domain
    #[arg(long, conflicts_with = "id")]
    pub domain: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum AliasCommands {
    /// List aliases
    List {
        /// Only aliases of this domain
        #[arg(long)]
        domain: Option<String>,
        /// Only aliases in this state
        #[arg(long, value_enum)]
        state: Option<StateArg>,
    },

    /// Show the authoritative alias of a domain
    Show {
        /// Domain (site) the alias belongs to
        #[arg(long)]
        domain: String,
    },

    /// Return the domain's alias, creating one when none is usable
    GetOrCreate {
        /// Domain (site) the alias is for
        #[arg(long)]
        domain: String,
        /// Description for a newly created alias
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Enable an alias or all aliases of a domain
    Enable(TargetArgs),

    /// Disable an alias or all aliases of a domain
    Disable(TargetArgs),

    /// Delete an alias or all aliases of a domain (cannot be undone)
    Delete(TargetArgs),

    /// Set an alias's description
    Describe {
        /// Alias id
        id: String,
        /// New description
        description: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum MailCommands {
    /// Delete mail items
    Delete {
        /// Item ids
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Move mail items to a mailbox
    Move {
        /// Destination mailbox
        #[arg(long, short = 't')]
        to: String,
        /// Item ids
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Mark mail items as read
    MarkRead {
        /// Item ids
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Mark mail items as unread
    MarkUnread {
        /// Item ids
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Show config file locations
    Path,
    /// Create the global config file from a template
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Alias states accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateArg {
    Pending,
    Enabled,
    Disabled,
    Deleted,
}

impl From<StateArg> for AliasState {
    fn from(arg: StateArg) -> Self {
        match arg {
            StateArg::Pending => AliasState::Pending,
            StateArg::Enabled => AliasState::Enabled,
            StateArg::Disabled => AliasState::Disabled,
            StateArg::Deleted => AliasState::Deleted,
        }
    }
}
