//! Clap derive structures for the `adminly` CLI.
//!
//! Defines the command tree, global flags, and shared argument groups.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use adminly_core::FilterPatch;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// adminly -- manage users, transactions and predictions from the shell
#[derive(Debug, Parser)]
#[command(
    name = "adminly",
    version,
    about = "Administer users, transactions and predictions from the command line",
    long_about = "A CLI for the admin dashboard API.\n\n\
        Lists, inspects, edits, deletes and exports users, transactions\n\
        and predictions through the same collection controllers the\n\
        dashboard uses.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "ADMINLY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Admin API root URL (overrides profile)
    #[arg(long, env = "ADMINLY_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Bearer token (overrides profile credentials)
    #[arg(long, env = "ADMINLY_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ADMINLY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "ADMINLY_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "ADMINLY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one id per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage user accounts
    #[command(alias = "u")]
    Users(CollectionArgs),

    /// Manage wallet transactions
    #[command(alias = "tx")]
    Transactions(CollectionArgs),

    /// Manage predictions
    #[command(alias = "pred")]
    Predictions(CollectionArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Collections ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CollectionArgs {
    #[command(subcommand)]
    pub command: CollectionCommand,
}

/// Operations shared by every collection.
#[derive(Debug, Subcommand)]
pub enum CollectionCommand {
    /// List one page of records
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one record
    Get {
        /// Record id
        id: String,
    },

    /// Create a record from a JSON draft
    Create {
        /// JSON file holding the draft
        #[arg(long, short = 'f')]
        from_file: PathBuf,
    },

    /// Update a record from a JSON draft
    Update {
        /// Record id
        id: String,
        /// JSON file holding the changed fields
        #[arg(long, short = 'f')]
        from_file: PathBuf,
    },

    /// Delete a record
    #[command(alias = "rm")]
    Delete {
        /// Record id
        id: String,
    },

    /// Delete several records
    BulkDelete {
        /// Record ids
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Apply one JSON draft to several records
    BulkUpdate {
        /// Record ids
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
        /// JSON file holding the changed fields
        #[arg(long, short = 'f')]
        from_file: PathBuf,
    },

    /// Export every record matching the filters as CSV
    Export {
        #[command(flatten)]
        filters: FilterArgs,

        /// Directory to write the CSV into
        #[arg(long, short = 'd', default_value = ".")]
        dir: PathBuf,
    },
}

/// Filter flags shared by `list` and `export`.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Free-text search
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Status filter
    #[arg(long)]
    pub status: Option<String>,

    /// Category filter (role, type or league depending on the collection)
    #[arg(long, short = 'c', visible_aliases = ["role", "type", "league"])]
    pub category: Option<String>,

    /// Earliest creation date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Latest creation date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Minimum amount
    #[arg(long)]
    pub min_amount: Option<f64>,

    /// Maximum amount
    #[arg(long)]
    pub max_amount: Option<f64>,
}

impl FilterArgs {
    /// Only the flags actually given become part of the patch.
    pub fn to_patch(&self) -> FilterPatch {
        let mut patch = FilterPatch::new();
        if let Some(ref search) = self.search {
            patch = patch.search(search.as_str());
        }
        if let Some(ref status) = self.status {
            patch = patch.status(status.as_str());
        }
        if let Some(ref category) = self.category {
            patch = patch.category(category.as_str());
        }
        if self.from.is_some() || self.to.is_some() {
            patch = patch.date_range(self.from, self.to);
        }
        if self.min_amount.is_some() || self.max_amount.is_some() {
            patch = patch.amount_range(self.min_amount, self.max_amount);
        }
        patch
    }
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Page number (1-based)
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Records per page (defaults to the profile's page size)
    #[arg(long, short = 'l')]
    pub limit: Option<u32>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive setup wizard
    Init,

    /// Show the effective configuration
    Show,

    /// Set a key on the active profile
    Set {
        /// Key (api_url, token_env, ca_cert, insecure, timeout, page_size)
        key: String,
        /// Value
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Store a bearer token in the system keyring
    SetToken {
        /// Profile to store the token for (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
