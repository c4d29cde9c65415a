//! Clap derive structures for the `chililog` CLI.
//!
//! Defines the command tree, global flags, and the value enums shared by
//! handlers. Also compiled by `build.rs` for man pages, so it must depend on
//! nothing but clap.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// chililog -- administration console for Chililog log servers
#[derive(Debug, Parser)]
#[command(
    name = "chililog",
    version,
    about = "Administer Chililog log repositories and users",
    long_about = "Administer a Chililog log server from the command line.\n\n\
        Manages repository configuration and runtime status, user accounts,\n\
        and your own profile. Sessions are remembered per profile.",
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
    /// Server profile to use
    #[arg(long, short = 'p', env = "CHILILOG_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Server URL (overrides profile)
    #[arg(long, short = 's', env = "CHILILOG_SERVER", global = true)]
    pub server: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CHILILOG_OUTPUT",
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

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "CHILILOG_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "CHILILOG_TIMEOUT", global = true)]
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
    /// Plain text, one value per line (scripting)
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
    /// Log in and remember the session for this profile
    Login(LoginArgs),

    /// End the session and forget the remembered token
    Logout,

    /// Show the logged-in user and server
    Whoami,

    /// Re-fetch repositories and users from the server
    Sync {
        /// Drop local data before fetching
        #[arg(long)]
        clear: bool,
    },

    /// Follow repository status until interrupted
    Watch {
        /// Seconds between refreshes
        #[arg(long, short = 'i', default_value = "30")]
        interval: u64,
    },

    /// Manage repositories
    #[command(alias = "repo", alias = "r")]
    Repos(ReposArgs),

    /// Manage user accounts
    #[command(alias = "user", alias = "u")]
    Users(UsersArgs),

    /// View and edit your own profile
    Profile(ProfileArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SESSION
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Username (defaults to the profile's)
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// Do not remember the session after this command
    #[arg(long)]
    pub no_remember: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  REPOSITORIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ReposArgs {
    #[command(subcommand)]
    pub command: ReposCommand,
}

#[derive(Debug, Subcommand)]
pub enum ReposCommand {
    /// List repositories with their runtime status
    #[command(alias = "ls")]
    List,

    /// Show repository configuration
    Show {
        /// Repository name or document ID
        repository: String,
    },

    /// Create a repository
    Create {
        /// Repository name (lowercase letters, digits, underscores)
        name: String,

        #[command(flatten)]
        fields: RepositoryFields,
    },

    /// Update repository configuration
    Update {
        /// Repository name or document ID
        repository: String,

        /// Rename the repository
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        fields: RepositoryFields,
    },

    /// Delete a repository (must be offline)
    #[command(alias = "rm")]
    Delete {
        /// Repository name or document ID
        repository: String,
    },

    /// Start a repository
    Online {
        /// Repository name or document ID
        repository: String,
    },

    /// Put a repository into read-only mode
    Readonly {
        /// Repository name or document ID
        repository: String,
    },

    /// Stop a repository
    Offline {
        /// Repository name or document ID
        repository: String,
    },
}

/// Editable repository settings. Unset flags leave the value unchanged.
#[derive(Debug, Args, Default)]
pub struct RepositoryFields {
    #[arg(long)]
    pub display_name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Status when the server starts
    #[arg(long)]
    pub startup_status: Option<StartupStatusArg>,

    #[arg(long)]
    pub read_queue_durable: Option<bool>,

    #[arg(long)]
    pub write_queue_durable: Option<bool>,

    /// Number of write queue workers
    #[arg(long)]
    pub worker_count: Option<u32>,

    /// Write queue memory limit in bytes
    #[arg(long)]
    pub max_memory: Option<u64>,

    /// What to do when the write queue memory limit is reached
    #[arg(long)]
    pub max_memory_policy: Option<MemoryPolicyArg>,

    /// Write queue page size in bytes
    #[arg(long)]
    pub page_size: Option<u64>,

    /// Write queue pages kept in memory
    #[arg(long)]
    pub page_count_cache: Option<u32>,

    /// Keywords extracted per entry (-1 for unlimited)
    #[arg(long, allow_negative_numbers = true)]
    pub max_keywords: Option<i64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StartupStatusArg {
    Online,
    Offline,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MemoryPolicyArg {
    Page,
    Drop,
    Block,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  USERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List user accounts
    #[command(alias = "ls")]
    List {
        /// Only users holding this role
        #[arg(long)]
        role: Option<String>,
    },

    /// Show a user account
    Show {
        /// Username or document ID
        user: String,
    },

    /// Create a user account (prompts for the password)
    Create {
        username: String,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        display_name: Option<String>,

        /// Role to grant (repeatable), e.g. repo.sandpit.workbench
        #[arg(long = "role")]
        roles: Vec<String>,

        #[arg(long, default_value = "enabled")]
        status: UserStatusArg,
    },

    /// Update a user account
    Update {
        /// Username or document ID
        user: String,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        display_name: Option<String>,

        /// Role to grant (repeatable)
        #[arg(long)]
        add_role: Vec<String>,

        /// Role to revoke (repeatable)
        #[arg(long)]
        remove_role: Vec<String>,

        #[arg(long)]
        status: Option<UserStatusArg>,

        /// Prompt for a new password
        #[arg(long)]
        reset_password: bool,
    },

    /// Delete a user account
    #[command(alias = "rm")]
    Delete {
        /// Username or document ID
        user: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UserStatusArg {
    Enabled,
    Disabled,
    Locked,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PROFILE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Show your profile
    Show,

    /// Update your display name or email address
    Update {
        #[arg(long)]
        display_name: Option<String>,

        #[arg(long)]
        email: Option<String>,
    },

    /// Change your password (prompts)
    Password,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create a profile with guided setup
    Init,

    /// Display current configuration (secrets masked)
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key, e.g. server, username, timeout, token_expiry
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a profile's password in the system keyring
    SetPassword,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
