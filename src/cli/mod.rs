//! CLI interface for Contactbook

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "contactbook")]
#[command(version)]
#[command(about = "Browse the contact and organization directory", long_about = None)]
pub struct Cli {
    /// Path to contactbook.toml (defaults to searching upward from the current directory)
    #[arg(short, long, global = true, env = "CONTACTBOOK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new contactbook.toml configuration file
    Init,

    /// Sign in and remember the session
    Login {
        /// Account email
        #[arg(short, long)]
        email: Option<String>,

        /// Password (prompted for when omitted)
        #[arg(long, env = "CONTACTBOOK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account and sign in with it
    Register {
        /// Full name
        #[arg(short, long)]
        name: Option<String>,

        /// Account email
        #[arg(short, long)]
        email: Option<String>,

        /// Password (prompted for, with confirmation, when omitted)
        #[arg(long, env = "CONTACTBOOK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show whether a session is active
    Status {
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// View or change the signed-in user's profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Browse and manage contacts
    Contacts {
        #[command(subcommand)]
        action: ContactsAction,
    },

    /// Browse and manage organizations
    Orgs {
        #[command(subcommand)]
        action: OrgsAction,
    },

    /// List available roles
    Roles {
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show the profile
    Show {
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Change name and/or email
    Update {
        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        email: Option<String>,
    },

    /// Change the account password
    Password,

    /// Delete the account and sign out
    Delete {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum ContactsAction {
    /// List all contacts
    List {
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show one contact
    Show {
        id: i64,

        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Add a contact
    Add {
        /// Full name
        #[arg(short, long)]
        name: String,

        #[arg(short, long, default_value = "")]
        phone: String,

        #[arg(short, long, default_value = "")]
        email: String,

        /// Contact type, e.g. MAHASISWA, DOSEN, STAFF, ALUMNI
        #[arg(short = 't', long = "type", default_value = "")]
        contact_type: String,
    },

    /// Delete a contact
    Remove {
        id: i64,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum OrgsAction {
    /// List all organizations
    List {
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show an organization and its members
    Show {
        id: i64,

        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Create an organization
    Add {
        /// Organization name
        name: String,
    },

    /// Delete an organization
    Remove {
        id: i64,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}
