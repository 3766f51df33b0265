use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use muscledesk::{lifecycle::StatusFilter, notify::MessageTemplate, storage::PaymentStatus};

#[derive(Parser)]
#[command(name = "muscledesk")]
#[command(about = "Gym membership tracking: statuses, renewal reminders and exports")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file (extension optional)
    #[arg(short, long, global = true, default_value = "config/default")]
    pub config: String,

    /// Evaluate statuses as of this date (YYYY-MM-DD) instead of the local date
    #[arg(long, global = true)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportTarget {
    Members,
    Payments,
    Plans,
    Revenue,
    All,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the local store and show configuration
    Init,

    /// Import records exported from the backend (JSON arrays)
    Import {
        #[arg(long)]
        members: Option<PathBuf>,

        #[arg(long)]
        payments: Option<PathBuf>,

        #[arg(long)]
        plans: Option<PathBuf>,
    },

    /// Manage members
    #[command(subcommand)]
    Member(MemberCommands),

    /// Manage membership plans
    #[command(subcommand)]
    Plan(PlanCommands),

    /// Record and list payments
    #[command(subcommand)]
    Payment(PaymentCommands),

    /// Show members due for a renewal reminder, optionally sending them
    Reminders {
        /// Message template: renewal, expired, followup
        #[arg(short, long)]
        template: Option<MessageTemplate>,

        /// Deliver reminders through the configured Telegram chats
        #[arg(long)]
        send: bool,

        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show member counts and revenue
    Stats {
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Export data as CSV
    Export {
        #[arg(value_enum)]
        target: ExportTarget,

        /// Output directory (defaults to export.directory from config)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum MemberCommands {
    /// Register a new member
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: String,

        /// Plan length in months
        #[arg(short, long, default_value = "1")]
        duration: i64,

        /// Joining date (defaults to today)
        #[arg(long)]
        joined: Option<NaiveDate>,
    },

    /// List members with their current status
    List {
        /// Filter by status (all, active, expiring, expired)
        #[arg(short, long, default_value = "all")]
        status: StatusFilter,

        /// Match name, email or phone
        #[arg(long)]
        search: Option<String>,

        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Edit a member; expiry is recomputed from joining date and plan length
    Update {
        /// Member id or exact name
        member: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(short, long)]
        duration: Option<i64>,

        #[arg(long)]
        joined: Option<NaiveDate>,
    },

    /// Renew a membership starting today
    Renew {
        /// Member id or exact name
        member: String,
    },

    /// Delete a member
    Remove {
        /// Member id or exact name
        member: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Create a plan
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        price: f64,

        /// Plan length in days
        #[arg(short, long, default_value = "30")]
        duration: i64,

        /// Comma separated feature list
        #[arg(long, default_value = "")]
        features: String,
    },

    /// List plans
    List {
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Edit a plan; omitted fields keep their current value
    Update {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        price: Option<f64>,

        /// Plan length in days
        #[arg(short, long)]
        duration: Option<i64>,

        /// Comma separated feature list, replaces the current one
        #[arg(long)]
        features: Option<String>,
    },

    /// Delete a plan
    Remove {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum PaymentCommands {
    /// Record a payment for a member
    Add {
        /// Member id or exact name
        #[arg(long)]
        member: String,

        #[arg(long)]
        amount: f64,

        /// Payment mode, e.g. upi, cash, card
        #[arg(long, default_value = "upi")]
        mode: String,

        /// Payment date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long, default_value = "completed")]
        status: PaymentStatus,

        #[arg(long)]
        plan: Option<String>,
    },

    /// List payments, newest first
    List {
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}
