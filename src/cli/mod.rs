pub mod commands;

pub use commands::{Cli, Commands, ExportTarget, MemberCommands, OutputFormat, PaymentCommands, PlanCommands};
