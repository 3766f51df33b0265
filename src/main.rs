mod cli;

use chrono::NaiveDate;
use clap::Parser;
use cli::{Cli, Commands, ExportTarget, MemberCommands, OutputFormat, PaymentCommands, PlanCommands};
use colored::*;
use muscledesk::{
    config::Config,
    error::{self, GymError},
    export::{self, Dataset},
    ingest,
    lifecycle::{self, ClassifiedMember, MemberFilter, StatusFilter},
    notify::{self, TelegramChannel},
    storage::{models, Database, Member, Payment, PaymentStatus, Plan},
    utils,
};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("muscledesk=info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // the only place the wall clock is read
    let today = cli.today.unwrap_or_else(|| chrono::Local::now().date_naive());
    info!("Evaluating memberships as of {}", today);

    let result = match cli.command {
        Commands::Init => initialize(&config),

        Commands::Import { members, payments, plans } => {
            import_records(&config, members.as_deref(), payments.as_deref(), plans.as_deref())
        }

        Commands::Member(cmd) => run_member_command(&config, cmd, today),

        Commands::Plan(cmd) => run_plan_command(&config, cmd),

        Commands::Payment(cmd) => run_payment_command(&config, cmd, today),

        Commands::Reminders { template, send, format } => {
            show_reminders(&config, today, template, send, format).await
        }

        Commands::Stats { format } => show_stats(&config, today, format),

        Commands::Export { target, out } => export_data(&config, today, target, out),
    };

    if let Err(e) = result {
        error!("{}", format!("Error: {}", e).red());
        std::process::exit(1);
    }
}

fn open_db(config: &Config) -> error::Result<Database> {
    Database::new(&config.database.path)
}

fn print_json<T: serde::Serialize>(value: &T) -> error::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn initialize(config: &Config) -> error::Result<()> {
    println!("{}", format!("Initializing {}...", config.gym.name).green());
    let _db = open_db(config)?;
    println!("{}", "✓ Database initialized".green());
    println!("{}", "✓ Configuration loaded".green());
    println!("\n{}", "Configuration:".cyan());
    println!("  Gym:            {}", config.gym.name);
    println!("  Currency:       {}", config.gym.currency_symbol);
    println!("  Database:       {}", config.database.path);
    println!("  Export dir:     {}", config.export.directory);
    println!("  Reminder text:  {:?}", config.reminders.default_template);
    println!(
        "  Telegram:       {}",
        if config.telegram.is_some() { "configured" } else { "not configured" }
    );

    println!("\n{}", "Ready to use! Try running:".cyan());
    println!("  {} to load records from the backend export", "muscledesk import --members members.json".yellow());
    println!("  {} to see who needs a reminder", "muscledesk reminders".yellow());
    println!("  {} to view the dashboard numbers", "muscledesk stats".yellow());
    Ok(())
}

fn import_records(
    config: &Config,
    members: Option<&Path>,
    payments: Option<&Path>,
    plans: Option<&Path>,
) -> error::Result<()> {
    if members.is_none() && payments.is_none() && plans.is_none() {
        return Err(GymError::InvalidRecord(
            "nothing to import: pass --members, --payments or --plans".to_string(),
        ));
    }

    let db = open_db(config)?;
    println!("{}", "=== Import Results ===".cyan().bold());

    if let Some(path) = members {
        let outcome = ingest::load_members(path)?;
        for member in &outcome.accepted {
            db.save_member(member)?;
        }
        report_import("Members", outcome.accepted.len(), &outcome.rejected);
    }

    if let Some(path) = payments {
        let outcome = ingest::load_payments(path)?;
        for payment in &outcome.accepted {
            db.save_payment(payment)?;
        }
        report_import("Payments", outcome.accepted.len(), &outcome.rejected);
    }

    if let Some(path) = plans {
        let outcome = ingest::load_plans(path)?;
        for plan in &outcome.accepted {
            db.save_plan(plan)?;
        }
        report_import("Plans", outcome.accepted.len(), &outcome.rejected);
    }

    Ok(())
}

fn report_import(kind: &str, imported: usize, rejected: &[(usize, GymError)]) {
    println!(
        "{:<10} {} imported, {} skipped",
        kind,
        imported.to_string().green(),
        if rejected.is_empty() {
            "0".normal()
        } else {
            rejected.len().to_string().yellow()
        }
    );
    for (index, e) in rejected {
        println!("  record #{}: {}", index + 1, e.to_string().yellow());
    }
}

fn run_member_command(config: &Config, cmd: MemberCommands, today: NaiveDate) -> error::Result<()> {
    let db = open_db(config)?;

    match cmd {
        MemberCommands::Add { name, email, phone, duration, joined } => {
            let member = Member::new(&name, &email, &phone, duration, joined.unwrap_or(today))?;
            db.save_member(&member)?;

            let classified = ClassifiedMember::new(member, today);
            info!("Added member {} ({})", classified.member.name, classified.member.id);
            println!(
                "✓ Added {}, expires {} ({})",
                classified.member.name,
                classified.member.expiry_date,
                utils::format_status(classified.status)
            );
        }

        MemberCommands::List { status, search, format } => {
            let filter = MemberFilter { query: search, status };
            let members = filter.apply(lifecycle::classify_all(&db.list_members()?, today));

            if format == OutputFormat::Json {
                return print_json(&members);
            }
            print_members(&members, filter.status);
        }

        MemberCommands::Update { member, name, email, phone, duration, joined } => {
            let existing = db.resolve_member(&member)?;
            let updated = Member::new(
                name.as_deref().unwrap_or(&existing.name),
                email.as_deref().unwrap_or(&existing.email),
                phone.as_deref().unwrap_or(&existing.phone),
                duration.unwrap_or(i64::from(existing.plan_duration)),
                joined.unwrap_or(existing.joining_date),
            )?;
            let updated = Member { id: existing.id, ..updated };
            db.save_member(&updated)?;

            let status = lifecycle::classify(updated.expiry_date, today);
            println!(
                "✓ Updated {}, expires {} ({})",
                updated.name,
                updated.expiry_date,
                utils::format_status(status)
            );
        }

        MemberCommands::Renew { member } => {
            let existing = db.resolve_member(&member)?;
            let renewed = lifecycle::renew(&existing, today)?;
            db.save_member(&renewed)?;

            info!("Renewed {} until {}", renewed.name, renewed.expiry_date);
            println!(
                "✓ Renewed {} for {}, now expires {} ({})",
                renewed.name,
                lifecycle::reminders::plan_label(renewed.plan_duration),
                renewed.expiry_date,
                utils::format_status(lifecycle::classify(renewed.expiry_date, today))
            );
        }

        MemberCommands::Remove { member, yes } => {
            let existing = db.resolve_member(&member)?;
            if !yes && !utils::confirm_action(&format!("Delete member {}?", existing.name)) {
                println!("Cancelled");
                return Ok(());
            }

            db.delete_member(&existing.id)?;
            info!("Deleted member {}", existing.id);
            println!("✓ Deleted {}", existing.name);
        }
    }

    Ok(())
}

fn print_members(members: &[ClassifiedMember], filter: StatusFilter) {
    if members.is_empty() {
        match filter {
            StatusFilter::All => println!("No members found"),
            StatusFilter::Only(status) => println!("No {} members found", status),
        }
        return;
    }

    let widths = [10, 24, 28, 14, 12, 12, 10];
    utils::print_table_border(120);
    utils::print_table_row(
        &["Id", "Name", "Email", "Phone", "Joined", "Expires", "Status"],
        &widths,
    );
    utils::print_table_border(120);

    for m in members {
        utils::print_table_row(
            &[
                &utils::format_id(&m.member.id),
                &m.member.name,
                &m.member.email,
                &m.member.phone,
                &m.member.joining_date.to_string(),
                &m.member.expiry_date.to_string(),
                &utils::format_status(m.status),
            ],
            &widths,
        );
    }
    utils::print_table_border(120);
    println!("{} members", members.len());
}

fn run_plan_command(config: &Config, cmd: PlanCommands) -> error::Result<()> {
    let db = open_db(config)?;

    match cmd {
        PlanCommands::Add { name, price, duration, features } => {
            let plan = Plan::try_from(models::RawPlan {
                id: None,
                name: Some(name),
                price: Some(price),
                duration: Some(duration),
                features: features.split(',').map(str::to_string).collect(),
            })?;
            db.save_plan(&plan)?;
            println!("✓ Added plan {} ({})", plan.name, plan.id);
        }

        PlanCommands::List { format } => {
            let plans = db.list_plans()?;
            if format == OutputFormat::Json {
                return print_json(&plans);
            }

            if plans.is_empty() {
                println!("No plans found");
                return Ok(());
            }

            let widths = [38, 20, 12, 10, 40];
            utils::print_table_border(120);
            utils::print_table_row(&["Id", "Name", "Price", "Days", "Features"], &widths);
            utils::print_table_border(120);
            for plan in &plans {
                utils::print_table_row(
                    &[
                        &plan.id,
                        &plan.name,
                        &utils::format_currency(plan.price, &config.gym.currency_symbol),
                        &plan.duration_days.to_string(),
                        &plan.features.join(", "),
                    ],
                    &widths,
                );
            }
            utils::print_table_border(120);
        }

        PlanCommands::Update { id, name, price, duration, features } => {
            let existing = db.get_plan(&id)?.ok_or_else(|| GymError::PlanNotFound(id.clone()))?;

            // merged fields go back through import validation
            let updated = Plan::try_from(models::RawPlan {
                id: Some(models::RawId::Text(existing.id)),
                name: Some(name.unwrap_or(existing.name)),
                price: Some(price.unwrap_or(existing.price)),
                duration: Some(duration.unwrap_or(i64::from(existing.duration_days))),
                features: match features {
                    Some(list) => list.split(',').map(str::to_string).collect(),
                    None => existing.features,
                },
            })?;
            db.save_plan(&updated)?;

            info!("Updated plan {}", updated.id);
            println!(
                "✓ Updated plan {}: {} for {} days",
                updated.name,
                utils::format_currency(updated.price, &config.gym.currency_symbol),
                updated.duration_days
            );
        }

        PlanCommands::Remove { id } => {
            if !db.delete_plan(&id)? {
                return Err(GymError::PlanNotFound(id));
            }
            println!("✓ Deleted plan {}", id);
        }
    }

    Ok(())
}

fn run_payment_command(config: &Config, cmd: PaymentCommands, today: NaiveDate) -> error::Result<()> {
    let db = open_db(config)?;

    match cmd {
        PaymentCommands::Add { member, amount, mode, date, status, plan } => {
            let member = db.resolve_member(&member)?;
            if !amount.is_finite() || amount < 0.0 {
                return Err(GymError::InvalidRecord(format!("invalid payment amount {}", amount)));
            }

            let payment = Payment {
                id: models::new_id(),
                member_id: member.id.clone(),
                member_name: member.name.clone(),
                amount,
                payment_date: Some(date.unwrap_or(today)),
                payment_method: mode,
                status,
                plan_name: plan,
            };
            db.save_payment(&payment)?;

            info!("Recorded payment {} for {}", payment.id, member.name);
            println!(
                "✓ Recorded {} from {} ({})",
                utils::format_currency(payment.amount, &config.gym.currency_symbol),
                member.name,
                payment.status
            );
        }

        PaymentCommands::List { format } => {
            let payments = db.list_payments()?;
            if format == OutputFormat::Json {
                return print_json(&payments);
            }

            if payments.is_empty() {
                println!("No payments found");
                return Ok(());
            }

            let widths = [24, 14, 12, 10, 10];
            utils::print_table_border(80);
            utils::print_table_row(&["Member", "Amount", "Date", "Mode", "Status"], &widths);
            utils::print_table_border(80);
            for p in &payments {
                let status = match p.status {
                    PaymentStatus::Completed => "✓ Done".green().to_string(),
                    PaymentStatus::Pending => "⏳ Pending".yellow().to_string(),
                    PaymentStatus::Failed => "✗ Failed".red().to_string(),
                };
                utils::print_table_row(
                    &[
                        &p.member_name,
                        &utils::format_currency(p.amount, &config.gym.currency_symbol),
                        &p.payment_date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
                        &p.payment_method,
                        &status,
                    ],
                    &widths,
                );
            }
            utils::print_table_border(80);
        }
    }

    Ok(())
}

async fn show_reminders(
    config: &Config,
    today: NaiveDate,
    template: Option<notify::MessageTemplate>,
    send: bool,
    format: OutputFormat,
) -> error::Result<()> {
    let db = open_db(config)?;
    let reminders = lifecycle::derive_reminders(&db.list_members()?, today);
    let template = template.unwrap_or(config.reminders.default_template);

    let reminders = if send && !reminders.is_empty() {
        let channel = config
            .telegram
            .as_ref()
            .and_then(TelegramChannel::new)
            .ok_or_else(|| GymError::Config("Telegram is not configured or disabled".to_string()))?;

        let report = notify::dispatch_reminders(&channel, reminders, template).await;
        if report.failed > 0 {
            warn!("{} reminders could not be delivered", report.failed);
        }
        println!(
            "Reminders sent to {} member{}{}",
            report.sent,
            if report.sent != 1 { "s" } else { "" },
            if report.failed > 0 {
                format!(" ({} failed)", report.failed).red().to_string()
            } else {
                String::new()
            }
        );
        report.reminders
    } else {
        reminders
    };

    if format == OutputFormat::Json {
        return print_json(&reminders);
    }

    if reminders.is_empty() {
        println!("No members with expiring memberships");
        return Ok(());
    }

    println!(
        "{}",
        format!("{} members have expiring memberships", reminders.len()).yellow().bold()
    );
    let widths = [24, 10, 12, 10];
    utils::print_table_border(64);
    utils::print_table_row(&["Member", "Expires in", "Plan", "Delivery"], &widths);
    utils::print_table_border(64);
    for r in &reminders {
        let days = utils::format_days(r.days_left);
        let days = if r.is_urgent() { days.red().to_string() } else { days.yellow().to_string() };
        utils::print_table_row(&[&r.member_name, &days, &r.plan, &r.status.to_string()], &widths);
    }
    utils::print_table_border(64);

    if let Some(first) = reminders.first() {
        println!("\n{}", "Preview:".cyan());
        println!("  {}", template.render(first));
    }

    Ok(())
}

fn show_stats(config: &Config, today: NaiveDate, format: OutputFormat) -> error::Result<()> {
    let db = open_db(config)?;
    let members = db.list_members()?;
    let payments = db.list_payments()?;

    let summary = lifecycle::summarize(&members, today);
    let totals = lifecycle::payment_totals(&payments);
    let lifetime = lifecycle::monthly_revenue(&payments);
    let this_month = lifecycle::revenue_in_month(&payments, today);
    let reminders = lifecycle::derive_reminders(&members, today);
    let stored = db.get_stats()?;

    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({
            "as_of": today,
            "members": summary,
            "revenue": {
                "lifetime": lifetime,
                "this_month": this_month,
                "pending": totals.pending,
            },
            "reminders_due": reminders.len(),
            "stored": stored,
        }));
    }

    let money = |amount: f64| utils::format_currency(amount, &config.gym.currency_symbol);

    println!("{}", format!("=== {} Statistics ({}) ===", config.gym.name, today).cyan().bold());
    println!("\nMembers:");
    println!("  Total:          {}", summary.total);
    println!("  Active:         {}", summary.active.to_string().green());
    println!("  Expiring soon:  {}", summary.expiring.to_string().yellow());
    println!("  Expired:        {}", summary.expired.to_string().red());

    println!("\nRevenue:");
    println!("  Monthly (all completed): {}", money(lifetime));
    println!("  This month:              {}", money(this_month));
    println!("  Pending:                 {}", money(totals.pending));

    println!("\nReminders due: {}", reminders.len());
    println!(
        "Stored: {} members, {} payments, {} plans",
        stored.members, stored.payments, stored.plans
    );
    Ok(())
}

fn export_data(
    config: &Config,
    today: NaiveDate,
    target: ExportTarget,
    out: Option<PathBuf>,
) -> error::Result<()> {
    let db = open_db(config)?;
    let dir = out.unwrap_or_else(|| config.export_dir());

    let datasets: Vec<Dataset> = match target {
        ExportTarget::Members => vec![Dataset::Members],
        ExportTarget::Payments => vec![Dataset::Payments],
        ExportTarget::Plans => vec![Dataset::Plans],
        ExportTarget::Revenue => vec![Dataset::Revenue],
        ExportTarget::All => Dataset::ALL.to_vec(),
    };

    let members = db.list_members()?;
    let payments = db.list_payments()?;
    let plans = db.list_plans()?;

    for dataset in datasets {
        let rendered = match dataset {
            Dataset::Members => export::members_csv(&members, today),
            Dataset::Payments => export::payments_csv(&payments),
            Dataset::Plans => export::plans_csv(&plans),
            Dataset::Revenue => export::revenue_csv(&payments),
        };

        match rendered {
            Ok(csv) => {
                let path = export::write_export(&dir, dataset, &csv, today)?;
                println!("✓ {} exported to {}", dataset.file_stem(), path.display());
            }
            // an empty dataset only matters when it was asked for on its own
            Err(GymError::NothingToExport(name)) if target == ExportTarget::All => {
                println!("{}", format!("- No {} to export", name).yellow());
            }
            Err(e) => return Err(e),
        }
    }

    Ok(())
}
