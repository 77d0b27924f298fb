use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use sentinela::{
    config::AppConfig,
    engine::{classifier, AlertAggregator, AlertThrottler},
    history,
    models::{Company, CompanyKind, CompanyStatus, DocumentFile, DocumentKind, DocumentSlots},
    persistence::{sqlite::SqliteStateRepository, traits::CompanyRepository},
    reports,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration directory.
    #[arg(long, global = true)]
    config_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prints expiry counters and the pending alert list.
    Dashboard {
        /// Computes the alert list without marking the alerts as shown.
        #[arg(long)]
        no_mark: bool,
    },
    /// Prints document indicators for a registration period.
    Report(ReportArgs),
    /// Prints the folder-style document history.
    History,
    /// Registers a new company or branch.
    Add(AddArgs),
    /// Lists registered companies and branches.
    List,
    /// Removes a company; removing a principal also removes its branches.
    Remove {
        /// Id of the company to remove.
        id: String,
    },
    /// Stores document metadata in one of a company's slots.
    Attach(AttachArgs),
}

#[derive(Args)]
struct ReportArgs {
    /// Start of the registration period (YYYY-MM-DD).
    #[arg(long)]
    from: Option<NaiveDate>,

    /// End of the registration period (YYYY-MM-DD).
    #[arg(long)]
    to: Option<NaiveDate>,
}

#[derive(Args)]
struct AddArgs {
    /// Company display name.
    #[arg(long)]
    name: String,

    /// Company registration number.
    #[arg(long)]
    cnpj: String,

    /// Registers the record as a branch of this principal.
    #[arg(long)]
    parent: Option<String>,

    /// Contract start date (YYYY-MM-DD).
    #[arg(long)]
    start_date: Option<String>,

    /// Contract termination date (YYYY-MM-DD).
    #[arg(long)]
    termination_date: Option<String>,

    /// Whether the company reports through eSocial.
    #[arg(long)]
    esocial: bool,

    /// Registers the contract as already inactive.
    #[arg(long)]
    inactive: bool,

    /// Coordinating physician for the PCMSO.
    #[arg(long, default_value = "")]
    physician: String,

    /// Free-form notes.
    #[arg(long, default_value = "")]
    notes: String,
}

#[derive(Args)]
struct AttachArgs {
    /// Id of the company the document belongs to.
    id: String,

    /// Document kind (pcmso, ltcat or pgr).
    kind: DocumentKind,

    /// Original file name.
    #[arg(long)]
    file_name: String,

    /// Reference year the document covers.
    #[arg(long)]
    year: i32,

    /// Opaque payload reference (data URL, path, ...).
    #[arg(long, default_value = "")]
    payload: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    let subscriber =
        FmtSubscriber::builder().with_env_filter(EnvFilter::from_default_env()).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();

    tracing::debug!("Loading application configuration...");
    let config = AppConfig::new(cli.config_dir.as_deref())?;
    tracing::debug!(database_url = %config.database_url, "Configuration loaded.");

    let repo = Arc::new(SqliteStateRepository::new(&config.database_url).await?);
    repo.run_migrations().await?;

    // The single wall-clock read; every core operation below takes the day
    // explicitly.
    let today = Utc::now().date_naive();

    match cli.command {
        Commands::Dashboard { no_mark } => run_dashboard(&repo, today, no_mark).await?,
        Commands::Report(args) => run_report(&repo, today, args).await?,
        Commands::History => run_history(&repo).await?,
        Commands::Add(args) => run_add(&repo, &config, today, args).await?,
        Commands::List => run_list(&repo, today).await?,
        Commands::Remove { id } => run_remove(&repo, &id).await?,
        Commands::Attach(args) => run_attach(&repo, today, args).await?,
    }

    repo.close().await;
    Ok(())
}

/// Prints the counters and pending alerts, and confirms each printed alert
/// as shown so the cooldown starts counting.
async fn run_dashboard(
    repo: &Arc<SqliteStateRepository>,
    today: NaiveDate,
    no_mark: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let companies = repo.get_companies().await?;
    let throttler = Arc::new(AlertThrottler::new(Arc::clone(repo)));
    let aggregator = AlertAggregator::new(Arc::clone(&throttler));

    let report = aggregator.aggregate(&companies, today).await;

    println!("Companies registered:   {}", companies.len());
    println!("Documents due within {} days: {}", classifier::WARNING_WINDOW_DAYS, report.counts.warning);
    println!("Documents expired:      {}", report.counts.expired);
    println!();

    if report.alerts.is_empty() {
        println!("No pending alerts.");
        return Ok(());
    }

    for alert in &report.alerts {
        let due = if alert.days_remaining < 0 {
            format!("{} day(s) overdue", -alert.days_remaining)
        } else if alert.days_remaining == 0 {
            "due today".to_string()
        } else {
            format!("due in {} day(s)", alert.days_remaining)
        };
        println!("{} - {}: {} ({})", alert.company_name, alert.kind.acronym(), alert.label, due);

        // Marking happens here, at the moment of display, not inside the
        // aggregator.
        if !no_mark {
            throttler.record_shown(&alert.key, today).await?;
        }
    }

    Ok(())
}

/// Prints the control-panel indicators for a registration period.
async fn run_report(
    repo: &Arc<SqliteStateRepository>,
    today: NaiveDate,
    args: ReportArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let companies = repo.get_companies().await?;
    let filtered = reports::filter_by_created(&companies, args.from, args.to);
    let summary = reports::control_summary(&filtered, today);

    println!("Companies in period: {}", summary.companies);
    println!("PCMSO documents:     {}", summary.pcmso);
    println!("LTCAT documents:     {}", summary.ltcat);
    println!("PGR documents:       {}", summary.pgr);
    println!("Active companies:    {}", summary.active);
    println!("Expired companies:   {}", summary.expired);
    Ok(())
}

/// Prints the folder-style history tree.
async fn run_history(
    repo: &Arc<SqliteStateRepository>,
) -> Result<(), Box<dyn std::error::Error>> {
    let companies = repo.get_companies().await?;
    let tree = history::company_tree(&companies);

    if tree.is_empty() {
        println!("No companies registered yet.");
        return Ok(());
    }

    for group in tree {
        println!("{}", group.principal.name);
        print_folders("Principal", group.principal);
        for branch in group.branches {
            print_folders(&branch.name, branch);
        }
    }
    Ok(())
}

/// Prints one company's year folders, indented under its label.
fn print_folders(label: &str, company: &Company) {
    println!("  {}/", label);
    let folders = history::document_folders(company);
    if folders.is_empty() {
        println!("    (no documents)");
        return;
    }
    for folder in folders {
        println!("    {}/", folder.year);
        for (_, file) in folder.files {
            println!("      {}", file.file_name);
        }
    }
}

/// Registers a new company or branch.
async fn run_add(
    repo: &Arc<SqliteStateRepository>,
    config: &AppConfig,
    today: NaiveDate,
    args: AddArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent_id) = &args.parent {
        match repo.get_company(parent_id).await? {
            Some(parent) if parent.kind == CompanyKind::Principal => {}
            Some(_) => return Err(format!("'{}' is not a principal company", parent_id).into()),
            None => return Err(format!("parent company '{}' not found", parent_id).into()),
        }
    }

    let company = Company {
        id: Company::generate_id(&config.company_id_prefix, Utc::now()),
        kind: if args.parent.is_some() { CompanyKind::Branch } else { CompanyKind::Principal },
        parent_company_id: args.parent,
        name: args.name,
        cnpj: args.cnpj,
        status: if args.inactive { CompanyStatus::Inactive } else { CompanyStatus::Active },
        start_date: args.start_date,
        termination_date: args.termination_date,
        esocial: args.esocial,
        coordinating_physician: args.physician,
        notes: args.notes,
        documents: DocumentSlots::default(),
        created_at: today,
        updated_at: None,
    };

    repo.add_company(&company).await?;
    println!("Registered {} ({})", company.name, company.id);
    Ok(())
}

/// Lists all companies and branches with their classification.
async fn run_list(
    repo: &Arc<SqliteStateRepository>,
    today: NaiveDate,
) -> Result<(), Box<dyn std::error::Error>> {
    let companies = repo.get_companies().await?;
    if companies.is_empty() {
        println!("No companies registered yet.");
        return Ok(());
    }

    for company in &companies {
        let classification = classifier::classify(company.termination_date.as_deref(), today);
        let kind = match company.kind {
            CompanyKind::Principal => "principal",
            CompanyKind::Branch => "branch",
        };
        println!(
            "{} | {} | {} | {} | {}",
            company.id,
            kind,
            company.name,
            company.cnpj,
            classification.status.label()
        );
    }
    Ok(())
}

/// Removes a company (and, for principals, its branches).
async fn run_remove(
    repo: &Arc<SqliteStateRepository>,
    id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if repo.delete_company_and_branches(id).await? {
        println!("Removed {}", id);
    } else {
        println!("No company with id {}", id);
    }
    Ok(())
}

/// Stores document metadata in one of a company's slots.
async fn run_attach(
    repo: &Arc<SqliteStateRepository>,
    today: NaiveDate,
    args: AttachArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(mut company) = repo.get_company(&args.id).await? else {
        return Err(format!("company '{}' not found", args.id).into());
    };

    company.documents.set(
        args.kind,
        DocumentFile {
            file_name: args.file_name,
            uploaded_at: Utc::now(),
            year: args.year,
            payload: args.payload,
        },
    );
    company.updated_at = Some(today);

    repo.update_company(&company).await?;
    println!("Attached {} to {}", args.kind.acronym(), company.name);
    Ok(())
}
