//! Command-line driver for the gym portal flows.
//!
//! Stands in for the browser UI: every subcommand wires the configured
//! backend client and token store into the domain services, runs one flow and
//! prints its outcome.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultClock;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
use zeroize::Zeroizing;

use portal::PortalConfig;
use portal::domain::{
    FormError, LoginCredentials, PaymentMethod, Plan, PlanCatalog, RegistrationDraft,
    RegistrationForm, RegistrationService, Route, SessionManager, SubmissionError, resolve_view,
};
use portal::outbound::portal_api::PortalHttpClient;
use portal::outbound::token_store::FileTokenStore;

/// `portal` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "portal",
    about = "Register gym members and manage the admin session",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List membership plans and prices.
    Plans,
    /// Submit a membership registration.
    Register(RegisterArgs),
    /// Sign in as an admin and persist the session token.
    Login {
        /// Admin email address.
        #[arg(long)]
        email: String,
    },
    /// Forget the persisted admin session.
    Logout,
    /// Verify the persisted admin session and report the admin view.
    Status,
}

#[derive(Debug, clap::Args)]
struct RegisterArgs {
    /// Member name.
    #[arg(long)]
    name: String,
    /// Contact email.
    #[arg(long)]
    email: String,
    /// Ten-digit phone number.
    #[arg(long)]
    phone: String,
    /// Date of birth as `YYYY-MM-DD`.
    #[arg(long = "dob", value_name = "date")]
    date_of_birth: NaiveDate,
    /// Plan label such as `1-month` or `yearly`.
    #[arg(long, default_value = "1-month", value_parser = parse_plan)]
    plan: Plan,
    /// Membership start date; defaults to today.
    #[arg(long = "start-date", value_name = "date")]
    start_date: Option<NaiveDate>,
    /// `cash` or `online`.
    #[arg(long = "payment", default_value = "online", value_parser = parse_payment_method)]
    payment_method: PaymentMethod,
    /// Optional profile photo (png, jpg, gif or webp, at most 1 MB).
    #[arg(long, value_name = "path")]
    photo: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build portal runtime")?;
    runtime.block_on(run(cli.command))
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::Plans => {
            print_plans();
            Ok(())
        }
        Command::Register(args) => {
            let (_, client) = connect()?;
            register(client, args).await
        }
        Command::Login { email } => {
            let (config, client) = connect()?;
            let store = Arc::new(FileTokenStore::open(&config.state_dir)?);
            let mut session = SessionManager::new(store, client);
            let password = read_password()?;
            let credentials = LoginCredentials::try_from_parts(&email, &password)?;
            session.authenticate(&credentials).await?;
            println!("Logged in as {}", credentials.email());
            Ok(())
        }
        Command::Logout => {
            let (config, client) = connect()?;
            let store = Arc::new(FileTokenStore::open(&config.state_dir)?);
            SessionManager::new(store, client).logout()?;
            println!("Logged out");
            Ok(())
        }
        Command::Status => {
            let (config, client) = connect()?;
            let store = Arc::new(FileTokenStore::open(&config.state_dir)?);
            let mut session =
                SessionManager::new(store, client).with_verify_timeout(config.verify_timeout);
            let state = session.bootstrap().await;
            println!("session={state:?}");
            println!("admin_view={:?}", resolve_view(Route::Admin, state));
            Ok(())
        }
    }
}

fn connect() -> Result<(PortalConfig, Arc<PortalHttpClient>)> {
    let config = PortalConfig::load().wrap_err("invalid portal configuration")?;
    let client = PortalHttpClient::new(config.api_base_url.clone(), config.request_timeout)
        .wrap_err("failed to build HTTP client")?;
    Ok((config, Arc::new(client)))
}

fn print_plans() {
    for plan in PlanCatalog::all() {
        println!(
            "{:<8} {:<10} {:>2} month(s)  Rs. {}",
            plan.id(),
            plan.display_name(),
            plan.duration_months(),
            plan.price_rupees()
        );
    }
}

async fn register(client: Arc<PortalHttpClient>, args: RegisterArgs) -> Result<()> {
    let mut draft = match args.start_date {
        Some(start_date) => RegistrationDraft::starting_on(start_date)?,
        None => RegistrationDraft::new(&DefaultClock)?,
    };
    draft.name = args.name;
    draft.email = args.email;
    draft.phone = args.phone;
    draft.date_of_birth = Some(args.date_of_birth);
    draft.payment_method = args.payment_method;
    draft.select_plan(args.plan.id())?;

    let mut form = RegistrationForm::new(draft);
    if let Some(path) = args.photo {
        form.attach_photo(&path)
            .await?
            .with_context(|| format!("cannot attach {}", path.display()))?;
    }

    let service = RegistrationService::new(client);
    match form.submit_with(&service).await {
        Ok(receipt) => {
            println!("Registration successful");
            if !receipt.body.is_null() {
                println!("{}", receipt.body);
            }
            Ok(())
        }
        Err(FormError::Submission(SubmissionError::Validation(errors))) => {
            for error in errors.errors() {
                eprintln!("{}: {}", error.field, error.reason);
            }
            Err(eyre!("registration has invalid fields"))
        }
        Err(error) => Err(eyre!("{error}")),
    }
}

fn read_password() -> Result<Zeroizing<String>> {
    eprintln!("Password:");
    let mut line = Zeroizing::new(String::new());
    io::stdin()
        .lock()
        .read_line(&mut line)
        .wrap_err("failed to read password from stdin")?;
    let trimmed = line.trim_end_matches(['\r', '\n']);
    Ok(Zeroizing::new(trimmed.to_owned()))
}

fn parse_plan(raw: &str) -> Result<Plan, String> {
    PlanCatalog::lookup_label(raw.trim()).map_err(|error| error.to_string())
}

fn parse_payment_method(raw: &str) -> Result<PaymentMethod, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "cash" => Ok(PaymentMethod::Cash),
        "online" => Ok(PaymentMethod::Online),
        other => Err(format!("unknown payment method `{other}`; expected cash or online")),
    }
}
