//! CLI entry point for the vaccination forecasting dashboard.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use vax_dashboard::{Dashboard, DashboardReport, ForecastOutcome, Session, UserStore};
use vax_forecast::config::ForecastSettings;
use vax_forecast::summary::DEFAULT_ESTIMATED_POPULATION;
use vax_forecast::{ArimaOrder, DataLoader, ForecastConfig, GapPolicy, RecordFilter};

#[derive(Parser)]
#[command(name = "vaxcast", about = "Vaccination record summaries and forecasts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new user
    Signup {
        username: String,
        #[arg(long)]
        password: String,
        /// Repeat the password
        #[arg(long)]
        confirm: String,
        /// Credentials file
        #[arg(long, default_value = "users.json")]
        users: PathBuf,
    },
    /// Check a username and password
    Login {
        username: String,
        #[arg(long)]
        password: String,
        /// Credentials file
        #[arg(long, default_value = "users.json")]
        users: PathBuf,
    },
    /// List the states, cities and vaccine descriptions in a dataset
    Filters {
        /// Vaccination records CSV
        #[arg(long)]
        data: PathBuf,
        /// Only list cities of this state
        #[arg(long)]
        state: Option<String>,
    },
    /// Forecast yearly vaccinated counts for a selection
    Forecast {
        #[command(flatten)]
        selection: Selection,
        /// ARIMA order as p,d,q
        #[arg(long)]
        order: Option<ArimaOrder>,
        /// Number of years to forecast
        #[arg(long)]
        horizon: Option<usize>,
        /// TOML file with a [forecast] table
        #[arg(long)]
        config: Option<PathBuf>,
        /// zero_fill, reject or positional
        #[arg(long)]
        gap_policy: Option<GapPolicy>,
        /// Confidence level for forecast bounds, e.g. 0.95
        #[arg(long)]
        confidence: Option<f64>,
        /// Write the history and forecast table to this CSV file
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Show totals and breakdowns for a selection
    Summary {
        #[command(flatten)]
        selection: Selection,
        /// Externally reported fully vaccinated count
        #[arg(long)]
        fully: Option<u64>,
        /// Externally reported partially vaccinated count
        #[arg(long)]
        partially: Option<u64>,
        /// Population the coverage is measured against
        #[arg(long, default_value_t = DEFAULT_ESTIMATED_POPULATION)]
        population: u64,
    },
}

#[derive(Args)]
struct Selection {
    /// Vaccination records CSV
    #[arg(long)]
    data: PathBuf,
    #[arg(long)]
    state: Option<String>,
    #[arg(long)]
    city: Option<String>,
    /// Vaccine description; repeat to select several
    #[arg(long = "vaccine")]
    vaccines: Vec<String>,
    /// Credentials file
    #[arg(long, default_value = "users.json")]
    users: PathBuf,
    /// Sign in as this user
    #[arg(long, requires = "password")]
    user: Option<String>,
    #[arg(long)]
    password: Option<String>,
}

impl Selection {
    fn filter(&self) -> RecordFilter {
        let mut filter = RecordFilter::all();
        if let Some(state) = &self.state {
            filter = filter.state(state);
        }
        if let Some(city) = &self.city {
            filter = filter.city(city);
        }
        if !self.vaccines.is_empty() {
            filter = filter.descriptions(self.vaccines.iter().cloned());
        }
        filter
    }

    fn session(&self) -> Result<Session, Box<dyn std::error::Error>> {
        let session = match (&self.user, &self.password) {
            (Some(user), Some(password)) => {
                let users = UserStore::open(&self.users)?;
                Session::login(&users, user, password)?
            }
            _ => Session::anonymous(),
        };
        Ok(session.with_filter(self.filter()))
    }
}

fn forecast_config(
    path: Option<&Path>,
    order: Option<ArimaOrder>,
    horizon: Option<usize>,
    gap_policy: Option<GapPolicy>,
    confidence: Option<f64>,
) -> Result<ForecastConfig, Box<dyn std::error::Error>> {
    let mut settings = match path {
        Some(path) => ForecastConfig::from_file(path)?.to_settings(),
        None => ForecastSettings::default(),
    };

    if let Some(order) = order {
        settings.order = [order.p() as i64, order.d() as i64, order.q() as i64];
    }
    if let Some(horizon) = horizon {
        settings.horizon = horizon as i64;
    }
    if let Some(gap_policy) = gap_policy {
        settings.gap_policy = gap_policy;
    }
    if confidence.is_some() {
        settings.confidence_level = confidence;
    }

    Ok(ForecastConfig::try_from(settings)?)
}

fn print_header(report: &DashboardReport) {
    if let Some(user) = &report.user {
        println!("Signed in as {}", user);
    }
    println!(
        "Vaccinated: {}  Not vaccinated: {}  Total: {}",
        report.totals.vaccinated, report.totals.non_vaccinated, report.totals.total
    );
}

fn print_forecast(report: &DashboardReport) {
    println!("\n{:<8} {:>10}", "YEAR", "COUNT");
    println!("{}", "-".repeat(19));
    for point in report.history.points() {
        println!("{:<8} {:>10}", point.year, point.count);
    }

    match &report.forecast {
        ForecastOutcome::Ready(result) => {
            println!("\n{} forecast", result.model().model);
            println!("{:<8} {:>10} {:>21}", "YEAR", "PREDICTED", "BOUNDS");
            println!("{}", "-".repeat(41));
            for point in result.points() {
                let bounds = match (point.lower, point.upper) {
                    (Some(lower), Some(upper)) => format!("[{:.1}, {:.1}]", lower, upper),
                    _ => String::new(),
                };
                println!("{:<8} {:>10.1} {:>21}", point.year, point.predicted, bounds);
            }
            if !result.gap_years().is_empty() {
                println!(
                    "Missing years {:?} handled as {:?}",
                    result.gap_years(),
                    result.gap_policy()
                );
            }
        }
        ForecastOutcome::Skipped { reason } => println!("\nForecast unavailable: {}", reason),
        ForecastOutcome::NotRequested => {}
    }
}

fn print_summary(report: &DashboardReport) {
    println!("\n{:<18} {:>10} {:>14}", "RACE", "VACCINATED", "NOT VACCINATED");
    println!("{}", "-".repeat(44));
    for row in &report.races {
        println!(
            "{:<18} {:>10} {:>14}",
            row.key, row.totals.vaccinated, row.totals.non_vaccinated
        );
    }

    println!(
        "\n{:<24} {:<8} {:<10} {:>10} {:>14}",
        "ETHNICITY", "GENDER", "AGE", "VACCINATED", "NOT VACCINATED"
    );
    println!("{}", "-".repeat(70));
    for row in &report.demographics {
        println!(
            "{:<24} {:<8} {:<10} {:>10} {:>14}",
            row.key.ethnicity,
            row.key.gender,
            row.key.age_group,
            row.totals.vaccinated,
            row.totals.non_vaccinated
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Signup {
            username,
            password,
            confirm,
            users,
        } => {
            let mut store = UserStore::open(&users)?;
            store.sign_up(&username, &password, &confirm)?;
            println!("Account created for {}", username.trim());
        }
        Commands::Login {
            username,
            password,
            users,
        } => {
            let store = UserStore::open(&users)?;
            let session = Session::login(&store, &username, &password)?;
            println!("Welcome, {}", session.username().unwrap_or_default());
        }
        Commands::Filters { data, state } => {
            let store = DataLoader::from_csv(&data)?;
            match state {
                Some(state) => {
                    println!("Cities in {}:", state);
                    for city in store.cities_in(&state) {
                        println!("  {}", city);
                    }
                }
                None => {
                    println!("States:");
                    for state in store.states() {
                        println!("  {}", state);
                    }
                }
            }
            println!("Vaccines:");
            for description in store.descriptions() {
                println!("  {}", description);
            }
        }
        Commands::Forecast {
            selection,
            order,
            horizon,
            config,
            gap_policy,
            confidence,
            export,
        } => {
            let config =
                forecast_config(config.as_deref(), order, horizon, gap_policy, confidence)?;
            let session = selection.session()?;
            let store = DataLoader::from_csv(&selection.data)?;

            let report = Dashboard::run(&session, &store, &config);
            print_header(&report);
            print_forecast(&report);

            if let Some(path) = export {
                report.export_csv(&path)?;
                println!("\nWrote {}", path.display());
            }
        }
        Commands::Summary {
            selection,
            fully,
            partially,
            population,
        } => {
            let session = selection.session()?;
            let store = DataLoader::from_csv(&selection.data)?;

            let report = Dashboard::summarize(&session, &store);
            print_header(&report);
            print_summary(&report);

            if fully.is_some() || partially.is_some() {
                let coverage = report.coverage(
                    fully.unwrap_or(0),
                    partially.unwrap_or(0),
                    population,
                );
                match coverage {
                    Some(coverage) => {
                        println!("\nCoverage of an estimated {} people:", population);
                        println!("  Dataset:  {:.2}%", coverage.dataset_percent);
                        println!("  Reported: {:.2}%", coverage.reported_percent);
                    }
                    None => log::warn!("Population must be positive to compare coverage"),
                }
            }
        }
    }

    Ok(())
}
