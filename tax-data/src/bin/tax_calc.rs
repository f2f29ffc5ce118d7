use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tax_core::calculations::{ProgressiveTax, RoundingPolicy, assess_report};
use tax_core::{BoundaryConvention, BracketSchedule, FinancialReport, ScheduleBook};
use tax_data::logging::init_logging;
use tax_data::{EngineConfig, ScheduleLoader};
use tracing::{debug, warn};

/// Compute bracketed tax liabilities.
///
/// Without `--schedule` the built-in six-band municipal schedule is used.
/// A schedule file is a CSV with the columns:
/// - tax_year: first year the schedule applies to
/// - lower_bound: where the bracket begins
/// - upper_bound: where the bracket ends (empty for unlimited)
/// - rate: the marginal rate as a decimal (e.g., 0.05)
#[derive(Parser, Debug)]
#[command(name = "tax-calc")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a CSV file with bracket schedules
    #[arg(short, long, global = true)]
    schedule: Option<PathBuf>,

    /// Path to a TOML engine configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Treat schedule boundaries as half-open `[lower, upper)` intervals
    #[arg(long, default_value_t = false, global = true)]
    half_open: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the tax owed on an amount
    Compute {
        /// Amount to tax
        #[arg(short, long, allow_negative_numbers = true)]
        amount: Decimal,

        /// Tax year whose schedule applies (defaults to the latest in the file)
        #[arg(short, long)]
        year: Option<i32>,

        /// Print the per-bracket breakdown
        #[arg(short, long, default_value_t = false)]
        breakdown: bool,
    },

    /// Assess a quarterly financial report
    Assess {
        #[arg(long)]
        year: i32,

        #[arg(long)]
        quarter: u8,

        #[arg(long, allow_negative_numbers = true)]
        revenue: Decimal,

        #[arg(long, allow_negative_numbers = true)]
        expenses: Decimal,
    },
}

struct Engine {
    book: Option<ScheduleBook>,
    rounding: RoundingPolicy,
}

impl Engine {
    fn from_args(args: &Args) -> Result<Self> {
        let config = match &args.config {
            Some(path) => EngineConfig::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?,
            None => EngineConfig::default(),
        };

        let convention = if args.half_open {
            BoundaryConvention::HalfOpen
        } else {
            config.convention()?
        };

        let book = match &args.schedule {
            Some(path) => Some(
                ScheduleLoader::load_from_file(path, convention)
                    .with_context(|| format!("Failed to load schedule: {}", path.display()))?,
            ),
            None => {
                if convention != BoundaryConvention::whole_units() {
                    warn!("boundary convention only applies to --schedule files; using the built-in schedule");
                }
                None
            }
        };

        Ok(Self {
            book,
            rounding: config.rounding,
        })
    }

    /// Snapshot of the schedule in effect for `year`.
    fn schedule(
        &self,
        year: Option<i32>,
    ) -> Result<BracketSchedule> {
        let Some(book) = &self.book else {
            return Ok(BracketSchedule::reference());
        };
        let year = match year.or_else(|| book.years().last()) {
            Some(year) => year,
            None => anyhow::bail!("schedule file contains no tax years"),
        };
        debug!(year, "selected schedule");
        Ok(book.for_year(year)?.clone())
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let engine = Engine::from_args(&args)?;

    match args.command {
        Command::Compute {
            amount,
            year,
            breakdown,
        } => {
            let schedule = engine.schedule(year)?;
            let calculator = ProgressiveTax::new(&schedule).with_rounding(engine.rounding);
            let computation = calculator
                .calculate(amount)
                .context("Failed to compute tax")?;

            println!("{}", computation.tax);

            if breakdown {
                for portion in &computation.portions {
                    let upper = portion
                        .upper_bound
                        .map_or_else(|| "∞".to_string(), |u| u.to_string());
                    println!(
                        "  {:>14} – {:<14} @ {:>6}  taxable {:>14}  tax {:>14}",
                        portion.lower_bound, upper, portion.rate, portion.taxable_amount, portion.tax
                    );
                }
                println!("  unrounded tax   {}", computation.unrounded_tax);
                println!("  effective rate  {}", computation.effective_rate.round_dp(6));
                println!("  marginal rate   {}", calculator.marginal_rate(amount)?);
            }
        }
        Command::Assess {
            year,
            quarter,
            revenue,
            expenses,
        } => {
            let book = match &engine.book {
                Some(book) => book.clone(),
                None => [(year, BracketSchedule::reference())].into_iter().collect(),
            };
            let report = FinancialReport {
                year,
                quarter,
                revenue,
                expenses,
            };
            let assessment = assess_report(&book, &report, engine.rounding)
                .context("Failed to assess report")?;

            println!("year        {}", assessment.year);
            println!("quarter     {}", assessment.quarter);
            println!("revenue     {}", assessment.revenue);
            println!("expenses    {}", assessment.expenses);
            println!("net income  {}", assessment.net_income);
            println!("tax amount  {}", assessment.tax_amount);
        }
    }

    Ok(())
}
