//! Premium quote CLI
//!
//! Prices a single life insurance quote against the configured rate tables.
//!
//! ```text
//! premium-quote --gender F --dob 2003-01-01 --smoking N --coverage 100000 \
//!     --effective-date 2021-01-01 --plan T15 --terms 15 --mode M
//! ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use life_premium::{AgeBasis, EngineConfig, PaymentMode, PremiumEngine, PremiumError, QuoteInput};
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "premium-quote", about = "Calculate a life insurance premium", version)]
struct Cli {
    /// Read the quote from a JSON file instead of flags
    #[arg(long, conflicts_with_all = ["gender", "dob", "smoking", "coverage", "effective_date", "plan", "terms"])]
    input: Option<PathBuf>,

    /// F or M
    #[arg(long)]
    gender: Option<String>,

    /// Date of birth (YYYY-MM-DD)
    #[arg(long)]
    dob: Option<String>,

    /// N or S
    #[arg(long)]
    smoking: Option<String>,

    #[arg(long)]
    coverage: Option<f64>,

    /// Policy effective date (YYYY-MM-DD)
    #[arg(long)]
    effective_date: Option<String>,

    /// T15 or WLF
    #[arg(long)]
    plan: Option<String>,

    /// Coverage term in years
    #[arg(long)]
    terms: Option<u32>,

    /// Billing frequency: Y, HY, Q or M
    #[arg(long)]
    mode: Option<PaymentMode>,

    /// Age convention: alb, anb or nearest (overrides AGE_BASIS)
    #[arg(long)]
    age_basis: Option<AgeBasis>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn quote_input(&self) -> Result<QuoteInput> {
        if let Some(path) = &self.input {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            return serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("parsing quote from {}", path.display()));
        }

        Ok(QuoteInput {
            gender: self.gender.clone(),
            date_of_birth: self.dob.clone(),
            smoking_status: self.smoking.clone(),
            coverage_amount: self.coverage.map(Value::from),
            effective_date: self.effective_date.clone(),
            plan_code: self.plan.clone(),
            coverage_terms: self.terms.map(Value::from),
        })
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let mut config = EngineConfig::from_env()?;
    if let Some(age_basis) = cli.age_basis {
        config.age_basis = age_basis;
    }
    log::debug!("Engine config: {:?}", config);

    let engine = PremiumEngine::from_config(&config)
        .map_err(|err| anyhow::anyhow!("loading premium engine: {}", err))?;
    let input = cli.quote_input()?;

    let summary = match engine.quote(&input, cli.mode) {
        Ok(summary) => summary,
        Err(PremiumError::InvalidQuote(message)) => {
            eprintln!("Invalid quote: {}", message);
            return Ok(ExitCode::from(2));
        }
        Err(err) => bail!(err),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("Plan:     {} ({})", summary.plan_code, summary.strategy);
    println!("Age:      {} ({})", summary.age, summary.age_basis);
    match summary.premium_amount {
        Some(premium) => println!("Premium:  ${:.2}", premium),
        None => println!("Premium:  no premium (outside rate table)"),
    }
    if let Some(mode) = summary.payment_mode {
        match summary.modal_premium_amount {
            Some(modal) => println!("Modal {:<3} ${:.2}", mode.code(), modal),
            None => println!("Modal {:<3} unavailable", mode.code()),
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
