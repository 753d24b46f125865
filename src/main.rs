use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};
use creditkit::{
    console::Console,
    error::SessionError,
    loan::LoanRequest,
    markdown::{self, Editor},
    quiz,
    report::INCORRECT_PARAMETERS,
    rps,
};
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;
use std::{
    io::{self, StdinLock, Stdout},
    path::{Path, PathBuf},
    process,
};

#[derive(Parser)]
#[command(name = "creditkit", version, about = "Loan calculator and console exercises")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// More log output; repeat for more detail
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve for the missing payment, principal or term of a loan
    Credit(CreditArgs),
    /// Build a markdown document interactively
    Markdown {
        #[arg(long, default_value = "output.md")]
        output: PathBuf,
    },
    /// Rock-paper-scissors with your own list of options
    Rps {
        #[arg(long, default_value = "rating.txt")]
        ratings: PathBuf,
    },
    /// Five arithmetic questions
    Quiz {
        #[arg(long, default_value = "results.txt")]
        results: PathBuf,
    },
}

#[derive(Args)]
struct CreditArgs {
    /// The type of payment: 'annuity' or 'diff'
    #[arg(long = "type")]
    calc_type: Option<String>,

    /// The amount of the monthly payment
    #[arg(long, allow_negative_numbers = true)]
    payment: Option<f64>,

    /// The loan principal amount
    #[arg(long, allow_negative_numbers = true)]
    principal: Option<f64>,

    /// The number of months required to repay the loan
    #[arg(long, allow_negative_numbers = true)]
    periods: Option<i64>,

    /// The annual interest rate, as a percentage
    #[arg(long, allow_negative_numbers = true)]
    interest: Option<f64>,

    /// Date of the first differentiated payment (YYYY-MM-DD)
    #[arg(long)]
    first_payment: Option<NaiveDate>,
}

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

// the report text, or "Incorrect parameters" with the reason logged
fn credit_report(args: CreditArgs) -> Result<String, &'static str> {
    let request = LoanRequest::new(
        args.calc_type.as_deref(),
        args.payment,
        args.principal,
        args.periods,
        args.interest,
    )
    .map(|request| match args.first_payment {
        Some(date) => request.with_first_payment(date),
        None => request,
    });

    request
        .and_then(|request| request.calculate())
        .map(|result| result.to_string())
        .map_err(|e| {
            info!("{}", e.fault());
            INCORRECT_PARAMETERS
        })
}

fn run_credit(args: CreditArgs) -> bool {
    match credit_report(args) {
        Ok(report) => {
            println!("{}", report);
            true
        }
        Err(message) => {
            println!("{}", message);
            false
        }
    }
}

fn stdin_console() -> Console<StdinLock<'static>, Stdout> {
    Console::new(io::stdin().lock(), io::stdout())
}

fn run_markdown(output: &Path) -> Result<(), SessionError> {
    let document = Editor::new(stdin_console()).run()?;
    markdown::save(output, &document)?;
    info!("saved {} bytes to {}", document.len(), output.display());
    Ok(())
}

fn run_rps(ratings: &Path) -> Result<(), SessionError> {
    let rating = rps::run(&mut stdin_console(), ratings, &mut rand::thread_rng())?;
    info!("final rating {}", rating);
    Ok(())
}

fn run_quiz(results: &Path) -> Result<(), SessionError> {
    if let Some(record) = quiz::run(&mut stdin_console(), results, &mut rand::thread_rng())? {
        info!("saved \"{}\" to {}", record, results.display());
    }
    Ok(())
}

fn report_session(outcome: Result<(), SessionError>) -> bool {
    match outcome {
        Ok(()) => true,
        Err(e) => {
            eprintln!("error: {}", e);
            false
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = SimpleLogger::new().with_level(log_level(cli.verbose)).init() {
        eprintln!("logger unavailable: {}", e);
    }

    let ok = match cli.command {
        Commands::Credit(args) => run_credit(args),
        Commands::Markdown { output } => report_session(run_markdown(&output)),
        Commands::Rps { ratings } => report_session(run_rps(&ratings)),
        Commands::Quiz { results } => report_session(run_quiz(&results)),
    };

    if !ok {
        process::exit(1);
    }
}
