use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rox::ast_printer::AstPrinter;
use rox::parser::Parser;
use rox::scanner::Scanner;
use rox::token::Token;
use rox::{Lox, Report};

/// Exit status after a lexical, syntax or resolution error.
const EXIT_STATIC_ERROR: u8 = 65;

/// Exit status after a runtime error.
const EXIT_RUNTIME_ERROR: u8 = 70;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize { filename: PathBuf },

    /// Parses input from a file and prints its AST
    Parse {
        filename: PathBuf,

        /// Print the AST as JSON instead of prefix form
        #[arg(long)]
        json: bool,
    },

    /// Runs a Lox program; without a file, starts an interactive prompt
    Run { filename: Option<PathBuf> },
}

/// Reads the contents of a file into a String
fn read_file(filename: PathBuf) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(&filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    String::from_utf8(buf).context(format!("{:?} is not valid UTF-8", filename))
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            // Strip 'rox::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("rox::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

/// Print every diagnostic of a run to stderr.
fn report_errors(report: &Report) {
    for e in report.errors() {
        eprintln!("{}", e);
    }
}

fn exit_code(report: &Report) -> ExitCode {
    if report.had_error() {
        ExitCode::from(EXIT_STATIC_ERROR)
    } else if report.had_runtime_error() {
        ExitCode::from(EXIT_RUNTIME_ERROR)
    } else {
        ExitCode::SUCCESS
    }
}

fn tokenize(filename: PathBuf) -> Result<ExitCode> {
    let source = read_file(filename)?;
    let mut tokenized = true;

    for token in Scanner::new(&source) {
        match token {
            Ok(token) => println!("{}", token),
            Err(e) => {
                tokenized = false;
                eprintln!("{}", e);
            }
        }
    }

    if !tokenized {
        debug!("Tokenization failed");
        return Ok(ExitCode::from(EXIT_STATIC_ERROR));
    }

    Ok(ExitCode::SUCCESS)
}

fn parse(filename: PathBuf, json: bool) -> Result<ExitCode> {
    let source = read_file(filename)?;
    let mut failed = false;

    let mut tokens: Vec<Token> = Vec::new();
    for token in Scanner::new(&source) {
        match token {
            Ok(token) => tokens.push(token),
            Err(e) => {
                failed = true;
                eprintln!("{}", e);
            }
        }
    }

    let parsed = Parser::new(tokens).parse();

    for e in &parsed.errors {
        failed = true;
        eprintln!("{}", e);
    }

    if json {
        let out = serde_json::to_string_pretty(&parsed.statements)
            .context("Failed to serialize AST")?;
        println!("{}", out);
    } else {
        for stmt in &parsed.statements {
            println!("{}", AstPrinter::print_stmt(stmt));
        }
    }

    if failed {
        return Ok(ExitCode::from(EXIT_STATIC_ERROR));
    }

    Ok(ExitCode::SUCCESS)
}

fn run_file(filename: PathBuf) -> Result<ExitCode> {
    let source = read_file(filename)?;
    debug!("Provided input:\n {}", source);

    let mut lox = Lox::new();
    let report = lox.run(&source);
    report_errors(&report);

    Ok(exit_code(&report))
}

/// Interactive prompt.  Globals persist between lines; errors do not.
fn run_prompt() -> Result<ExitCode> {
    let mut lox = Lox::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush prompt")?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read from stdin")?;

        let report = lox.run(&line);
        report_errors(&report);
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        Builder::new().filter_level(log::LevelFilter::Off).init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename } => tokenize(filename),
        Commands::Parse { filename, json } => parse(filename, json),
        Commands::Run {
            filename: Some(filename),
        } => run_file(filename),
        Commands::Run { filename: None } => run_prompt(),
    }
}
