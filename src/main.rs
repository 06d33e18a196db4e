use clap::{CommandFactory, Parser};
use codeseek::cli::{Cli, Commands};
use codeseek::config::Config;
use codeseek::error::{CodeseekError, Result as CodeseekResult};
use codeseek::list::list_directory;
use codeseek::metrics::Metrics;
use codeseek::output_formats::{OutputFormat, format_list_text, format_search_text};
use codeseek::search::{SearchEngine, SearchRequest};
use codeseek::tool::{self, ErrorResponse};
use colored::*;
use env_logger::{Builder, Env, Target};
use log::{error, info};
use std::fs;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = setup_logging(&cli) {
        eprintln!("{}", format!("Failed to initialise logging: {e}").red());
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            eprintln!("{}", e.to_string().red());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> CodeseekResult<ExitCode> {
    let start_time = Instant::now();
    info!("Application started with command: {:?}", cli.command);

    let config = Config::load(cli.config.as_deref())?;
    let metrics = Arc::new(Metrics::new()?);
    let engine = codeseek::engine_from_config(&config, Arc::clone(&metrics));

    let code = match &cli.command {
        Commands::Search {
            pattern,
            path,
            include,
            json,
        } => {
            let request = SearchRequest {
                pattern: pattern.clone(),
                path: path.clone(),
                include: include.clone(),
            };
            run_search(&engine, &request, OutputFormat::from_json_flag(*json))?
        }
        Commands::List { path, json } => match list_directory(path) {
            Ok(entries) => {
                match OutputFormat::from_json_flag(*json) {
                    OutputFormat::Json => println!("{}", serde_json::to_string(&entries)?),
                    OutputFormat::Text => println!("{}", format_list_text(&entries)),
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                if *json {
                    println!("{}", serde_json::to_string(&ErrorResponse::new(&e))?);
                    ExitCode::FAILURE
                } else {
                    return Err(e.into());
                }
            }
        },
        Commands::Stdio => {
            serve_stdio(&engine)?;
            ExitCode::SUCCESS
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "codeseek", &mut io::stdout());
            ExitCode::SUCCESS
        }
    };

    if cli.metrics {
        eprint!("{}", metrics.gather());
    }
    info!(
        "Application finished. Total elapsed time: {:.2?}",
        start_time.elapsed()
    );
    Ok(code)
}

fn run_search(
    engine: &SearchEngine,
    request: &SearchRequest,
    format: OutputFormat,
) -> CodeseekResult<ExitCode> {
    if format == OutputFormat::Json {
        let response = tool::search(engine, request);
        println!("{}", serde_json::to_string(&response)?);
        return Ok(match response {
            tool::SearchResponse::Success(_) => ExitCode::SUCCESS,
            tool::SearchResponse::Failure(_) => ExitCode::FAILURE,
        });
    }

    let outcome = engine.search(request)?;
    println!("{}", format_search_text(&outcome));
    Ok(ExitCode::SUCCESS)
}

/// One JSON request per input line, one JSON response per output line.
fn serve_stdio(engine: &SearchEngine) -> CodeseekResult<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = tool::handle_line(engine, &line)?;
        writeln!(stdout, "{response}")?;
        stdout.flush()?;
    }
    Ok(())
}

fn setup_logging(cli: &Cli) -> CodeseekResult<()> {
    let default_level = if cli.verbose { "debug" } else { "info" };
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level));

    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} [{}] [{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.module_path().unwrap_or("unknown"),
            record.args()
        )
    });

    if let Some(log_path) = &cli.log {
        if let Some(parent_dir) = log_path.parent() {
            if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                fs::create_dir_all(parent_dir).map_err(CodeseekError::Io)?;
            }
        }
        let log_file = fs::File::create(log_path).map_err(CodeseekError::Io)?;
        builder.target(Target::Pipe(Box::new(log_file)));
    } else {
        builder.target(Target::Stderr);
    }

    builder
        .try_init()
        .map_err(|e| CodeseekError::Other(e.to_string()))?;
    Ok(())
}
