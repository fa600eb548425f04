use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Result};
use clap::Parser;
use htmltab::{
    run, ExtractOptions, HtmltabError, InputSource, NumberFormat, Options, Output,
    DEFAULT_CURRENCY_SYMBOLS, DEFAULT_NULL_VALUES,
};
use tracing_subscriber::EnvFilter;

/// Select a table within an HTML document and convert it to CSV.
///
/// By default the first table element is converted. Pass an integer index,
/// a CSS selector, or an XPath expression to --select to pick another one:
///
///   htmltab --select 4 foo.html
///   htmltab --select table#data foo.html
///   htmltab --select "(//div[@id='bar']//table)[2]/tbody/tr" foo.html
#[derive(Debug, Parser)]
#[command(name = "htmltab", version, verbatim_doc_comment)]
struct Cli {
    /// HTML file path, '-' for stdin, or an http(s) URL
    #[arg(value_name = "HTML_FILE", default_value = "-")]
    input: String,

    /// Integer index, CSS selector, or XPath expression that determines the table to convert
    #[arg(short, long, default_value = "1")]
    select: String,

    /// Case-sensitive value to convert to an empty cell. Repeatable [default: NA, N/A, ., -]
    #[arg(short = 'n', long = "null-value")]
    null_values: Vec<String>,

    /// Convert number-like strings into numbers (default)
    #[arg(short = 'c', long, overrides_with = "keep_numbers")]
    convert_numbers: bool,

    /// Leave number-like strings unchanged
    #[arg(short = 'k', long, overrides_with = "convert_numbers")]
    keep_numbers: bool,

    /// Symbol used to group digits in numbers (e.g. the ',' in '1,000.00')
    #[arg(short, long, default_value = ",")]
    group_symbol: String,

    /// Symbol separating integer from fraction (e.g. the '.' in '1,000.00')
    #[arg(short, long, default_value = ".")]
    decimal_symbol: String,

    /// Currency symbol to remove when converting numbers. Repeatable [default: $, ¥, £, €]
    #[arg(short = 'u', long = "currency-symbol")]
    currency_symbols: Vec<String>,

    /// Write output to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn build_options(cli: &Cli) -> Result<Options> {
    if cli.decimal_symbol.is_empty() {
        bail!("--decimal-symbol must not be empty");
    }

    let null_values = if cli.null_values.is_empty() {
        DEFAULT_NULL_VALUES.iter().map(|s| s.to_string()).collect()
    } else {
        cli.null_values.clone()
    };
    let currency_symbols = if cli.currency_symbols.is_empty() {
        DEFAULT_CURRENCY_SYMBOLS.iter().map(|s| s.to_string()).collect()
    } else {
        cli.currency_symbols.clone()
    };

    Ok(Options {
        select: cli.select.clone(),
        extract: ExtractOptions {
            null_values,
            convert_numbers: cli.convert_numbers || !cli.keep_numbers,
            number_format: NumberFormat {
                group_symbol: cli.group_symbol.clone(),
                decimal_symbol: cli.decimal_symbol.clone(),
                currency_symbols,
            },
        },
    })
}

fn run_cli(cli: &Cli) -> Result<()> {
    let options = build_options(cli)?;
    let input = InputSource::parse(&cli.input);
    let output = match &cli.output {
        Some(path) => Output::File(path.clone()),
        None => Output::Stdout,
    };
    run(&input, &output, &options)?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "htmltab=debug" } else { "htmltab=warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    match run_cli(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {error:#}");
            let code = error
                .downcast_ref::<HtmltabError>()
                .map_or(2, HtmltabError::exit_code);
            ExitCode::from(code)
        }
    }
}
