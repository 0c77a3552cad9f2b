// Rebalance CLI - stock transfer suggestions from inventory spreadsheets

mod exit_codes;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rebalance_cli::{GenerateResponse, ServiceError, TransferService, Upload};
use rebalance_engine::{EngineError, StoreSchema, TransferConfig};

use exit_codes::{
    EXIT_ERROR, EXIT_INVALID_CONFIG, EXIT_READ, EXIT_SUCCESS, EXIT_USAGE, EXIT_WRITE,
    service_exit_code,
};

#[derive(Parser)]
#[command(name = "rebalance")]
#[command(about = "Suggest stock transfers between stores from an inventory spreadsheet")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Log progress to stderr (-v info, -vv debug; RUST_LOG overrides)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive transfer suggestions from an inventory spreadsheet
    #[command(after_help = "\
Examples:
  rebalance suggest estoque.xlsx
  rebalance suggest estoque.xlsx --json > sugestoes.json
  rebalance suggest estoque.xlsx --export-dir relatorios/
  rebalance suggest estoque.xls --config lojas.toml --diagnostics")]
    Suggest {
        /// Inventory spreadsheet (.xlsx or .xls)
        file: PathBuf,

        /// Store layout config (TOML); defaults apply when omitted
        #[arg(long, env = "REBALANCE_CONFIG")]
        config: Option<PathBuf>,

        /// Print the generate response as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Also write the report workbook into this directory
        #[arg(long, value_name = "DIR")]
        export_dir: Option<PathBuf>,

        /// List product rows that were admitted but skipped
        #[arg(long)]
        diagnostics: bool,

        /// Suppress the summary on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Print the store list and the columns read for each store
    Stores {
        /// Store layout config (TOML); defaults apply when omitted
        #[arg(long, env = "REBALANCE_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Check a store layout config file
    Validate {
        /// Config file to check
        config: PathBuf,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  rebalance-engine ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None => {
            eprintln!("Usage: rebalance <command> [options]");
            eprintln!("       rebalance --help for more information");
            Err(CliError { code: EXIT_USAGE, message: String::new(), hint: None })
        }
        Some(Commands::Suggest {
            file,
            config,
            json,
            export_dir,
            diagnostics,
            quiet,
        }) => cmd_suggest(&file, config.as_deref(), json, export_dir.as_deref(), diagnostics, quiet),
        Some(Commands::Stores { config }) => cmd_stores(config.as_deref()),
        Some(Commands::Validate { config }) => cmd_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn read(msg: impl Into<String>) -> Self {
        Self { code: EXIT_READ, message: msg.into(), hint: None }
    }

    pub fn write(msg: impl Into<String>) -> Self {
        Self { code: EXIT_WRITE, message: msg.into(), hint: None }
    }

    pub fn config(err: EngineError) -> Self {
        Self { code: EXIT_INVALID_CONFIG, message: err.to_string(), hint: None }
    }

    /// Create error from a service error with proper exit code.
    pub fn service(err: ServiceError) -> Self {
        let hint = match &err {
            ServiceError::LayoutNotFound { .. } => Some(
                "the first sheet needs the store header row; set `anchor` or `stores` in --config for other layouts"
                    .to_string(),
            ),
            ServiceError::UnsupportedFile { .. } => {
                Some("save the inventory as .xlsx or .xls".to_string())
            }
            ServiceError::EmptyReport => {
                Some("no store had idle stock with sales elsewhere; nothing to export".to_string())
            }
            _ => None,
        };
        Self { code: service_exit_code(&err), message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// Config
// ============================================================================

fn load_config(path: Option<&Path>) -> Result<TransferConfig, CliError> {
    let Some(path) = path else {
        return Ok(TransferConfig::default());
    };
    let text = fs::read_to_string(path)
        .map_err(|e| CliError::read(format!("cannot read config {}: {}", path.display(), e)))?;
    TransferConfig::from_toml(&text)
        .map_err(|e| CliError::config(e).with_hint(format!("in {}", path.display())))
}

/// Convert column index to spreadsheet column letter (0 = A, 26 = AA).
fn col_to_letter(col: usize) -> String {
    let mut letters = Vec::new();
    let mut n = col;
    loop {
        letters.push((b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.iter().rev().collect()
}

// ============================================================================
// suggest
// ============================================================================

fn cmd_suggest(
    file: &Path,
    config: Option<&Path>,
    json: bool,
    export_dir: Option<&Path>,
    diagnostics: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let config = load_config(config)?;
    let service = TransferService::new(config).map_err(CliError::service)?;

    let bytes = fs::read(file)
        .map_err(|e| CliError::read(format!("cannot read {}: {}", file.display(), e)))?;
    let filename = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let response = service
        .generate(Upload { filename, bytes })
        .map_err(CliError::service)?;

    if json {
        let text = serde_json::to_string_pretty(&response)
            .map_err(|e| CliError::general(format!("cannot serialize response: {}", e)))?;
        println!("{}", text);
    } else {
        print_suggestions(&response)?;
    }

    if diagnostics {
        for diag in &response.diagnostics {
            eprintln!("row {}: skipped ({})", diag.row + 1, diag.reason);
        }
    }

    if !quiet {
        eprintln!(
            "{} suggestions from {} products",
            response.total_suggestions, response.processed_products
        );
    }

    if let Some(dir) = export_dir {
        let export = service.export(&response.handle).map_err(CliError::service)?;
        let path = dir.join(&export.filename);
        fs::write(&path, &export.bytes)
            .map_err(|e| CliError::write(format!("cannot write {}: {}", path.display(), e)))?;
        if !quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    Ok(())
}

fn print_suggestions(response: &GenerateResponse) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let io_err = |e: io::Error| CliError::general(format!("cannot write to stdout: {}", e));

    writeln!(out, "code\tdescription\torigin\torigin_stock\tdestination\tdestination_sales\tquantity")
        .map_err(io_err)?;
    for s in &response.suggestions {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            s.product_code,
            s.product_description,
            s.origin_store,
            s.origin_stock,
            s.destination_store,
            s.destination_sales,
            s.transfer_quantity
        )
        .map_err(io_err)?;
    }
    Ok(())
}

// ============================================================================
// stores / validate
// ============================================================================

fn cmd_stores(config: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(config)?;
    let schema = StoreSchema::from_config(&config);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let io_err = |e: io::Error| CliError::general(format!("cannot write to stdout: {}", e));

    writeln!(out, "anchor\t{}", config.anchor()).map_err(io_err)?;
    for columns in schema.columns() {
        writeln!(
            out,
            "{}\tsales={}\tstock={}",
            columns.store,
            col_to_letter(columns.sales_col),
            col_to_letter(columns.stock_col)
        )
        .map_err(io_err)?;
    }
    Ok(())
}

fn cmd_validate(path: &Path) -> Result<(), CliError> {
    let config = load_config(Some(path))?;
    eprintln!(
        "ok: {} stores, anchor '{}', metrics from column {}",
        config.stores.len(),
        config.anchor(),
        col_to_letter(config.metrics_start_col)
    );
    Ok(())
}
