//! `smatch run` and `smatch validate`: config-driven matching runs.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use stockmatch_matcher::{MatchConfig, MatchInput, MatchResult};

use crate::exit_codes::{match_error_exit_code, EXIT_ERROR, EXIT_INPUT, EXIT_OUTPUT, EXIT_USAGE};
use crate::CliError;

fn run_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

fn load_config(config_path: &Path) -> Result<MatchConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| {
        run_err(EXIT_USAGE, format!("cannot read config {}: {e}", config_path.display()))
    })?;
    MatchConfig::from_toml(&config_str).map_err(|e| run_err(match_error_exit_code(&e), e.to_string()))
}

/// Resolve a path from the config relative to the config file's directory.
fn resolve(base_dir: &Path, file: &str) -> PathBuf {
    base_dir.join(file)
}

fn base_dir(config_path: &Path) -> &Path {
    config_path.parent().unwrap_or_else(|| Path::new("."))
}

pub fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let base_dir = base_dir(&config_path);

    // Load every input table before touching any output
    let mut suppliers = HashMap::new();
    for supplier in &config.suppliers {
        let path = resolve(base_dir, &supplier.file);
        let table = stockmatch_io::load_table(&supplier.source, &path, supplier.sheet.as_deref())
            .map_err(|e| run_err(EXIT_INPUT, e))?;
        suppliers.insert(supplier.source.clone(), table);
    }
    let buyers_path = resolve(base_dir, &config.buyers.file);
    let buyers = stockmatch_io::load_table(
        "buyer_preferences",
        &buyers_path,
        config.buyers.sheet.as_deref(),
    )
    .map_err(|e| run_err(EXIT_INPUT, e))?;

    let input = MatchInput { suppliers, buyers };

    let result = stockmatch_matcher::run(&config, &input).map_err(|e| {
        let code = match_error_exit_code(&e);
        let err = run_err(code, e.to_string());
        match e {
            stockmatch_matcher::MatchError::DuplicateBuyer { .. } => err
                .with_hint("set [buyers] on_duplicate = \"last_wins\" to keep the later row"),
            stockmatch_matcher::MatchError::MissingColumn { .. } => err.with_hint(
                "override header names under [suppliers.dimensional.columns], [suppliers.described.columns] or [buyers.columns]",
            ),
            _ => err,
        }
    })?;

    write_outputs(&config, base_dir, &result, output_file.as_deref())?;

    let json_str = if json_output {
        Some(stockmatch_io::json::to_string(&result).map_err(|e| run_err(EXIT_ERROR, e))?)
    } else {
        None
    };

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    match json_str {
        Some(s) => writeln!(handle, "{s}").map_err(|e| run_err(EXIT_OUTPUT, e.to_string()))?,
        None => stockmatch_io::csv::write_recommendations(result.presented(), &mut handle)
            .map_err(|e| run_err(EXIT_OUTPUT, e))?,
    }

    if !quiet {
        print_summary(&result);
    }
    Ok(())
}

/// One configured or requested output file.
enum OutputTarget {
    Csv(PathBuf),
    Json(PathBuf),
    Sqlite(PathBuf),
    /// `--output`, relative to the working directory rather than the config
    JsonFlag(PathBuf),
}

impl OutputTarget {
    fn path(&self) -> &Path {
        match self {
            OutputTarget::Csv(p)
            | OutputTarget::Json(p)
            | OutputTarget::Sqlite(p)
            | OutputTarget::JsonFlag(p) => p,
        }
    }
}

fn output_err(e: String) -> CliError {
    run_err(EXIT_OUTPUT, format!("cannot write output: {e}"))
}

fn write_outputs(
    config: &MatchConfig,
    base_dir: &Path,
    result: &MatchResult,
    output_file: Option<&Path>,
) -> Result<(), CliError> {
    let mut outputs = Vec::new();
    if let Some(ref csv) = config.output.csv {
        outputs.push(OutputTarget::Csv(resolve(base_dir, csv)));
    }
    if let Some(ref json) = config.output.json {
        outputs.push(OutputTarget::Json(resolve(base_dir, json)));
    }
    if let Some(ref sqlite) = config.output.sqlite {
        outputs.push(OutputTarget::Sqlite(resolve(base_dir, sqlite)));
    }
    if let Some(path) = output_file {
        outputs.push(OutputTarget::JsonFlag(path.to_path_buf()));
    }

    // Every target must be writable before any previous output is replaced
    for output in &outputs {
        stockmatch_io::check_writable(output.path()).map_err(output_err)?;
    }

    for output in &outputs {
        match output {
            OutputTarget::Csv(path) => {
                stockmatch_io::csv::export_recommendations(result.presented(), path).map_err(output_err)?;
                tracing::info!(path = %path.display(), "wrote CSV recommendations");
            }
            OutputTarget::Json(path) => {
                stockmatch_io::json::export(result, path).map_err(output_err)?;
                tracing::info!(path = %path.display(), "wrote JSON result");
            }
            OutputTarget::Sqlite(path) => {
                stockmatch_io::store::save(result, path).map_err(output_err)?;
                tracing::info!(path = %path.display(), "wrote SQLite store");
            }
            OutputTarget::JsonFlag(path) => {
                stockmatch_io::json::export(result, path).map_err(output_err)?;
                eprintln!("wrote {}", path.display());
            }
        }
    }

    Ok(())
}

/// Human summary to stderr.
fn print_summary(result: &MatchResult) {
    let s = &result.summary;
    for source in &s.sources {
        eprintln!(
            "{} ({}): {} rows, {} loaded, {} filtered, {} dropped",
            source.source, source.layout, source.rows, source.loaded, source.filtered, source.dropped,
        );
    }
    eprintln!(
        "{} buyers x {} items: {} pairs, {} eligible, {} recommendations",
        s.buyers, s.supplier_items, s.pairs_evaluated, s.eligible_pairs, s.recommendations,
    );
    eprintln!(
        "rejected: {} grade, {} finish, {} weight, {} quantity",
        s.rejected.grade, s.rejected.finish, s.rejected.weight, s.rejected.quantity,
    );
    if !s.buyers_without_candidates.is_empty() {
        eprintln!("no candidates: {}", s.buyers_without_candidates.join(", "));
    }
    if s.diagnostics > 0 {
        eprintln!("{} records skipped (see warnings above)", s.diagnostics);
    }
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let sources: Vec<String> = config
        .suppliers
        .iter()
        .map(|s| format!("{} ({})", s.source, s.layout))
        .collect();
    println!(
        "config OK: \"{}\"; suppliers: {}; top_k = {}; finish vocabulary = {}",
        config.name,
        sources.join(", "),
        config.matching.top_k,
        config.matching.finish_vocabulary,
    );
    Ok(())
}
