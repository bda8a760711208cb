// crates/compliance-gate-cli/src/main.rs
// ============================================================================
// Module: Compliance Gate CLI Entry Point
// Description: Command dispatcher for compliance check rebuild workflows.
// Purpose: Provide rebuild, categorize, and check inspection commands over a
//          SQLite-backed store.
// Dependencies: clap, compliance-gate-core, compliance-gate-store-sqlite,
//               serde, serde_json, thiserror.
// ============================================================================

//! ## Overview
//! The Compliance Gate CLI drives the extraction pipeline against a local
//! `SQLite` database: `rebuild` replaces compliance check rows for one or all
//! policies, `categorize` scores uncategorized catalog settings into template
//! families (optionally writing the winners back), and `checks` lists the
//! stored rows for one policy. Every command supports `--json` for
//! machine-readable output.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use compliance_gate_core::BatchOutcome;
use compliance_gate_core::CheckBuilder;
use compliance_gate_core::CheckStore;
use compliance_gate_core::ComplianceCheck;
use compliance_gate_core::Policy;
use compliance_gate_core::PolicyFeed;
use compliance_gate_core::PolicyId;
use compliance_gate_core::PolicyOutcome;
use compliance_gate_core::SettingCatalog;
use compliance_gate_core::SettingDefinition;
use compliance_gate_core::TemplateFamily;
use compliance_gate_core::Timestamp;
use compliance_gate_core::categorize;
use compliance_gate_store_sqlite::SqliteComplianceStore;
use compliance_gate_store_sqlite::SqliteStoreConfig;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "compliance-gate", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Rebuild compliance check rows for one or all policies.
    Rebuild(RebuildCommand),
    /// Score uncategorized catalog settings into template families.
    Categorize(CategorizeCommand),
    /// List stored compliance check rows for one policy.
    Checks(ChecksCommand),
}

/// Arguments for the `rebuild` command.
#[derive(Args, Debug)]
struct RebuildCommand {
    /// Path to the SQLite database file.
    #[arg(long, value_name = "PATH")]
    db: PathBuf,
    /// Rebuild only this policy id instead of the full batch.
    #[arg(long, value_name = "ID")]
    policy: Option<u64>,
    /// Override the row timestamp (unix milliseconds) instead of wall clock.
    #[arg(long, value_name = "MS")]
    now_ms: Option<i64>,
    /// Emit the batch outcome as JSON.
    #[arg(long)]
    json: bool,
}

/// Arguments for the `categorize` command.
#[derive(Args, Debug)]
struct CategorizeCommand {
    /// Path to the SQLite database file.
    #[arg(long, value_name = "PATH")]
    db: PathBuf,
    /// Write winning families back to the catalog.
    #[arg(long)]
    apply: bool,
    /// Emit the categorization report as JSON.
    #[arg(long)]
    json: bool,
}

/// Arguments for the `checks` command.
#[derive(Args, Debug)]
struct ChecksCommand {
    /// Path to the SQLite database file.
    #[arg(long, value_name = "PATH")]
    db: PathBuf,
    /// Policy id whose rows are listed.
    #[arg(long, value_name = "ID")]
    policy: u64,
    /// Emit the rows as JSON.
    #[arg(long)]
    json: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Rebuild(command) => command_rebuild(&command),
        Commands::Categorize(command) => command_categorize(&command),
        Commands::Checks(command) => command_checks(&command),
    }
}

// ============================================================================
// SECTION: Rebuild Command
// ============================================================================

/// Executes the `rebuild` command.
fn command_rebuild(command: &RebuildCommand) -> CliResult<ExitCode> {
    let store = open_store(&command.db)?;
    let settings = store
        .load_active_settings()
        .map_err(|err| CliError::new(format!("catalog load failed: {err}")))?;
    let policies = resolve_policies(&store, command.policy)?;
    let now = resolve_now(command.now_ms)?;

    let builder = CheckBuilder::new(&store, &settings, now);
    let outcome = builder.rebuild_all(&policies);

    if command.json {
        write_stdout_line(&to_json(&outcome)?)?;
    } else {
        render_rebuild_text(&outcome)?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Loads the requested policy set: one policy by id, or the full feed.
fn resolve_policies(
    store: &SqliteComplianceStore,
    policy: Option<u64>,
) -> CliResult<Vec<Policy>> {
    match policy {
        Some(raw) => {
            let id = parse_policy_id(raw)?;
            let policy = store
                .load_policy(id)
                .map_err(|err| CliError::new(format!("policy load failed: {err}")))?
                .ok_or_else(|| CliError::new(format!("policy {id} not found")))?;
            Ok(vec![policy])
        }
        None => store
            .load_policies()
            .map_err(|err| CliError::new(format!("policy load failed: {err}"))),
    }
}

/// Resolves the row timestamp from the override or the wall clock.
fn resolve_now(override_unix_ms: Option<i64>) -> CliResult<Timestamp> {
    if let Some(value) = override_unix_ms {
        if value < 0 {
            return Err(CliError::new(
                "timestamp override must be non-negative".to_string(),
            ));
        }
        return Ok(Timestamp::from_unix_millis(value));
    }
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|err| CliError::new(format!("system clock unavailable: {err}")))?;
    let millis = i64::try_from(duration.as_millis())
        .map_err(|_| CliError::new("system clock out of range".to_string()))?;
    Ok(Timestamp::from_unix_millis(millis))
}

/// Renders the batch outcome as human-readable text.
fn render_rebuild_text(outcome: &BatchOutcome) -> CliResult<()> {
    for policy in &outcome.policies {
        write_stdout_line(&render_policy_line(policy))?;
    }
    write_stdout_line(&format!(
        "processed {} policies ({} skipped), wrote {} checks ({} compliant, {} noncompliant)",
        outcome.policies_processed,
        outcome.policies_skipped,
        outcome.checks_written,
        outcome.compliant,
        outcome.noncompliant,
    ))?;
    Ok(())
}

/// Renders one policy outcome line.
fn render_policy_line(outcome: &PolicyOutcome) -> String {
    match &outcome.skipped {
        Some(reason) => format!("policy {}: skipped ({reason})", outcome.policy_id),
        None => format!(
            "policy {}: {} settings considered, {} checks written ({} compliant, {} noncompliant)",
            outcome.policy_id,
            outcome.settings_considered,
            outcome.checks_written,
            outcome.compliant,
            outcome.noncompliant,
        ),
    }
}

// ============================================================================
// SECTION: Categorize Command
// ============================================================================

/// One row of the categorization report.
#[derive(Debug, Serialize)]
struct CategorizeRow {
    /// Catalog setting id.
    setting_id: u64,
    /// Setting display name.
    display_name: String,
    /// Winning family label, when any family scored.
    family: Option<&'static str>,
    /// Confidence tier label for the winning score.
    confidence: &'static str,
    /// Whether the winner was written back to the catalog.
    applied: bool,
}

/// Executes the `categorize` command.
fn command_categorize(command: &CategorizeCommand) -> CliResult<ExitCode> {
    let store = open_store(&command.db)?;
    let settings = store
        .load_all_settings()
        .map_err(|err| CliError::new(format!("catalog load failed: {err}")))?;

    let mut rows = Vec::new();
    for setting in settings
        .iter()
        .filter(|setting| setting.family == TemplateFamily::Uncategorized)
    {
        let row = categorize_setting(&store, setting, command.apply)?;
        rows.push(row);
    }

    if command.json {
        write_stdout_line(&to_json(&rows)?)?;
    } else {
        for row in &rows {
            write_stdout_line(&render_categorize_line(row))?;
        }
        write_stdout_line(&format!("scored {} uncategorized settings", rows.len()))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Scores one setting and optionally writes the winner back.
fn categorize_setting(
    store: &SqliteComplianceStore,
    setting: &SettingDefinition,
    apply: bool,
) -> CliResult<CategorizeRow> {
    let outcome = categorize(
        &setting.display_name,
        setting.description.as_deref(),
        setting.platform,
    );
    let mut applied = false;
    if apply && let Some(family) = outcome.family {
        applied = store
            .assign_family(setting.id, family)
            .map_err(|err| CliError::new(format!("family update failed: {err}")))?;
    }
    Ok(CategorizeRow {
        setting_id: setting.id.get(),
        display_name: setting.display_name.clone(),
        family: outcome.family.map(TemplateFamily::as_str),
        confidence: outcome.confidence.as_str(),
        applied,
    })
}

/// Renders one categorization row as human-readable text.
fn render_categorize_line(row: &CategorizeRow) -> String {
    let family = row.family.unwrap_or("(none)");
    let suffix = if row.applied { " [applied]" } else { "" };
    format!(
        "setting {} ({}): {family} / {}{suffix}",
        row.setting_id, row.display_name, row.confidence,
    )
}

// ============================================================================
// SECTION: Checks Command
// ============================================================================

/// Executes the `checks` command.
fn command_checks(command: &ChecksCommand) -> CliResult<ExitCode> {
    let store = open_store(&command.db)?;
    let id = parse_policy_id(command.policy)?;
    let checks = store
        .list_checks(id)
        .map_err(|err| CliError::new(format!("check load failed: {err}")))?;

    if command.json {
        write_stdout_line(&to_json(&checks)?)?;
    } else {
        for check in &checks {
            write_stdout_line(&render_check_line(check))?;
        }
        write_stdout_line(&format!("{} checks stored for policy {id}", checks.len()))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Renders one stored check row as human-readable text.
fn render_check_line(check: &ComplianceCheck) -> String {
    let verdict = if check.is_compliant {
        "compliant"
    } else {
        "noncompliant"
    };
    format!(
        "setting {}: {verdict} (expected \"{}\", actual \"{}\")",
        check.setting_id, check.expected_value, check.actual_value,
    )
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Opens the `SQLite` store at the given path with default pragmas.
fn open_store(path: &std::path::Path) -> CliResult<SqliteComplianceStore> {
    let config = SqliteStoreConfig::new(path);
    SqliteComplianceStore::open(&config)
        .map_err(|err| CliError::new(format!("store open failed: {err}")))
}

/// Parses a raw policy id argument.
fn parse_policy_id(raw: u64) -> CliResult<PolicyId> {
    PolicyId::from_raw(raw)
        .ok_or_else(|| CliError::new("policy id must be >= 1".to_string()))
}

/// Serializes a report value as pretty JSON.
fn to_json<T: Serialize>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(format!("json encode failed: {err}")))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
        .map_err(|err| CliError::new(format!("stdout write failed: {err}")))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits a final error message and returns the failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
