// crates/compliance-gate-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Compliance Store
// Description: Durable policy, catalog, and compliance check tables.
// Purpose: Persist reference data and check rows with per-policy replacement.
// Dependencies: compliance-gate-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This module implements the persistence collaborator over `SQLite`. Four
//! tables hold the reference data and the engine's output: `policies`,
//! `setting_catalog`, `control_setting_mappings`, and
//! `setting_compliance_checks`, gated by a `store_meta` schema version row.
//! Check replacement runs DELETE plus INSERTs in one transaction scoped to
//! the policy id, so a rebuild is a full replace and a failed replace leaves
//! the prior rows intact. Connection access is serialized through a mutex,
//! which also provides the per-policy write serialization the engine
//! assumes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use compliance_gate_core::CatalogError;
use compliance_gate_core::CheckStore;
use compliance_gate_core::ComplianceCheck;
use compliance_gate_core::ConfidenceTier;
use compliance_gate_core::ControlId;
use compliance_gate_core::ControlSettingMapping;
use compliance_gate_core::FeedError;
use compliance_gate_core::Platform;
use compliance_gate_core::Policy;
use compliance_gate_core::PolicyFeed;
use compliance_gate_core::PolicyId;
use compliance_gate_core::PolicySource;
use compliance_gate_core::SettingCatalog;
use compliance_gate_core::SettingDefinition;
use compliance_gate_core::SettingId;
use compliance_gate_core::StoreError;
use compliance_gate_core::TemplateFamily;
use compliance_gate_core::TemplateId;
use compliance_gate_core::Timestamp;
use compliance_gate_core::ValidationOperator;
use compliance_gate_core::ValueKind;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` compliance store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Creates a config with default pragmas for the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by the `SQLite` compliance store.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Filesystem or connection error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// Database operation error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Stored data failed domain validation.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Stored schema version is incompatible.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
}

impl From<rusqlite::Error> for SqliteStoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Db(err.to_string())
    }
}

impl From<SqliteStoreError> for FeedError {
    fn from(err: SqliteStoreError) -> Self {
        match err {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) | SqliteStoreError::VersionMismatch(message) => {
                Self::Io(message)
            }
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

impl From<SqliteStoreError> for CatalogError {
    fn from(err: SqliteStoreError) -> Self {
        match err {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) | SqliteStoreError::VersionMismatch(message) => {
                Self::Io(message)
            }
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

impl From<SqliteStoreError> for StoreError {
    fn from(err: SqliteStoreError) -> Self {
        match err {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) | SqliteStoreError::VersionMismatch(message) => {
                Self::Store(message)
            }
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed compliance store.
///
/// # Invariants
/// - Connection access is serialized through a mutex.
/// - Check replacement is transactional and scoped to one policy id.
#[derive(Clone)]
pub struct SqliteComplianceStore {
    /// Shared connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteComplianceStore {
    /// Opens (and migrates) a store at the configured path.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened,
    /// pragmas fail, or the stored schema version is incompatible.
    pub fn open(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        let connection = Connection::open(&config.path)
            .map_err(|err| SqliteStoreError::Io(err.to_string()))?;
        connection.execute_batch("PRAGMA foreign_keys = ON;")?;
        connection.execute_batch(&format!(
            "PRAGMA journal_mode = {};",
            config.journal_mode.pragma_value()
        ))?;
        connection.execute_batch(&format!(
            "PRAGMA synchronous = {};",
            config.sync_mode.pragma_value()
        ))?;
        connection
            .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))?;
        initialize_schema(&connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Locks the shared connection, surfacing poisoning as a db error.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("connection mutex poisoned".to_string()))
    }

    /// Inserts or replaces one policy row (administrative/import path).
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn upsert_policy(&self, policy: &Policy) -> Result<(), SqliteStoreError> {
        let guard = self.lock()?;
        guard.execute(
            "INSERT OR REPLACE INTO policies
                 (id, display_name, template_id, family, source, platform, document)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                to_db_id(policy.id.get())?,
                policy.display_name,
                policy.template_id.as_str(),
                policy.family.as_str(),
                policy.source.as_str(),
                policy.platform.map(Platform::as_str),
                policy.document,
            ],
        )?;
        Ok(())
    }

    /// Inserts or replaces one setting definition (administrative/import path).
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn upsert_setting(&self, setting: &SettingDefinition) -> Result<(), SqliteStoreError> {
        let aliases = serde_json::to_string(&setting.aliases)
            .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        let guard = self.lock()?;
        guard.execute(
            "INSERT OR REPLACE INTO setting_catalog
                 (id, display_name, description, setting_name, setting_path, aliases,
                  expected_value, operator, value_kind, template_id, family, platform,
                  is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                to_db_id(setting.id.get())?,
                setting.display_name,
                setting.description,
                setting.setting_name,
                setting.setting_path,
                aliases,
                setting.expected_value,
                setting.operator.as_str(),
                setting.value_kind.as_str(),
                setting.template_id.as_str(),
                setting.family.as_str(),
                setting.platform.map(Platform::as_str),
                setting.is_active,
            ],
        )?;
        Ok(())
    }

    /// Inserts or replaces one control mapping (administrative/import path).
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn upsert_mapping(
        &self,
        mapping: &ControlSettingMapping,
    ) -> Result<(), SqliteStoreError> {
        let guard = self.lock()?;
        guard.execute(
            "INSERT OR REPLACE INTO control_setting_mappings
                 (setting_id, control_id, confidence, rationale)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                to_db_id(mapping.setting_id.get())?,
                mapping.control_id.as_str(),
                mapping.confidence.as_str(),
                mapping.rationale,
            ],
        )?;
        Ok(())
    }

    /// Updates one setting's template family (administrative repair path).
    ///
    /// Returns true when a row was updated. The extraction engine itself
    /// never calls this; only the categorize workflow does.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn assign_family(
        &self,
        setting_id: SettingId,
        family: TemplateFamily,
    ) -> Result<bool, SqliteStoreError> {
        let guard = self.lock()?;
        let updated = guard.execute(
            "UPDATE setting_catalog SET family = ?1 WHERE id = ?2",
            params![family.as_str(), to_db_id(setting_id.get())?],
        )?;
        Ok(updated > 0)
    }

    /// Loads every setting definition, active or not (categorize workflow).
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when loading fails.
    pub fn load_all_settings(&self) -> Result<Vec<SettingDefinition>, SqliteStoreError> {
        self.query_settings("SELECT id, display_name, description, setting_name, setting_path,
                 aliases, expected_value, operator, value_kind, template_id, family,
                 platform, is_active
             FROM setting_catalog ORDER BY id")
    }

    /// Runs a settings query and converts the rows.
    fn query_settings(&self, sql: &str) -> Result<Vec<SettingDefinition>, SqliteStoreError> {
        let guard = self.lock()?;
        let mut statement = guard.prepare(sql)?;
        let rows = statement.query_map([], |row| {
            Ok(RawSettingRow {
                id: row.get(0)?,
                display_name: row.get(1)?,
                description: row.get(2)?,
                setting_name: row.get(3)?,
                setting_path: row.get(4)?,
                aliases: row.get(5)?,
                expected_value: row.get(6)?,
                operator: row.get(7)?,
                value_kind: row.get(8)?,
                template_id: row.get(9)?,
                family: row.get(10)?,
                platform: row.get(11)?,
                is_active: row.get(12)?,
            })
        })?;
        let mut settings = Vec::new();
        for row in rows {
            settings.push(setting_from_row(row?)?);
        }
        Ok(settings)
    }

    /// Runs a policies query with the given parameters.
    fn query_policies(
        &self,
        sql: &str,
        parameters: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<Policy>, SqliteStoreError> {
        let guard = self.lock()?;
        let mut statement = guard.prepare(sql)?;
        let rows = statement.query_map(parameters, |row| {
            Ok(RawPolicyRow {
                id: row.get(0)?,
                display_name: row.get(1)?,
                template_id: row.get(2)?,
                family: row.get(3)?,
                source: row.get(4)?,
                platform: row.get(5)?,
                document: row.get(6)?,
            })
        })?;
        let mut policies = Vec::new();
        for row in rows {
            policies.push(policy_from_row(row?)?);
        }
        Ok(policies)
    }
}

// ============================================================================
// SECTION: Interface Implementations
// ============================================================================

impl PolicyFeed for SqliteComplianceStore {
    fn load_policies(&self) -> Result<Vec<Policy>, FeedError> {
        Ok(self.query_policies(
            "SELECT id, display_name, template_id, family, source, platform, document
             FROM policies ORDER BY id",
            &[],
        )?)
    }

    fn load_policy(&self, policy_id: PolicyId) -> Result<Option<Policy>, FeedError> {
        let db_id = to_db_id(policy_id.get())?;
        let policies = self.query_policies(
            "SELECT id, display_name, template_id, family, source, platform, document
             FROM policies WHERE id = ?1",
            &[&db_id],
        )?;
        Ok(policies.into_iter().next())
    }
}

impl SettingCatalog for SqliteComplianceStore {
    fn load_active_settings(&self) -> Result<Vec<SettingDefinition>, CatalogError> {
        Ok(self.query_settings(
            "SELECT id, display_name, description, setting_name, setting_path,
                 aliases, expected_value, operator, value_kind, template_id, family,
                 platform, is_active
             FROM setting_catalog WHERE is_active = 1 ORDER BY id",
        )?)
    }

    fn load_control_mappings(&self) -> Result<Vec<ControlSettingMapping>, CatalogError> {
        let guard = self.lock()?;
        let result: Result<Vec<ControlSettingMapping>, SqliteStoreError> = (|| {
            let mut statement = guard.prepare(
                "SELECT setting_id, control_id, confidence, rationale
                 FROM control_setting_mappings ORDER BY setting_id, control_id",
            )?;
            let rows = statement.query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            })?;
            let mut mappings = Vec::new();
            for row in rows {
                let (setting_id, control_id, confidence, rationale) = row?;
                mappings.push(ControlSettingMapping {
                    setting_id: setting_id_from_db(setting_id)?,
                    control_id: ControlId::new(control_id),
                    confidence: ConfidenceTier::parse(&confidence).ok_or_else(|| {
                        SqliteStoreError::Invalid(format!("unknown confidence: {confidence}"))
                    })?,
                    rationale,
                });
            }
            Ok(mappings)
        })();
        Ok(result?)
    }
}

impl CheckStore for SqliteComplianceStore {
    fn replace_checks(
        &self,
        policy_id: PolicyId,
        checks: &[ComplianceCheck],
    ) -> Result<(), StoreError> {
        let db_id = to_db_id(policy_id.get())?;
        for check in checks {
            if check.policy_id != policy_id {
                return Err(StoreError::Invalid(format!(
                    "check for policy {} supplied to replace for policy {policy_id}",
                    check.policy_id
                )));
            }
        }
        let mut guard = self.lock()?;
        let result: Result<(), SqliteStoreError> = (|| {
            let tx = guard.transaction()?;
            tx.execute(
                "DELETE FROM setting_compliance_checks WHERE policy_id = ?1",
                params![db_id],
            )?;
            for check in checks {
                tx.execute(
                    "INSERT INTO setting_compliance_checks
                         (policy_id, setting_id, expected_value, actual_value,
                          is_compliant, last_checked)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        db_id,
                        to_db_id(check.setting_id.get())?,
                        check.expected_value,
                        check.actual_value,
                        check.is_compliant,
                        check.last_checked.as_unix_millis(),
                    ],
                )?;
            }
            tx.commit()?;
            Ok(())
        })();
        Ok(result?)
    }

    fn list_checks(&self, policy_id: PolicyId) -> Result<Vec<ComplianceCheck>, StoreError> {
        let db_id = to_db_id(policy_id.get())?;
        let guard = self.lock()?;
        let result: Result<Vec<ComplianceCheck>, SqliteStoreError> = (|| {
            let mut statement = guard.prepare(
                "SELECT policy_id, setting_id, expected_value, actual_value,
                        is_compliant, last_checked
                 FROM setting_compliance_checks WHERE policy_id = ?1 ORDER BY setting_id",
            )?;
            let rows = statement.query_map(params![db_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, bool>(4)?,
                    row.get::<_, i64>(5)?,
                ))
            })?;
            let mut checks = Vec::new();
            for row in rows {
                let (policy_raw, setting_raw, expected, actual, compliant, checked) = row?;
                checks.push(ComplianceCheck {
                    policy_id: policy_id_from_db(policy_raw)?,
                    setting_id: setting_id_from_db(setting_raw)?,
                    expected_value: expected,
                    actual_value: actual,
                    is_compliant: compliant,
                    last_checked: Timestamp::from_unix_millis(checked),
                });
            }
            Ok(checks)
        })();
        Ok(result?)
    }
}

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Creates tables and validates the stored schema version.
fn initialize_schema(connection: &Connection) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")?;
    let stored: Option<i64> = connection
        .query_row("SELECT version FROM store_meta LIMIT 1", [], |row| row.get(0))
        .optional()?;
    match stored {
        None => {
            connection
                .execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])?;
        }
        Some(version) if version == SCHEMA_VERSION => {}
        Some(version) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "stored version {version}, supported version {SCHEMA_VERSION}"
            )));
        }
    }
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS policies (
             id INTEGER PRIMARY KEY,
             display_name TEXT NOT NULL,
             template_id TEXT NOT NULL,
             family TEXT NOT NULL,
             source TEXT NOT NULL,
             platform TEXT,
             document TEXT NOT NULL
         );
         CREATE TABLE IF NOT EXISTS setting_catalog (
             id INTEGER PRIMARY KEY,
             display_name TEXT NOT NULL,
             description TEXT,
             setting_name TEXT NOT NULL,
             setting_path TEXT,
             aliases TEXT NOT NULL DEFAULT '[]',
             expected_value TEXT NOT NULL,
             operator TEXT NOT NULL,
             value_kind TEXT NOT NULL,
             template_id TEXT NOT NULL,
             family TEXT NOT NULL,
             platform TEXT,
             is_active INTEGER NOT NULL DEFAULT 1
         );
         CREATE TABLE IF NOT EXISTS control_setting_mappings (
             setting_id INTEGER NOT NULL,
             control_id TEXT NOT NULL,
             confidence TEXT NOT NULL,
             rationale TEXT,
             PRIMARY KEY (setting_id, control_id)
         );
         CREATE TABLE IF NOT EXISTS setting_compliance_checks (
             policy_id INTEGER NOT NULL,
             setting_id INTEGER NOT NULL,
             expected_value TEXT NOT NULL,
             actual_value TEXT NOT NULL,
             is_compliant INTEGER NOT NULL,
             last_checked INTEGER NOT NULL,
             PRIMARY KEY (policy_id, setting_id)
         );",
    )?;
    Ok(())
}

// ============================================================================
// SECTION: Row Conversion
// ============================================================================

/// Raw policy row before domain conversion.
struct RawPolicyRow {
    /// Policy id column.
    id: i64,
    /// Display name column.
    display_name: String,
    /// Template id column.
    template_id: String,
    /// Family label column.
    family: String,
    /// Source label column.
    source: String,
    /// Optional platform label column.
    platform: Option<String>,
    /// Raw document column.
    document: String,
}

/// Raw setting row before domain conversion.
struct RawSettingRow {
    /// Setting id column.
    id: i64,
    /// Display name column.
    display_name: String,
    /// Optional description column.
    description: Option<String>,
    /// Canonical name column.
    setting_name: String,
    /// Optional fallback path column.
    setting_path: Option<String>,
    /// JSON-encoded aliases column.
    aliases: String,
    /// Expected value column.
    expected_value: String,
    /// Operator label column.
    operator: String,
    /// Value kind label column.
    value_kind: String,
    /// Template id column.
    template_id: String,
    /// Family label column.
    family: String,
    /// Optional platform label column.
    platform: Option<String>,
    /// Active flag column.
    is_active: bool,
}

/// Converts a raw id into the database integer form.
fn to_db_id(raw: u64) -> Result<i64, SqliteStoreError> {
    i64::try_from(raw)
        .map_err(|_| SqliteStoreError::Invalid(format!("identifier {raw} exceeds i64 range")))
}

/// Converts a database integer into a policy id.
fn policy_id_from_db(raw: i64) -> Result<PolicyId, SqliteStoreError> {
    u64::try_from(raw)
        .ok()
        .and_then(PolicyId::from_raw)
        .ok_or_else(|| SqliteStoreError::Invalid(format!("invalid policy id: {raw}")))
}

/// Converts a database integer into a setting id.
fn setting_id_from_db(raw: i64) -> Result<SettingId, SqliteStoreError> {
    u64::try_from(raw)
        .ok()
        .and_then(SettingId::from_raw)
        .ok_or_else(|| SqliteStoreError::Invalid(format!("invalid setting id: {raw}")))
}

/// Parses an optional platform label column.
fn platform_from_db(label: Option<String>) -> Result<Option<Platform>, SqliteStoreError> {
    label
        .map(|label| {
            Platform::parse(&label)
                .ok_or_else(|| SqliteStoreError::Invalid(format!("unknown platform: {label}")))
        })
        .transpose()
}

/// Converts a raw policy row into the domain record.
fn policy_from_row(row: RawPolicyRow) -> Result<Policy, SqliteStoreError> {
    Ok(Policy {
        id: policy_id_from_db(row.id)?,
        display_name: row.display_name,
        template_id: TemplateId::new(row.template_id),
        family: TemplateFamily::parse(&row.family)
            .ok_or_else(|| SqliteStoreError::Invalid(format!("unknown family: {}", row.family)))?,
        source: PolicySource::parse(&row.source)
            .ok_or_else(|| SqliteStoreError::Invalid(format!("unknown source: {}", row.source)))?,
        platform: platform_from_db(row.platform)?,
        document: row.document,
    })
}

/// Converts a raw setting row into the domain record.
fn setting_from_row(row: RawSettingRow) -> Result<SettingDefinition, SqliteStoreError> {
    let aliases: Vec<String> = serde_json::from_str(&row.aliases)
        .map_err(|err| SqliteStoreError::Invalid(format!("aliases column: {err}")))?;
    Ok(SettingDefinition {
        id: setting_id_from_db(row.id)?,
        display_name: row.display_name,
        description: row.description,
        setting_name: row.setting_name,
        setting_path: row.setting_path,
        aliases,
        expected_value: row.expected_value,
        operator: ValidationOperator::parse_lenient(&row.operator),
        value_kind: ValueKind::parse_lenient(&row.value_kind),
        template_id: TemplateId::new(row.template_id),
        family: TemplateFamily::parse(&row.family)
            .ok_or_else(|| SqliteStoreError::Invalid(format!("unknown family: {}", row.family)))?,
        platform: platform_from_db(row.platform)?,
        is_active: row.is_active,
    })
}
