//! Table settings and their layered resolution.

use crate::ColumnConfig;
use datatable_error::{ConfigError, ConfigErrorKind};
use derive_getters::Getters;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, instrument};

fn default_max_limit() -> u64 {
    100
}

/// Settings shared by every table unless overridden.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Getters)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    /// Largest page a client may request
    #[serde(default = "default_max_limit")]
    max_limit: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            max_limit: default_max_limit(),
        }
    }
}

impl Defaults {
    /// Defaults with a different page cap.
    pub fn with_max_limit(max_limit: u64) -> Self {
        Self { max_limit }
    }
}

/// Configuration of one table target.
///
/// # Examples
///
/// ```
/// use datatable_core::{ColumnConfig, TableSettingsBuilder};
///
/// let table = TableSettingsBuilder::default()
///     .entity("Article")
///     .columns(ColumnConfig::new().label("title", "Title"))
///     .max_limit(25u64)
///     .build()
///     .unwrap();
/// assert_eq!(table.entity(), "Article");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Getters, derive_builder::Builder)]
#[serde(deny_unknown_fields)]
pub struct TableSettings {
    /// Alias used to qualify unqualified column keys
    #[builder(setter(into))]
    entity: String,
    /// Columns in wire order
    columns: ColumnConfig,
    /// Page cap overriding the global default
    #[serde(default)]
    #[builder(default, setter(into, strip_option))]
    max_limit: Option<u64>,
}

/// Overrides supplied by the caller for a single request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Getters, derive_setters::Setters)]
#[setters(prefix = "with_", strip_option)]
pub struct SettingsOverrides {
    /// Page cap for this request only
    max_limit: Option<u64>,
}

/// Frozen settings for one request.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct ResolvedSettings {
    /// Entity alias
    entity: String,
    /// Effective page cap
    max_limit: u64,
}

impl ResolvedSettings {
    /// Merge global defaults, table overrides and request overrides.
    ///
    /// Later layers win. The result is validated once and never changes.
    ///
    /// ```
    /// use datatable_core::{ColumnConfig, Defaults, ResolvedSettings, SettingsOverrides, TableSettingsBuilder};
    ///
    /// let table = TableSettingsBuilder::default()
    ///     .entity("Article")
    ///     .columns(ColumnConfig::new())
    ///     .max_limit(50u64)
    ///     .build()
    ///     .unwrap();
    /// let request = SettingsOverrides::default().with_max_limit(10);
    ///
    /// let resolved = ResolvedSettings::resolve(&Defaults::default(), &table, &request).unwrap();
    /// assert_eq!(*resolved.max_limit(), 10);
    /// ```
    pub fn resolve(
        defaults: &Defaults,
        table: &TableSettings,
        request: &SettingsOverrides,
    ) -> Result<Self, ConfigError> {
        let max_limit = request
            .max_limit
            .or(table.max_limit)
            .unwrap_or(defaults.max_limit);
        if max_limit == 0 {
            return Err(ConfigError::new(ConfigErrorKind::InvalidSetting(format!(
                "max_limit for '{}' must be at least 1",
                table.entity
            ))));
        }
        if table.entity.trim().is_empty() {
            return Err(ConfigError::new(ConfigErrorKind::InvalidSetting(
                "entity must not be empty".to_string(),
            )));
        }
        Ok(Self {
            entity: table.entity.clone(),
            max_limit,
        })
    }
}

/// Settings for every configured table, usually loaded from TOML.
///
/// ```toml
/// [defaults]
/// max_limit = 100
///
/// [tables.articles]
/// entity = "Article"
/// columns = { title = "Title", user_id = "User", body = { searchable = "fullText" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Getters)]
#[serde(deny_unknown_fields)]
pub struct DataTableSettings {
    /// Global defaults
    #[serde(default)]
    defaults: Defaults,
    /// Tables by target name
    #[serde(default)]
    tables: BTreeMap<String, TableSettings>,
}

impl DataTableSettings {
    /// Settings with the given defaults and no tables.
    pub fn new(defaults: Defaults) -> Self {
        Self {
            defaults,
            tables: BTreeMap::new(),
        }
    }

    /// Add or replace a table.
    pub fn with_table(mut self, name: impl Into<String>, table: TableSettings) -> Self {
        self.tables.insert(name.into(), table);
        self
    }

    /// Parse settings from TOML text.
    #[instrument(skip(content), fields(length = content.len()))]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(content).map_err(|e| {
            ConfigError::new(ConfigErrorKind::Parse(e.to_string()))
        })?;
        debug!(tables = settings.tables.len(), "Parsed table settings");
        Ok(settings)
    }

    /// Load settings from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::new(ConfigErrorKind::FileRead(format!(
                "{}: {}",
                path.as_ref().display(),
                e
            )))
        })?;
        Self::from_toml_str(&content)
    }
}
