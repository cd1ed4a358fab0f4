//! Several table targets behind one endpoint.

use crate::{DataTable, DataTableOutput};
use datatable_core::{DataTableSettings, Predicate, wire};
use datatable_error::{ConfigError, DataTableResult, TargetError, TargetErrorKind};
use datatable_interface::{ParamSource, RecordSource};
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

/// Table targets by name.
///
/// A request may name its target with the `dtTarget` parameter; otherwise
/// the caller's default target answers it.
///
/// # Examples
///
/// ```
/// use datatable::{DataTableSettings, DataTables};
///
/// let settings = DataTableSettings::from_toml_str(
///     r#"
///     [tables.articles]
///     entity = "Article"
///     columns = { title = "Title" }
///
///     [tables.users]
///     entity = "User"
///     columns = { name = "Name" }
///     "#,
/// )
/// .unwrap();
/// let tables = DataTables::from_settings(&settings).unwrap();
///
/// let payload = vec![("dtTarget".to_string(), "users".to_string())];
/// assert_eq!(tables.resolve("articles", &payload).unwrap().name(), "users");
/// assert!(tables.resolve("articles", &vec![("dtTarget".to_string(), "posts".to_string())]).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DataTables {
    tables: BTreeMap<String, DataTable>,
}

impl DataTables {
    /// Empty set of targets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every table in `settings`.
    ///
    /// # Errors
    ///
    /// The first table whose configuration does not normalize.
    #[instrument(skip(settings), fields(tables = settings.tables().len()))]
    pub fn from_settings(settings: &DataTableSettings) -> Result<Self, ConfigError> {
        let mut tables = BTreeMap::new();
        for (name, table) in settings.tables() {
            let table = DataTable::new(name.clone(), settings.defaults().clone(), table.clone())?;
            tables.insert(name.clone(), table);
        }
        debug!(count = tables.len(), "Built table targets");
        Ok(Self { tables })
    }

    /// Add or replace a target, keyed by its name.
    pub fn with_table(mut self, table: DataTable) -> Self {
        self.tables.insert(table.name().clone(), table);
        self
    }

    /// Target by name.
    pub fn get(&self, name: &str) -> Option<&DataTable> {
        self.tables.get(name)
    }

    /// Names of all targets.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// The target a request is addressed to.
    ///
    /// # Errors
    ///
    /// [`TargetErrorKind::UnknownTarget`] when the request names a target
    /// that is not configured; [`TargetErrorKind::MissingConfiguration`]
    /// when it names none and `default_target` is not configured.
    pub fn resolve<P>(&self, default_target: &str, payload: &P) -> Result<&DataTable, TargetError>
    where
        P: ParamSource + ?Sized,
    {
        match payload.param(wire::TARGET).filter(|t| !t.is_empty()) {
            Some(declared) => self.tables.get(declared.as_ref()).ok_or_else(|| {
                warn!(requested = %declared, "Request declared unknown target");
                TargetError::new(TargetErrorKind::UnknownTarget(declared.into_owned()))
            }),
            None => self.tables.get(default_target).ok_or_else(|| {
                warn!(requested = default_target, "No configuration for default target");
                TargetError::new(TargetErrorKind::MissingConfiguration(
                    default_target.to_string(),
                ))
            }),
        }
    }

    /// Resolve the target and answer the request from `source`.
    ///
    /// When targets live in different stores, call [`resolve`](Self::resolve)
    /// and pick the source per target instead.
    pub async fn handle<S, P>(
        &self,
        default_target: &str,
        payload: &P,
        scope: Option<Predicate>,
        source: &S,
    ) -> DataTableResult<DataTableOutput<S::Record>>
    where
        S: RecordSource + ?Sized,
        P: ParamSource + Sync + ?Sized,
    {
        let table = self.resolve(default_target, payload)?;
        table.handle(payload, scope, source).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datatable_core::{ColumnConfig, Defaults, TableSettingsBuilder};

    fn tables() -> DataTables {
        let table = DataTable::new(
            "articles",
            Defaults::default(),
            TableSettingsBuilder::default()
                .entity("Article")
                .columns(ColumnConfig::new().label("title", "Title"))
                .build()
                .unwrap(),
        )
        .unwrap();
        DataTables::new().with_table(table)
    }

    fn payload(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_target_is_used_without_declaration() {
        let tables = tables();
        let table = tables.resolve("articles", &payload(&[])).unwrap();
        assert_eq!(table.name(), "articles");
    }

    #[test]
    fn test_unconfigured_default_is_missing_configuration() {
        let err = tables().resolve("users", &payload(&[])).unwrap_err();
        assert_eq!(
            err.kind,
            TargetErrorKind::MissingConfiguration("users".to_string())
        );
    }

    #[test]
    fn test_declared_unknown_target() {
        let err = tables()
            .resolve("articles", &payload(&[("dtTarget", "posts")]))
            .unwrap_err();
        assert_eq!(err.kind, TargetErrorKind::UnknownTarget("posts".to_string()));
    }

    #[test]
    fn test_empty_declaration_falls_back_to_default() {
        let tables = tables();
        let table = tables
            .resolve("articles", &payload(&[("dtTarget", "")]))
            .unwrap();
        assert_eq!(table.name(), "articles");
        assert_eq!(tables.names().collect::<Vec<_>>(), vec!["articles"]);
    }
}
