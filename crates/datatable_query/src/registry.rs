//! Column configuration normalization.

use datatable_core::{
    ColumnConfig, ColumnDescriptor, ColumnOptions, ColumnSpec, SearchStrategy, Searchable,
};
use datatable_error::{ConfigError, ConfigErrorKind};
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Ordered column descriptors for one table.
///
/// A column's index is its declaration position and is the only way the wire
/// protocol refers to it. The registry is immutable once built, so it can be
/// shared across requests for the same configuration.
///
/// # Examples
///
/// ```
/// use datatable_core::ColumnConfig;
/// use datatable_query::ColumnRegistry;
///
/// let columns = ColumnConfig::new()
///     .label("title", "Title")
///     .label("User.name", "Author")
///     .unbound("Actions");
/// let registry = ColumnRegistry::build(&columns, "Article").unwrap();
///
/// assert_eq!(registry.get(0).unwrap().identity(), "Article.title");
/// assert_eq!(registry.get(1).unwrap().identity(), "User.name");
/// assert!(!registry.get(2).unwrap().bound());
/// assert_eq!(registry.fields(), vec!["Article.title", "User.name"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct ColumnRegistry {
    /// Alias unqualified keys are qualified with
    entity: String,
    /// Descriptors in declaration order
    columns: Vec<ColumnDescriptor>,
}

impl ColumnRegistry {
    /// Normalize `config` for the entity alias `entity`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the offending key when a spec is
    /// contradictory, a key is empty, a matcher name is empty or two columns
    /// resolve to the same identity.
    #[instrument(skip(config), fields(columns = config.len()))]
    pub fn build(config: &ColumnConfig, entity: &str) -> Result<Self, ConfigError> {
        let mut columns = Vec::with_capacity(config.len());
        let mut seen = HashSet::new();

        for (index, entry) in config.entries().iter().enumerate() {
            let key = entry.key();
            if key.trim().is_empty() {
                return Err(ConfigError::new(ConfigErrorKind::EmptyColumnKey(index)));
            }
            let column = normalize(key, entry.spec(), entity, index)?;
            if !seen.insert(column.identity().clone()) {
                return Err(ConfigError::new(ConfigErrorKind::DuplicateColumn(
                    column.identity().clone(),
                )));
            }
            debug!(
                index,
                identity = %column.identity(),
                bound = column.bound(),
                sortable = column.is_sortable(),
                searchable = column.is_searchable(),
                "Registered column"
            );
            columns.push(column);
        }

        Ok(Self {
            entity: entity.to_string(),
            columns,
        })
    }

    /// Column at wire index `index`.
    pub fn get(&self, index: usize) -> Option<&ColumnDescriptor> {
        self.columns.get(index)
    }

    /// Number of columns, bound or not.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether no column is configured.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Identities of bound columns, in column order.
    pub fn fields(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| *c.bound())
            .map(|c| c.identity().clone())
            .collect()
    }

    /// Searchable columns delegating to a named matcher.
    pub fn matchers(&self) -> impl Iterator<Item = (&ColumnDescriptor, &str)> {
        self.columns.iter().filter_map(|column| {
            if !column.is_searchable() {
                return None;
            }
            column.searchable().matcher().map(|name| (column, name))
        })
    }
}

fn normalize(
    key: &str,
    spec: &ColumnSpec,
    entity: &str,
    index: usize,
) -> Result<ColumnDescriptor, ConfigError> {
    match spec {
        ColumnSpec::Unbound => Ok(unbound(key, key.to_string(), index)),
        ColumnSpec::Enabled(enabled) => Ok(ColumnDescriptor::new(
            qualify(key, entity),
            true,
            humanize(key),
            *enabled,
            SearchStrategy::from(*enabled),
            index,
        )),
        ColumnSpec::Label(label) => Ok(ColumnDescriptor::new(
            qualify(key, entity),
            true,
            label.clone(),
            true,
            SearchStrategy::AlwaysOn,
            index,
        )),
        ColumnSpec::Options(options) => from_options(key, options, entity, index),
    }
}

fn from_options(
    key: &str,
    options: &ColumnOptions,
    entity: &str,
    index: usize,
) -> Result<ColumnDescriptor, ConfigError> {
    if *options.bound() == Some(false) {
        if options.field().is_some() {
            return Err(ConfigError::invalid_column(
                key,
                "an unbound column cannot name a field",
            ));
        }
        if *options.sortable() == Some(true)
            || matches!(options.searchable(), Some(s) if *s != Searchable::Enabled(false))
        {
            return Err(ConfigError::invalid_column(
                key,
                "an unbound column cannot be sortable or searchable",
            ));
        }
        let label = options.label().clone().unwrap_or_else(|| key.to_string());
        return Ok(unbound(key, label, index));
    }

    let field = match options.field() {
        Some(field) if field.trim().is_empty() => {
            return Err(ConfigError::invalid_column(key, "field must not be empty"));
        }
        Some(field) => field.as_str(),
        None => key,
    };

    let searchable = match options.searchable() {
        None => SearchStrategy::AlwaysOn,
        Some(Searchable::Enabled(enabled)) => SearchStrategy::from(*enabled),
        Some(Searchable::Matcher(name)) if name.trim().is_empty() => {
            return Err(ConfigError::invalid_column(
                key,
                "matcher name must not be empty",
            ));
        }
        Some(Searchable::Matcher(name)) => SearchStrategy::CustomMatcher(name.clone()),
    };

    Ok(ColumnDescriptor::new(
        qualify(field, entity),
        true,
        options.label().clone().unwrap_or_else(|| humanize(key)),
        options.sortable().unwrap_or(true),
        searchable,
        index,
    ))
}

fn unbound(key: &str, label: String, index: usize) -> ColumnDescriptor {
    ColumnDescriptor::new(
        key.to_string(),
        false,
        label,
        false,
        SearchStrategy::AlwaysOff,
        index,
    )
}

/// `entity.field`, unless the field is already qualified.
fn qualify(field: &str, entity: &str) -> String {
    if field.contains('.') {
        field.to_string()
    } else {
        format!("{}.{}", entity, field)
    }
}

/// Header text for a key: last dotted segment, words split on `_` and
/// capitalized.
///
/// ```
/// use datatable_query::humanize;
///
/// assert_eq!(humanize("user_id"), "User Id");
/// assert_eq!(humanize("Article.created_at"), "Created At");
/// ```
pub fn humanize(key: &str) -> String {
    let field = key.rsplit('.').next().unwrap_or(key);
    field
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
