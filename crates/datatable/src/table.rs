//! Request orchestration for one configured table.

use datatable_core::{
    Defaults, Predicate, ResolvedSettings, ResponseEnvelope, SettingsOverrides, TableSettings,
};
use datatable_error::{ConfigError, ConfigErrorKind, DataTableResult};
use datatable_interface::{ParamSource, RecordSource};
use datatable_query::{ColumnRegistry, QueryDescriptorBuilder, extract_params};
use derive_getters::Getters;
use tracing::{debug, error, info, instrument};

/// Envelope and fetched records for one request.
///
/// The envelope's `aaData` is empty until the caller projects the records
/// with [`into_envelope`](Self::into_envelope).
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct DataTableOutput<R> {
    /// Counts and echo token
    envelope: ResponseEnvelope,
    /// Records of the requested page, in query order
    records: Vec<R>,
}

impl<R> DataTableOutput<R> {
    /// Split into envelope and records.
    pub fn into_parts(self) -> (ResponseEnvelope, Vec<R>) {
        (self.envelope, self.records)
    }

    /// Project every record into a row and place the rows in `aaData`.
    pub fn into_envelope<T, F>(self, project: F) -> ResponseEnvelope<T>
    where
        F: FnMut(R) -> T,
    {
        let rows = self.records.into_iter().map(project).collect();
        self.envelope.with_data(rows)
    }
}

/// One configured table target.
///
/// The column registry is built once at construction and shared by every
/// request, so a `DataTable` can sit behind an `Arc` and serve concurrent
/// requests.
#[derive(Debug, Clone, Getters)]
pub struct DataTable {
    /// Target name
    name: String,
    /// Global defaults
    defaults: Defaults,
    /// Table configuration
    settings: TableSettings,
    /// Normalized columns
    registry: ColumnRegistry,
}

impl DataTable {
    /// Build a table target, normalizing its columns.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the column configuration cannot be
    /// normalized or the settings do not resolve.
    #[instrument(skip_all, fields(entity = %settings.entity()))]
    pub fn new(
        name: impl Into<String>,
        defaults: Defaults,
        settings: TableSettings,
    ) -> Result<Self, ConfigError> {
        ResolvedSettings::resolve(&defaults, &settings, &SettingsOverrides::default())?;
        let registry = ColumnRegistry::build(settings.columns(), settings.entity())?;
        Ok(Self {
            name: name.into(),
            defaults,
            settings,
            registry,
        })
    }

    /// Answer one table request with the table's own settings.
    ///
    /// See [`handle_with`](Self::handle_with).
    pub async fn handle<S, P>(
        &self,
        payload: &P,
        scope: Option<Predicate>,
        source: &S,
    ) -> DataTableResult<DataTableOutput<S::Record>>
    where
        S: RecordSource + ?Sized,
        P: ParamSource + Sync + ?Sized,
    {
        self.handle_with(payload, scope, &SettingsOverrides::default(), source)
            .await
    }

    /// Answer one table request.
    ///
    /// `scope` is the caller's base condition. It limits both totals and the
    /// fetch. The source is queried three times: the scoped count, the
    /// filtered count and the paged fetch.
    ///
    /// # Errors
    ///
    /// A column matcher the source cannot resolve is a [`ConfigError`],
    /// reported before the source is queried. Matcher and record source
    /// failures are returned unchanged.
    #[instrument(skip_all, fields(table = %self.name))]
    pub async fn handle_with<S, P>(
        &self,
        payload: &P,
        scope: Option<Predicate>,
        overrides: &SettingsOverrides,
        source: &S,
    ) -> DataTableResult<DataTableOutput<S::Record>>
    where
        S: RecordSource + ?Sized,
        P: ParamSource + Sync + ?Sized,
    {
        let resolved = ResolvedSettings::resolve(&self.defaults, &self.settings, overrides)?;

        for (column, name) in self.registry.matchers() {
            if source.matcher(name).is_none() {
                error!(column = %column.identity(), matcher = name, "Matcher not provided by record source");
                return Err(ConfigError::new(ConfigErrorKind::UnknownMatcher {
                    column: column.identity().clone(),
                    matcher: name.to_string(),
                })
                .into());
            }
        }

        let params = extract_params(payload, self.registry.len());
        let mut builder = QueryDescriptorBuilder::new(&self.registry, &params, scope);

        builder.sort_pass();
        let total = source.count(builder.descriptor()).await.map_err(|e| {
            error!(error = %e, "Scoped count failed");
            e
        })?;

        builder.search_pass(|name| source.matcher(name))?;
        let filtered = source.count(builder.descriptor()).await.map_err(|e| {
            error!(error = %e, "Filtered count failed");
            e
        })?;

        builder.paginate_pass(*resolved.max_limit());
        let descriptor = builder.into_descriptor();
        debug!(
            limit = ?descriptor.limit,
            offset = ?descriptor.offset,
            order_terms = descriptor.order.len(),
            "Fetching page"
        );
        let records = source.fetch(&descriptor).await.map_err(|e| {
            error!(error = %e, "Fetch failed");
            e
        })?;

        info!(
            total,
            filtered,
            returned = records.len(),
            echo = params.echo,
            "Answered table request"
        );

        Ok(DataTableOutput {
            envelope: ResponseEnvelope::new(total, filtered, params.echo),
            records,
        })
    }
}
