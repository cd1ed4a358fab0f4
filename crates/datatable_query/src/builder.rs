//! The sort, search and paginate passes.

use crate::ColumnRegistry;
use datatable_core::{NormalizedParams, OrderTerm, Predicate, QueryDescriptor, SearchStrategy};
use datatable_error::{ConfigError, ConfigErrorKind, DataTableResult};
use datatable_interface::Matcher;
use tracing::{debug, error, instrument};

/// Builds a [`QueryDescriptor`] for one request.
///
/// The passes are separate so the caller can count between them: the scoped
/// total is taken after [`sort_pass`](Self::sort_pass), the filtered total
/// after [`search_pass`](Self::search_pass), and only the final fetch sees
/// the page window from [`paginate_pass`](Self::paginate_pass).
///
/// # Examples
///
/// ```
/// use datatable_core::{ColumnConfig, Predicate};
/// use datatable_query::{ColumnRegistry, QueryDescriptorBuilder, extract_params};
///
/// let registry = ColumnRegistry::build(
///     &ColumnConfig::new().label("title", "Title").label("user_id", "User"),
///     "Article",
/// )
/// .unwrap();
/// let payload = vec![("sSearch".to_string(), "foo".to_string())];
/// let params = extract_params(&payload, registry.len());
///
/// let mut builder = QueryDescriptorBuilder::new(&registry, &params, None);
/// builder.sort_pass();
/// builder.search_pass(|_| None).unwrap();
/// builder.paginate_pass(100);
///
/// let descriptor = builder.into_descriptor();
/// assert_eq!(
///     descriptor.predicate,
///     Some(Predicate::Or(vec![
///         Predicate::contains("Article.title", "foo"),
///         Predicate::contains("Article.user_id", "foo"),
///     ]))
/// );
/// ```
#[derive(Debug)]
pub struct QueryDescriptorBuilder<'a> {
    registry: &'a ColumnRegistry,
    params: &'a NormalizedParams,
    descriptor: QueryDescriptor,
}

impl<'a> QueryDescriptorBuilder<'a> {
    /// Start from the bound fields and the caller's base scope.
    pub fn new(
        registry: &'a ColumnRegistry,
        params: &'a NormalizedParams,
        scope: Option<Predicate>,
    ) -> Self {
        Self {
            registry,
            params,
            descriptor: QueryDescriptor::scoped(registry.fields(), scope),
        }
    }

    /// The descriptor as built so far.
    pub fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }

    /// Finish and take the descriptor.
    pub fn into_descriptor(self) -> QueryDescriptor {
        self.descriptor
    }

    /// Append one order term per usable sort slot, in slot order.
    ///
    /// Slots pointing past the last column, at an unbound column or at a
    /// column that is not sortable are skipped.
    #[instrument(skip(self), fields(slots = self.params.sort_requests.len()))]
    pub fn sort_pass(&mut self) {
        for (slot, request) in self.params.sort_requests.iter().enumerate() {
            let Some(request) = request else {
                continue;
            };
            match self.registry.get(*request.column()) {
                Some(column) if column.is_sortable() => {
                    self.descriptor
                        .order
                        .push(OrderTerm::new(column.identity().clone(), *request.direction()));
                }
                Some(column) => {
                    debug!(slot, identity = %column.identity(), "Column not sortable, skipping");
                }
                None => {
                    debug!(slot, column = request.column(), "Sort column out of range, skipping");
                }
            }
        }
        debug!(terms = self.descriptor.order.len(), "Sort pass complete");
    }

    /// Collect search fragments from every searchable column and AND them,
    /// as one OR group, onto the predicate.
    ///
    /// `lookup` resolves matcher names. Default columns produce a `CONTAINS`
    /// fragment for the global term and another for their own term. Without
    /// any fragment the predicate is left untouched.
    ///
    /// # Errors
    ///
    /// A matcher that cannot be resolved is a configuration error. Matcher
    /// failures are returned unchanged.
    #[instrument(skip(self, lookup), fields(has_global = self.params.global_search.is_some()))]
    pub fn search_pass<'m, F>(&mut self, lookup: F) -> DataTableResult<()>
    where
        F: Fn(&str) -> Option<&'m dyn Matcher>,
    {
        let global = self.params.global_term();
        let mut fragments = Vec::new();

        for column in self.registry.columns().iter().filter(|c| c.is_searchable()) {
            let identity = column.identity();
            let column_term = self.params.column_term(*column.index());
            match column.searchable() {
                SearchStrategy::CustomMatcher(name) => {
                    let matcher = lookup(name.as_str()).ok_or_else(|| {
                        error!(matcher = %name, identity = %identity, "Matcher not provided by record source");
                        ConfigError::new(ConfigErrorKind::UnknownMatcher {
                            column: identity.clone(),
                            matcher: name.clone(),
                        })
                    })?;
                    let contributed = matcher
                        .contribute(identity, global, column_term)
                        .inspect_err(|e| error!(matcher = %name, error = %e, "Matcher failed"))?;
                    debug!(matcher = %name, fragments = contributed.len(), "Matcher contributed");
                    fragments.extend(contributed);
                }
                SearchStrategy::AlwaysOn => {
                    if let Some(term) = global {
                        fragments.push(Predicate::contains(identity.clone(), term));
                    }
                    if let Some(term) = column_term {
                        fragments.push(Predicate::contains(identity.clone(), term));
                    }
                }
                SearchStrategy::AlwaysOff => {}
            }
        }

        debug!(fragments = fragments.len(), "Search pass complete");
        if !fragments.is_empty() {
            self.descriptor.add_condition(Predicate::Or(fragments));
        }
        Ok(())
    }

    /// Apply the page window, clamped to `max_limit`.
    ///
    /// Without a complete page request the descriptor stays unlimited.
    #[instrument(skip(self))]
    pub fn paginate_pass(&mut self, max_limit: u64) {
        if let Some(page) = self.params.page {
            let limit = (*page.limit()).min(max_limit);
            if limit < *page.limit() {
                debug!(requested = page.limit(), limit, "Clamped page length");
            }
            self.descriptor.limit = Some(limit);
            self.descriptor.offset = Some(*page.offset());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract_params;
    use datatable_core::{ColumnConfig, ColumnOptions, CompareOp, SortDirection};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn registry() -> ColumnRegistry {
        ColumnRegistry::build(
            &ColumnConfig::new()
                .label("title", "Title")
                .label("user_id", "User")
                .unbound("Actions")
                .enabled("created", false),
            "Article",
        )
        .unwrap()
    }

    fn params(registry: &ColumnRegistry, pairs: &[(&str, &str)]) -> NormalizedParams {
        let payload: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        extract_params(&payload, registry.len())
    }

    fn no_matchers(_: &str) -> Option<&'static dyn Matcher> {
        None
    }

    #[test]
    fn test_sort_desc_on_second_column() {
        let registry = registry();
        let params = params(&registry, &[("iSortCol_0", "1"), ("sSortDir_0", "desc")]);
        let mut builder = QueryDescriptorBuilder::new(&registry, &params, None);
        builder.sort_pass();
        assert_eq!(
            builder.descriptor().order,
            vec![OrderTerm::new("Article.user_id".to_string(), SortDirection::Desc)]
        );
    }

    #[test]
    fn test_sort_skips_unusable_columns() {
        let registry = registry();
        let params = params(
            &registry,
            &[
                ("iSortCol_0", "2"),
                ("iSortCol_1", "3"),
                ("iSortCol_2", "99"),
                ("iSortCol_3", "0"),
            ],
        );
        let mut builder = QueryDescriptorBuilder::new(&registry, &params, None);
        builder.sort_pass();
        assert_eq!(
            builder.descriptor().order,
            vec![OrderTerm::new("Article.title".to_string(), SortDirection::Asc)]
        );
    }

    #[test]
    fn test_sort_slot_order_sets_precedence() {
        let registry = registry();
        let params = params(
            &registry,
            &[("iSortCol_0", "1"), ("iSortCol_1", "0"), ("sSortDir_1", "DESC")],
        );
        let mut builder = QueryDescriptorBuilder::new(&registry, &params, None);
        builder.sort_pass();
        let fields: Vec<_> = builder
            .descriptor()
            .order
            .iter()
            .map(|t| (t.field().as_str(), *t.direction()))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("Article.user_id", SortDirection::Asc),
                ("Article.title", SortDirection::Desc)
            ]
        );
    }

    #[test]
    fn test_search_without_terms_keeps_scope() {
        let registry = registry();
        let params = params(&registry, &[("sSearch", "")]);
        let scope = Predicate::equals("Article.published", "Y");
        let mut builder = QueryDescriptorBuilder::new(&registry, &params, Some(scope.clone()));
        builder.search_pass(no_matchers).unwrap();
        assert_eq!(builder.descriptor().predicate, Some(scope));
    }

    #[test]
    fn test_search_conjoins_with_scope() {
        let registry = registry();
        let params = params(&registry, &[("sSearch_1", "7")]);
        let scope = Predicate::equals("Article.published", "Y");
        let mut builder = QueryDescriptorBuilder::new(&registry, &params, Some(scope.clone()));
        builder.search_pass(no_matchers).unwrap();
        assert_eq!(
            builder.descriptor().predicate,
            Some(Predicate::And(vec![
                scope,
                Predicate::Or(vec![Predicate::contains("Article.user_id", "7")])
            ]))
        );
    }

    #[test]
    fn test_global_and_column_term_both_emitted() {
        let registry = registry();
        let params = params(&registry, &[("sSearch", "a"), ("sSearch_0", "b")]);
        let mut builder = QueryDescriptorBuilder::new(&registry, &params, None);
        builder.search_pass(no_matchers).unwrap();
        assert_eq!(
            builder.descriptor().predicate,
            Some(Predicate::Or(vec![
                Predicate::contains("Article.title", "a"),
                Predicate::contains("Article.title", "b"),
                Predicate::contains("Article.user_id", "a"),
            ]))
        );
    }

    #[test]
    fn test_custom_matcher_replaces_default_fragment() {
        let registry = ColumnRegistry::build(
            &ColumnConfig::new()
                .label("title", "Title")
                .column("views", ColumnOptions::default().with_searchable("atLeast")),
            "Article",
        )
        .unwrap();
        let params = params(&registry, &[("sSearch_1", "10")]);

        let calls = AtomicUsize::new(0);
        let matcher = |field: &str,
                       global: Option<&str>,
                       column: Option<&str>|
         -> DataTableResult<Vec<Predicate>> {
            calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(field, "Article.views");
            assert_eq!(global, None);
            assert_eq!(column, Some("10"));
            Ok(vec![Predicate::compare(field, CompareOp::Gte, 10)])
        };
        let mut builder = QueryDescriptorBuilder::new(&registry, &params, None);
        builder
            .search_pass(|name| (name == "atLeast").then_some(&matcher as &dyn Matcher))
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            builder.descriptor().predicate,
            Some(Predicate::Or(vec![Predicate::compare(
                "Article.views",
                CompareOp::Gte,
                10
            )]))
        );
    }

    #[test]
    fn test_unresolved_matcher_is_config_error() {
        let registry = ColumnRegistry::build(
            &ColumnConfig::new().column("body", ColumnOptions::default().with_searchable("nope")),
            "Article",
        )
        .unwrap();
        let params = params(&registry, &[]);
        let mut builder = QueryDescriptorBuilder::new(&registry, &params, None);
        assert!(builder.search_pass(no_matchers).is_err());
    }

    #[test]
    fn test_paginate_clamps_to_max() {
        let registry = registry();
        let params = params(&registry, &[("iDisplayStart", "10"), ("iDisplayLength", "1000")]);
        let mut builder = QueryDescriptorBuilder::new(&registry, &params, None);
        builder.paginate_pass(100);
        assert_eq!(builder.descriptor().limit, Some(100));
        assert_eq!(builder.descriptor().offset, Some(10));
    }

    #[test]
    fn test_paginate_requires_both_values() {
        let registry = registry();
        let params = params(&registry, &[("iDisplayLength", "5")]);
        let mut builder = QueryDescriptorBuilder::new(&registry, &params, None);
        builder.paginate_pass(100);
        assert_eq!(builder.descriptor().limit, None);
        assert_eq!(builder.descriptor().offset, None);
    }

    #[test]
    fn test_fields_skip_unbound_columns() {
        let registry = registry();
        let params = params(&registry, &[]);
        let builder = QueryDescriptorBuilder::new(&registry, &params, None);
        assert_eq!(
            builder.descriptor().fields,
            vec!["Article.title", "Article.user_id", "Article.created"]
        );
    }
}
