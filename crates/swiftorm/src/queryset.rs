//! Chainable, immutable queries over one schema.
//!
//! Every chaining call returns a new [`QuerySet`]; the receiver is never
//! modified, so a base query can be refined in several directions. Filter and
//! ordering state is shared behind `Arc`s and copied only when a refinement
//! actually changes it.
//!
//! Terminal operations (`all`, `first`, `get`, `create`) check filter values
//! and column names against the schema before any statement is sent.

use std::sync::Arc;

use asupersync::{Cx, Outcome};
use swiftorm_core::{Driver, Entity, Error, Result, Schema, Value};
use swiftorm_query::{Filter, OrderBy};

use crate::database::Database;

/// A lazily evaluated query over one schema.
pub struct QuerySet<'db, D: Driver> {
    db: &'db Database<D>,
    schema: Arc<Schema>,
    filter: Arc<Filter>,
    order_by: Arc<Vec<OrderBy>>,
    limit: Option<u64>,
}

impl<D: Driver> Clone for QuerySet<'_, D> {
    fn clone(&self) -> Self {
        Self {
            db: self.db,
            schema: Arc::clone(&self.schema),
            filter: Arc::clone(&self.filter),
            order_by: Arc::clone(&self.order_by),
            limit: self.limit,
        }
    }
}

impl<D: Driver> std::fmt::Debug for QuerySet<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuerySet")
            .field("model", &self.schema.name())
            .field("filter", &self.filter)
            .field("order_by", &self.order_by)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

impl<'db, D: Driver> QuerySet<'db, D> {
    pub(crate) fn new(db: &'db Database<D>, schema: &Arc<Schema>) -> Self {
        Self {
            db,
            schema: Arc::clone(schema),
            filter: Arc::new(Filter::new()),
            order_by: Arc::new(Vec::new()),
            limit: None,
        }
    }

    /// The queried schema.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Accumulated equality conditions.
    pub fn filters(&self) -> &Filter {
        &self.filter
    }

    /// Accumulated ordering.
    pub fn ordering(&self) -> &[OrderBy] {
        &self.order_by
    }

    /// Requested row limit.
    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    /// A new query set with `conditions` merged into the filters.
    ///
    /// A column given again replaces its earlier value.
    #[must_use]
    pub fn filter<I, K, V>(&self, conditions: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut next = self.clone();
        let filter = Arc::make_mut(&mut next.filter);
        for (column, value) in conditions {
            filter.insert(column.into(), value.into());
        }
        next
    }

    /// A new query set with ordering entries appended.
    ///
    /// `"name"` sorts ascending, `"-name"` descending; earlier entries take
    /// precedence.
    #[must_use]
    pub fn order_by<I, S>(&self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut next = self.clone();
        Arc::make_mut(&mut next.order_by).extend(columns.into_iter().map(|c| OrderBy::parse(c.as_ref())));
        next
    }

    /// A new query set returning at most `n` rows from `all`.
    #[must_use]
    pub fn limit(&self, n: u64) -> Self {
        let mut next = self.clone();
        next.limit = Some(n);
        next
    }

    /// Every matching row.
    #[tracing::instrument(level = "debug", skip(self, cx), fields(model = self.schema.name()))]
    pub async fn all(&self, cx: &Cx) -> Outcome<Vec<Entity>, Error> {
        self.fetch(cx, &self.filter, &self.order_by, self.limit).await
    }

    /// The first matching row, if any.
    #[tracing::instrument(level = "debug", skip(self, cx), fields(model = self.schema.name()))]
    pub async fn first(&self, cx: &Cx) -> Outcome<Option<Entity>, Error> {
        match self.fetch(cx, &self.filter, &self.order_by, Some(1)).await {
            Outcome::Ok(rows) => Outcome::Ok(rows.into_iter().next()),
            Outcome::Err(e) => Outcome::Err(e),
            Outcome::Cancelled(r) => Outcome::Cancelled(r),
            Outcome::Panicked(p) => Outcome::Panicked(p),
        }
    }

    /// Exactly one row matching `conditions`.
    ///
    /// This is a fresh lookup: accumulated filters and ordering are ignored.
    /// No match is [`Error::ObjectNotFound`], several are
    /// [`Error::MultipleObjectsReturned`].
    pub async fn get<I, K, V>(&self, cx: &Cx, conditions: I) -> Outcome<Entity, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let filter: Filter = conditions.into_iter().collect();
        tracing::debug!(model = self.schema.name(), filter = ?filter, "Getting object");

        let mut rows = match self.fetch(cx, &filter, &[], None).await {
            Outcome::Ok(rows) => rows,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };

        match rows.len() {
            0 => Outcome::Err(Error::ObjectNotFound {
                model: self.schema.name().to_string(),
            }),
            1 => match rows.pop() {
                Some(entity) => Outcome::Ok(entity),
                None => Outcome::Err(Error::ObjectNotFound {
                    model: self.schema.name().to_string(),
                }),
            },
            count => Outcome::Err(Error::MultipleObjectsReturned {
                model: self.schema.name().to_string(),
                count,
            }),
        }
    }

    /// Build an entity from `values`, save it and return it.
    pub async fn create<I, K, V>(&self, cx: &Cx, values: I) -> Outcome<Entity, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut entity = match Entity::with_values(&self.schema, values) {
            Ok(entity) => entity,
            Err(e) => return Outcome::Err(e),
        };
        match self.db.save(cx, &mut entity).await {
            Outcome::Ok(()) => Outcome::Ok(entity),
            Outcome::Err(e) => Outcome::Err(e),
            Outcome::Cancelled(r) => Outcome::Cancelled(r),
            Outcome::Panicked(p) => Outcome::Panicked(p),
        }
    }

    async fn fetch(
        &self,
        cx: &Cx,
        filter: &Filter,
        order_by: &[OrderBy],
        limit: Option<u64>,
    ) -> Outcome<Vec<Entity>, Error> {
        if let Err(e) = self.check_query(filter, order_by) {
            return Outcome::Err(e);
        }
        if let Err(e) = self.db.ensure_connected() {
            return Outcome::Err(e);
        }

        let rows = match self
            .db
            .engine()
            .select(cx, &self.schema, filter, order_by, limit)
            .await
        {
            Outcome::Ok(rows) => rows,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };

        tracing::debug!(model = self.schema.name(), rows = rows.len(), "Fetched rows");
        Outcome::Ok(
            rows.iter()
                .map(|row| Entity::from_row(&self.schema, row))
                .collect(),
        )
    }

    /// Filter columns must exist and their values must pass the column's
    /// check; ordering columns must exist.
    fn check_query(&self, filter: &Filter, order_by: &[OrderBy]) -> Result<()> {
        for (column, value) in filter.iter() {
            let Some(col) = self.schema.column(column) else {
                return Err(self.schema.unknown_field(column));
            };
            col.validate(value)?;
        }
        for entry in order_by {
            if self.schema.column(&entry.column).is_none() {
                return Err(self.schema.unknown_field(&entry.column));
            }
        }
        Ok(())
    }
}
