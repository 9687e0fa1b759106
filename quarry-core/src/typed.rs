//! Typed filter construction.
//!
//! [`Field`] ties a column name to a record type so filters for one model
//! cannot accidentally reference another model's fields:
//!
//! ```
//! use quarry_core::typed::{Field, FilterBuilder};
//!
//! struct RealmUnit;
//!
//! const UUID: Field<RealmUnit> = Field::new("uuid");
//! const NAME: Field<RealmUnit> = Field::new("name");
//! const REALM_UUID: Field<RealmUnit> = Field::new("realm_uuid");
//!
//! let filter = FilterBuilder::<RealmUnit>::new()
//!     .eq(UUID, "value")
//!     .is_in(REALM_UUID, ["a", "b"])
//!     .and([FilterBuilder::new().like(NAME, "admin")])
//!     .build();
//!
//! assert_eq!(filter.fields.len(), 2);
//! assert_eq!(filter.and.len(), 1);
//! ```

use crate::filter::{FieldExpr, Filter};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// A field path belonging to record type `T`.
pub struct Field<T> {
    path: &'static str,
    _record: PhantomData<fn() -> T>,
}

impl<T> Field<T> {
    pub const fn new(path: &'static str) -> Self {
        Self {
            path,
            _record: PhantomData,
        }
    }

    pub const fn path(&self) -> &'static str {
        self.path
    }
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Field<T> {}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field").field(&self.path).finish()
    }
}

/// Fluent builder producing the same [`Filter`] values as manual construction.
///
/// Calling several operators on one field merges them into a single
/// [`FieldExpr`]; calling the same operator twice keeps the last operand.
pub struct FilterBuilder<T> {
    filter: Filter,
    _record: PhantomData<fn() -> T>,
}

impl<T> Default for FilterBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for FilterBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterBuilder")
            .field("filter", &self.filter)
            .finish()
    }
}

impl<T> FilterBuilder<T> {
    pub fn new() -> Self {
        Self {
            filter: Filter::default(),
            _record: PhantomData,
        }
    }

    pub fn build(self) -> Filter {
        self.filter
    }

    fn set(mut self, field: Field<T>, update: impl FnOnce(&mut FieldExpr)) -> Self {
        let expr = self.filter.fields.entry(field.path.to_string()).or_default();
        update(expr);
        self
    }

    pub fn eq(self, field: Field<T>, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.set(field, |e| e.eq = Some(value))
    }

    pub fn ne(self, field: Field<T>, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.set(field, |e| e.ne = Some(value))
    }

    pub fn gt(self, field: Field<T>, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.set(field, |e| e.gt = Some(value))
    }

    pub fn gte(self, field: Field<T>, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.set(field, |e| e.gte = Some(value))
    }

    pub fn lt(self, field: Field<T>, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.set(field, |e| e.lt = Some(value))
    }

    pub fn lte(self, field: Field<T>, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.set(field, |e| e.lte = Some(value))
    }

    pub fn is_in<V: Into<Value>>(self, field: Field<T>, values: impl IntoIterator<Item = V>) -> Self {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.set(field, |e| e.in_list = Some(values))
    }

    pub fn not_in<V: Into<Value>>(
        self,
        field: Field<T>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.set(field, |e| e.nin_list = Some(values))
    }

    pub fn like(self, field: Field<T>, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        self.set(field, |e| e.like = Some(pattern))
    }

    pub fn ilike(self, field: Field<T>, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        self.set(field, |e| e.ilike = Some(pattern))
    }

    pub fn between(self, field: Field<T>, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        let range = (low.into(), high.into());
        self.set(field, |e| e.between = Some(range))
    }

    pub fn is_null(self, field: Field<T>) -> Self {
        self.set(field, |e| e.is_null = Some(true))
    }

    pub fn not_null(self, field: Field<T>) -> Self {
        self.set(field, |e| e.is_null = Some(false))
    }

    pub fn exists(self, field: Field<T>) -> Self {
        self.set(field, |e| e.exists = Some(true))
    }

    pub fn not_exists(self, field: Field<T>) -> Self {
        self.set(field, |e| e.exists = Some(false))
    }

    /// Append each builder's filter as a conjunct.
    pub fn and(mut self, filters: impl IntoIterator<Item = FilterBuilder<T>>) -> Self {
        self.filter.and.extend(filters.into_iter().map(FilterBuilder::build));
        self
    }

    /// Append each builder's filter as a disjunct.
    pub fn or(mut self, filters: impl IntoIterator<Item = FilterBuilder<T>>) -> Self {
        self.filter.or.extend(filters.into_iter().map(FilterBuilder::build));
        self
    }

    /// Negate the given builder's filter (replacing any previous negation).
    pub fn not(mut self, filter: FilterBuilder<T>) -> Self {
        self.filter.not = Some(Box::new(filter.build()));
        self
    }
}
