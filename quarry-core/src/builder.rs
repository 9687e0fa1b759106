//! Query-builder capability and the filter-application fold.
//!
//! Storage adapters implement [`QueryBuilder`] for their native query type
//! and supply a [`FieldApplier`] that turns one field's operators into
//! native constraints. [`apply_filter`] drives both without ever looking at
//! the query being built.

use crate::filter::{FieldExpr, Filter};
use serde_json::Value;
use tracing::trace;

/// Engine-specific accumulator of query constraints.
///
/// All combinators consume the builder and return the updated one, so an
/// implementation may either mutate in place or rebuild.
///
/// # Implementation Requirements
///
/// - `clone_isolated()` must return a builder that keeps whatever context is
///   needed to keep building (model, schema, session) but shares no filter
///   state with the original. Mutating the clone must never affect the
///   original, or sibling `$and`/`$or` branches will see each other's
///   constraints.
/// - `and`, `or` and `not` receive a builder produced by `clone_isolated()`.
pub trait QueryBuilder: Sized {
    /// Engine-native query produced by [`QueryBuilder::materialize`].
    type Query;

    /// Add a raw condition with positional arguments.
    fn where_clause(self, condition: &str, args: Vec<Value>) -> Self;

    /// Conjoin the constraints accumulated in `sub`.
    fn and(self, sub: Self) -> Self;

    /// Disjoin the constraints accumulated in `sub`.
    fn or(self, sub: Self) -> Self;

    /// Conjoin the negation of the constraints accumulated in `sub`.
    fn not(self, sub: Self) -> Self;

    /// Fresh builder with the same context and no filter state.
    fn clone_isolated(&self) -> Self;

    /// Produce the engine-native query.
    fn materialize(&self) -> Self::Query;
}

/// Translates one field's operators into builder constraints.
///
/// Every set operator in `expr` must become at least one constraint on
/// `path`. Closures of the matching shape implement this trait.
pub trait FieldApplier<B> {
    fn apply_field(&mut self, builder: B, path: &str, expr: &FieldExpr) -> B;
}

impl<B, F> FieldApplier<B> for F
where
    F: FnMut(B, &str, &FieldExpr) -> B,
{
    fn apply_field(&mut self, builder: B, path: &str, expr: &FieldExpr) -> B {
        self(builder, path, expr)
    }
}

/// Apply `filter` onto `builder`.
///
/// Fields are handed to `applier` in path order. Each `$and`, `$or` and
/// `$not` child is applied onto its own isolated clone, which is then folded
/// back with the matching combinator. The fold never fails; adapter faults
/// surface through the adapter's own builder or applier.
pub fn apply_filter<B, A>(builder: B, filter: &Filter, applier: &mut A) -> B
where
    B: QueryBuilder,
    A: FieldApplier<B> + ?Sized,
{
    apply_at_depth(builder, filter, applier, 0)
}

fn apply_at_depth<B, A>(mut builder: B, filter: &Filter, applier: &mut A, depth: usize) -> B
where
    B: QueryBuilder,
    A: FieldApplier<B> + ?Sized,
{
    trace!(
        depth,
        fields = filter.fields.len(),
        and = filter.and.len(),
        or = filter.or.len(),
        not = filter.not.is_some(),
        "applying filter node"
    );

    for (path, expr) in &filter.fields {
        builder = applier.apply_field(builder, path, expr);
    }

    for child in &filter.and {
        let sub = apply_at_depth(builder.clone_isolated(), child, applier, depth + 1);
        builder = builder.and(sub);
    }

    for child in &filter.or {
        let sub = apply_at_depth(builder.clone_isolated(), child, applier, depth + 1);
        builder = builder.or(sub);
    }

    if let Some(child) = &filter.not {
        let sub = apply_at_depth(builder.clone_isolated(), child, applier, depth + 1);
        builder = builder.not(sub);
    }

    builder
}

// ============================================================================
// TESTS
// ============================================================================
