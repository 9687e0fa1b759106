//! QUARRY Test Utilities
//!
//! Centralized test infrastructure for the QUARRY workspace:
//! - A reference [`QueryBuilder`] that records constraints as SQL text
//! - A reference field applier covering every filter operator
//! - Proptest generators for filters, payloads and nested trees
//! - Test fixtures and custom assertions

// Re-export core types for convenience
pub use quarry_core::{
    apply_filter, cast_if_semistructured, relation_path_to_camel, FieldApplier, FieldExpr, Filter,
    ListPlan, Order, PaginationMeta, QueryBuilder, QueryPayload, SortDirection,
};
pub use quarry_dsl::{NestedNode, ParseOptions};

use serde_json::Value;
use std::collections::BTreeSet;

// ============================================================================
// RECORDING BUILDER
// ============================================================================

/// One conjunct. A disjunction is grouped whenever other conjuncts sit
/// beside it.
#[derive(Debug, Clone, PartialEq)]
struct Clause {
    sql: String,
    args: Vec<Value>,
    disjunction: bool,
}

/// Condition text with positional `?` placeholders and their arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedQuery {
    pub sql: String,
    pub args: Vec<Value>,
}

/// Reference [`QueryBuilder`] that records conditions as SQL text.
///
/// Context (table and known relations) survives
/// `clone_isolated`; recorded clauses do not. Empty sub-builders are ignored
/// by `and`, `or` and `not`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingBuilder {
    table: String,
    relations: BTreeSet<String>,
    clauses: Vec<Clause>,
}

impl RecordingBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    /// Declare a relation that dotted paths may traverse.
    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.relations.insert(relation.into());
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn is_relation(&self, name: &str) -> bool {
        self.relations.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    fn push(mut self, sql: String, args: Vec<Value>) -> Self {
        self.clauses.push(Clause {
            sql,
            args,
            disjunction: false,
        });
        self
    }

    fn render(&self) -> RenderedQuery {
        let mut rendered = RenderedQuery::default();
        let grouped = self.clauses.len() > 1;
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                rendered.sql.push_str(" AND ");
            }
            if grouped && clause.disjunction {
                rendered.sql.push_str(&format!("({})", clause.sql));
            } else {
                rendered.sql.push_str(&clause.sql);
            }
            rendered.args.extend(clause.args.iter().cloned());
        }
        rendered
    }

    /// Resolve a filter path to a column reference.
    ///
    /// Dotted paths that do not start with a declared relation address a JSON
    /// document column. Returns the reference and whether it is such a path.
    pub fn field_ref(&self, path: &str) -> (String, bool) {
        let segments: Vec<&str> = path.split('.').collect();
        match segments.as_slice() {
            [column] => {
                if self.table.is_empty() {
                    (quote_ident(column), false)
                } else {
                    (format!("{}.{}", quote_ident(&self.table), quote_ident(column)), false)
                }
            }
            [first, .., last] if self.is_relation(first) => {
                let relation = segments[..segments.len() - 1].join(".");
                (
                    format!("{}.{}", quote_ident(&relation_path_to_camel(&relation)), quote_ident(last)),
                    false,
                )
            }
            [column, rest @ ..] => (
                format!("({} #>> '{{{}}}')", quote_ident(column), rest.join(",")),
                true,
            ),
            [] => (String::new(), false),
        }
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

impl QueryBuilder for RecordingBuilder {
    type Query = RenderedQuery;

    fn where_clause(self, condition: &str, args: Vec<Value>) -> Self {
        self.push(condition.to_string(), args)
    }

    fn and(self, sub: Self) -> Self {
        if sub.is_empty() {
            return self;
        }
        let inner = sub.render();
        self.push(format!("({})", inner.sql), inner.args)
    }

    /// Everything recorded so far becomes the left side of the disjunction.
    fn or(mut self, sub: Self) -> Self {
        if sub.is_empty() {
            return self;
        }
        let inner = sub.render();
        if self.is_empty() {
            return self.push(format!("({})", inner.sql), inner.args);
        }

        let left = self.render();
        let left_sql = if self.clauses.len() > 1 {
            format!("({})", left.sql)
        } else {
            left.sql
        };
        let mut args = left.args;
        args.extend(inner.args);
        self.clauses = vec![Clause {
            sql: format!("{} OR ({})", left_sql, inner.sql),
            args,
            disjunction: true,
        }];
        self
    }

    fn not(self, sub: Self) -> Self {
        if sub.is_empty() {
            return self;
        }
        let inner = sub.render();
        self.push(format!("NOT ({})", inner.sql), inner.args)
    }

    fn clone_isolated(&self) -> Self {
        Self {
            table: self.table.clone(),
            relations: self.relations.clone(),
            clauses: Vec::new(),
        }
    }

    fn materialize(&self) -> RenderedQuery {
        self.render()
    }
}

// ============================================================================
// REFERENCE FIELD APPLIER
// ============================================================================

/// Apply every operator in `expr` to `builder` as SQL conditions.
///
/// Relation paths (`author.name` where `author` is a declared relation)
/// become `"Author"."name"`; other dotted paths address a JSON document
/// column and are cast before typed comparisons. A null `$eq`/`$ne` becomes
/// `IS NULL`/`IS NOT NULL`. Patterns are wrapped as `%pattern%`.
pub fn sql_field_applier(builder: RecordingBuilder, path: &str, expr: &FieldExpr) -> RecordingBuilder {
    let (field, semi) = builder.field_ref(path);
    let cast = |sample: &Value| cast_if_semistructured(&field, semi, sample);
    let mut builder = builder;

    if let Some(value) = &expr.eq {
        builder = match value {
            Value::Null => builder.where_clause(&format!("{} IS NULL", field), vec![]),
            value => builder.where_clause(&format!("{} = ?", cast(value)), vec![value.clone()]),
        };
    }
    if let Some(value) = &expr.ne {
        builder = match value {
            Value::Null => builder.where_clause(&format!("{} IS NOT NULL", field), vec![]),
            value => builder.where_clause(&format!("{} <> ?", cast(value)), vec![value.clone()]),
        };
    }

    for (operand, op) in [(&expr.gt, ">"), (&expr.gte, ">="), (&expr.lt, "<"), (&expr.lte, "<=")] {
        if let Some(value) = operand {
            builder = builder.where_clause(&format!("{} {} ?", cast(value), op), vec![value.clone()]);
        }
    }

    if let Some(values) = expr.in_list.as_ref().filter(|v| !v.is_empty()) {
        builder = builder.where_clause(&format!("{} IN ?", field), vec![Value::Array(values.clone())]);
    }
    if let Some(values) = expr.nin_list.as_ref().filter(|v| !v.is_empty()) {
        builder = builder.where_clause(&format!("{} NOT IN ?", field), vec![Value::Array(values.clone())]);
    }

    if let Some(pattern) = expr.like.as_deref().filter(|p| !p.is_empty()) {
        builder = builder.where_clause(&format!("{} LIKE ?", field), vec![Value::from(format!("%{}%", pattern))]);
    }
    if let Some(pattern) = expr.ilike.as_deref().filter(|p| !p.is_empty()) {
        builder = builder.where_clause(&format!("{} ILIKE ?", field), vec![Value::from(format!("%{}%", pattern))]);
    }

    if let Some((low, high)) = &expr.between {
        builder = builder.where_clause(
            &format!("{} BETWEEN ? AND ?", cast(low)),
            vec![low.clone(), high.clone()],
        );
    }

    if let Some(exists) = expr.exists {
        let test = if exists { "IS NOT NULL" } else { "IS NULL" };
        builder = builder.where_clause(&format!("{} {}", field, test), vec![]);
    }
    if let Some(is_null) = expr.is_null {
        let test = if is_null { "IS NULL" } else { "IS NOT NULL" };
        builder = builder.where_clause(&format!("{} {}", field, test), vec![]);
    }

    builder
}

/// Apply `filter` onto `builder` with [`sql_field_applier`] and render it.
pub fn render_filter(builder: RecordingBuilder, filter: &Filter) -> RenderedQuery {
    apply_filter(builder, filter, &mut sql_field_applier).materialize()
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for filters, payloads and nested trees.
    //!
    //! Generated values survive a JSON encode/decode cycle unchanged: scalars
    //! exclude null and floats, operator lists and patterns are non-empty,
    //! and every field expression sets at least one operator.

    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    /// Generate an integer, string or boolean JSON value.
    pub fn arb_scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<i64>().prop_map(Value::from),
            "[a-zA-Z0-9 _-]{0,12}".prop_map(Value::from),
            any::<bool>().prop_map(Value::from),
            Just(Value::Null),
        ]
    }

    /// Generate a relation or column name.
    pub fn arb_identifier() -> impl Strategy<Value = String> {
        "[a-z][a-z_]{0,7}".prop_map(|s| s)
    }

    /// Generate a field path of one to three segments.
    pub fn arb_field_path() -> impl Strategy<Value = String> {
        prop::collection::vec(arb_identifier(), 1..=3).prop_map(|segments| segments.join("."))
    }

    fn arb_pattern() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9]{1,8}".prop_map(|s| s)
    }

    fn arb_list() -> impl Strategy<Value = Vec<Value>> {
        prop::collection::vec(arb_scalar(), 1..4)
    }

    /// Generate a field expression: bare equality or an operator object.
    pub fn arb_field_expr() -> impl Strategy<Value = FieldExpr> {
        let comparisons = (
            prop::option::of(arb_scalar()),
            prop::option::of(arb_scalar()),
            prop::option::of(arb_scalar()),
            prop::option::of(arb_scalar()),
            prop::option::of(arb_scalar()),
            prop::option::of(arb_scalar()),
        );
        let others = (
            prop::option::of(arb_list()),
            prop::option::of(arb_list()),
            prop::option::of(arb_pattern()),
            prop::option::of(arb_pattern()),
            prop::option::of((arb_scalar(), arb_scalar())),
            prop::option::of(any::<bool>()),
            prop::option::of(any::<bool>()),
        );
        let operators = (comparisons, others, arb_scalar()).prop_map(
            |((eq, ne, gt, gte, lt, lte), (in_list, nin_list, like, ilike, between, exists, is_null), fallback)| {
                let expr = FieldExpr {
                    eq,
                    ne,
                    gt,
                    gte,
                    lt,
                    lte,
                    in_list,
                    nin_list,
                    like,
                    ilike,
                    between,
                    exists,
                    is_null,
                };
                if expr.is_empty() {
                    FieldExpr::equal_to(fallback)
                } else {
                    expr
                }
            },
        );

        prop_oneof![arb_scalar().prop_map(FieldExpr::equal_to), operators]
    }

    fn arb_fields() -> impl Strategy<Value = BTreeMap<String, FieldExpr>> {
        prop::collection::btree_map(arb_field_path(), arb_field_expr(), 0..4)
    }

    /// Generate a filter tree up to four levels deep.
    pub fn arb_filter() -> impl Strategy<Value = Filter> {
        let leaf = arb_fields().prop_map(|fields| Filter {
            fields,
            ..Filter::default()
        });
        leaf.prop_recursive(4, 24, 3, |inner| {
            (
                arb_fields(),
                prop::collection::vec(inner.clone(), 0..3),
                prop::collection::vec(inner.clone(), 0..3),
                prop::option::of(inner),
            )
                .prop_map(|(fields, and, or, not)| Filter {
                    and,
                    or,
                    not: not.map(Box::new),
                    fields,
                })
        })
    }

    /// Generate an ordering term.
    pub fn arb_order() -> impl Strategy<Value = Order> {
        (arb_field_path(), any::<bool>()).prop_map(|(field, desc)| {
            if desc {
                Order::desc(field)
            } else {
                Order::asc(field)
            }
        })
    }

    /// Generate a request payload.
    pub fn arb_query_payload() -> impl Strategy<Value = QueryPayload> {
        (
            arb_filter(),
            prop::collection::vec(arb_order(), 0..3),
            prop::collection::vec(arb_identifier(), 0..4),
            prop::option::of(1i64..200),
            prop::option::of(0i64..10_000),
            prop::option::of(-2i64..50),
        )
            .prop_map(|(where_, order, select, limit, offset, page)| QueryPayload {
                where_,
                order,
                select,
                nested: String::new(),
                limit,
                offset,
                page,
            })
    }

    fn arb_node_query() -> impl Strategy<Value = Option<QueryPayload>> {
        prop::option::weighted(0.3, arb_query_payload())
    }

    /// Generate a nested eager-load forest; about a third of the nodes carry
    /// a sub-query.
    pub fn arb_nested_tree() -> impl Strategy<Value = Vec<NestedNode>> {
        let leaf = (arb_identifier(), arb_node_query()).prop_map(|(name, query)| NestedNode {
            name,
            query,
            children: Vec::new(),
        });
        let node = leaf.prop_recursive(3, 16, 3, |inner| {
            (arb_identifier(), arb_node_query(), prop::collection::vec(inner, 0..3)).prop_map(
                |(name, query, children)| NestedNode {
                    name,
                    query,
                    children,
                },
            )
        });
        prop::collection::vec(node, 0..4)
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built values for common scenarios.

    use super::*;
    use serde_json::json;

    /// Builder for a `users` table with `author` and `order_items` relations.
    pub fn users_builder() -> RecordingBuilder {
        RecordingBuilder::new("users")
            .with_relation("author")
            .with_relation("order_items")
    }

    /// A filter touching fields, relations, JSON paths and all combinators.
    pub fn mixed_filter() -> Filter {
        Filter::from_value(json!({
            "status": "active",
            "age": {"$gte": 18, "$lt": 65},
            "$or": [{"role": "admin"}, {"author.name": {"$ilike": "ann"}}],
            "$not": {"meta.flags.banned": true}
        }))
        .unwrap_or_default()
    }

    /// A paged request for the second page of ten rows.
    pub fn second_page() -> QueryPayload {
        QueryPayload {
            where_: Filter::new().with_field("status", FieldExpr::equal_to("active")),
            order: vec![Order::desc("created_at")],
            limit: Some(10),
            page: Some(2),
            ..QueryPayload::default()
        }
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions shared across crate test suites.

    use super::*;

    /// Assert that `filter` survives a JSON encode/decode cycle.
    pub fn assert_filter_round_trips(filter: &Filter) {
        let json = filter.to_value().to_string();
        let decoded = Filter::from_json(&json)
            .unwrap_or_else(|e| panic!("encoded filter did not decode: {e}\n{json}"));
        assert_eq!(&decoded, filter, "round trip changed filter: {json}");
    }

    /// Assert that every `?` placeholder has exactly one argument.
    pub fn assert_placeholders_match(rendered: &RenderedQuery) {
        let placeholders = rendered.sql.matches('?').count();
        assert_eq!(
            placeholders,
            rendered.args.len(),
            "placeholder/argument mismatch in {:?}",
            rendered.sql
        );
    }

    /// Assert the pagination metadata invariants for a normalized payload.
    pub fn assert_meta_consistent(meta: &PaginationMeta) {
        if let (Some(count), Some(limit), Some(page_count)) = (meta.count, meta.limit, meta.page_count) {
            assert!(page_count * limit >= count, "pages too few: {meta:?}");
            assert!((page_count - 1) * limit < count.max(1), "pages too many: {meta:?}");
        }
        if let Some(current) = meta.current_page {
            assert!(current >= 1, "current page below 1: {meta:?}");
        }
    }
}

// ============================================================================
// TRACING
// ============================================================================

/// Install a test subscriber honoring `RUST_LOG`. Safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// TESTS
// ============================================================================
