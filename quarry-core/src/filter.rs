//! Boolean filter expressions and their JSON wire format.
//!
//! A [`Filter`] is a tree of field constraints combined with `$and`, `$or`
//! and `$not`. Each field carries a [`FieldExpr`], the set of operators
//! applied to that one field path.
//!
//! ```text
//! {
//!   "status": "active",                  implicit equality
//!   "age": { "$gte": 18, "$lt": 65 },    operator object
//!   "$or": [ { "role": "admin" }, { "author.name": { "$ilike": "ann" } } ],
//!   "$not": { "deleted_at": { "$null": false } }
//! }
//! ```

use crate::error::DecodeError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Wire key for conjunction.
pub const AND_KEY: &str = "$and";
/// Wire key for disjunction.
pub const OR_KEY: &str = "$or";
/// Wire key for negation.
pub const NOT_KEY: &str = "$not";

// ============================================================================
// FIELD EXPRESSIONS
// ============================================================================

/// Operators applied to a single field path.
///
/// Every operand is optional; an absent operand means the operator is not
/// applied. When several operands are set they are independent constraints
/// ANDed together on the same field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "OperatorObject")]
pub struct FieldExpr {
    #[serde(rename = "$eq", skip_serializing_if = "Option::is_none")]
    pub eq: Option<Value>,
    #[serde(rename = "$ne", skip_serializing_if = "Option::is_none")]
    pub ne: Option<Value>,
    #[serde(rename = "$gt", skip_serializing_if = "Option::is_none")]
    pub gt: Option<Value>,
    #[serde(rename = "$gte", skip_serializing_if = "Option::is_none")]
    pub gte: Option<Value>,
    #[serde(rename = "$lt", skip_serializing_if = "Option::is_none")]
    pub lt: Option<Value>,
    #[serde(rename = "$lte", skip_serializing_if = "Option::is_none")]
    pub lte: Option<Value>,
    /// Membership in a list of values.
    #[serde(rename = "$in", skip_serializing_if = "Option::is_none")]
    pub in_list: Option<Vec<Value>>,
    /// Non-membership in a list of values.
    #[serde(rename = "$nin", skip_serializing_if = "Option::is_none")]
    pub nin_list: Option<Vec<Value>>,
    /// Case-sensitive substring pattern.
    #[serde(rename = "$like", skip_serializing_if = "Option::is_none")]
    pub like: Option<String>,
    /// Case-insensitive substring pattern.
    #[serde(rename = "$ilike", skip_serializing_if = "Option::is_none")]
    pub ilike: Option<String>,
    /// Inclusive `(low, high)` range.
    #[serde(rename = "$between", skip_serializing_if = "Option::is_none")]
    pub between: Option<(Value, Value)>,
    /// `true` when the field must be non-null.
    #[serde(rename = "$exists", skip_serializing_if = "Option::is_none")]
    pub exists: Option<bool>,
    /// `true` when the field must be null, `false` when it must not be.
    #[serde(rename = "$null", skip_serializing_if = "Option::is_none")]
    pub is_null: Option<bool>,
}

/// Raw shape of an operator object as it appears on the wire.
///
/// Unknown keys are ignored. Empty patterns and empty lists are dropped when
/// converting into a [`FieldExpr`] so they never count as a set operator.
#[derive(Deserialize)]
struct OperatorObject {
    #[serde(rename = "$eq", default, deserialize_with = "present_operand")]
    eq: Option<Value>,
    #[serde(rename = "$ne", default, deserialize_with = "present_operand")]
    ne: Option<Value>,
    #[serde(rename = "$gt", default, deserialize_with = "present_operand")]
    gt: Option<Value>,
    #[serde(rename = "$gte", default, deserialize_with = "present_operand")]
    gte: Option<Value>,
    #[serde(rename = "$lt", default, deserialize_with = "present_operand")]
    lt: Option<Value>,
    #[serde(rename = "$lte", default, deserialize_with = "present_operand")]
    lte: Option<Value>,
    #[serde(rename = "$in", default)]
    in_list: Option<Vec<Value>>,
    #[serde(rename = "$nin", default)]
    nin_list: Option<Vec<Value>>,
    #[serde(rename = "$like", default)]
    like: Option<String>,
    #[serde(rename = "$ilike", default)]
    ilike: Option<String>,
    #[serde(rename = "$between", default)]
    between: Option<(Value, Value)>,
    #[serde(rename = "$exists", default)]
    exists: Option<bool>,
    #[serde(rename = "$null", default)]
    is_null: Option<bool>,
}

/// A key that is present yields `Some`, even when its value is `null`.
fn present_operand<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl From<OperatorObject> for FieldExpr {
    fn from(raw: OperatorObject) -> Self {
        Self {
            eq: raw.eq,
            ne: raw.ne,
            gt: raw.gt,
            gte: raw.gte,
            lt: raw.lt,
            lte: raw.lte,
            in_list: raw.in_list.filter(|values| !values.is_empty()),
            nin_list: raw.nin_list.filter(|values| !values.is_empty()),
            like: raw.like.filter(|pattern| !pattern.is_empty()),
            ilike: raw.ilike.filter(|pattern| !pattern.is_empty()),
            between: raw.between,
            exists: raw.exists,
            is_null: raw.is_null,
        }
    }
}

impl FieldExpr {
    /// Create an expression holding only an equality operand.
    pub fn equal_to(value: impl Into<Value>) -> Self {
        Self {
            eq: Some(value.into()),
            ..Self::default()
        }
    }

    /// Whether no operator is set.
    pub fn is_empty(&self) -> bool {
        self.eq.is_none()
            && self.ne.is_none()
            && self.gt.is_none()
            && self.gte.is_none()
            && self.lt.is_none()
            && self.lte.is_none()
            && self.in_list.as_ref().map_or(true, Vec::is_empty)
            && self.nin_list.as_ref().map_or(true, Vec::is_empty)
            && self.like.as_deref().map_or(true, str::is_empty)
            && self.ilike.as_deref().map_or(true, str::is_empty)
            && self.between.is_none()
            && self.exists.is_none()
            && self.is_null.is_none()
    }

    /// Whether the expression is a plain equality with nothing else set.
    pub fn is_plain_equality(&self) -> bool {
        self.eq.is_some()
            && Self {
                eq: None,
                ..self.clone()
            }
            .is_empty()
    }

    /// Decode the value attached to a field key.
    ///
    /// An object carrying at least one recognized operator becomes an operator
    /// expression; anything else (scalars, arrays, objects without operators,
    /// operator objects with mistyped operands) is an implicit `$eq` literal.
    pub fn from_operand(value: Value) -> Self {
        if value.is_object() {
            if let Ok(expr) = serde_json::from_value::<FieldExpr>(value.clone()) {
                if !expr.is_empty() {
                    return expr;
                }
            }
        }
        Self::equal_to(value)
    }

    /// Wire form of this expression: a bare value for plain non-object
    /// equality, an operator object otherwise.
    pub fn to_operand(&self) -> Value {
        match &self.eq {
            Some(value) if self.is_plain_equality() && !value.is_object() => value.clone(),
            _ => serde_json::to_value(self).unwrap_or(Value::Null),
        }
    }
}

// ============================================================================
// FILTER TREE
// ============================================================================

/// Boolean expression node over field constraints.
///
/// Children under `and`, `or` and `not` are owned by their parent; the tree
/// has no sharing and no cycles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    /// Conjunction of children. Empty means no constraint.
    pub and: Vec<Filter>,
    /// Disjunction of children.
    pub or: Vec<Filter>,
    /// Negated child.
    pub not: Option<Box<Filter>>,
    /// Field path (dotted for relation fields) to its operators.
    pub fields: BTreeMap<String, FieldExpr>,
}

impl Filter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the filter constrains nothing.
    pub fn is_empty(&self) -> bool {
        self.and.is_empty() && self.or.is_empty() && self.not.is_none() && self.fields.is_empty()
    }

    /// Add (or replace) the expression for one field path.
    pub fn with_field(mut self, path: impl Into<String>, expr: FieldExpr) -> Self {
        self.fields.insert(path.into(), expr);
        self
    }

    /// Conjunction of the given filters.
    pub fn all_of(filters: Vec<Filter>) -> Self {
        Self {
            and: filters,
            ..Self::default()
        }
    }

    /// Disjunction of the given filters.
    pub fn any_of(filters: Vec<Filter>) -> Self {
        Self {
            or: filters,
            ..Self::default()
        }
    }

    /// Negation of the given filter.
    pub fn negate(filter: Filter) -> Self {
        Self {
            not: Some(Box::new(filter)),
            ..Self::default()
        }
    }

    /// Decode a filter from JSON text.
    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(json).map_err(DecodeError::invalid_json)?;
        Self::from_value(value)
    }

    /// Decode a filter from an already parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(DecodeError::NotAnObject {
                    context: "filter".to_string(),
                    found: json_kind(&other).to_string(),
                })
            }
        };

        let mut filter = Filter::default();
        for (key, value) in map {
            match key.as_str() {
                AND_KEY => filter.and = decode_filter_list(AND_KEY, value)?,
                OR_KEY => filter.or = decode_filter_list(OR_KEY, value)?,
                NOT_KEY => {
                    filter.not = match value {
                        Value::Null => None,
                        value => Some(Box::new(Filter::from_value(value).map_err(|e| {
                            DecodeError::InvalidCombinator {
                                key: NOT_KEY.to_string(),
                                reason: e.to_string(),
                            }
                        })?)),
                    }
                }
                _ => {
                    filter.fields.insert(key, FieldExpr::from_operand(value));
                }
            }
        }
        Ok(filter)
    }

    /// Encode the filter to its JSON wire form.
    pub fn to_value(&self) -> Value {
        let mut map = serde_json::Map::new();
        if !self.and.is_empty() {
            map.insert(
                AND_KEY.to_string(),
                Value::Array(self.and.iter().map(Filter::to_value).collect()),
            );
        }
        if !self.or.is_empty() {
            map.insert(
                OR_KEY.to_string(),
                Value::Array(self.or.iter().map(Filter::to_value).collect()),
            );
        }
        if let Some(not) = &self.not {
            map.insert(NOT_KEY.to_string(), not.to_value());
        }
        for (path, expr) in &self.fields {
            map.insert(path.clone(), expr.to_operand());
        }
        Value::Object(map)
    }

    /// Visit every `(path, expr)` pair in the tree, depth first.
    pub fn walk_fields<F>(&self, visit: &mut F)
    where
        F: FnMut(&str, &FieldExpr),
    {
        for (path, expr) in &self.fields {
            visit(path, expr);
        }
        for child in self.and.iter().chain(self.or.iter()) {
            child.walk_fields(visit);
        }
        if let Some(not) = &self.not {
            not.walk_fields(visit);
        }
    }

    /// First segments of every dotted field path anywhere in the tree.
    ///
    /// These are the relations an adapter must join before the filter can be
    /// applied.
    pub fn relation_prefixes(&self) -> BTreeSet<String> {
        let mut prefixes = BTreeSet::new();
        self.walk_fields(&mut |path, _| {
            if let Some((relation, _)) = path.split_once('.') {
                prefixes.insert(relation.to_string());
            }
        });
        prefixes
    }
}

fn decode_filter_list(key: &str, value: Value) -> Result<Vec<Filter>, DecodeError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .into_iter()
            .map(Filter::from_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DecodeError::InvalidCombinator {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        other => Err(DecodeError::InvalidCombinator {
            key: key.to_string(),
            reason: format!("expected an array of filters, got {}", json_kind(&other)),
        }),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.fields.len()
            + usize::from(!self.and.is_empty())
            + usize::from(!self.or.is_empty())
            + usize::from(self.not.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        if !self.and.is_empty() {
            map.serialize_entry(AND_KEY, &self.and)?;
        }
        if !self.or.is_empty() {
            map.serialize_entry(OR_KEY, &self.or)?;
        }
        if let Some(not) = &self.not {
            map.serialize_entry(NOT_KEY, not)?;
        }
        for (path, expr) in &self.fields {
            map.serialize_entry(path, &expr.to_operand())?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Filter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Filter::from_value(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_value_is_implicit_equality() {
        let filter = Filter::from_json(r#"{"name": "Joao"}"#).unwrap();
        let expr = &filter.fields["name"];
        assert_eq!(expr.eq, Some(json!("Joao")));
        assert!(expr.is_plain_equality());
        assert!(filter.and.is_empty() && filter.or.is_empty() && filter.not.is_none());
    }

    #[test]
    fn test_operator_object_is_decoded() {
        let filter = Filter::from_json(r#"{"age": {"$gt": 18}}"#).unwrap();
        let expr = &filter.fields["age"];
        assert_eq!(expr.gt, Some(json!(18)));
        assert_eq!(expr.eq, None);
    }

    #[test]
    fn test_recognized_operator_wins_over_unknown_keys() {
        let filter =
            Filter::from_json(r#"{"meta": {"$gt": 18, "extra": "ignored"}}"#).unwrap();
        let expr = &filter.fields["meta"];
        assert_eq!(expr.gt, Some(json!(18)));
        assert_eq!(expr.eq, None);
    }

    #[test]
    fn test_object_without_operators_is_literal_equality() {
        let filter = Filter::from_json(r#"{"meta": {"color": "red"}}"#).unwrap();
        assert_eq!(filter.fields["meta"].eq, Some(json!({"color": "red"})));
    }

    #[test]
    fn test_array_value_is_literal_equality() {
        let filter = Filter::from_json(r#"{"tags": [1, 2]}"#).unwrap();
        assert_eq!(filter.fields["tags"].eq, Some(json!([1, 2])));
    }

    #[test]
    fn test_mistyped_operand_falls_back_to_equality() {
        let filter = Filter::from_json(r#"{"name": {"$like": 5}}"#).unwrap();
        assert_eq!(filter.fields["name"].eq, Some(json!({"$like": 5})));

        let filter = Filter::from_json(r#"{"n": {"$between": [1]}}"#).unwrap();
        assert_eq!(filter.fields["n"].eq, Some(json!({"$between": [1]})));
    }

    #[test]
    fn test_empty_operands_count_as_absent() {
        let filter = Filter::from_json(r#"{"x": {"$in": [], "$like": ""}}"#).unwrap();
        assert_eq!(filter.fields["x"].eq, Some(json!({"$in": [], "$like": ""})));
    }

    #[test]
    fn test_all_operators_decode() {
        let filter = Filter::from_json(
            r#"{"f": {
                "$eq": 1, "$ne": 2, "$gt": 3, "$gte": 4, "$lt": 5, "$lte": 6,
                "$in": [7], "$nin": [8], "$like": "a", "$ilike": "b",
                "$between": [9, 10], "$exists": true, "$null": false
            }}"#,
        )
        .unwrap();
        let expr = &filter.fields["f"];
        assert_eq!(expr.eq, Some(json!(1)));
        assert_eq!(expr.ne, Some(json!(2)));
        assert_eq!(expr.gt, Some(json!(3)));
        assert_eq!(expr.gte, Some(json!(4)));
        assert_eq!(expr.lt, Some(json!(5)));
        assert_eq!(expr.lte, Some(json!(6)));
        assert_eq!(expr.in_list, Some(vec![json!(7)]));
        assert_eq!(expr.nin_list, Some(vec![json!(8)]));
        assert_eq!(expr.like.as_deref(), Some("a"));
        assert_eq!(expr.ilike.as_deref(), Some("b"));
        assert_eq!(expr.between, Some((json!(9), json!(10))));
        assert_eq!(expr.exists, Some(true));
        assert_eq!(expr.is_null, Some(false));
    }

    #[test]
    fn test_and_combinator() {
        let filter = Filter::from_json(r#"{"$and": [{"a": 1}, {"b": 2}]}"#).unwrap();
        assert_eq!(filter.and.len(), 2);
        assert_eq!(filter.and[0].fields["a"].eq, Some(json!(1)));
        assert_eq!(filter.and[1].fields["b"].eq, Some(json!(2)));
        assert!(filter.fields.is_empty());
        assert!(filter.or.is_empty());
        assert!(filter.not.is_none());
    }

    #[test]
    fn test_nested_combinators() {
        let filter = Filter::from_json(
            r#"{"$or": [{"a": 1}, {"$not": {"b": {"$null": true}}}], "c": 3}"#,
        )
        .unwrap();
        assert_eq!(filter.or.len(), 2);
        let not = filter.or[1].not.as_ref().unwrap();
        assert_eq!(not.fields["b"].is_null, Some(true));
        assert_eq!(filter.fields["c"].eq, Some(json!(3)));
    }

    #[test]
    fn test_null_combinators_are_empty() {
        let filter = Filter::from_json(r#"{"$and": null, "$not": null}"#).unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_null_field_value_is_null_equality() {
        let filter = Filter::from_json(r#"{"x": null}"#).unwrap();
        assert_eq!(filter.fields["x"].eq, Some(Value::Null));
    }

    #[test]
    fn test_null_operands_are_set() {
        let filter = Filter::from_value(json!({"a": {"$eq": null}, "b": {"$ne": null}})).unwrap();
        assert_eq!(filter.fields["a"], FieldExpr::equal_to(Value::Null));
        assert_eq!(
            filter.fields["b"],
            FieldExpr {
                ne: Some(Value::Null),
                ..FieldExpr::default()
            }
        );

        let expr = FieldExpr {
            ne: Some(Value::Null),
            gt: Some(json!(1)),
            ..FieldExpr::default()
        };
        let filter = Filter::new().with_field("c", expr);
        assert_eq!(Filter::from_value(filter.to_value()).unwrap(), filter);
    }

    #[test]
    fn test_non_object_filter_is_rejected() {
        let err = Filter::from_json("[1, 2]").unwrap_err();
        assert!(matches!(err, DecodeError::NotAnObject { .. }));
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let err = Filter::from_json(r#"{"a": "#).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidJson { .. }));
    }

    #[test]
    fn test_bad_combinator_shape_is_rejected() {
        let err = Filter::from_json(r#"{"$and": {"a": 1}}"#).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidCombinator { ref key, .. } if key == "$and"));

        let err = Filter::from_json(r#"{"$or": [1]}"#).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidCombinator { ref key, .. } if key == "$or"));

        let err = Filter::from_json(r#"{"$not": "x"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidCombinator { ref key, .. } if key == "$not"));
    }

    #[test]
    fn test_duplicate_key_later_wins() {
        let filter = Filter::from_json(r#"{"a": 1, "a": 2}"#).unwrap();
        assert_eq!(filter.fields["a"].eq, Some(json!(2)));
    }

    #[test]
    fn test_serde_deserialize_matches_from_json() {
        let json = r#"{"$and": [{"a": {"$in": [1, 2]}}], "b": "x"}"#;
        let via_serde: Filter = serde_json::from_str(json).unwrap();
        assert_eq!(via_serde, Filter::from_json(json).unwrap());
    }

    #[test]
    fn test_serialize_wire_form() {
        let filter = Filter::new()
            .with_field("name", FieldExpr::equal_to("Ann"))
            .with_field(
                "age",
                FieldExpr {
                    gte: Some(json!(18)),
                    ..FieldExpr::default()
                },
            );
        let filter = Filter {
            not: Some(Box::new(Filter::new().with_field("x", FieldExpr::equal_to(json!({"k": 1}))))),
            ..filter
        };
        let value = serde_json::to_value(&filter).unwrap();
        assert_eq!(
            value,
            json!({
                "$not": {"x": {"$eq": {"k": 1}}},
                "age": {"$gte": 18},
                "name": "Ann"
            })
        );
        assert_eq!(value, filter.to_value());
        assert_eq!(Filter::from_value(value).unwrap(), filter);
    }

    #[test]
    fn test_is_empty() {
        assert!(Filter::new().is_empty());
        assert!(!Filter::negate(Filter::new()).is_empty());
        assert!(FieldExpr::default().is_empty());
        assert!(!FieldExpr::equal_to(Value::Null).is_empty());
    }

    #[test]
    fn test_relation_prefixes() {
        let filter = Filter::from_json(
            r#"{"author.name": "a", "$or": [{"tags.label": "x"}, {"plain": 1}],
                "$not": {"author.id": 3}}"#,
        )
        .unwrap();
        let prefixes: Vec<_> = filter.relation_prefixes().into_iter().collect();
        assert_eq!(prefixes, vec!["author".to_string(), "tags".to_string()]);
    }

    #[test]
    fn test_walk_fields_visits_every_node() {
        let filter = Filter::from_json(
            r#"{"a": 1, "$and": [{"b": 2}], "$or": [{"c": 3}], "$not": {"d": 4}}"#,
        )
        .unwrap();
        let mut seen = Vec::new();
        filter.walk_fields(&mut |path, _| seen.push(path.to_string()));
        assert_eq!(seen, vec!["a", "b", "c", "d"]);
    }
}
