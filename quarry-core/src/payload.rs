//! Request and response shapes.

use crate::error::DecodeError;
use crate::filter::Filter;
use serde::{Deserialize, Deserializer, Serialize};

/// Sort direction. Anything other than a case-insensitive `desc` sorts ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl<'de> Deserialize<'de> for SortDirection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw {
            Some(dir) if dir.eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        })
    }
}

/// One ordering term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Order {
    pub field: String,
    #[serde(default)]
    pub dir: SortDirection,
}

impl Order {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            dir: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            dir: SortDirection::Desc,
        }
    }
}

/// One request's filter, ordering, selection, eager-load and pagination intent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct QueryPayload {
    #[serde(
        rename = "where",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Filter::is_empty"
    )]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub where_: Filter,
    #[serde(
        rename = "sort",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub order: Vec<Order>,
    /// Field paths to project. Empty selects everything.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub select: Vec<String>,
    /// Raw nested-DSL text describing relations to eager-load.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub nested: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(rename = "skip", default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    /// 1-based page number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
}

impl QueryPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_where(mut self, filter: Filter) -> Self {
        self.where_ = filter;
        self
    }

    /// Decode a payload from a JSON body.
    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        serde_json::from_str(json).map_err(DecodeError::invalid_json)
    }

    /// Decode a payload from query-string parameters.
    ///
    /// `where`, `select` and `sort` carry JSON documents; `limit`, `skip` and
    /// `page` carry JSON integers; `nested` is raw DSL text. Empty values and
    /// unknown keys are ignored.
    pub fn from_params<I, K, V>(params: I) -> Result<Self, DecodeError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut payload = QueryPayload::default();
        for (key, value) in params {
            let (key, raw) = (key.as_ref(), value.as_ref());
            if raw.is_empty() {
                continue;
            }
            match key {
                "where" => payload.where_ = decode_nullable_param(key, raw)?,
                "select" => payload.select = decode_nullable_param(key, raw)?,
                "sort" => payload.order = decode_nullable_param(key, raw)?,
                "limit" => payload.limit = Some(decode_param(key, raw)?),
                "skip" => payload.offset = Some(decode_param(key, raw)?),
                "page" => payload.page = Some(decode_param(key, raw)?),
                "nested" => payload.nested = raw.to_string(),
                _ => {}
            }
        }
        Ok(payload)
    }

    /// Append `column` to a non-empty selection that lacks it.
    ///
    /// Nested loads need the keys linking parent and child rows even when the
    /// caller projected them away.
    pub fn ensure_selected(&mut self, column: &str) {
        if column.is_empty() || self.select.is_empty() {
            return;
        }
        if !self.select.iter().any(|c| c == column) {
            self.select.push(column.to_string());
        }
    }

    /// Whether the caller asked for any pagination.
    pub fn is_paginated(&self) -> bool {
        self.limit.is_some() || self.offset.is_some() || self.page.is_some()
    }
}

fn decode_param<T: serde::de::DeserializeOwned>(param: &str, raw: &str) -> Result<T, DecodeError> {
    serde_json::from_str(raw).map_err(|e| DecodeError::InvalidParam {
        param: param.to_string(),
        reason: e.to_string(),
    })
}

/// A JSON `null` parameter reads as the empty value.
fn decode_nullable_param<T>(param: &str, raw: &str) -> Result<T, DecodeError>
where
    T: serde::de::DeserializeOwned + Default,
{
    decode_param::<Option<T>>(param, raw).map(Option::unwrap_or_default)
}

/// An explicit `null` decodes like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Pagination metadata attached to list responses. Unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_page: Option<i64>,
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub payload: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationMeta>,
}

impl<T> ListResponse<T> {
    pub fn new(payload: Vec<T>, pagination: Option<PaginationMeta>) -> Self {
        Self {
            payload,
            pagination,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
