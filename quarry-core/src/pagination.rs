//! Pagination arithmetic and list planning.
//!
//! A list request runs two queries: a count over the caller's filter alone,
//! and the data query with ordering, projection and paging applied. The
//! count then becomes the response's [`PaginationMeta`].

use crate::filter::Filter;
use crate::payload::{ListResponse, PaginationMeta, QueryPayload};
use tracing::debug;

/// Derive `offset` from `page` and `limit`.
///
/// An explicit offset always wins. Otherwise, when both `page` and `limit`
/// are present, `page` is clamped to at least 1 and `offset` becomes
/// `(page - 1) * limit`.
pub fn normalize(payload: &mut QueryPayload) {
    if payload.offset.is_some() {
        return;
    }

    if let (Some(page), Some(limit)) = (payload.page, payload.limit) {
        let page = page.max(1);
        let offset = (page - 1).saturating_mul(limit);
        payload.page = Some(page);
        payload.offset = Some(offset);
        debug!(page, limit, offset, "derived offset from page");
    }
}

/// Copy of `payload` carrying only its filter, for row counting.
pub fn extract_count_payload(payload: &QueryPayload) -> QueryPayload {
    QueryPayload {
        where_: payload.where_.clone(),
        ..QueryPayload::default()
    }
}

/// Build response metadata from the total row count.
///
/// Returns `None` when the caller did not ask for pagination at all.
pub fn build_meta(payload: &QueryPayload, total: i64) -> Option<PaginationMeta> {
    if !payload.is_paginated() {
        return None;
    }

    let mut meta = PaginationMeta {
        skip: payload.offset,
        limit: payload.limit,
        count: Some(total),
        ..PaginationMeta::default()
    };

    if let Some(limit) = payload.limit.filter(|limit| *limit > 0) {
        meta.page_count = Some(ceil_div(total, limit));
        meta.current_page = Some(match (payload.page, payload.offset) {
            (Some(page), _) => page,
            (None, Some(offset)) => offset / limit + 1,
            (None, None) => 1,
        });
    }

    Some(meta)
}

fn ceil_div(count: i64, limit: i64) -> i64 {
    let whole = count / limit;
    if count % limit > 0 {
        whole + 1
    } else {
        whole
    }
}

/// Conjoin a system filter with a caller filter.
///
/// An empty side yields the other unchanged; otherwise the result is
/// `{"$and": [additional, user]}`.
pub fn merge_where_with_and(user: Filter, additional: Filter) -> Filter {
    if user.is_empty() {
        return additional;
    }
    if additional.is_empty() {
        return user;
    }
    Filter::all_of(vec![additional, user])
}

/// The two queries behind one list request.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPlan {
    payload: QueryPayload,
}

impl ListPlan {
    /// Merge the system filter in front of the caller's and normalize paging.
    pub fn new(mut payload: QueryPayload, additional_where: Filter) -> Self {
        let user = std::mem::take(&mut payload.where_);
        payload.where_ = merge_where_with_and(user, additional_where);
        normalize(&mut payload);
        Self { payload }
    }

    /// Payload for the count query.
    pub fn count_payload(&self) -> QueryPayload {
        extract_count_payload(&self.payload)
    }

    /// Payload for the data query.
    pub fn data_payload(&self) -> &QueryPayload {
        &self.payload
    }

    /// Wrap fetched rows and the counted total into the response envelope.
    pub fn respond<T>(&self, rows: Vec<T>, total: i64) -> ListResponse<T> {
        ListResponse::new(rows, build_meta(&self.payload, total))
    }
}

// ============================================================================
// TESTS
// ============================================================================
