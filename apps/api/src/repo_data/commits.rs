//! Commit history pagination.

use std::future::Future;

/// GitHub caps `per_page` for the commits endpoint at 100.
pub const MAX_PER_PAGE: usize = 100;

/// Page size and page budget for collecting `limit` commit messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePlan {
    pub per_page: usize,
    pub max_pages: usize,
}

impl PagePlan {
    /// `None` when nothing should be fetched (`limit == 0`).
    pub fn for_limit(limit: usize) -> Option<Self> {
        if limit == 0 {
            return None;
        }
        let per_page = limit.min(MAX_PER_PAGE);
        Some(PagePlan {
            per_page,
            max_pages: limit / per_page + 1,
        })
    }
}

/// Collects commit messages page by page.
///
/// `fetch_page(page, per_page)` returns the messages on a 1-based page, or
/// `None` if the page could not be fetched. Paging stops once `limit`
/// messages are collected, a page comes back empty or fails, or the plan's
/// page budget runs out. Messages collected before a failure are kept.
pub async fn collect_commit_messages<F, Fut>(limit: usize, mut fetch_page: F) -> Vec<String>
where
    F: FnMut(usize, usize) -> Fut,
    Fut: Future<Output = Option<Vec<String>>>,
{
    let Some(plan) = PagePlan::for_limit(limit) else {
        return Vec::new();
    };

    let mut messages = Vec::new();
    let mut page = 1;
    while messages.len() < limit && page <= plan.max_pages {
        match fetch_page(page, plan.per_page).await {
            Some(batch) if !batch.is_empty() => messages.extend(batch),
            _ => break,
        }
        page += 1;
    }

    messages.truncate(limit);
    messages
}
