//! Page arithmetic for the directory view.
//!
//! Pages are cut from a reversed copy of the working set so the most
//! recently added records come first. Page numbers are 1-based.

use serde::Serialize;

use crate::models::UserRecord;

/// Number of cards shown per page.
pub const DEFAULT_PAGE_SIZE: usize = 6;

/// One page of the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct PageView {
    /// 1-based page number after clamping.
    pub number: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub items: Vec<UserRecord>,
}

impl PageView {
    pub fn has_prev(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// "Page X of Y" footer text.
    pub fn label(&self) -> String {
        format!("Page {} of {}", self.number, self.total_pages)
    }
}

/// `ceil(items / page_size)`. Zero items means zero pages.
pub fn total_pages(items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    items.div_ceil(page_size)
}

/// Clamp a requested page into `[1, total]`. With no pages, page 1 is
/// still the answer so callers always have somewhere to stand.
pub fn clamp_page(page: usize, total: usize) -> usize {
    page.clamp(1, total.max(1))
}

/// Build the view for `page` over `users`, newest first.
pub fn page_view(users: &[UserRecord], page: usize, page_size: usize) -> PageView {
    let total = total_pages(users.len(), page_size);
    let number = clamp_page(page, total);

    let start = (number - 1) * page_size;
    let items = users
        .iter()
        .rev()
        .skip(start)
        .take(page_size)
        .cloned()
        .collect();

    PageView {
        number,
        total_pages: total,
        total_items: users.len(),
        items,
    }
}
