//! Page buttons for the upload list

use serde::Serialize;

/// Records shown per page
pub const ITEMS_PER_PAGE: usize = 5;

/// Pages shown on each side of the current page
const WINDOW_DELTA: usize = 2;

/// One pagination control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "page")]
pub enum PageButton {
    Page(usize),
    Ellipsis,
}

/// Number of pages needed for `items` records
pub fn page_count(items: usize) -> usize {
    items.div_ceil(ITEMS_PER_PAGE)
}

/// Windowed page range around `current` (1-based)
///
/// The first and last page are always shown. A gap of exactly one page shows
/// that page instead of an ellipsis.
pub fn get_pagination(current: usize, total: usize) -> Vec<PageButton> {
    let left = current.saturating_sub(WINDOW_DELTA);
    let right = current + WINDOW_DELTA + 1;
    let range = (1..=total).filter(|&i| i == 1 || i == total || (i >= left && i < right));

    let mut buttons = Vec::new();
    let mut last: Option<usize> = None;
    for page in range {
        if let Some(prev) = last {
            if page - prev == 2 {
                buttons.push(PageButton::Page(prev + 1));
            } else if page - prev != 1 {
                buttons.push(PageButton::Ellipsis);
            }
        }
        buttons.push(PageButton::Page(page));
        last = Some(page);
    }
    buttons
}
