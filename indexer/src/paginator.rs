//! Page clamping, slicing and nearby-page links shared by every list view

use serde::Serialize;

pub fn total_pages(item_count: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    item_count.div_ceil(page_size).max(1)
}

/// Clamp a 1-based page number into `[1, total_pages]`. Zero total pages behaves as one.
pub fn clamp_page(requested: usize, total_pages: usize) -> usize {
    requested.clamp(1, total_pages.max(1))
}

pub fn slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let page_size = page_size.max(1);
    let start = page.saturating_sub(1).saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Contiguous page numbers centred on `page`, at most `width` wide (widened to odd).
pub fn nearby_page_window(page: usize, total_pages: usize, width: usize) -> Vec<usize> {
    let total = total_pages.max(1);
    let page = clamp_page(page, total);
    let width = (width.max(1) | 1).min(total);
    let half = width / 2;

    let start = page.saturating_sub(half).max(1).min(total + 1 - width);
    (start..start + width).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "page", rename_all = "snake_case")]
pub enum PageLink {
    Page(usize),
    Gap,
}

/// Nearby window plus shortcuts to the first and last page, with gaps where numbers are skipped.
pub fn page_links(page: usize, total_pages: usize, width: usize) -> Vec<PageLink> {
    let total = total_pages.max(1);
    let window = nearby_page_window(page, total, width);
    let mut links = Vec::with_capacity(window.len() + 4);

    let first = window[0];
    let last = window[window.len() - 1];

    if first > 1 {
        links.push(PageLink::Page(1));
        if first > 2 {
            links.push(PageLink::Gap);
        }
    }
    links.extend(window.iter().map(|&p| PageLink::Page(p)));
    if last < total {
        if last + 1 < total {
            links.push(PageLink::Gap);
        }
        links.push(PageLink::Page(total));
    }
    links
}

/// One page of a list view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub links: Vec<PageLink>,
}

pub fn paginate<T: Clone>(items: &[T], requested: usize, page_size: usize, width: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total = total_pages(items.len(), page_size);
    let page = clamp_page(requested, total);
    Page {
        items: slice(items, page, page_size).to_vec(),
        page,
        page_size,
        total_items: items.len(),
        total_pages: total,
        links: page_links(page, total, width),
    }
}
