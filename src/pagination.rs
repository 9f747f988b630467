//! Page arithmetic for the admin listing.

use serde::Serialize;

use crate::dto::application::{AdminApplicationsPage, PageInfo};
use crate::domain::application::VisaApplication;

/// Page numbers to render, with `None` marking an elided run.
fn page_links(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    if total_pages == 0 {
        return vec![];
    }

    let mut links = Vec::new();

    let left_end = (1 + left_edge).min(total_pages + 1);
    links.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = (current_page + right_current + 1).min(total_pages + 1);
    if mid_start > left_end {
        links.push(None);
    }
    links.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(total_pages.saturating_sub(right_edge) + 1);
    if right_start > mid_end {
        links.push(None);
    }
    links.extend((right_start..=total_pages).map(Some));

    links
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub links: Vec<Option<usize>>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, current_page: usize, limit: usize, total: usize) -> Self {
        let current_page = current_page.max(1);
        let limit = limit.max(1);
        let total_pages = total.div_ceil(limit);

        Self {
            items,
            links: page_links(total_pages, current_page, 2, 2, 4, 2),
            page: current_page,
            limit,
            total,
        }
    }

    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.limit)
    }
}

impl From<Paginated<VisaApplication>> for AdminApplicationsPage {
    fn from(page: Paginated<VisaApplication>) -> Self {
        let pagination = PageInfo {
            page: page.page,
            limit: page.limit,
            total: page.total,
            total_pages: page.total_pages(),
        };
        Self {
            applications: page.items,
            pagination,
            links: page.links,
        }
    }
}
