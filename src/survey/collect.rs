//! Page-number pagination shared by the survey list and the per-survey response lists

use anyhow::Result;
use log::{info, warn};
use std::future::Future;

/// Items requested per page unless configured otherwise
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Result of fetching one page
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome<T> {
    Page(Vec<T>),
    /// The fetch gave up (operator declined a retry). Collection ends here.
    Aborted,
}

/// Fetch pages 1, 2, ... until one comes back short, concatenating the items.
///
/// A full page is never taken as the last one, so a collection whose size is an
/// exact multiple of `page_size` costs one extra call that returns nothing.
/// An aborted fetch returns what was collected so far; hard errors propagate.
pub async fn collect<T, F, Fut>(label: &str, page_size: usize, mut fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<PageOutcome<T>>>,
{
    let mut items = Vec::new();
    let mut page = 1u32;

    loop {
        match fetch_page(page).await? {
            PageOutcome::Aborted => {
                warn!("Stopping {} collection at page {} with {} items.", label, page, items.len());
                return Ok(items);
            }
            PageOutcome::Page(batch) => {
                let returned = batch.len();
                items.extend(batch);
                info!("Returned {} {}.", returned, label);
                info!("Total count: {}.", items.len());

                if returned != page_size {
                    return Ok(items);
                }
            }
        }
        page += 1;
    }
}
