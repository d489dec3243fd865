//! Where survey and response pages come from: the live API or captured JSON
//!
//! Both are served through [`PageSource::fetch_page`] so the collector runs the
//! same loop whichever is configured.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

use crate::api::SurveyClient;
use crate::export::raw;
use crate::survey::PageOutcome;

#[async_trait]
pub trait PageSource: Send + Sync {
    /// Items on 1-indexed `page`
    async fn fetch_page(&self, page: u32) -> Result<PageOutcome<Value>>;
}

/// The account's survey list from the API
pub struct LiveSurveys<'a> {
    pub client: &'a SurveyClient,
}

#[async_trait]
impl<'a> PageSource for LiveSurveys<'a> {
    async fn fetch_page(&self, page: u32) -> Result<PageOutcome<Value>> {
        self.client.surveys_page(page).await
    }
}

/// One survey's responses from the API
pub struct LiveResponses<'a> {
    pub client: &'a SurveyClient,
    pub survey_id: &'a str,
}

#[async_trait]
impl<'a> PageSource for LiveResponses<'a> {
    async fn fetch_page(&self, page: u32) -> Result<PageOutcome<Value>> {
        self.client.responses_page(self.survey_id, page).await
    }
}

/// A captured JSON array replayed in `page_size` slices
#[derive(Debug, Clone)]
pub struct Replay {
    items: Vec<Value>,
    page_size: usize,
}

impl Replay {
    pub fn new(items: Vec<Value>, page_size: usize) -> Self {
        Self { items, page_size: page_size.max(1) }
    }

    pub fn from_file(path: &Path, page_size: usize) -> Result<Self> {
        Ok(Self::new(raw::load_json_array(path)?, page_size))
    }

    pub fn page(&self, page: u32) -> Vec<Value> {
        let start = (page.max(1) as usize - 1).saturating_mul(self.page_size);
        self.items
            .iter()
            .skip(start)
            .take(self.page_size)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PageSource for Replay {
    async fn fetch_page(&self, page: u32) -> Result<PageOutcome<Value>> {
        Ok(PageOutcome::Page(self.page(page)))
    }
}
