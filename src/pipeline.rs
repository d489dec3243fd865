//! End-to-end export: surveys, then each survey's responses, then the three tables
//!
//! One survey is fully paginated and flattened before the next begins. The
//! surveys table is written before any response is fetched, and the responses
//! table before the answers table is assembled.

use anyhow::{Context, Result, anyhow};
use log::info;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::PathBuf;

use crate::api::SurveyClient;
use crate::config::Config;
use crate::export::{self, WriteMode, raw};
use crate::source::{LiveResponses, LiveSurveys, PageSource, Replay};
use crate::survey::table::{self, DisplayZone};
use crate::survey::{RawResponse, RawSurvey, SurveyRecord, collect, flatten_all};

/// Inputs and outputs of one export run
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Replay the survey list from this file instead of calling the API
    pub surveys_input_json: Option<PathBuf>,
    /// Capture the raw survey list here
    pub surveys_output_json: Option<PathBuf>,
    /// Replay responses from `survey_results_{id}.json` files in this folder
    pub survey_results_input_folder: Option<PathBuf>,
    /// Capture each survey's raw responses here (live fetches only)
    pub survey_results_output_folder: Option<PathBuf>,
    pub surveys_output: PathBuf,
    pub responses_output: PathBuf,
    pub answers_output: PathBuf,
}

impl ExportOptions {
    /// Whether any input has to be fetched live
    pub fn needs_api(&self) -> bool {
        self.surveys_input_json.is_none() || self.survey_results_input_folder.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportSummary {
    pub surveys: usize,
    pub responses: usize,
    pub answers: usize,
}

pub struct Exporter<'a> {
    config: &'a Config,
    client: Option<&'a SurveyClient>,
    zone: DisplayZone,
}

impl<'a> Exporter<'a> {
    pub fn new(config: &'a Config) -> Result<Self> {
        Ok(Self {
            config,
            client: None,
            zone: config.display_zone()?,
        })
    }

    /// API client for live fetches; replay-only runs never need one
    pub fn with_client(mut self, client: &'a SurveyClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Override the zone timestamps are rendered in
    pub fn with_zone(mut self, zone: DisplayZone) -> Self {
        self.zone = zone;
        self
    }

    pub async fn run(&self, options: &ExportOptions) -> Result<ExportSummary> {
        let raw_surveys = self.read_surveys(options).await?;
        info!("Read {} surveys.", raw_surveys.len());

        let surveys: Vec<SurveyRecord> = parse_items::<RawSurvey>(&raw_surveys, "survey")?
            .iter()
            .map(SurveyRecord::from)
            .collect();

        let surveys_table = table::assemble(&surveys, &table::SURVEYS, &self.zone)?;
        info!("Converted surveys to table.");
        export::write_table(&surveys_table, &options.surveys_output, WriteMode::Standard)?;
        info!("Saved surveys to {}.", options.surveys_output.display());

        let mut responses = Vec::new();
        let mut answers = Vec::new();

        for survey in &surveys {
            let raw_responses = self.read_responses(&survey.id, options).await?;
            let parsed = parse_items::<RawResponse>(&raw_responses, "response")
                .with_context(|| format!("Survey {}", survey.id))?;

            let (survey_responses, survey_answers) = flatten_all(&parsed, &survey.id);
            responses.extend(survey_responses);
            answers.extend(survey_answers);
        }

        let responses_table = table::assemble(&responses, &table::RESPONSES, &self.zone)?;
        info!("Converted responses to table.");
        export::write_table(&responses_table, &options.responses_output, WriteMode::Standard)?;
        info!("Saved responses to {}.", options.responses_output.display());

        let answers_table = table::assemble(&answers, &table::ANSWERS, &self.zone)?;
        info!("Converted answers to table.");
        export::write_table(&answers_table, &options.answers_output, WriteMode::ConstantMemory)?;
        info!("Saved answers to {}.", options.answers_output.display());

        Ok(ExportSummary {
            surveys: surveys.len(),
            responses: responses.len(),
            answers: answers.len(),
        })
    }

    async fn read_surveys(&self, options: &ExportOptions) -> Result<Vec<Value>> {
        let surveys = match &options.surveys_input_json {
            Some(path) => {
                let replay = Replay::from_file(path, self.config.page_size)?;
                self.collect_from(&replay, "surveys").await?
            }
            None => {
                let live = LiveSurveys { client: self.client()? };
                self.collect_from(&live, "surveys").await?
            }
        };

        if let Some(path) = &options.surveys_output_json {
            raw::save_json_array(path, &surveys)?;
        }

        Ok(surveys)
    }

    async fn read_responses(&self, survey_id: &str, options: &ExportOptions) -> Result<Vec<Value>> {
        if let Some(folder) = &options.survey_results_input_folder {
            let replay = Replay::from_file(&raw::survey_results_path(folder, survey_id), self.config.page_size)?;
            return self.collect_from(&replay, "survey results").await;
        }

        let live = LiveResponses {
            client: self.client()?,
            survey_id,
        };
        let responses = self.collect_from(&live, "survey results").await?;

        if let Some(folder) = &options.survey_results_output_folder {
            raw::save_json_array(&raw::survey_results_path(folder, survey_id), &responses)?;
        }

        Ok(responses)
    }

    fn client(&self) -> Result<&'a SurveyClient> {
        self.client.ok_or_else(|| anyhow!("No API client configured for live fetch"))
    }

    async fn collect_from(&self, source: &dyn PageSource, label: &str) -> Result<Vec<Value>> {
        collect(label, self.config.page_size, |page| source.fetch_page(page)).await
    }
}

fn parse_items<T: DeserializeOwned>(items: &[Value], kind: &str) -> Result<Vec<T>> {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            serde_json::from_value(item.clone()).with_context(|| format!("Malformed {} at position {}", kind, idx + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_items_reports_position() {
        let items = vec![
            json!({"id": 1, "title": "A", "date_created": null, "date_modified": null, "responses": 0, "status": "open"}),
            json!({"id": 2}),
        ];

        let err = parse_items::<RawSurvey>(&items, "survey").unwrap_err();
        assert!(err.to_string().contains("Malformed survey at position 2"));
    }

    #[test]
    fn test_needs_api_only_for_live_inputs() {
        let mut options = ExportOptions::default();
        assert!(options.needs_api());

        options.surveys_input_json = Some(PathBuf::from("surveys.json"));
        assert!(options.needs_api());

        options.survey_results_input_folder = Some(PathBuf::from("results"));
        assert!(!options.needs_api());

        options.surveys_input_json = None;
        assert!(options.needs_api());
    }

    #[tokio::test]
    async fn test_live_fetch_without_client_fails() {
        let config = Config::default();
        let exporter = Exporter::new(&config).unwrap();

        let err = exporter.read_surveys(&ExportOptions::default()).await.unwrap_err();
        assert!(err.to_string().contains("No API client"), "{}", err);
    }
}
