//! Survey platform payload types and the flat records built from them
//!
//! The `Raw*` types mirror the JSON returned by the list-surveys and
//! list-responses endpoints. Only the fields the exporter reads are declared;
//! everything else in the payload is ignored by serde.

use serde::Deserialize;
use std::fmt;

use super::sanitize::{ID_MAX, STATUS_MAX, TEXT_MAX, truncate};

/// A JSON scalar the API sends as either a number or a string (ids, counts)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

/// One item of the list-surveys endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct RawSurvey {
    pub id: Scalar,
    pub title: String,
    pub date_created: Option<String>,
    pub date_modified: Option<String>,
    pub responses: Scalar,
    pub status: String,
}

/// One item of the list-responses endpoint (with `include_labels=true`)
#[derive(Debug, Clone, Deserialize)]
pub struct RawResponse {
    pub id: Scalar,
    pub date_started: Option<String>,
    pub date_ended: Option<String>,
    pub date_modified: Option<String>,
    pub status: String,
    #[serde(default)]
    pub pages: Vec<RawPage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPage {
    #[serde(default)]
    pub questions: Vec<RawQuestion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestion {
    pub title: String,
    #[serde(default)]
    pub answers: Vec<RawAnswer>,
}

/// Answer object. Which of the optional fields are populated depends on `kind`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAnswer {
    pub id: Scalar,
    #[serde(rename = "type", default)]
    pub kind: AnswerType,
    pub choice_title: Option<String>,
    pub value: Option<String>,
    pub row_title: Option<String>,
    pub column_title: Option<String>,
}

/// The `type` tag on an answer object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerType {
    Radio,
    Comment,
    Other,
    Text,
    MatrixRow,
    Checkbox,
    Dropdown,
    #[default]
    #[serde(other)]
    Unrecognized,
}

/// Y/N flag marking answers typed by the respondent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeText {
    Yes,
    No,
}

impl FreeText {
    pub fn as_flag(&self) -> &'static str {
        match self {
            FreeText::Yes => "Y",
            FreeText::No => "N",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurveyRecord {
    pub id: String,
    pub title: String,
    pub date_created: Option<String>,
    pub date_modified: Option<String>,
    /// Kept as the source text; the table assembler parses it
    pub responses: String,
    pub status: String,
}

impl From<&RawSurvey> for SurveyRecord {
    fn from(raw: &RawSurvey) -> Self {
        Self {
            id: truncate(&raw.id.to_string(), ID_MAX),
            title: truncate(&raw.title, TEXT_MAX),
            date_created: raw.date_created.clone(),
            date_modified: raw.date_modified.clone(),
            responses: raw.responses.to_string(),
            status: truncate(&raw.status, STATUS_MAX),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseRecord {
    pub id: String,
    pub survey_id: String,
    pub date_started: Option<String>,
    pub date_ended: Option<String>,
    pub date_modified: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnswerRecord {
    pub id: String,
    pub response_id: String,
    pub question: String,
    pub answer: String,
    pub free_text: FreeText,
}
