//! Unrolls a survey response into one summary row and its answer rows

use log::debug;

use super::extract::extract;
use super::models::{AnswerRecord, RawResponse, ResponseRecord};
use super::sanitize::{ID_MAX, STATUS_MAX, truncate};

/// Flatten one response of survey `survey_id`.
///
/// Answers come out page by page, question by question, in payload order.
/// Unrecognized answer types and answers that clean to an empty string are dropped.
pub fn flatten(response: &RawResponse, survey_id: &str) -> (ResponseRecord, Vec<AnswerRecord>) {
    let response_id = response.id.to_string();

    let record = ResponseRecord {
        id: truncate(&response_id, ID_MAX),
        survey_id: truncate(survey_id, ID_MAX),
        date_started: response.date_started.clone(),
        date_ended: response.date_ended.clone(),
        date_modified: response.date_modified.clone(),
        status: truncate(&response.status, STATUS_MAX),
    };

    let mut answers = Vec::new();
    let mut skipped = 0usize;
    for page in &response.pages {
        for question in &page.questions {
            for answer in &question.answers {
                match extract(question, answer, &response_id) {
                    Some(extracted) if !extracted.answer.is_empty() => answers.push(extracted),
                    _ => skipped += 1,
                }
            }
        }
    }

    if skipped > 0 {
        debug!("Response {}: kept {} answers, skipped {}", response_id, answers.len(), skipped);
    }

    (record, answers)
}

/// Flatten every response of one survey, preserving fetch order.
pub fn flatten_all(responses: &[RawResponse], survey_id: &str) -> (Vec<ResponseRecord>, Vec<AnswerRecord>) {
    let mut records = Vec::with_capacity(responses.len());
    let mut answers = Vec::new();

    for response in responses {
        let (record, response_answers) = flatten(response, survey_id);
        records.push(record);
        answers.extend(response_answers);
    }

    (records, answers)
}
