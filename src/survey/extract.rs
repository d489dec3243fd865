//! Maps one question/answer pair to a flat answer record

use super::models::{AnswerRecord, AnswerType, FreeText, RawAnswer, RawQuestion};
use super::sanitize::{ID_MAX, TEXT_MAX, clean, truncate};

/// Literal stored for a ticked checkbox option
pub const CHECKBOX_SELECTED: &str = "Yes";

/// Build the answer record for `answer`, or `None` when its type is not one we export.
///
/// The question label joins the question title with the answer's sub-heading
/// (choice or matrix row) where the type has one. An empty cleaned answer is
/// still returned here; dropping it is up to the caller.
pub fn extract(question: &RawQuestion, answer: &RawAnswer, response_id: &str) -> Option<AnswerRecord> {
    let title = question.title.as_str();
    let choice = answer.choice_title.as_deref().unwrap_or_default();

    let (label, value, free_text) = match answer.kind {
        AnswerType::Radio | AnswerType::Dropdown => (vec![title], choice, FreeText::No),
        AnswerType::Comment | AnswerType::Other | AnswerType::Text => (
            vec![title, choice],
            answer.value.as_deref().unwrap_or_default(),
            FreeText::Yes,
        ),
        AnswerType::MatrixRow => (
            vec![title, answer.row_title.as_deref().unwrap_or_default()],
            answer.column_title.as_deref().unwrap_or_default(),
            FreeText::No,
        ),
        AnswerType::Checkbox => (vec![title, choice], CHECKBOX_SELECTED, FreeText::No),
        AnswerType::Unrecognized => return None,
    };

    Some(AnswerRecord {
        id: truncate(&answer.id.to_string(), ID_MAX),
        response_id: truncate(response_id, ID_MAX),
        question: truncate(&clean(&label.join(" ")), TEXT_MAX),
        answer: truncate(&clean(value), TEXT_MAX),
        free_text,
    })
}
