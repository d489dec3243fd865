//! Survey normalization: nested API payloads in, flat tables out

pub mod collect;
pub mod extract;
pub mod flatten;
pub mod models;
pub mod sanitize;
pub mod table;

pub use collect::{DEFAULT_PAGE_SIZE, PageOutcome, collect};
pub use extract::extract;
pub use flatten::{flatten, flatten_all};
pub use models::{
    AnswerRecord, AnswerType, FreeText, RawAnswer, RawPage, RawQuestion, RawResponse, RawSurvey,
    ResponseRecord, Scalar, SurveyRecord,
};
pub use sanitize::clean;
pub use table::{ANSWERS, Cell, DisplayZone, RESPONSES, SURVEYS, Schema, Table, assemble};
