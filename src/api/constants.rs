//! Survey platform REST endpoints

/// Collection listing every survey on the account
pub const SURVEYS_ENDPOINT: &str = "surveys";

/// Responses sub-collection of a survey
pub const RESPONSES_ENDPOINT: &str = "responses";

pub mod headers {
    pub const ACCEPT_JSON: &str = "application/json";
}

/// `GET {server}/surveys?page_size={n}&page={p}`
pub fn surveys_page_url(server: &str, page: u32, page_size: usize) -> String {
    format!("{}/{}?page_size={}&page={}", server, SURVEYS_ENDPOINT, page_size, page)
}

/// `GET {server}/surveys/{id}/responses?include_labels=true&page_size={n}&page={p}`
pub fn responses_page_url(server: &str, survey_id: &str, page: u32, page_size: usize) -> String {
    format!(
        "{}/{}/{}/{}?include_labels=true&page_size={}&page={}",
        server,
        SURVEYS_ENDPOINT,
        urlencoding::encode(survey_id),
        RESPONSES_ENDPOINT,
        page_size,
        page
    )
}
