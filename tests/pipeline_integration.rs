//! End-to-end export runs, over captured JSON and against a local HTTP server

use calamine::{Data, Reader, Xlsx, open_workbook};
use chrono::FixedOffset;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use survey_export::api::SurveyClient;
use survey_export::config::Config;
use survey_export::export::SHEET_NAME;
use survey_export::export::raw::{load_json_array, save_json_array, survey_results_path};
use survey_export::pipeline::{ExportOptions, Exporter};
use survey_export::survey::DisplayZone;

fn surveys_fixture() -> Vec<Value> {
    vec![
        json!({
            "id": 5001,
            "title": "Summer fair &amp; picnic feedback",
            "date_created": "2023-06-01T09:00:00Z",
            "date_modified": "2023-06-15T10:00:00Z",
            "responses": 2,
            "status": "open",
            "folder_id": 12
        }),
        json!({
            "id": "5002",
            "title": "Empty survey",
            "date_created": "2023-07-01T09:00:00Z",
            "date_modified": "2023-07-01T09:00:00Z",
            "responses": "0",
            "status": "draft"
        }),
    ]
}

fn responses_fixture() -> Vec<Value> {
    vec![
        json!({
            "id": 900001,
            "date_started": "2023-06-15T10:00:00Z",
            "date_ended": "2023-06-15T10:04:00Z",
            "date_modified": "2023-06-15T10:04:00Z",
            "status": "completed",
            "pages": [
                {"questions": [
                    {"title": "Favourite stall?", "answers": [
                        {"id": 1, "type": "radio", "choice_title": "Cakes"}
                    ]},
                    {"title": "How would you rate:", "answers": [
                        {"id": 2, "type": "matrix_row", "row_title": "The event overall?", "column_title": "4"}
                    ]}
                ]},
                {"questions": [
                    {"title": "Comments", "answers": [
                        {"id": 3, "type": "comment", "choice_title": "", "value": "Great\nday &nbsp;"}
                    ]}
                ]}
            ]
        }),
        json!({
            "id": 900002,
            "date_started": "2023-06-16T08:00:00Z",
            "date_ended": null,
            "date_modified": "2023-06-16T08:01:00Z",
            "status": "partial",
            "pages": [
                {"questions": [
                    {"title": "Favourite stall?", "answers": [
                        {"id": 4, "type": "radio", "choice_title": "  "}
                    ]},
                    {"title": "Which did you visit?", "answers": [
                        {"id": 5, "type": "checkbox", "choice_title": "Bouncy castle"},
                        {"id": 6, "type": "signature"}
                    ]}
                ]}
            ]
        }),
    ]
}

fn write_captures(dir: &Path) -> ExportOptions {
    let surveys_json = dir.join("surveys.json");
    let results = dir.join("results");
    fs::create_dir_all(&results).unwrap();

    save_json_array(&surveys_json, &surveys_fixture()).unwrap();
    save_json_array(&survey_results_path(&results, "5001"), &responses_fixture()).unwrap();
    save_json_array(&survey_results_path(&results, "5002"), &[]).unwrap();

    ExportOptions {
        surveys_input_json: Some(surveys_json),
        survey_results_input_folder: Some(results),
        surveys_output: dir.join("surveys.xlsx"),
        responses_output: dir.join("responses.xlsx"),
        answers_output: dir.join("answers.xlsx"),
        ..ExportOptions::default()
    }
}

fn plus_one() -> DisplayZone {
    DisplayZone::Fixed(FixedOffset::east_opt(3600).unwrap())
}

fn sheet(path: &Path) -> Vec<Vec<Data>> {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    let range = workbook.worksheet_range(SHEET_NAME).unwrap();
    range.rows().map(|row| row.to_vec()).collect()
}

fn text(s: &str) -> Data {
    Data::String(s.to_string())
}

#[tokio::test]
async fn test_export_from_captures() {
    let dir = tempfile::tempdir().unwrap();
    let options = write_captures(dir.path());
    let config = Config::default();

    let summary = Exporter::new(&config)
        .unwrap()
        .with_zone(plus_one())
        .run(&options)
        .await
        .unwrap();

    assert_eq!(summary.surveys, 2);
    assert_eq!(summary.responses, 2);
    assert_eq!(summary.answers, 4);

    let surveys = sheet(&options.surveys_output);
    assert_eq!(
        surveys[0],
        vec![text("id"), text("title"), text("date_created"), text("date_modified"), text("responses"), text("status")]
    );
    assert_eq!(surveys[1][0], text("5001"));
    assert_eq!(surveys[1][1], text("Summer fair &amp; picnic feedback"));
    assert_eq!(surveys[1][3], text("2023-06-15 11:00:00"));
    assert_eq!(surveys[1][4], Data::Float(2.0));
    assert_eq!(surveys[2][4], Data::Float(0.0));

    let responses = sheet(&options.responses_output);
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[1][0], text("900001"));
    assert_eq!(responses[1][1], text("5001"));
    assert_eq!(responses[1][3], text("2023-06-15 11:04:00"));
    assert_eq!(responses[2][5], text("partial"));

    let answers = sheet(&options.answers_output);
    let rows: Vec<(String, String, String)> = answers[1..]
        .iter()
        .map(|row| (row[0].to_string(), row[2].to_string(), row[3].to_string()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("1".to_string(), "Favourite stall?".to_string(), "Cakes".to_string()),
            ("2".to_string(), "How would you rate: The event overall?".to_string(), "4".to_string()),
            ("3".to_string(), "Comments".to_string(), "Greatday".to_string()),
            ("5".to_string(), "Which did you visit? Bouncy castle".to_string(), "Yes".to_string()),
        ]
    );
    assert_eq!(answers[3][4], text("Y"));
    assert_eq!(answers[4][1], text("900002"));
}

#[tokio::test]
async fn test_export_captures_surveys_json() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = write_captures(dir.path());
    let capture = dir.path().join("captured_surveys.json");
    options.surveys_output_json = Some(capture.clone());

    let config = Config::default();
    Exporter::new(&config).unwrap().run(&options).await.unwrap();

    assert_eq!(load_json_array(&capture).unwrap(), surveys_fixture());
}

#[tokio::test]
async fn test_export_fails_on_unparsable_response_count() {
    let dir = tempfile::tempdir().unwrap();
    let options = write_captures(dir.path());
    let mut surveys = surveys_fixture();
    surveys[1]["responses"] = json!("many");
    save_json_array(options.surveys_input_json.as_ref().unwrap(), &surveys).unwrap();

    let config = Config::default();
    let result = Exporter::new(&config).unwrap().run(&options).await;

    assert!(result.is_err());
    assert!(!options.surveys_output.exists());
}

#[tokio::test]
async fn test_export_fails_without_response_capture() {
    let dir = tempfile::tempdir().unwrap();
    let options = write_captures(dir.path());
    fs::remove_file(survey_results_path(options.survey_results_input_folder.as_ref().unwrap(), "5002")).unwrap();

    let config = Config::default();
    let result = Exporter::new(&config).unwrap().run(&options).await;

    assert!(result.is_err());
    assert!(options.surveys_output.exists());
    assert!(!options.responses_output.exists());
}

#[tokio::test]
async fn test_replay_export_ignores_unusable_api_settings() {
    let dir = tempfile::tempdir().unwrap();
    let options = write_captures(dir.path());
    let config = Config {
        proxy: Some("not a url".to_string()),
        ..Config::default()
    };

    assert!(!options.needs_api());
    assert!(SurveyClient::new(&config).is_err());

    let summary = Exporter::new(&config).unwrap().run(&options).await.unwrap();
    assert_eq!(summary.surveys, 2);
    assert!(options.answers_output.exists());
}

fn http_reply(status: &str, extra_headers: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n{}",
        status,
        body.len(),
        extra_headers,
        body
    )
}

fn json_reply(items: &[Value]) -> String {
    http_reply("200 OK", "", &Value::Array(items.to_vec()).to_string())
}

/// Serve `routes` (request target → raw reply) until the test ends.
/// Returns the targets of every HTTP request received, in order.
fn serve(listener: TcpListener, routes: HashMap<String, String>) -> Arc<Mutex<Vec<String>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let mut head = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = stream.read(&mut buf).await.unwrap_or(0);
                head.extend_from_slice(&buf[..n]);
                if n == 0 || !head.starts_with(b"GET ") || head.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }

            // A TLS handshake gets a plaintext reply and is not recorded
            let reply = if head.starts_with(b"GET ") {
                let head = String::from_utf8_lossy(&head).into_owned();
                let target = head.split_whitespace().nth(1).unwrap_or_default().to_string();
                log.lock().unwrap().push(target.clone());

                routes
                    .get(&target)
                    .cloned()
                    .unwrap_or_else(|| http_reply("404 Not Found", "", "{}"))
            } else {
                http_reply("400 Bad Request", "", "{}")
            };
            let _ = stream.write_all(reply.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    seen
}

fn live_survey(id: u64) -> Value {
    json!({
        "id": id,
        "title": format!("Survey {}", id),
        "date_created": "2024-01-10T12:00:00Z",
        "date_modified": "2024-01-10T12:00:00Z",
        "responses": 3,
        "status": "open"
    })
}

fn live_response(id: u64) -> Value {
    json!({
        "id": id,
        "date_started": "2024-02-01T08:00:00Z",
        "date_ended": "2024-02-01T08:05:00Z",
        "date_modified": "2024-02-01T08:05:00Z",
        "status": "completed",
        "pages": [
            {"questions": [
                {"title": "Pick one", "answers": [
                    {"id": id * 10, "type": "radio", "choice_title": format!("Choice {}", id)}
                ]}
            ]}
        ]
    })
}

fn responses_target(survey_id: u64, page: u32) -> String {
    format!("/v1/surveys/{}/responses?include_labels=true&page_size=2&page={}", survey_id, page)
}

#[tokio::test]
async fn test_live_export_paginates_and_captures() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let mut routes = HashMap::new();
    routes.insert(
        "/v1/surveys?page_size=2&page=1".to_string(),
        json_reply(&[live_survey(7001), live_survey(7002)]),
    );
    routes.insert("/v1/surveys?page_size=2&page=2".to_string(), json_reply(&[live_survey(7003)]));
    routes.insert(responses_target(7001, 1), json_reply(&[live_response(101), live_response(102)]));
    routes.insert(responses_target(7001, 2), json_reply(&[live_response(103)]));
    routes.insert(responses_target(7002, 1), json_reply(&[live_response(104), live_response(105)]));
    // The second page of 7002 lands on a TLS endpoint that is not there; the
    // default prompt declines the retry, so 7002 keeps its first page.
    routes.insert(
        responses_target(7002, 2),
        http_reply(
            "302 Found",
            &format!("Location: https://127.0.0.1:{}/tls-only\r\n", port),
            "",
        ),
    );
    routes.insert(responses_target(7003, 1), json_reply(&[live_response(106)]));
    let requests = serve(listener, routes);

    let dir = tempfile::tempdir().unwrap();
    let captures = dir.path().join("captures");
    fs::create_dir_all(&captures).unwrap();
    let options = ExportOptions {
        survey_results_output_folder: Some(captures.clone()),
        surveys_output: dir.path().join("surveys.xlsx"),
        responses_output: dir.path().join("responses.xlsx"),
        answers_output: dir.path().join("answers.xlsx"),
        ..ExportOptions::default()
    };
    assert!(options.needs_api());

    let config = Config {
        base_url: format!("http://127.0.0.1:{}", port),
        page_size: 2,
        request_timeout_secs: 10,
        ..Config::default()
    };
    let client = SurveyClient::new(&config).unwrap();

    let summary = Exporter::new(&config)
        .unwrap()
        .with_client(&client)
        .with_zone(plus_one())
        .run(&options)
        .await
        .unwrap();

    assert_eq!(summary.surveys, 3);
    assert_eq!(summary.responses, 6);
    assert_eq!(summary.answers, 6);

    assert_eq!(
        *requests.lock().unwrap(),
        vec![
            "/v1/surveys?page_size=2&page=1".to_string(),
            "/v1/surveys?page_size=2&page=2".to_string(),
            responses_target(7001, 1),
            responses_target(7001, 2),
            responses_target(7002, 1),
            responses_target(7002, 2),
            responses_target(7003, 1),
        ]
    );

    let captured = |id: &str| load_json_array(&survey_results_path(&captures, id)).unwrap();
    assert_eq!(captured("7001"), vec![live_response(101), live_response(102), live_response(103)]);
    assert_eq!(captured("7002"), vec![live_response(104), live_response(105)]);
    assert_eq!(captured("7003"), vec![live_response(106)]);

    let surveys = sheet(&options.surveys_output);
    let survey_ids: Vec<Data> = surveys[1..].iter().map(|row| row[0].clone()).collect();
    assert_eq!(survey_ids, vec![text("7001"), text("7002"), text("7003")]);

    let responses = sheet(&options.responses_output);
    let response_rows: Vec<(Data, Data)> = responses[1..].iter().map(|row| (row[0].clone(), row[1].clone())).collect();
    assert_eq!(
        response_rows,
        vec![
            (text("101"), text("7001")),
            (text("102"), text("7001")),
            (text("103"), text("7001")),
            (text("104"), text("7002")),
            (text("105"), text("7002")),
            (text("106"), text("7003")),
        ]
    );
    assert_eq!(responses[1][2], text("2024-02-01 09:00:00"));

    let answers = sheet(&options.answers_output);
    let answer_rows: Vec<(Data, Data, Data)> = answers[1..]
        .iter()
        .map(|row| (row[0].clone(), row[1].clone(), row[3].clone()))
        .collect();
    assert_eq!(
        answer_rows,
        (101..=106)
            .map(|id: u64| (text(&(id * 10).to_string()), text(&id.to_string()), text(&format!("Choice {}", id))))
            .collect::<Vec<_>>()
    );
}
