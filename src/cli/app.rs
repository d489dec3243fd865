use clap::Parser;
use std::path::PathBuf;

use survey_export::pipeline::ExportOptions;

#[derive(Parser, Debug)]
#[command(name = "survey-export")]
#[command(about = "Calls the survey API and produces long table representations of the results")]
pub struct Cli {
    /// Location of surveys JSON (if missing, the API is called)
    #[arg(short = 's', long)]
    pub surveys_input_json: Option<PathBuf>,

    /// Location to write surveys JSON (if missing, it is not written)
    #[arg(short = 'S', long)]
    pub surveys_output_json: Option<PathBuf>,

    /// Folder to read individual survey results from (if missing, the API is called)
    #[arg(short = 'r', long)]
    pub survey_results_input_folder: Option<PathBuf>,

    /// Folder to write individual survey results to (ignored with --survey-results-input-folder)
    #[arg(short = 'R', long)]
    pub survey_results_output_folder: Option<PathBuf>,

    /// Location to write surveys xlsx
    #[arg(short = 't', long)]
    pub surveys_output: PathBuf,

    /// Location to write responses xlsx
    #[arg(short = 'o', long)]
    pub responses_output: PathBuf,

    /// Location to write answers xlsx
    #[arg(short = 'a', long)]
    pub answers_output: PathBuf,

    /// Config file (defaults to the user config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            surveys_input_json: self.surveys_input_json.clone(),
            surveys_output_json: self.surveys_output_json.clone(),
            survey_results_input_folder: self.survey_results_input_folder.clone(),
            survey_results_output_folder: self.survey_results_output_folder.clone(),
            surveys_output: self.surveys_output.clone(),
            responses_output: self.responses_output.clone(),
            answers_output: self.answers_output.clone(),
        }
    }
}
