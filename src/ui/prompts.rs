use anyhow::Result;
use dialoguer::Select;

const CHOICES: [&str; 2] = ["Yes, retry", "No, stop fetching"];

/// Ask the operator whether to retry a request that failed on TLS.
///
/// Returns `Ok(false)` when they choose to stop; the export then continues with
/// whatever was fetched before the failure.
pub fn prompt_tls_retry(message: &str) -> Result<bool> {
    let selection = Select::new()
        .with_prompt(message)
        .items(&CHOICES)
        .default(0)
        .interact()?;

    Ok(selection == 0)
}
