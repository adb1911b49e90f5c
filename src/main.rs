use anyhow::Context;
use contact_relay::{
    configuration::{get_configuration, Settings},
    contact::ContactForm,
    startup::build_workflow,
    telemetry::{get_subscriber, init_subscriber},
    workflow::SubmitOutcome,
};
use std::io::{stderr, stdin};
use std::process::ExitCode;

// Reads one url-encoded contact form from stdin and runs it through the
// configured delivery strategy.
#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let subscriber = get_subscriber(env!("CARGO_PKG_NAME").to_owned(), "info".to_owned(), stderr);
    init_subscriber(subscriber)?;
    let config_file = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "configuration".to_owned());
    let settings: Settings = get_configuration(&config_file).with_context(|| {
        format!(
            "ERROR: Failed to read configuration file \"{}\"",
            config_file
        )
    })?;
    let mut workflow = build_workflow(&settings)?;
    let body = std::io::read_to_string(stdin()).context("Failed to read form from stdin")?;
    let form: ContactForm =
        serde_urlencoded::from_str(body.trim()).context("Failed to decode url-encoded form")?;
    workflow.fill(form);
    let exit_code = match workflow.submit().await {
        SubmitOutcome::Delivered(_) => {
            println!("{}", workflow.state().banner().unwrap_or_default());
            ExitCode::SUCCESS
        }
        SubmitOutcome::Invalid(errors) => {
            println!("{}", errors);
            for (field, error) in errors.iter() {
                println!("  {}: {}", field, error);
            }
            ExitCode::FAILURE
        }
        SubmitOutcome::Failed(error) => {
            println!("{}", error.user_message());
            ExitCode::FAILURE
        }
        SubmitOutcome::Ignored => ExitCode::FAILURE,
    };
    workflow.shutdown().await;
    Ok(exit_code)
}
