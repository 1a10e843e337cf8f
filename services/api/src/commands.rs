use crate::infra::{build_service, ConfiguredRepository};
use clap::Args;
use crew_intake::config::AppConfig;
use crew_intake::error::AppError;
use crew_intake::telemetry;
use crew_intake::workflows::recruitment::{Application, ApplicationRepository, RawApplication};
use serde_json::Value;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct SubmitArgs {
    /// Applicant name on the game platform
    #[arg(long)]
    pub(crate) name: String,
    /// Applicant age (positive whole number)
    #[arg(long)]
    pub(crate) age: String,
    /// Whether the applicant works elsewhere (yes/no, sim/nao, true/false)
    #[arg(long)]
    pub(crate) works_elsewhere: String,
    /// Applicant id on the chat platform
    #[arg(long)]
    pub(crate) chat_id: String,
    /// Who referred the applicant
    #[arg(long)]
    pub(crate) referred_by: String,
}

impl From<SubmitArgs> for RawApplication {
    fn from(args: SubmitArgs) -> Self {
        Self {
            name: Some(args.name),
            age: Some(Value::String(args.age)),
            works_elsewhere: Some(Value::String(args.works_elsewhere)),
            external_chat_id: Some(args.chat_id),
            referred_by: Some(args.referred_by),
        }
    }
}

pub(crate) async fn run_submit(args: SubmitArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let repository = Arc::new(ConfiguredRepository::from_config(&config.storage)?);
    let service = build_service(repository, &config.notifier)?;

    let receipt = service.submit(args.into()).await?;
    println!(
        "Application {} submitted (success: {})",
        receipt.application_id, receipt.success
    );
    Ok(())
}

pub(crate) fn run_list() -> Result<(), AppError> {
    let config = AppConfig::load()?;

    let Some(path) = config.storage.csv_path.as_ref() else {
        println!("No storage path configured (set APP_STORAGE_PATH); nothing to list.");
        return Ok(());
    };

    let repository = ConfiguredRepository::from_config(&config.storage)?;
    let applications = repository.list()?;

    println!("Applications in {}", path.display());
    if applications.is_empty() {
        println!("- none");
    }
    for application in &applications {
        println!("- {}", render_application(application));
    }
    Ok(())
}

fn render_application(application: &Application) -> String {
    format!(
        "{} | {} | age {} | works elsewhere: {} | chat {} | referred by {} | {}",
        application.id,
        application.name,
        application.age,
        if application.works_elsewhere { "yes" } else { "no" },
        application.external_chat_id,
        application.referred_by,
        application.submitted_at.to_rfc3339(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use crew_intake::workflows::recruitment::{validate, ApplicationId};

    fn args() -> SubmitArgs {
        SubmitArgs {
            name: "TestUser".to_string(),
            age: "18".to_string(),
            works_elsewhere: "sim".to_string(),
            chat_id: "123456789".to_string(),
            referred_by: "Recruiter".to_string(),
        }
    }

    #[test]
    fn submit_args_validate_like_form_input() {
        let form = validate(args().into()).expect("valid");
        assert_eq!(form.age, 18);
        assert!(form.works_elsewhere);
    }

    #[test]
    fn render_application_lists_every_field() {
        let form = validate(args().into()).expect("valid");
        let submitted_at = Utc
            .with_ymd_and_hms(2025, 3, 14, 18, 30, 5)
            .single()
            .expect("valid timestamp");
        let application =
            Application::from_form(ApplicationId::from_sequence(3), form, submitted_at);

        assert_eq!(
            render_application(&application),
            "app-000003 | TestUser | age 18 | works elsewhere: yes | chat 123456789 | referred by Recruiter | 2025-03-14T18:30:05+00:00"
        );
    }
}
