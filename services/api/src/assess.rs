use crate::infra::{build_service, load_profile};
use admission_fit::assessment::{AssessmentReport, ScoringConfig, StudentSubmission};
use admission_fit::config::{AppConfig, NarrativeConfig};
use admission_fit::error::AppError;
use admission_fit::telemetry;
use clap::Args;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Submission JSON with `student_name`, `ratings` and optional `answers`
    #[arg(long)]
    pub(crate) responses: PathBuf,
    /// Scoring profile JSON (defaults to the built-in B.Com (CA) profile)
    #[arg(long)]
    pub(crate) profile: Option<PathBuf>,
    /// Request a narrative evaluation using the NARRATIVE_* settings
    #[arg(long)]
    pub(crate) narrative: bool,
    /// Write the rendered text report to this path
    #[arg(long)]
    pub(crate) report_out: Option<PathBuf>,
    /// Write the per-trait chart data as CSV to this path
    #[arg(long)]
    pub(crate) chart_out: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ProfileArgs {
    /// Scoring profile JSON to validate and print
    #[arg(long)]
    pub(crate) profile: Option<PathBuf>,
}

pub(crate) async fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let narrative = if args.narrative {
        let config = AppConfig::load()?;
        telemetry::init(&config.telemetry)?;
        config.narrative
    } else {
        NarrativeConfig::default()
    };

    let report = assess_file(&args, &narrative).await?;
    print!("{}", report.render_text());
    write_outputs(&args, &report)?;
    Ok(())
}

pub(crate) fn run_profile(args: ProfileArgs) -> Result<(), AppError> {
    let profile = load_profile(args.profile.as_deref())?;
    profile.validate()?;
    println!("{}", encode_profile(&profile)?);
    Ok(())
}

fn encode_profile(profile: &ScoringConfig) -> Result<String, AppError> {
    serde_json::to_string_pretty(profile).map_err(AppError::Serialization)
}

async fn assess_file(
    args: &AssessArgs,
    narrative: &NarrativeConfig,
) -> Result<AssessmentReport, AppError> {
    let raw = fs::read_to_string(&args.responses)?;
    let submission: StudentSubmission = serde_json::from_str(&raw)?;
    let profile = load_profile(args.profile.as_deref())?;
    let service = build_service(profile, narrative)?;
    Ok(service.assess(&submission, args.narrative).await?)
}

fn write_outputs(args: &AssessArgs, report: &AssessmentReport) -> Result<(), AppError> {
    if let Some(path) = &args.report_out {
        fs::write(path, report.render_text())?;
        println!("\nReport written to {}", path.display());
    }
    if let Some(path) = &args.chart_out {
        fs::write(path, report.chart_csv()?)?;
        println!("Chart data written to {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use admission_fit::assessment::{FitClassification, NarrativeStatus};
    use std::path::Path;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "admission-fit-{name}-{}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).expect("scratch dir");
        dir
    }

    fn write_submission(dir: &Path) -> PathBuf {
        let path = dir.join("submission.json");
        let body = serde_json::json!({
            "student_name": "Karan Shah",
            "ratings": {
                "Commerce Interest": 8,
                "Academic Interest": 3,
                "Problem Solving": 8,
                "Tech Comfort": 3,
                "Career Clarity": 6,
                "Communication": 5
            },
            "answers": [
                { "question": "Why B.Com (CA)?", "answer": "My cousin did it." }
            ]
        });
        fs::write(&path, body.to_string()).expect("submission written");
        path
    }

    fn args_for(responses: PathBuf) -> AssessArgs {
        AssessArgs {
            responses,
            profile: None,
            narrative: false,
            report_out: None,
            chart_out: None,
        }
    }

    #[tokio::test]
    async fn assess_file_scores_the_submission() {
        let dir = scratch_dir("score");
        let args = args_for(write_submission(&dir));

        let report = assess_file(&args, &NarrativeConfig::default())
            .await
            .expect("assessment succeeds");

        assert_eq!(report.result.percentage, 55.0);
        assert_eq!(report.result.classification, FitClassification::ModerateFit);
        assert_eq!(
            report.result.strengths,
            vec!["Commerce Interest", "Problem Solving"]
        );
        assert_eq!(
            report.result.weaknesses,
            vec!["Academic Interest", "Tech Comfort"]
        );
        assert_eq!(report.narrative, NarrativeStatus::Skipped);
        fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn outputs_are_written_when_requested() {
        let dir = scratch_dir("outputs");
        let mut args = args_for(write_submission(&dir));
        args.report_out = Some(dir.join("report.txt"));
        args.chart_out = Some(dir.join("chart.csv"));

        let report = assess_file(&args, &NarrativeConfig::default())
            .await
            .expect("assessment succeeds");
        write_outputs(&args, &report).expect("outputs written");

        let text = fs::read_to_string(dir.join("report.txt")).expect("report exists");
        assert!(text.starts_with("Student Evaluation Report: Karan Shah"));
        let csv = fs::read_to_string(dir.join("chart.csv")).expect("chart exists");
        assert!(csv.starts_with("trait,rating,max,percent"));
        assert!(csv.contains("Tech Comfort,3,10,30.00"));
        fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn malformed_submission_is_rejected() {
        let dir = scratch_dir("malformed");
        let path = dir.join("broken.json");
        fs::write(&path, "{ \"student_name\": ").expect("written");

        let err = assess_file(&args_for(path), &NarrativeConfig::default())
            .await
            .expect_err("malformed json");

        assert!(matches!(err, AppError::Submission(_)));
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn encoded_profile_round_trips() {
        let encoded = encode_profile(&ScoringConfig::bcom_ca()).expect("profile encodes");
        let decoded = ScoringConfig::from_json_str(&encoded).expect("profile decodes");
        assert_eq!(decoded, ScoringConfig::bcom_ca());
    }

    #[test]
    fn profile_command_rejects_missing_files() {
        let err = run_profile(ProfileArgs {
            profile: Some(PathBuf::from("does/not/exist.json")),
        })
        .expect_err("missing profile");
        assert!(matches!(err, AppError::Profile(_)));
    }
}
