use crate::assess::{run_assess, run_profile, AssessArgs, ProfileArgs};
use crate::server;
use admission_fit::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Admission Fit",
    about = "Score student program fit from the command line or over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a submission file and print the evaluation report
    Assess(AssessArgs),
    /// Print the effective scoring profile as JSON
    Profile(ProfileArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Assess(args) => run_assess(args).await,
        Command::Profile(args) => run_profile(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["admission-fit-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn assess_accepts_output_paths() {
        let cli = Cli::try_parse_from([
            "admission-fit-api",
            "assess",
            "--responses",
            "asha.json",
            "--narrative",
            "--chart-out",
            "asha.csv",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Assess(args)) => {
                assert_eq!(args.responses.to_str(), Some("asha.json"));
                assert!(args.narrative);
                assert!(args.profile.is_none());
                assert!(args.report_out.is_none());
                assert_eq!(args.chart_out.as_deref().and_then(|p| p.to_str()), Some("asha.csv"));
            }
            other => panic!("expected assess command, got {other:?}"),
        }
    }

    #[test]
    fn assess_requires_a_responses_file() {
        assert!(Cli::try_parse_from(["admission-fit-api", "assess"]).is_err());
    }
}
