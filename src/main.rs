use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use git_semver::cli::{run_calculation, CalculateArgs};
use git_semver::observability::{env_filter, init_logging, DEFAULT_LOG_LEVEL};
use git_semver::ui::{self, OutputFormat};

#[derive(clap::Parser)]
#[command(
    name = "git-semver",
    version,
    about = "Calculate the semantic version of a commit from git history"
)]
struct Args {
    #[arg(default_value = ".", help = "Path inside the git repository")]
    path: PathBuf,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(short, long, help = "Calculate for this branch instead of the current one")]
    branch: Option<String>,

    #[arg(long, help = "Calculate for this commit instead of the branch tip")]
    commit: Option<String>,

    #[arg(long, help = "Print only the value of this variable")]
    show_variable: Option<String>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, help = "Output format")]
    output: OutputFormat,

    #[arg(long, help = "Neither read nor write the version cache")]
    no_cache: bool,

    #[arg(long, help = "Override the configured next version")]
    next_version: Option<String>,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase log verbosity (-v, -vv)")]
    verbose: u8,

    #[arg(short, long, help = "Only log errors")]
    quiet: bool,
}

fn main() {
    let args = Args::parse();
    init_logging(env_filter(args.quiet, args.verbose, DEFAULT_LOG_LEVEL));

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let calculate = CalculateArgs {
        path: args.path,
        config_path: args.config,
        branch: args.branch,
        commit: args.commit,
        next_version: args.next_version,
        no_cache: args.no_cache,
    };
    let outcome = run_calculation(&calculate)?;

    if !args.quiet {
        for warning in &outcome.warnings {
            ui::display_warning(warning);
        }
    }

    match (&outcome.result, args.output, args.show_variable.as_deref()) {
        (Some(result), OutputFormat::Text, None) if !args.quiet => {
            ui::display_version(result, &outcome.variables);
        }
        (_, format, show_variable) => {
            println!("{}", ui::render(&outcome.variables, format, show_variable)?);
        }
    }

    Ok(())
}
