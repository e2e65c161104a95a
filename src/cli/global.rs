use clap::{ArgAction, Args, Parser};
use tracing_core::metadata::LevelFilter;

use crate::cli::commands::audit::AuditArgs;

#[deny(missing_docs)]
#[derive(Parser, Debug)]
#[command(name = "iam-audit", version = env!("CARGO_PKG_VERSION"))]
/// iam-audit - Report console access, MFA and policy attachments for every IAM user
pub struct CommandLineArgs {
    /// Arguments for the audit run
    #[command(flatten)]
    pub audit_args: AuditArgs,

    /// Global arguments
    #[command(flatten)]
    pub global_args: GlobalArgs,
}

impl CommandLineArgs {
    /// Parse command-line arguments.
    ///
    /// Blank key values (for example an exported but empty `AWS_SESSION_TOKEN`) are
    /// treated as absent.
    pub fn parse_args() -> Self {
        let mut args = CommandLineArgs::parse();

        for value in [
            &mut args.audit_args.access_key,
            &mut args.audit_args.secret_key,
            &mut args.audit_args.session_token,
            &mut args.audit_args.profile,
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *value = None;
            }
        }

        args
    }
}

/// Top-level global CLI arguments
#[derive(Args, Debug, Clone, Default)]
#[command(next_help_heading = "Global Options")]
pub struct GlobalArgs {
    /// Enable verbose output (up to 3 times for more detail)
    #[arg(global = true, long = "verbose", short = 'v', action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error messages
    #[arg(global = true, long, short)]
    pub quiet: bool,
}

impl GlobalArgs {
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::ERROR
        } else {
            match self.verbose {
                0 => LevelFilter::INFO,  // Default level if no `-v` is provided
                1 => LevelFilter::DEBUG, // `-v`
                _ => LevelFilter::TRACE, // `-vv` or more
            }
        }
    }

    /// `-vvv` and beyond also surface logs from the AWS SDK crates.
    pub fn all_targets(&self) -> bool {
        !self.quiet && self.verbose > 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        let mut args = GlobalArgs::default();
        assert_eq!(args.log_level(), LevelFilter::INFO);
        args.verbose = 1;
        assert_eq!(args.log_level(), LevelFilter::DEBUG);
        args.verbose = 3;
        assert_eq!(args.log_level(), LevelFilter::TRACE);
        assert!(args.all_targets());
        args.quiet = true;
        assert_eq!(args.log_level(), LevelFilter::ERROR);
        assert!(!args.all_targets());
    }

    #[test]
    fn parses_keys_and_output_dir() {
        let args = CommandLineArgs::try_parse_from([
            "iam-audit",
            "--access-key",
            "AKIAEXAMPLE",
            "--secret-key",
            "secret",
            "--output-dir",
            "/tmp/reports",
            "-vv",
        ])
        .unwrap();

        assert_eq!(args.audit_args.access_key.as_deref(), Some("AKIAEXAMPLE"));
        assert_eq!(args.audit_args.secret_key.as_deref(), Some("secret"));
        assert_eq!(args.audit_args.output_dir, std::path::PathBuf::from("/tmp/reports"));
        assert_eq!(args.global_args.verbose, 2);
    }
}
