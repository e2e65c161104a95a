use std::path::PathBuf;

use clap::Args;

/// Audit every IAM user in the account behind the supplied credentials.
#[derive(Args, Debug, Clone)]
pub struct AuditArgs {
    /// AWS access key ID (prompted for with hidden input when omitted)
    #[arg(long, short = 'a', env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    pub access_key: Option<String>,

    /// AWS secret access key (prompted for with hidden input when omitted)
    #[arg(long, short = 's', env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// Optional STS session token for temporary credentials
    #[arg(long, env = "AWS_SESSION_TOKEN", hide_env_values = true)]
    pub session_token: Option<String>,

    /// Named profile from the shared AWS config, used when no keys are given
    #[arg(long, value_name = "NAME")]
    pub profile: Option<String>,

    /// Existing directory the `<account-alias>.xlsx` report is written to
    #[arg(long, value_name = "DIR", default_value = "downloads")]
    pub output_dir: PathBuf,

    /// Optional path to also write the report as JSON
    #[arg(long, value_name = "PATH")]
    pub json_out: Option<PathBuf>,
}
