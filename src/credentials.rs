use anyhow::{bail, Context, Result};
use aws_credential_types::Credentials;
use dialoguer::Password;

use crate::cli::commands::audit::AuditArgs;

const PROVIDER_NAME: &str = "iam_audit";

/// Build static credentials from an access key pair.
pub fn static_credentials(
    access_key: &str,
    secret_key: &str,
    session_token: Option<&str>,
) -> Result<Credentials> {
    let access_key = access_key.trim();
    let secret_key = secret_key.trim();
    if access_key.is_empty() || secret_key.is_empty() {
        bail!("AWS access key and secret key must not be empty");
    }
    let session_token = session_token.map(str::trim).filter(|t| !t.is_empty());

    Ok(Credentials::new(
        access_key,
        secret_key,
        session_token.map(str::to_string),
        None,
        PROVIDER_NAME,
    ))
}

fn prompt_secret(prompt: &str) -> Result<String> {
    Password::new()
        .with_prompt(prompt)
        .interact()
        .with_context(|| format!("Failed to read {prompt}"))
}

/// Resolve the credentials to audit with.
///
/// Keys given on the command line or in the environment are used as-is. With a
/// named profile and no keys, `None` defers to the profile. Otherwise both keys are
/// prompted for with hidden input.
pub fn resolve(args: &AuditArgs) -> Result<Option<Credentials>> {
    if args.profile.is_some() && args.access_key.is_none() && args.secret_key.is_none() {
        return Ok(None);
    }

    let access_key = match &args.access_key {
        Some(key) => key.clone(),
        None => prompt_secret("AWS access key")?,
    };
    let secret_key = match &args.secret_key {
        Some(key) => key.clone(),
        None => prompt_secret("AWS secret key")?,
    };

    static_credentials(&access_key, &secret_key, args.session_token.as_deref()).map(Some)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn args() -> AuditArgs {
        AuditArgs {
            access_key: None,
            secret_key: None,
            session_token: None,
            profile: None,
            output_dir: PathBuf::from("downloads"),
            json_out: None,
        }
    }

    #[test]
    fn explicit_keys_skip_the_prompt() {
        let args = AuditArgs {
            access_key: Some("AKIAEXAMPLE".into()),
            secret_key: Some("secret".into()),
            session_token: Some("  ".into()),
            ..args()
        };

        let creds = resolve(&args).unwrap().expect("static credentials");
        assert_eq!(creds.access_key_id(), "AKIAEXAMPLE");
        assert_eq!(creds.secret_access_key(), "secret");
        assert_eq!(creds.session_token(), None);
    }

    #[test]
    fn profile_without_keys_defers_to_the_profile() {
        let args = AuditArgs { profile: Some("audit".into()), ..args() };
        assert!(resolve(&args).unwrap().is_none());
    }

    #[test]
    fn session_token_is_kept() {
        let creds = static_credentials("AKIAEXAMPLE", "secret", Some("token")).unwrap();
        assert_eq!(creds.session_token(), Some("token"));
    }

    #[test]
    fn blank_keys_are_rejected() {
        assert!(static_credentials(" ", "secret", None).is_err());
        assert!(static_credentials("AKIAEXAMPLE", "", None).is_err());
    }
}
