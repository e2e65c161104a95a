use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use tempfile::TempDir;

mod test {

    use super::*;

    #[test]
    fn cli_version_flag() {
        Command::cargo_bin("iam-audit")
            .unwrap()
            .arg("--version")
            .assert()
            .success()
            .stdout(contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn cli_help_lists_credential_options() {
        Command::cargo_bin("iam-audit")
            .unwrap()
            .arg("--help")
            .assert()
            .success()
            .stdout(contains("--access-key").and(contains("--secret-key")).and(contains("--output-dir")));
    }

    #[test]
    fn cli_fails_before_aws_when_output_dir_is_missing() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("downloads");

        Command::cargo_bin("iam-audit")
            .unwrap()
            .args(["--access-key", "AKIAEXAMPLE", "--secret-key", "secret", "--output-dir"])
            .arg(&missing)
            .env_remove("AWS_PROFILE")
            .assert()
            .failure()
            .stderr(contains("does not exist"));

        assert!(!missing.exists());
    }

    #[test]
    fn cli_defaults_to_downloads_in_the_working_directory() {
        let dir = TempDir::new().unwrap();

        Command::cargo_bin("iam-audit")
            .unwrap()
            .current_dir(dir.path())
            .args(["--access-key", "AKIAEXAMPLE", "--secret-key", "secret", "--quiet"])
            .assert()
            .failure()
            .stderr(contains("downloads does not exist"));
    }
}
