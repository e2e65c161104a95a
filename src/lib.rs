pub mod audit;
pub mod cli;
pub mod credentials;
pub mod iam;
pub mod report;

use std::path::{Path, PathBuf};

use anyhow::Result;

pub use audit::{build_report, enrich_user, Report, ReportRow, HEADER};
pub use iam::{AwsIamDirectory, IamDirectory, Lookup, UserRecord};

/// Audit the account behind `directory` and write `<output_dir>/<account>.xlsx`,
/// plus a JSON copy when `json_out` is set. Returns the workbook path.
///
/// The output directory is checked by the writer, after the account is audited.
pub async fn audit_account<D: IamDirectory>(
    directory: &D,
    output_dir: &Path,
    json_out: Option<&Path>,
) -> Result<PathBuf> {
    let report = build_report(directory).await?;
    let path = report::write_workbook(output_dir, &report)?;
    if let Some(json_path) = json_out {
        report::write_json(json_path, &report)?;
    }
    Ok(path)
}
