use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook};
use tracing::info;

use crate::audit::{Report, CREATED_COLUMN};

/// Excel's limit on worksheet name length.
const MAX_SHEET_NAME_CHARS: usize = 31;

const DATE_FORMAT: &str = "mmm d yyyy hh:mm AM/PM";

/// Fail unless `dir` already exists. Reports are never written to a directory this
/// tool had to create.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        bail!("Output directory {} does not exist", dir.display());
    }
    Ok(())
}

/// Path of the workbook written for `account` inside `dir`.
pub fn workbook_path(dir: &Path, account: &str) -> PathBuf {
    dir.join(format!("{account}.xlsx"))
}

fn sheet_name(account: &str) -> String {
    account.chars().take(MAX_SHEET_NAME_CHARS).collect()
}

/// Write `report` to `<dir>/<account>.xlsx` and return the path written.
pub fn write_workbook(dir: &Path, report: &Report) -> Result<PathBuf> {
    ensure_output_dir(dir)?;
    let path = workbook_path(dir, &report.account);

    let mut workbook = Workbook::new();
    let heading = Format::new().set_bold();
    let date = Format::new().set_num_format(DATE_FORMAT);

    let sheet = workbook.add_worksheet();
    sheet
        .set_name(sheet_name(&report.account))
        .with_context(|| format!("Invalid worksheet name for account {}", report.account))?;

    for (col, title) in report.header.iter().enumerate() {
        sheet.write_string_with_format(0, col as ColNum, *title, &heading)?;
    }

    for (idx, row) in report.rows.iter().enumerate() {
        let row_num = (idx + 1) as RowNum;
        for (col, value) in row.text_columns().into_iter().enumerate() {
            if let Some(text) = value {
                sheet.write_string(row_num, col as ColNum, text)?;
            }
        }
        // Spreadsheet dates carry no timezone: write the UTC wall-clock as-is.
        sheet.write_datetime_with_format(
            row_num,
            CREATED_COLUMN as ColNum,
            &row.created.naive_utc(),
            &date,
        )?;
    }
    sheet.autofit();

    workbook.save(&path).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {} user row(s) to {}", report.rows.len(), path.display());
    Ok(path)
}

/// Write `report` as pretty-printed JSON.
pub fn write_json(path: &Path, report: &Report) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    use super::*;
    use crate::audit::ReportRow;

    fn row(name: &str) -> ReportRow {
        ReportRow {
            user_name: name.into(),
            console_access: "Yes".into(),
            mfa_enabled: "No".into(),
            user_id: "AIDAEXAMPLE".into(),
            user_arn: format!("arn:aws:iam::123456789012:user/{name}"),
            created: Utc.with_ymd_and_hms(2019, 11, 4, 17, 5, 0).unwrap(),
            managed_policies: String::new(),
            inline_policies: String::new(),
            groups: "admins".into(),
            group_managed_policies: "AdministratorAccess".into(),
            group_inline_policies: String::new(),
        }
    }

    #[test]
    fn long_aliases_are_truncated_for_the_sheet_name() {
        let alias = "a-very-long-account-alias-used-by-the-platform-team";
        assert_eq!(sheet_name(alias).chars().count(), MAX_SHEET_NAME_CHARS);
        assert_eq!(sheet_name("acme"), "acme");
    }

    #[test]
    fn workbook_is_named_after_the_account() {
        let dir = TempDir::new().unwrap();
        let report = Report::new("acme", vec![row("alice")]);

        let path = write_workbook(dir.path(), &report).unwrap();

        assert_eq!(path, dir.path().join("acme.xlsx"));
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PK"), "xlsx output must be a zip container");
    }

    #[test]
    fn missing_output_dir_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("downloads");
        let report = Report::new("acme", vec![row("alice")]);

        let err = write_workbook(&missing, &report).unwrap_err();

        assert!(err.to_string().contains("does not exist"));
        assert!(!missing.exists());
    }

    #[test]
    fn json_copy_carries_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("acme.json");
        let report = Report::new("acme", vec![row("alice"), row("bob")]);

        write_json(&path, &report).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["account"], "acme");
        assert_eq!(value["header"].as_array().unwrap().len(), 11);
        assert_eq!(value["rows"][1]["user_name"], "bob");
        assert_eq!(value["rows"][0]["created"], "2019-11-04T17:05:00Z");
    }
}
