use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::iam::{IamDirectory, UserRecord};

/// Column names of the report, in row order.
pub const HEADER: [&str; 11] = [
    "User Name",
    "Console Access",
    "MFA Enabled",
    "User Id",
    "User ARN",
    "User Create Date",
    "Directly Attached Managed Policies",
    "Directly Attached Inline Policies",
    "Group Name",
    "Group Attached Managed Policies",
    "Group Attached Inline Policies",
];

/// Position of the creation timestamp within a row.
pub const CREATED_COLUMN: usize = 5;

const LIST_SEPARATOR: &str = ", ";

/// Managed and inline policy names attached to one identity.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PolicySet {
    pub managed: Vec<String>,
    pub inline: Vec<String>,
}

impl PolicySet {
    /// Append `other` after the policies already collected. Duplicates are kept.
    pub fn append(&mut self, other: PolicySet) {
        self.managed.extend(other.managed);
        self.inline.extend(other.inline);
    }
}

/// One audited user, flattened into the report's columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub user_name: String,
    pub console_access: String,
    pub mfa_enabled: String,
    pub user_id: String,
    pub user_arn: String,
    pub created: DateTime<Utc>,
    pub managed_policies: String,
    pub inline_policies: String,
    pub groups: String,
    pub group_managed_policies: String,
    pub group_inline_policies: String,
}

impl ReportRow {
    /// Text columns in header order. The creation timestamp slot is `None`;
    /// writers render it as a date cell.
    pub fn text_columns(&self) -> [Option<&str>; 11] {
        [
            Some(self.user_name.as_str()),
            Some(self.console_access.as_str()),
            Some(self.mfa_enabled.as_str()),
            Some(self.user_id.as_str()),
            Some(self.user_arn.as_str()),
            None,
            Some(self.managed_policies.as_str()),
            Some(self.inline_policies.as_str()),
            Some(self.groups.as_str()),
            Some(self.group_managed_policies.as_str()),
            Some(self.group_inline_policies.as_str()),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Account alias; names the output workbook.
    pub account: String,
    pub header: [&'static str; 11],
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn new(account: impl Into<String>, rows: Vec<ReportRow>) -> Self {
        Self { account: account.into(), header: HEADER, rows }
    }
}

fn yes_no(flag: bool) -> String {
    let text = if flag { "Yes" } else { "No" };
    text.to_string()
}

async fn user_policies<D: IamDirectory>(directory: &D, user_name: &str) -> Result<PolicySet> {
    Ok(PolicySet {
        managed: directory.user_managed_policies(user_name).await?,
        inline: directory.user_inline_policies(user_name).await?,
    })
}

async fn group_policies<D: IamDirectory>(directory: &D, group_name: &str) -> Result<PolicySet> {
    Ok(PolicySet {
        managed: directory.group_managed_policies(group_name).await?,
        inline: directory.group_inline_policies(group_name).await?,
    })
}

/// Collect console, MFA, group and policy details for a single user.
pub async fn enrich_user<D: IamDirectory>(directory: &D, user: &UserRecord) -> Result<ReportRow> {
    let name = user.name.as_str();

    let groups = directory.groups_for_user(name).await?;
    let mut inherited = PolicySet::default();
    for group in &groups {
        inherited.append(group_policies(directory, group).await?);
    }

    let direct = user_policies(directory, name).await?;
    let console_access = directory.login_profile(name).await?.is_found();
    let mfa_enabled = !directory.mfa_devices(name).await?.is_empty();

    debug!(
        "IAM user {name}: {} group(s), console={console_access}, mfa={mfa_enabled}",
        groups.len()
    );

    Ok(ReportRow {
        user_name: user.name.clone(),
        console_access: yes_no(console_access),
        mfa_enabled: yes_no(mfa_enabled),
        user_id: user.id.clone(),
        user_arn: user.arn.clone(),
        created: user.created,
        managed_policies: direct.managed.join(LIST_SEPARATOR),
        inline_policies: direct.inline.join(LIST_SEPARATOR),
        groups: groups.join(LIST_SEPARATOR),
        group_managed_policies: inherited.managed.join(LIST_SEPARATOR),
        group_inline_policies: inherited.inline.join(LIST_SEPARATOR),
    })
}

/// The account's display name: its first alias.
pub async fn resolve_account_name<D: IamDirectory>(directory: &D) -> Result<String> {
    let aliases = directory.account_aliases().await?;
    match aliases.into_iter().next() {
        Some(alias) => Ok(alias),
        None => bail!("AWS account has no alias; one is required to name the report"),
    }
}

/// Audit every user in the account, in listing order.
///
/// Stops at the first failure; a partial report is never returned.
pub async fn build_report<D: IamDirectory>(directory: &D) -> Result<Report> {
    let account = resolve_account_name(directory).await?;
    let users = directory.list_users().await?;
    info!("Auditing {} IAM user(s) in account {account}", users.len());

    let mut rows = Vec::with_capacity(users.len());
    for user in &users {
        let row = enrich_user(directory, user)
            .await
            .with_context(|| format!("Failed to audit IAM user {}", user.name))?;
        rows.push(row);
    }

    Ok(Report::new(account, rows))
}
