use anyhow::Result;
use chrono::{DateTime, Utc};

mod aws;

pub use aws::{load_config, AwsIamDirectory};

/// An IAM user as returned by the account's user listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// User name, unique within the account.
    pub name: String,
    /// Stable identifier assigned by IAM.
    pub id: String,
    pub arn: String,
    pub created: DateTime<Utc>,
}

/// Outcome of a lookup where absence is an expected answer rather than a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Found,
    NotFound,
}

impl Lookup {
    pub fn is_found(self) -> bool {
        matches!(self, Lookup::Found)
    }
}

/// Read-only view of an account's identity store.
///
/// Every listing returns the complete result set in provider order; paging is the
/// implementation's concern. Lookups that can legitimately miss return [`Lookup`],
/// anything else that goes wrong is an error.
#[allow(async_fn_in_trait)]
pub trait IamDirectory {
    async fn account_aliases(&self) -> Result<Vec<String>>;

    async fn list_users(&self) -> Result<Vec<UserRecord>>;

    async fn groups_for_user(&self, user_name: &str) -> Result<Vec<String>>;

    /// Names of the inline policies embedded in a group.
    async fn group_inline_policies(&self, group_name: &str) -> Result<Vec<String>>;

    /// Names of the managed policies attached to a group.
    async fn group_managed_policies(&self, group_name: &str) -> Result<Vec<String>>;

    async fn user_inline_policies(&self, user_name: &str) -> Result<Vec<String>>;

    async fn user_managed_policies(&self, user_name: &str) -> Result<Vec<String>>;

    /// Whether the user has a console password.
    async fn login_profile(&self, user_name: &str) -> Result<Lookup>;

    /// Serial numbers of the MFA devices registered to the user.
    async fn mfa_devices(&self, user_name: &str) -> Result<Vec<String>>;
}
