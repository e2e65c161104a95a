use anyhow::{anyhow, Result};
use aws_config::{meta::region::RegionProviderChain, BehaviorVersion, SdkConfig};
use aws_credential_types::Credentials;
use aws_sdk_iam::{
    error::{DisplayErrorContext, SdkError},
    primitives::DateTime as AwsDateTime,
    Client as IamClient,
};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::{IamDirectory, Lookup, UserRecord};

/// [`IamDirectory`] backed by the AWS IAM API.
#[derive(Clone, Debug)]
pub struct AwsIamDirectory {
    client: IamClient,
}

impl AwsIamDirectory {
    pub fn new(config: &SdkConfig) -> Self {
        Self { client: IamClient::new(config) }
    }
}

/// Load the shared AWS configuration.
///
/// Explicit `credentials` win over the `profile`; with neither, the default provider
/// chain applies. IAM is a global service, so the region only matters for endpoint
/// resolution and falls back to `us-east-1`.
pub async fn load_config(credentials: Option<Credentials>, profile: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(profile) = profile {
        loader = loader.profile_name(profile);
    }
    if let Some(creds) = credentials {
        loader = loader.credentials_provider(creds);
    }

    let region_provider = RegionProviderChain::default_provider().or_else("us-east-1");
    loader.region(region_provider).load().await
}

impl IamDirectory for AwsIamDirectory {
    async fn account_aliases(&self) -> Result<Vec<String>> {
        let mut stream = self.client.list_account_aliases().into_paginator().items().send();
        let mut aliases = Vec::new();
        while let Some(alias) =
            stream.try_next().await.map_err(|err| map_iam_error(err, "list_account_aliases failed"))?
        {
            aliases.push(alias);
        }
        Ok(aliases)
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        let mut stream = self.client.list_users().into_paginator().items().send();
        let mut users = Vec::new();
        while let Some(user) =
            stream.try_next().await.map_err(|err| map_iam_error(err, "list_users failed"))?
        {
            users.push(UserRecord {
                name: user.user_name().to_string(),
                id: user.user_id().to_string(),
                arn: user.arn().to_string(),
                created: to_utc(user.create_date())?,
            });
        }
        debug!("IAM listed {} users", users.len());
        Ok(users)
    }

    async fn groups_for_user(&self, user_name: &str) -> Result<Vec<String>> {
        let mut stream =
            self.client.list_groups_for_user().user_name(user_name).into_paginator().items().send();
        let mut groups = Vec::new();
        while let Some(group) = stream.try_next().await.map_err(|err| {
            map_iam_error(err, &format!("list_groups_for_user failed for user {user_name}"))
        })? {
            groups.push(group.group_name().to_string());
        }
        Ok(groups)
    }

    async fn group_inline_policies(&self, group_name: &str) -> Result<Vec<String>> {
        let mut stream =
            self.client.list_group_policies().group_name(group_name).into_paginator().items().send();
        let mut names = Vec::new();
        while let Some(name) = stream.try_next().await.map_err(|err| {
            map_iam_error(err, &format!("list_group_policies failed for group {group_name}"))
        })? {
            names.push(name);
        }
        Ok(names)
    }

    async fn group_managed_policies(&self, group_name: &str) -> Result<Vec<String>> {
        let mut stream = self
            .client
            .list_attached_group_policies()
            .group_name(group_name)
            .into_paginator()
            .items()
            .send();
        let mut names = Vec::new();
        while let Some(policy) = stream.try_next().await.map_err(|err| {
            map_iam_error(err, &format!("list_attached_group_policies failed for group {group_name}"))
        })? {
            if let Some(name) = policy.policy_name() {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    async fn user_inline_policies(&self, user_name: &str) -> Result<Vec<String>> {
        let mut stream =
            self.client.list_user_policies().user_name(user_name).into_paginator().items().send();
        let mut names = Vec::new();
        while let Some(name) = stream.try_next().await.map_err(|err| {
            map_iam_error(err, &format!("list_user_policies failed for user {user_name}"))
        })? {
            names.push(name);
        }
        Ok(names)
    }

    async fn user_managed_policies(&self, user_name: &str) -> Result<Vec<String>> {
        let mut stream = self
            .client
            .list_attached_user_policies()
            .user_name(user_name)
            .into_paginator()
            .items()
            .send();
        let mut names = Vec::new();
        while let Some(policy) = stream.try_next().await.map_err(|err| {
            map_iam_error(err, &format!("list_attached_user_policies failed for user {user_name}"))
        })? {
            if let Some(name) = policy.policy_name() {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    async fn login_profile(&self, user_name: &str) -> Result<Lookup> {
        match self.client.get_login_profile().user_name(user_name).send().await {
            Ok(_) => Ok(Lookup::Found),
            Err(err)
                if err.as_service_error().is_some_and(|e| e.is_no_such_entity_exception()) =>
            {
                debug!("IAM user {user_name} has no login profile");
                Ok(Lookup::NotFound)
            }
            Err(err) => {
                Err(map_iam_error(err, &format!("get_login_profile failed for user {user_name}")))
            }
        }
    }

    async fn mfa_devices(&self, user_name: &str) -> Result<Vec<String>> {
        let mut stream =
            self.client.list_mfa_devices().user_name(user_name).into_paginator().items().send();
        let mut serials = Vec::new();
        while let Some(device) = stream.try_next().await.map_err(|err| {
            map_iam_error(err, &format!("list_mfa_devices failed for user {user_name}"))
        })? {
            serials.push(device.serial_number().to_string());
        }
        Ok(serials)
    }
}

fn to_utc(timestamp: &AwsDateTime) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(timestamp.secs(), timestamp.subsec_nanos())
        .ok_or_else(|| anyhow!("IAM returned an out-of-range timestamp: {timestamp:?}"))
}

fn map_iam_error<E>(err: SdkError<E>, context: &str) -> anyhow::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    let message = DisplayErrorContext(&err).to_string();
    if denied_by_policy(&err) {
        warn!("IAM audit: caller lacks iam:Get*/iam:List* permission: {context}");
    }
    warn!("IAM audit: {context}: {message}");
    anyhow!("{context}: {message}")
}

/// Only a service response can report AccessDenied; transport failures never do.
fn denied_by_policy<E>(err: &SdkError<E>) -> bool
where
    E: std::error::Error + Send + Sync + 'static,
{
    err.as_service_error().is_some() && is_access_denied(&DisplayErrorContext(err).to_string())
}

fn is_access_denied(message: &str) -> bool {
    message.contains("AccessDenied")
}
