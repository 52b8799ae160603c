//! Group membership orchestration.
//!
//! Composes dispatcher calls into idempotent group operations. Every mutation
//! for one account is awaited before the next one is issued; the groupware
//! system does not tolerate concurrent membership changes of a single user.

use crate::client::GroupwareClient;
use crate::error::{GroupwareError, GroupwareResult};
use crate::ids::{AccountId, GroupId, GroupName};
use crate::operation::{
    AddMember, CreateGroup, GroupSummary, ListGroups, ListGroupsForAccount, RemoveMember,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Groups to add and to remove for one account.
///
/// Only groups following the teacher group naming convention take part;
/// other groups of the account are never touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipDiff {
    pub to_add: Vec<GroupName>,
    pub to_remove: Vec<GroupSummary>,
}

impl MembershipDiff {
    /// `to_add = desired - current`, `to_remove = current - desired`.
    #[must_use]
    pub fn compute(current: &[GroupSummary], desired: &[GroupName]) -> Self {
        let current: Vec<&GroupSummary> =
            current.iter().filter(|g| g.name.is_managed()).collect();

        let mut seen = HashSet::new();
        let desired: Vec<&GroupName> = desired
            .iter()
            .filter(|name| name.is_managed() && seen.insert(*name))
            .collect();

        let to_add = desired
            .iter()
            .filter(|name| !current.iter().any(|g| &&g.name == *name))
            .map(|name| (*name).clone())
            .collect();
        let to_remove = current
            .iter()
            .filter(|g| !desired.contains(&&g.name))
            .map(|g| (*g).clone())
            .collect();

        Self { to_add, to_remove }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Memberships changed by [`GroupMembership::set_account_groups`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipChanges {
    pub added: Vec<GroupId>,
    pub removed: Vec<GroupId>,
}

/// Idempotent group operations on top of [`GroupwareClient`].
#[derive(Debug, Clone)]
pub struct GroupMembership {
    client: Arc<GroupwareClient>,
}

impl GroupMembership {
    #[must_use]
    pub fn new(client: Arc<GroupwareClient>) -> Self {
        Self { client }
    }

    /// Resolve a group by exact name, creating it when no group matches.
    ///
    /// More than one exact match is reported as
    /// [`GroupwareError::GroupNameAmbiguous`] and nothing is created.
    pub async fn get_existing_group_by_name_or_create(
        &self,
        name: &GroupName,
        display_name: &str,
    ) -> GroupwareResult<GroupId> {
        let listed = self
            .client
            .send(&ListGroups {
                pattern: name.as_str().to_string(),
            })
            .await?;

        let mut matches: Vec<GroupSummary> =
            listed.into_iter().filter(|g| &g.name == name).collect();

        match matches.len() {
            0 => {
                let created = self
                    .client
                    .send(&CreateGroup {
                        name: name.clone(),
                        display_name: display_name.to_string(),
                    })
                    .await?;
                info!(group = %name, group_id = %created.id, "Created groupware group");
                Ok(created.id)
            }
            1 => {
                let group = matches.remove(0);
                debug!(group = %name, group_id = %group.id, "Found existing groupware group");
                Ok(group.id)
            }
            n => {
                error!(group = %name, matches = n, "Group name is not unique");
                Err(GroupwareError::GroupNameAmbiguous {
                    name: name.to_string(),
                    matches: n,
                })
            }
        }
    }

    /// Add an account to a group. An existing membership counts as success.
    pub async fn add_account_to_group(
        &self,
        account_id: &AccountId,
        group_id: &GroupId,
    ) -> GroupwareResult<()> {
        let result = self
            .client
            .send(&AddMember {
                group_id: group_id.clone(),
                account_id: account_id.clone(),
            })
            .await;

        match result {
            Ok(()) => {
                info!(account_id = %account_id, group_id = %group_id, "Added account to group");
                Ok(())
            }
            Err(GroupwareError::MemberAlreadyInGroup(_)) => {
                info!(
                    account_id = %account_id,
                    group_id = %group_id,
                    "Account is already a member of group"
                );
                Ok(())
            }
            Err(e) => {
                error!(
                    account_id = %account_id,
                    group_id = %group_id,
                    error = %e,
                    "Could not add account to group"
                );
                Err(e)
            }
        }
    }

    pub async fn remove_account_from_group(
        &self,
        account_id: &AccountId,
        group_id: &GroupId,
    ) -> GroupwareResult<()> {
        self.client
            .send(&RemoveMember {
                group_id: group_id.clone(),
                account_id: account_id.clone(),
            })
            .await
            .inspect(|()| {
                info!(account_id = %account_id, group_id = %group_id, "Removed account from group");
            })
            .inspect_err(|e| {
                error!(
                    account_id = %account_id,
                    group_id = %group_id,
                    error = %e,
                    "Could not remove account from group"
                );
            })
    }

    /// Reconcile the teacher groups of an account with `desired`.
    ///
    /// Additions are applied before removals, one call at a time. The first
    /// failed addition or removal stops the reconciliation.
    pub async fn set_account_groups(
        &self,
        account_id: &AccountId,
        desired: &[GroupName],
    ) -> GroupwareResult<MembershipChanges> {
        let current = self
            .client
            .send(&ListGroupsForAccount {
                account_id: account_id.clone(),
            })
            .await?;
        let diff = MembershipDiff::compute(&current, desired);

        debug!(
            account_id = %account_id,
            to_add = diff.to_add.len(),
            to_remove = diff.to_remove.len(),
            "Computed group membership diff"
        );

        let mut changes = MembershipChanges::default();

        for name in &diff.to_add {
            let group_id = self
                .get_existing_group_by_name_or_create(name, name.as_str())
                .await?;
            self.add_account_to_group(account_id, &group_id).await?;
            changes.added.push(group_id);
        }

        for group in diff.to_remove {
            self.remove_account_from_group(account_id, &group.id).await?;
            changes.removed.push(group.id);
        }

        Ok(changes)
    }

    /// Remove an account from every group it is a member of.
    pub async fn remove_account_from_all_groups(
        &self,
        account_id: &AccountId,
    ) -> GroupwareResult<Vec<GroupId>> {
        let groups = self
            .client
            .send(&ListGroupsForAccount {
                account_id: account_id.clone(),
            })
            .await?;

        let mut removed = Vec::with_capacity(groups.len());
        for group in groups {
            self.remove_account_from_group(account_id, &group.id).await?;
            removed.push(group.id);
        }
        Ok(removed)
    }
}
