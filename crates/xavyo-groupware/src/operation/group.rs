//! Group operations of the group service.

use super::{
    optional_text, render, required_text, response_element, undecodable, Operation,
    RequestContext, Service,
};
use crate::error::GroupwareResult;
use crate::ids::{AccountId, GroupId, GroupName};
use crate::soap::XmlNode;

/// A group as reported by the groupware system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub id: GroupId,
    pub name: GroupName,
    pub display_name: Option<String>,
    pub members: Vec<AccountId>,
}

fn group_summary<O: Operation>(node: &XmlNode) -> GroupwareResult<GroupSummary> {
    Ok(GroupSummary {
        id: GroupId::new(required_text::<O>(node, "id")?),
        name: GroupName::new(required_text::<O>(node, "name")?),
        display_name: optional_text(node, "displayname"),
        members: node
            .children_named("members")
            .map(|member| member.text.trim())
            .filter(|member| !member.is_empty())
            .map(AccountId::from)
            .collect(),
    })
}

/// Every `<return>` of a list response as a group.
fn group_list<O: Operation>(body: &str) -> GroupwareResult<Vec<GroupSummary>> {
    let response = response_element::<O>(body)?;
    response
        .children_named("return")
        .map(group_summary::<O>)
        .collect()
}

/// Create a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGroup {
    pub name: GroupName,
    pub display_name: String,
}

/// Result of [`CreateGroup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedGroup {
    pub id: GroupId,
    pub name: GroupName,
    pub display_name: String,
}

impl Operation for CreateGroup {
    type Output = CreatedGroup;

    const NAME: &'static str = "CreateGroup";
    const ACTION: &'static str = "create";
    const SERVICE: Service = Service::Group;

    fn build_request(&self, ctx: &RequestContext<'_>) -> String {
        render(Self::ACTION, ctx, |b| {
            b.nest("soap:grp", |b| {
                b.text("xsd1:name", self.name.as_str())
                    .text("xsd1:displayname", &self.display_name)
            })
        })
    }

    fn parse_response(&self, body: &str) -> GroupwareResult<CreatedGroup> {
        let response = response_element::<Self>(body)?;
        let group = response
            .child("return")
            .ok_or_else(|| undecodable::<Self>("missing <return>"))?;

        Ok(CreatedGroup {
            id: GroupId::new(required_text::<Self>(group, "id")?),
            name: optional_text(group, "name").map_or_else(|| self.name.clone(), GroupName::new),
            display_name: optional_text(group, "displayname")
                .unwrap_or_else(|| self.display_name.clone()),
        })
    }
}

/// List groups whose name matches a search pattern.
///
/// The groupware system treats the pattern as a search expression, so callers
/// that need an exact match must filter the result by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListGroups {
    pub pattern: String,
}

impl Operation for ListGroups {
    type Output = Vec<GroupSummary>;

    const NAME: &'static str = "ListGroups";
    const ACTION: &'static str = "list";
    const SERVICE: Service = Service::Group;

    fn build_request(&self, ctx: &RequestContext<'_>) -> String {
        render(Self::ACTION, ctx, |b| b.text("soap:pattern", &self.pattern))
    }

    fn parse_response(&self, body: &str) -> GroupwareResult<Vec<GroupSummary>> {
        group_list::<Self>(body)
    }
}

/// List the groups an account is a member of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListGroupsForAccount {
    pub account_id: AccountId,
}

impl Operation for ListGroupsForAccount {
    type Output = Vec<GroupSummary>;

    const NAME: &'static str = "ListGroupsForAccount";
    const ACTION: &'static str = "listGroupsForUser";
    const SERVICE: Service = Service::Group;

    fn build_request(&self, ctx: &RequestContext<'_>) -> String {
        render(Self::ACTION, ctx, |b| {
            b.nest("soap:usr", |b| b.text("xsd1:id", self.account_id.as_str()))
        })
    }

    fn parse_response(&self, body: &str) -> GroupwareResult<Vec<GroupSummary>> {
        group_list::<Self>(body)
    }
}

fn render_membership(
    action: &str,
    ctx: &RequestContext<'_>,
    group_id: &GroupId,
    account_id: &AccountId,
) -> String {
    render(action, ctx, |b| {
        b.nest("soap:grp", |b| b.text("xsd1:id", group_id.as_str()))
            .nest("soap:members", |b| b.text("xsd1:id", account_id.as_str()))
    })
}

/// Add an account to a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddMember {
    pub group_id: GroupId,
    pub account_id: AccountId,
}

impl Operation for AddMember {
    type Output = ();

    const NAME: &'static str = "AddMember";
    const ACTION: &'static str = "addMember";
    const SERVICE: Service = Service::Group;

    fn build_request(&self, ctx: &RequestContext<'_>) -> String {
        render_membership(Self::ACTION, ctx, &self.group_id, &self.account_id)
    }

    fn parse_response(&self, body: &str) -> GroupwareResult<()> {
        response_element::<Self>(body).map(|_| ())
    }
}

/// Remove an account from a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveMember {
    pub group_id: GroupId,
    pub account_id: AccountId,
}

impl Operation for RemoveMember {
    type Output = ();

    const NAME: &'static str = "RemoveMember";
    const ACTION: &'static str = "removeMember";
    const SERVICE: Service = Service::Group;

    fn build_request(&self, ctx: &RequestContext<'_>) -> String {
        render_membership(Self::ACTION, ctx, &self.group_id, &self.account_id)
    }

    fn parse_response(&self, body: &str) -> GroupwareResult<()> {
        response_element::<Self>(body).map(|_| ())
    }
}
