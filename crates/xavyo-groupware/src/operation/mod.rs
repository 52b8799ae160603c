//! Typed groupware operations.
//!
//! Every remote call is one struct implementing [`Operation`]. Operations are
//! pure values: they render their request envelope and decode a successful
//! response body, while all I/O happens in [`crate::client::GroupwareClient`].

pub mod account;
pub mod group;

pub use account::{
    AccountData, AccountExists, ChangeAccount, CreateAccount, CreatedAccount, DeleteAccount,
    FetchAccountData, SetModuleAccess,
};
pub use group::{
    AddMember, CreateGroup, CreatedGroup, GroupSummary, ListGroups, ListGroupsForAccount,
    RemoveMember,
};

use crate::auth::Credentials;
use crate::error::{GroupwareError, GroupwareResult};
use crate::ids::ContextId;
use crate::soap::{envelope, XmlBuilder, XmlNode, SERVICE_NS};

/// Web service an operation is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    User,
    Group,
}

impl Service {
    /// Endpoint segment below `/webservices/`.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Service::User => "OXUserService",
            Service::Group => "OXGroupService",
        }
    }
}

/// Per-call data every request carries besides the operation parameters.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    pub context_id: &'a ContextId,
    pub credentials: &'a Credentials,
}

/// A remote call against the groupware system.
pub trait Operation: Send + Sync {
    /// Decoded result of a successful call.
    type Output: Send;

    /// Label used in logs and errors.
    const NAME: &'static str;
    /// Wire method; the request element and the `SOAPAction` suffix.
    const ACTION: &'static str;
    const SERVICE: Service;

    /// Value of the `SOAPAction` header.
    fn soap_action() -> String {
        format!("{SERVICE_NS}/{}", Self::ACTION)
    }

    /// Render the complete request envelope.
    fn build_request(&self, ctx: &RequestContext<'_>) -> String;

    /// Decode a successful response body.
    fn parse_response(&self, body: &str) -> GroupwareResult<Self::Output>;
}

/// Envelope for `action`: context first, then `content`, then credentials.
pub(crate) fn render(
    action: &str,
    ctx: &RequestContext<'_>,
    content: impl FnOnce(XmlBuilder) -> XmlBuilder,
) -> String {
    let builder = XmlBuilder::new().nest("soap:ctx", |b| b.text("xsd:id", ctx.context_id.as_str()));
    let builder = content(builder).nest("soap:auth", |b| {
        b.text("xsd:login", ctx.credentials.login())
            .text("xsd:password", ctx.credentials.password())
    });
    envelope(action, builder)
}

pub(crate) fn undecodable<O: Operation>(reason: impl Into<String>) -> GroupwareError {
    GroupwareError::ResponseUndecodable {
        operation: O::NAME,
        reason: reason.into(),
    }
}

/// The `{ACTION}Response` element of a response body.
pub(crate) fn response_element<O: Operation>(body: &str) -> GroupwareResult<XmlNode> {
    let root = XmlNode::parse(body).map_err(undecodable::<O>)?;
    let response = root
        .soap_response()
        .ok_or_else(|| undecodable::<O>("missing SOAP body"))?;

    let expected = format!("{}Response", O::ACTION);
    if response.name != expected {
        return Err(undecodable::<O>(format!(
            "expected <{expected}>, got <{}>",
            response.name
        )));
    }
    Ok(response.clone())
}

/// Required, non-empty text of a child element.
pub(crate) fn required_text<O: Operation>(node: &XmlNode, name: &str) -> GroupwareResult<String> {
    node.child_text(name)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or_else(|| undecodable::<O>(format!("missing <{name}>")))
}

pub(crate) fn optional_text(node: &XmlNode, name: &str) -> Option<String> {
    node.child_text(name)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
