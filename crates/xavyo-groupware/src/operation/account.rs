//! Account (user) operations of the user service.

use super::{
    optional_text, render, required_text, response_element, undecodable, Operation,
    RequestContext, Service,
};
use crate::config::ModuleAccess;
use crate::error::GroupwareResult;
use crate::ids::AccountId;

/// Create a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAccount {
    pub username: String,
    pub display_name: String,
    pub given_name: String,
    pub surname: String,
    /// Used for both `email1` and the primary address.
    pub email: String,
    pub password: String,
}

/// Result of [`CreateAccount`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedAccount {
    pub id: AccountId,
    pub username: String,
    pub primary_email: Option<String>,
}

impl Operation for CreateAccount {
    type Output = CreatedAccount;

    const NAME: &'static str = "CreateAccount";
    const ACTION: &'static str = "create";
    const SERVICE: Service = Service::User;

    fn build_request(&self, ctx: &RequestContext<'_>) -> String {
        render(Self::ACTION, ctx, |b| {
            b.nest("soap:usrdata", |b| {
                b.text("xsd1:display_name", &self.display_name)
                    .text("xsd1:email1", &self.email)
                    .text("xsd1:given_name", &self.given_name)
                    .text("xsd1:name", &self.username)
                    .text("xsd1:password", &self.password)
                    .text("xsd1:primaryEmail", &self.email)
                    .text("xsd1:sur_name", &self.surname)
            })
        })
    }

    fn parse_response(&self, body: &str) -> GroupwareResult<CreatedAccount> {
        let response = response_element::<Self>(body)?;
        let account = response
            .child("return")
            .ok_or_else(|| undecodable::<Self>("missing <return>"))?;

        Ok(CreatedAccount {
            id: AccountId::new(required_text::<Self>(account, "id")?),
            username: optional_text(account, "name").unwrap_or_else(|| self.username.clone()),
            primary_email: optional_text(account, "primaryEmail"),
        })
    }
}

/// Change attributes of an existing account. Unset fields stay untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeAccount {
    pub account_id: AccountId,
    pub username: Option<String>,
    /// Written to `email1`, `primaryEmail` and `defaultSenderAddress`, which
    /// the groupware system requires to agree.
    pub primary_email: Option<String>,
    /// Complete alias list; replaces the stored one. An empty list clears it.
    pub aliases: Option<Vec<String>>,
}

impl ChangeAccount {
    #[must_use]
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            username: None,
            primary_email: None,
            aliases: None,
        }
    }

    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn primary_email(mut self, address: impl Into<String>) -> Self {
        self.primary_email = Some(address.into());
        self
    }

    #[must_use]
    pub fn aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = Some(aliases);
        self
    }
}

impl Operation for ChangeAccount {
    type Output = ();

    const NAME: &'static str = "ChangeAccount";
    const ACTION: &'static str = "change";
    const SERVICE: Service = Service::User;

    fn build_request(&self, ctx: &RequestContext<'_>) -> String {
        render(Self::ACTION, ctx, |b| {
            b.nest("soap:usrdata", |b| {
                let b = b
                    .text("xsd1:id", self.account_id.as_str())
                    .text_opt("xsd1:name", self.username.as_deref());
                let b = match &self.aliases {
                    // An empty element clears the stored list; omitting it keeps it.
                    Some(aliases) if aliases.is_empty() => b.empty("xsd1:aliases"),
                    Some(aliases) => b.texts("xsd1:aliases", aliases),
                    None => b,
                };
                b.text_opt("xsd1:email1", self.primary_email.as_deref())
                    .text_opt("xsd1:primaryEmail", self.primary_email.as_deref())
                    .text_opt("xsd1:defaultSenderAddress", self.primary_email.as_deref())
            })
        })
    }

    fn parse_response(&self, body: &str) -> GroupwareResult<()> {
        response_element::<Self>(body).map(|_| ())
    }
}

/// Delete an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteAccount {
    pub account_id: AccountId,
}

impl Operation for DeleteAccount {
    type Output = ();

    const NAME: &'static str = "DeleteAccount";
    const ACTION: &'static str = "delete";
    const SERVICE: Service = Service::User;

    fn build_request(&self, ctx: &RequestContext<'_>) -> String {
        render(Self::ACTION, ctx, |b| {
            b.nest("soap:user", |b| b.text("xsd1:id", self.account_id.as_str()))
        })
    }

    fn parse_response(&self, body: &str) -> GroupwareResult<()> {
        response_element::<Self>(body).map(|_| ())
    }
}

/// Check whether an account with the given username exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountExists {
    pub username: String,
}

impl Operation for AccountExists {
    type Output = bool;

    const NAME: &'static str = "AccountExists";
    const ACTION: &'static str = "exists";
    const SERVICE: Service = Service::User;

    fn build_request(&self, ctx: &RequestContext<'_>) -> String {
        render(Self::ACTION, ctx, |b| {
            b.nest("soap:user", |b| b.text("xsd1:name", &self.username))
        })
    }

    fn parse_response(&self, body: &str) -> GroupwareResult<bool> {
        let response = response_element::<Self>(body)?;
        match response.child_text("return") {
            Some("true") => Ok(true),
            Some("false") => Ok(false),
            Some(other) => Err(undecodable::<Self>(format!("not a boolean: '{other}'"))),
            None => Err(undecodable::<Self>("missing <return>")),
        }
    }
}

/// Fetch the stored data of an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchAccountData {
    pub account_id: AccountId,
}

/// Result of [`FetchAccountData`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountData {
    pub id: AccountId,
    pub username: String,
    pub display_name: Option<String>,
    pub given_name: Option<String>,
    pub surname: Option<String>,
    pub primary_email: Option<String>,
    pub email1: Option<String>,
    pub aliases: Vec<String>,
}

impl Operation for FetchAccountData {
    type Output = AccountData;

    const NAME: &'static str = "FetchAccountData";
    const ACTION: &'static str = "getData";
    const SERVICE: Service = Service::User;

    fn build_request(&self, ctx: &RequestContext<'_>) -> String {
        render(Self::ACTION, ctx, |b| {
            b.nest("soap:user", |b| b.text("xsd1:id", self.account_id.as_str()))
        })
    }

    fn parse_response(&self, body: &str) -> GroupwareResult<AccountData> {
        let response = response_element::<Self>(body)?;
        let account = response
            .child("return")
            .ok_or_else(|| undecodable::<Self>("missing <return>"))?;

        Ok(AccountData {
            id: AccountId::new(required_text::<Self>(account, "id")?),
            username: required_text::<Self>(account, "name")?,
            display_name: optional_text(account, "display_name"),
            given_name: optional_text(account, "given_name"),
            surname: optional_text(account, "sur_name"),
            primary_email: optional_text(account, "primaryEmail"),
            email1: optional_text(account, "email1"),
            aliases: account
                .children_named("aliases")
                .map(|alias| alias.text.trim().to_string())
                .filter(|alias| !alias.is_empty())
                .collect(),
        })
    }
}

/// Set the module access flags of an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetModuleAccess {
    pub account_id: AccountId,
    pub access: ModuleAccess,
}

impl Operation for SetModuleAccess {
    type Output = ();

    const NAME: &'static str = "SetModuleAccess";
    const ACTION: &'static str = "changeByModuleAccess";
    const SERVICE: Service = Service::User;

    fn build_request(&self, ctx: &RequestContext<'_>) -> String {
        render(Self::ACTION, ctx, |b| {
            b.nest("soap:user", |b| b.text("xsd1:id", self.account_id.as_str()))
                .nest("soap:moduleAccess", |b| {
                    b.flag(
                        "xsd:globalAddressBookDisabled",
                        self.access.global_address_book_disabled,
                    )
                    .flag("xsd:infostore", self.access.infostore)
                })
        })
    }

    fn parse_response(&self, body: &str) -> GroupwareResult<()> {
        response_element::<Self>(body).map(|_| ())
    }
}
