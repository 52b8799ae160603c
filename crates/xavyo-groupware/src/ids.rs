//! Identifier newtypes for groupware objects.
//!
//! All identifiers are opaque strings assigned by the groupware system or by
//! configuration. The newtypes keep account, group and context ids apart.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// The raw identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Unwrap into the raw identifier.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id!(
    /// Account id assigned by the groupware system.
    ///
    /// Once assigned it never changes for a given local identity.
    AccountId
);

define_id!(
    /// Group id assigned by the groupware system.
    GroupId
);

define_id!(
    /// Tenant context all calls are scoped to.
    ContextId
);

/// Prefix of every group that grants teaching-staff access.
pub const TEACHER_GROUP_PREFIX: &str = "lehrer-";

/// Human readable group name following the `lehrer-{orgCode}` convention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupName(String);

impl GroupName {
    /// Name of the teacher group for an organisation code.
    #[must_use]
    pub fn for_organisation(org_code: &str) -> Self {
        Self(format!("{TEACHER_GROUP_PREFIX}{org_code}"))
    }

    /// Wrap an existing group name as returned by the groupware system.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Whether the name follows the teacher group convention.
    #[must_use]
    pub fn is_managed(&self) -> bool {
        self.0.len() > TEACHER_GROUP_PREFIX.len() && self.0.starts_with(TEACHER_GROUP_PREFIX)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for GroupName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
