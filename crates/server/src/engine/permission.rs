use std::collections::HashSet;

use crate::models::resource::Resource;
use crate::models::user::ActingUser;

/// Decides who may edit or delete a resource.
#[derive(Clone, Debug, Default)]
pub struct PermissionPolicy {
    privileged_emails: HashSet<String>,
}

impl PermissionPolicy {
    pub fn new<I, S>(privileged_emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            privileged_emails: privileged_emails.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_privileged(&self, user: &ActingUser) -> bool {
        user.role.is_privileged() || self.privileged_emails.contains(&user.email)
    }

    /// Staff may mutate anything; everyone else only what they contributed.
    /// An unknown resource is never mutable.
    pub fn can_mutate(&self, user: &ActingUser, resource: Option<&Resource>) -> bool {
        let Some(resource) = resource else {
            return false;
        };
        self.is_privileged(user) || resource.contributor_email.as_deref() == Some(user.email.as_str())
    }
}
