//! Permission value objects.
//!
//! A permission grants one [`Action`] on one [`ResourceKind`], optionally
//! narrowed to a single resource id or to every resource of an
//! organization. Permissions are not stored on their own; they live
//! inside an authorization.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{StrataError, StrataResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    Write,
}

impl Action {
    pub const ALL: [Action; 2] = [Action::Read, Action::Write];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Write => "write",
        }
    }
}

impl FromStr for Action {
    type Err = StrataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Action::Read),
            "write" => Ok(Action::Write),
            other => Err(StrataError::invalid(format!("unknown action: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    Authorizations,
    Buckets,
    Dashboards,
    Orgs,
    Sources,
    Tasks,
    Telegrafs,
    Users,
    Variables,
    Scrapers,
    Secrets,
    Labels,
    Views,
    Documents,
    NotificationRules,
    NotificationEndpoints,
    Checks,
}

impl ResourceKind {
    /// Every resource kind, in the order permission sets are built.
    pub const ALL: [ResourceKind; 17] = [
        ResourceKind::Authorizations,
        ResourceKind::Buckets,
        ResourceKind::Dashboards,
        ResourceKind::Orgs,
        ResourceKind::Sources,
        ResourceKind::Tasks,
        ResourceKind::Telegrafs,
        ResourceKind::Users,
        ResourceKind::Variables,
        ResourceKind::Scrapers,
        ResourceKind::Secrets,
        ResourceKind::Labels,
        ResourceKind::Views,
        ResourceKind::Documents,
        ResourceKind::NotificationRules,
        ResourceKind::NotificationEndpoints,
        ResourceKind::Checks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Authorizations => "authorizations",
            ResourceKind::Buckets => "buckets",
            ResourceKind::Dashboards => "dashboards",
            ResourceKind::Orgs => "orgs",
            ResourceKind::Sources => "sources",
            ResourceKind::Tasks => "tasks",
            ResourceKind::Telegrafs => "telegrafs",
            ResourceKind::Users => "users",
            ResourceKind::Variables => "variables",
            ResourceKind::Scrapers => "scrapers",
            ResourceKind::Secrets => "secrets",
            ResourceKind::Labels => "labels",
            ResourceKind::Views => "views",
            ResourceKind::Documents => "documents",
            ResourceKind::NotificationRules => "notificationRules",
            ResourceKind::NotificationEndpoints => "notificationEndpoints",
            ResourceKind::Checks => "checks",
        }
    }
}

impl FromStr for ResourceKind {
    type Err = StrataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| StrataError::invalid(format!("unknown resource kind: {s}")))
    }
}

/// The target of a permission.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Resource {
    pub kind: ResourceKind,
    /// A single resource of `kind`. `None` means every resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// Restricts the grant to resources owned by this organization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<Uuid>,
}

impl Resource {
    pub fn valid(&self) -> StrataResult<()> {
        if self.id.is_some_and(|id| id.is_nil()) {
            return Err(StrataError::invalid(format!(
                "{} resource id must not be nil",
                self.kind.as_str()
            )));
        }
        if self.org_id.is_some_and(|id| id.is_nil()) {
            return Err(StrataError::invalid(format!(
                "{} resource org id must not be nil",
                self.kind.as_str()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Permission {
    pub action: Action,
    pub resource: Resource,
}

impl Permission {
    /// Unscoped grant over every resource of `kind`.
    pub fn new(action: Action, kind: ResourceKind) -> Self {
        Self {
            action,
            resource: Resource {
                kind,
                id: None,
                org_id: None,
            },
        }
    }

    /// Grant over a single resource.
    pub fn at_id(id: Uuid, action: Action, kind: ResourceKind) -> StrataResult<Self> {
        let permission = Self {
            action,
            resource: Resource {
                kind,
                id: Some(id),
                org_id: None,
            },
        };
        permission.valid()?;
        Ok(permission)
    }

    /// Grant over every resource of `kind` owned by an organization.
    pub fn at_org(org_id: Uuid, action: Action, kind: ResourceKind) -> StrataResult<Self> {
        let permission = Self {
            action,
            resource: Resource {
                kind,
                id: None,
                org_id: Some(org_id),
            },
        };
        permission.valid()?;
        Ok(permission)
    }

    pub fn valid(&self) -> StrataResult<()> {
        self.resource.valid()
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.action.as_str())?;
        if let Some(org_id) = self.resource.org_id {
            write!(f, "orgs/{org_id}/")?;
        }
        f.write_str(self.resource.kind.as_str())?;
        if let Some(id) = self.resource.id {
            write!(f, "/{id}")?;
        }
        Ok(())
    }
}

/// Read and write on every resource kind, unscoped.
pub fn operator_permissions() -> Vec<Permission> {
    ResourceKind::ALL
        .into_iter()
        .flat_map(|kind| Action::ALL.map(|action| Permission::new(action, kind)))
        .collect()
}

/// Read and write on every resource of one organization, plus the
/// organization itself.
pub fn org_admin_permissions(org_id: Uuid) -> StrataResult<Vec<Permission>> {
    let mut permissions = Vec::with_capacity(ResourceKind::ALL.len() * Action::ALL.len());
    for kind in ResourceKind::ALL {
        for action in Action::ALL {
            let permission = if kind == ResourceKind::Orgs {
                Permission::at_id(org_id, action, kind)?
            } else {
                Permission::at_org(org_id, action, kind)?
            };
            permissions.push(permission);
        }
    }
    Ok(permissions)
}
