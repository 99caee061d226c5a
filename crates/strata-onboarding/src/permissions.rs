//! Permission set granted to the first user's token.

use strata_core::error::StrataResult;
use strata_core::models::permission::{
    Action, Permission, ResourceKind, operator_permissions, org_admin_permissions,
};
use uuid::Uuid;

/// Operator permissions, then org-admin permissions for `org_id`, then
/// write and read on the bucket.
pub fn onboarding_permissions(org_id: Uuid, bucket_id: Uuid) -> StrataResult<Vec<Permission>> {
    let mut permissions = operator_permissions();
    permissions.extend(org_admin_permissions(org_id)?);
    permissions.push(Permission::at_id(bucket_id, Action::Write, ResourceKind::Buckets)?);
    permissions.push(Permission::at_id(bucket_id, Action::Read, ResourceKind::Buckets)?);
    Ok(permissions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_is_operator_then_org_admin_then_bucket() {
        let org_id = Uuid::new_v4();
        let bucket_id = Uuid::new_v4();

        let perms = onboarding_permissions(org_id, bucket_id).unwrap();
        let operator = operator_permissions();
        let org_admin = org_admin_permissions(org_id).unwrap();

        assert_eq!(perms.len(), operator.len() + org_admin.len() + 2);
        assert_eq!(&perms[..operator.len()], operator.as_slice());
        assert_eq!(
            &perms[operator.len()..operator.len() + org_admin.len()],
            org_admin.as_slice()
        );

        let tail = &perms[perms.len() - 2..];
        assert_eq!(tail[0].to_string(), format!("write:buckets/{bucket_id}"));
        assert_eq!(tail[1].to_string(), format!("read:buckets/{bucket_id}"));
    }

    #[test]
    fn nil_ids_are_rejected() {
        assert!(onboarding_permissions(Uuid::nil(), Uuid::new_v4()).is_err());
        assert!(onboarding_permissions(Uuid::new_v4(), Uuid::nil()).is_err());
    }
}
