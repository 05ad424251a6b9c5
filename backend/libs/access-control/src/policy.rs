//! Authorization decisions
//!
//! Total functions over already-resolved identifiers. No I/O, no failure
//! modes; callers turn a [`Decision::Deny`] into `Forbidden` with
//! [`Decision::into_result`].

use error_types::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn into_result(self, denial: &str) -> Result<(), ServiceError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny => Err(ServiceError::forbidden(denial)),
        }
    }
}

/// Allow when the caller acts on its own account, or is an administrator
pub fn self_or_admin(principal_account_id: &str, target_account_id: &str, is_admin: bool) -> Decision {
    if is_admin || principal_account_id == target_account_id {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

/// Allow only when the recorded creator is exactly the caller
///
/// Byte-for-byte comparison: no trimming, no case folding.
pub fn ownership_match(resource_creator_id: &str, caller_account_id: &str) -> Decision {
    if resource_creator_id == caller_account_id {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_self_or_admin_table() {
        assert_eq!(self_or_admin("acc1", "acc2", false), Decision::Deny);
        assert_eq!(self_or_admin("acc1", "acc1", false), Decision::Allow);
        assert_eq!(self_or_admin("acc1", "acc2", true), Decision::Allow);
    }

    #[test]
    fn test_ownership_is_case_sensitive() {
        assert_eq!(ownership_match("Acc1", "acc1"), Decision::Deny);
        assert_eq!(ownership_match("acc1 ", "acc1"), Decision::Deny);
    }

    #[test]
    fn test_deny_becomes_forbidden() {
        let err = Decision::Deny.into_result("not the creator").unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert!(Decision::Allow.into_result("unused").is_ok());
    }

    proptest! {
        #[test]
        fn prop_ownership_reflexive(id in ".*") {
            prop_assert_eq!(ownership_match(&id, &id), Decision::Allow);
        }

        #[test]
        fn prop_ownership_rejects_distinct(a in ".*", b in ".*") {
            prop_assume!(a != b);
            prop_assert_eq!(ownership_match(&a, &b), Decision::Deny);
        }

        #[test]
        fn prop_admin_always_allowed(a in "[a-z0-9-]{1,36}", b in "[a-z0-9-]{1,36}") {
            prop_assert_eq!(self_or_admin(&a, &b, true), Decision::Allow);
        }

        #[test]
        fn prop_non_admin_needs_self(a in "[a-z0-9-]{1,36}", b in "[a-z0-9-]{1,36}") {
            let expected = if a == b { Decision::Allow } else { Decision::Deny };
            prop_assert_eq!(self_or_admin(&a, &b, false), expected);
        }
    }
}
