use crate::{
    aws::Credentials,
    constants::{ROLE_ARN_MARKER, SESSION_NAME_SUFFIX},
    error::{Error, Result},
};

/// One assumed-role session
#[derive(Debug, Clone, PartialEq)]
pub struct RoleSession {
    pub role_arn: String,
    pub session_name: String,
    pub credentials: Credentials,
}

/// Derive the STS session name for a role ARN.
///
/// Everything after the first `role/` is kept, so role paths stay in the name:
/// `arn:aws:iam::123:role/ops/Deployer` becomes `ops/Deployer-aws-sdk`.
pub fn session_name_for(role_arn: &str) -> Result<String> {
    let (_, role_name) = role_arn
        .split_once(ROLE_ARN_MARKER)
        .ok_or_else(|| Error::MalformedArn {
            role_arn: role_arn.to_string(),
        })?;

    Ok(format!("{role_name}{SESSION_NAME_SUFFIX}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_name_from_role_arn() {
        let name = session_name_for("arn:aws:iam::123:role/Deployer").unwrap();
        assert_eq!(name, "Deployer-aws-sdk");
    }

    #[test]
    fn test_session_name_keeps_role_path() {
        let name = session_name_for("arn:aws:iam::123456789012:role/ops/Deployer").unwrap();
        assert_eq!(name, "ops/Deployer-aws-sdk");
    }

    #[test]
    fn test_session_name_uses_first_marker() {
        let name = session_name_for("arn:aws:iam::123:role/role/Nested").unwrap();
        assert_eq!(name, "role/Nested-aws-sdk");
    }

    #[test]
    fn test_session_name_without_marker() {
        let result = session_name_for("arn:aws:iam::123:user/alice");
        assert!(matches!(
            result,
            Err(Error::MalformedArn { role_arn }) if role_arn == "arn:aws:iam::123:user/alice"
        ));
    }

    #[test]
    fn test_session_name_empty_arn() {
        assert!(matches!(
            session_name_for(""),
            Err(Error::MalformedArn { .. })
        ));
    }
}
