//! Application-account registration

use tracing::info;

use crate::domains::user::actions::{hash_password, AccountError};
use crate::kernel::{BaseUserStore, ServerDeps};

/// Register a new application user and issue a bearer token.
pub async fn register(
    deps: &ServerDeps,
    email: &str,
    password: &str,
) -> Result<String, AccountError> {
    if deps.users.find_by_email(email).await?.is_some() {
        return Err(AccountError::EmailTaken);
    }

    let user = deps.users.create(email, &hash_password(password)).await?;
    let token = deps
        .jwt_service
        .create_token(user.id, user.email.clone())
        .map_err(AccountError::Storage)?;

    info!(user_id = %user.id, email = %email, "user registered");
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::TestDependencies;

    #[tokio::test]
    async fn registers_and_issues_a_verifiable_token() {
        let test = TestDependencies::new();

        let token = register(&test.deps, "user@example.org", "pw").await.unwrap();

        let claims = test.deps.jwt_service.verify_token(&token).unwrap();
        assert_eq!(claims.email, "user@example.org");

        let stored = test
            .deps
            .users
            .find_by_email("user@example.org")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.password_hash, hash_password("pw"));
    }

    #[tokio::test]
    async fn rejects_duplicate_email() {
        let test = TestDependencies::new();
        register(&test.deps, "user@example.org", "pw").await.unwrap();

        let err = register(&test.deps, "user@example.org", "other")
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::EmailTaken));
    }
}
