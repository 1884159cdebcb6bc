use serde::{Deserialize, Serialize};

use super::errors::AuthError;
use super::token::{Claims, TokenIssuer};
use crate::models::Role;

/// The caller of a protected request, as proven by its bearer token.
///
/// The middleware stores one of these in the request's extensions, which are
/// dropped together with the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i32,
    pub role: Role,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// True when the caller is `user_id` or an administrator.
    pub fn can_act_for(&self, user_id: i32) -> bool {
        self.user_id == user_id || self.is_admin()
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            role: claims.role,
        }
    }
}

/// Splits `Bearer <token>`. The scheme is matched case-insensitively; there must
/// be exactly one space and a token with no whitespace in it. Only an empty
/// value counts as missing; a blank one is malformed.
pub fn bearer_token(header: &str) -> Result<&str, AuthError> {
    if header.is_empty() {
        return Err(AuthError::MissingCredential);
    }

    let (scheme, token) = header
        .split_once(' ')
        .ok_or(AuthError::MalformedCredential)?;

    if !scheme.eq_ignore_ascii_case("Bearer")
        || token.is_empty()
        || token.chars().any(char::is_whitespace)
    {
        return Err(AuthError::MalformedCredential);
    }

    Ok(token)
}

/// Validates a raw `Authorization` header value and yields the caller's identity.
pub fn authorize(tokens: &TokenIssuer, header: &str) -> Result<Identity, AuthError> {
    let token = bearer_token(header)?;
    let claims = tokens.verify(token).map_err(|e| {
        log::debug!("rejected bearer token: {}", e);
        AuthError::Unauthenticated(e)
    })?;
    Ok(claims.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::errors::TokenError;
    use chrono::{Duration, Utc};

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(b"test-secret-key-for-jwt-signing-at-least-32-bytes", Duration::hours(24))
    }

    #[test]
    fn test_bearer_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Ok("abc.def.ghi"));
        assert_eq!(bearer_token("bearer abc"), Ok("abc"));

        assert_eq!(bearer_token(""), Err(AuthError::MissingCredential));

        let malformed = [
            " ",
            "   ",
            "\t",
            "Bearer",
            "Bearer ",
            "Basic abc",
            "Bearer  abc",
            "Bearer a b",
            "Token abc",
        ];
        for header in malformed {
            assert_eq!(
                bearer_token(header),
                Err(AuthError::MalformedCredential),
                "header {:?}",
                header
            );
        }
    }

    #[test]
    fn test_authorize_accepts_issued_token() {
        let tokens = issuer();
        let token = tokens.issue(42, Role::User).unwrap();

        let identity = authorize(&tokens, &format!("Bearer {}", token)).unwrap();
        assert_eq!(
            identity,
            Identity {
                user_id: 42,
                role: Role::User
            }
        );
        assert!(!identity.is_admin());
        assert!(identity.can_act_for(42));
        assert!(!identity.can_act_for(43));
    }

    #[test]
    fn test_authorize_rejections() {
        let tokens = issuer();

        assert_eq!(authorize(&tokens, ""), Err(AuthError::MissingCredential));
        assert_eq!(
            authorize(&tokens, "Bearer garbage"),
            Err(AuthError::Unauthenticated(TokenError::Malformed))
        );

        let expired = tokens
            .issue_at(1, Role::User, Utc::now() - Duration::hours(25))
            .unwrap();
        assert_eq!(
            authorize(&tokens, &format!("Bearer {}", expired)),
            Err(AuthError::Unauthenticated(TokenError::Expired))
        );
    }

    #[test]
    fn test_admin_identity() {
        let tokens = issuer();
        let token = tokens.issue(1, Role::Admin).unwrap();
        let identity = authorize(&tokens, &format!("Bearer {}", token)).unwrap();

        assert!(identity.is_admin());
        assert!(identity.can_act_for(99));
    }
}
