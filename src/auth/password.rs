use bcrypt::{hash, verify, DEFAULT_COST};

use super::errors::AuthError;

pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;

/// bcrypt wrapper with a configured cost factor.
///
/// The produced hash embeds the cost and salt, so verification needs nothing
/// besides the stored string. bcrypt compares digests in constant time.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, AuthError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(AuthError::Hashing(format!(
                "bcrypt cost must be between {} and {}, got {}",
                MIN_COST, MAX_COST, cost
            )));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        hash(plaintext, self.cost)
            .map_err(|e| AuthError::Hashing(format!("Failed to hash password: {}", e)))
    }

    /// Returns `false` for any mismatch, including a stored hash that does not parse.
    pub fn verify(&self, plaintext: &str, hashed: &str) -> bool {
        match verify(plaintext, hashed) {
            Ok(matches) => matches,
            Err(e) => {
                log::warn!("stored password hash could not be verified: {}", e);
                false
            }
        }
    }

    pub async fn hash_blocking(&self, plaintext: String) -> Result<String, AuthError> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| AuthError::Hashing(format!("hashing task failed: {}", e)))?
    }

    pub async fn verify_blocking(&self, plaintext: String, hashed: String) -> Result<bool, AuthError> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &hashed))
            .await
            .map_err(|e| AuthError::Infrastructure(format!("verification task failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(MIN_COST).unwrap()
    }

    #[test]
    fn test_password_hashing_and_verification() {
        let password = "test_password123";
        let hashed = hasher().hash(password).unwrap();

        assert_ne!(hashed, password);
        assert!(hasher().verify(password, &hashed));
        assert!(!hasher().verify("wrong_password", &hashed));
    }

    #[test]
    fn test_hash_is_salted() {
        let a = hasher().hash("same-password").unwrap();
        let b = hasher().hash("same-password").unwrap();
        assert_ne!(a, b);
        assert!(hasher().verify("same-password", &a));
        assert!(hasher().verify("same-password", &b));
    }

    #[test_log::test]
    fn test_verify_with_invalid_hash() {
        assert!(!hasher().verify("test_password123", "invalidhashformat"));
        assert!(!hasher().verify("test_password123", ""));
    }

    #[test]
    fn test_cost_out_of_range_is_rejected() {
        assert!(matches!(PasswordHasher::new(3), Err(AuthError::Hashing(_))));
        assert!(matches!(PasswordHasher::new(32), Err(AuthError::Hashing(_))));
        assert_eq!(PasswordHasher::default().cost(), DEFAULT_COST);
    }

    #[actix_rt::test]
    async fn test_blocking_round_trip() {
        let hashed = hasher().hash_blocking("password123".into()).await.unwrap();
        assert!(hasher()
            .verify_blocking("password123".into(), hashed.clone())
            .await
            .unwrap());
        assert!(!hasher()
            .verify_blocking("password124".into(), hashed)
            .await
            .unwrap());
    }
}
