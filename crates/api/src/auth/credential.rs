//! Signed token credentials.
//!
//! A credential is an HS256-signed JWT whose claims bind it to one catalog
//! token row: the row id, the owner, the owner's email, the database name,
//! and the creation time. It is generated exactly once, at token creation,
//! and never regenerated. Credentials carry no expiry -- usability is
//! governed by the catalog row's active flag, not by time.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use lattice_core::types::DbId;

/// Claims embedded in every token credential.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TokenClaims {
    /// Catalog token row id the signature is bound to.
    pub token_id: DbId,
    /// Owning user's id.
    pub user_id: DbId,
    /// Owning user's email at creation time.
    pub email: String,
    /// The one database this credential scopes access to.
    pub database_name: String,
    /// Creation time (UTC Unix timestamp).
    pub created_at: i64,
}

/// Configuration for credential signing and validation.
#[derive(Debug, Clone)]
pub struct SigningConfig {
    /// HMAC-SHA256 secret used to sign and verify credentials.
    pub secret: String,
}

impl SigningConfig {
    /// Load signing configuration from the environment.
    ///
    /// # Panics
    ///
    /// Panics if `TOKEN_SECRET_KEY` is not set or is empty.
    pub fn from_env() -> Self {
        let secret = std::env::var("TOKEN_SECRET_KEY")
            .expect("TOKEN_SECRET_KEY must be set in the environment");
        assert!(!secret.is_empty(), "TOKEN_SECRET_KEY must not be empty");
        Self { secret }
    }
}

/// Sign a credential for the given claims.
pub fn sign(
    claims: &TokenClaims,
    config: &SigningConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(), // HS256
        claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate a credential's signature and decode its claims.
///
/// Credentials have no `exp` claim, so expiry validation is disabled; only
/// the signature is checked here. Whether the token is *usable* is decided
/// against the catalog row.
pub fn verify(
    token: &str,
    config: &SigningConfig,
) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default(); // HS256
    validation.required_spec_claims.clear();
    validation.validate_exp = false;

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SigningConfig {
        SigningConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
        }
    }

    fn test_claims() -> TokenClaims {
        TokenClaims {
            token_id: 7,
            user_id: 42,
            email: "alice@example.com".to_string(),
            database_name: "shop".to_string(),
            created_at: 1_700_000_000,
        }
    }

    #[test]
    fn test_sign_and_verify_round_trip() {
        let config = test_config();
        let signed = sign(&test_claims(), &config).expect("signing should succeed");

        let claims = verify(&signed, &config).expect("verification should succeed");
        assert_eq!(claims, test_claims());
    }

    #[test]
    fn test_different_secrets_fail() {
        let config_a = SigningConfig {
            secret: "secret-alpha".to_string(),
        };
        let config_b = SigningConfig {
            secret: "secret-bravo".to_string(),
        };

        let signed = sign(&test_claims(), &config_a).expect("signing should succeed");
        assert!(
            verify(&signed, &config_b).is_err(),
            "credential signed with a different secret must fail"
        );
    }

    #[test]
    fn test_tampered_credential_fails() {
        let config = test_config();
        let signed = sign(&test_claims(), &config).expect("signing should succeed");

        // Flip a character in the payload segment.
        let mut parts: Vec<String> = signed.split('.').map(str::to_string).collect();
        parts[1] = format!("x{}", &parts[1][1..]);
        let tampered = parts.join(".");

        assert!(verify(&tampered, &config).is_err());
    }

    #[test]
    fn test_garbage_input_fails() {
        let config = test_config();
        assert!(verify("not-a-credential", &config).is_err());
        assert!(verify("", &config).is_err());
    }
}
