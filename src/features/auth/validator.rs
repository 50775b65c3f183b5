use super::model::AuthenticatedUser;
use crate::core::error::AppError;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::time::Duration;

pub struct JwtValidator {
    decoding_key: DecodingKey,
    issuer: Option<String>,
    leeway: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    sub: String,
    #[serde(rename = "exp")]
    _exp: u64,

    // Single role as issued by the CMMS login, or a list of roles
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    roles: Vec<String>,
}

impl JwtValidator {
    pub fn new(secret: &str, issuer: Option<String>, leeway: Duration) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            leeway: leeway.as_secs(),
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }
        validation.leeway = self.leeway;
        validation.validate_nbf = true;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Auth(e.to_string()))?;

        let claims = token_data.claims;
        if claims.sub.is_empty() {
            return Err(AppError::Auth("Token has an empty subject".to_string()));
        }

        let mut roles = claims.roles;
        if let Some(role) = claims.role {
            if !roles.contains(&role) {
                roles.push(role);
            }
        }

        Ok(AuthenticatedUser {
            user_id: claims.sub,
            roles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestClaims<'a> {
        sub: &'a str,
        exp: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        role: Option<&'a str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        iss: Option<&'a str>,
    }

    fn token(secret: &str, claims: &TestClaims<'_>) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn in_one_hour() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[test]
    fn test_valid_token() {
        let validator = JwtValidator::new("secret", None, Duration::from_secs(0));
        let jwt = token(
            "secret",
            &TestClaims {
                sub: "user-1",
                exp: in_one_hour(),
                role: Some("TECHNICIEN"),
                iss: None,
            },
        );

        let user = validator.validate_token(&jwt).unwrap();
        assert_eq!(user.user_id, "user-1");
        assert_eq!(user.roles, vec!["TECHNICIEN".to_string()]);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let validator = JwtValidator::new("secret", None, Duration::from_secs(0));
        let jwt = token(
            "other",
            &TestClaims {
                sub: "user-1",
                exp: in_one_hour(),
                role: None,
                iss: None,
            },
        );

        assert!(matches!(
            validator.validate_token(&jwt),
            Err(AppError::Auth(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let validator = JwtValidator::new("secret", None, Duration::from_secs(0));
        let jwt = token(
            "secret",
            &TestClaims {
                sub: "user-1",
                exp: chrono::Utc::now().timestamp() - 3600,
                role: None,
                iss: None,
            },
        );

        assert!(validator.validate_token(&jwt).is_err());
    }

    #[test]
    fn test_issuer_checked_when_configured() {
        let validator = JwtValidator::new(
            "secret",
            Some("https://gmao.example".to_string()),
            Duration::from_secs(0),
        );
        let wrong = token(
            "secret",
            &TestClaims {
                sub: "user-1",
                exp: in_one_hour(),
                role: None,
                iss: Some("https://elsewhere.example"),
            },
        );
        let right = token(
            "secret",
            &TestClaims {
                sub: "user-1",
                exp: in_one_hour(),
                role: None,
                iss: Some("https://gmao.example"),
            },
        );

        assert!(validator.validate_token(&wrong).is_err());
        assert!(validator.validate_token(&right).is_ok());
    }
}
