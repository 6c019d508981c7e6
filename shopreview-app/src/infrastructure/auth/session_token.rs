use crate::domain::Session;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shopreview_errors::AppError;
use uuid::Uuid;

const SESSION_AUDIENCE: &str = "authenticated";

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    aud: String,
    exp: i64,
}

/// Verifies the HS256 session tokens issued by the identity provider.
#[derive(Clone)]
pub struct SessionVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl SessionVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[SESSION_AUDIENCE]);
        validation.set_required_spec_claims(&["exp", "sub", "aud"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Session, AppError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected session token");
                AppError::Unauthenticated
            })?;

        let user_id = Uuid::parse_str(&data.claims.sub).map_err(|_| {
            tracing::debug!("Session token subject is not a user id");
            AppError::Unauthenticated
        })?;

        Ok(Session::new(user_id).with_email(data.claims.email))
    }

    /// Signs a token for `session`. Used for local runs and tests; production tokens
    /// come from the identity provider.
    pub fn issue(&self, session: &Session, ttl: Duration) -> Result<String, AppError> {
        let claims = SessionClaims {
            sub: session.user_id.to_string(),
            email: session.email.clone(),
            aud: SESSION_AUDIENCE.to_string(),
            exp: (Utc::now() + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign session token: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "super-secret-jwt-token-with-at-least-32-characters";

    #[test]
    fn test_valid_token_yields_session() {
        let verifier = SessionVerifier::new(SECRET);
        let session = Session::new(Uuid::new_v4()).with_email(Some("ana@example.com".into()));

        let token = verifier.issue(&session, Duration::hours(1)).unwrap();
        assert_eq!(verifier.verify(&token).unwrap(), session);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let verifier = SessionVerifier::new(SECRET);
        let session = Session::new(Uuid::new_v4());

        let token = verifier.issue(&session, Duration::hours(-2)).unwrap();
        assert_eq!(verifier.verify(&token), Err(AppError::Unauthenticated));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = SessionVerifier::new("another-secret-entirely-another-secret");
        let verifier = SessionVerifier::new(SECRET);

        let token = issuer
            .issue(&Session::new(Uuid::new_v4()), Duration::hours(1))
            .unwrap();
        assert_eq!(verifier.verify(&token), Err(AppError::Unauthenticated));
        assert_eq!(verifier.verify("not.a.token"), Err(AppError::Unauthenticated));
    }

    #[test]
    fn test_non_uuid_subject_is_rejected() {
        let verifier = SessionVerifier::new(SECRET);
        let claims = SessionClaims {
            sub: "service-role".to_string(),
            email: None,
            aud: SESSION_AUDIENCE.to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(verifier.verify(&token), Err(AppError::Unauthenticated));
    }
}
