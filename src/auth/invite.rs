use axum::http::StatusCode;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use serde_json::{Map, Value};
use time::{Duration, OffsetDateTime};

pub const DEFAULT_INVITE_TTL: Duration = Duration::days(7);

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("invalid token")]
    Invalid(#[source] jsonwebtoken::errors::Error),
    #[error("bad token")]
    Malformed,
    #[error("couldn't sign invite")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl CredentialError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Invalid(_) => StatusCode::UNAUTHORIZED,
            Self::Malformed => StatusCode::BAD_REQUEST,
            Self::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct InviteClaims {
    room_id: String,
    invite: bool,
    exp: i64,
}

/// Issues and checks stateless room invites (HS256 JWTs).
///
/// Nothing is stored server side: a token is valid for as long as its
/// signature checks out and `exp` lies in the future.
#[derive(Clone)]
pub struct CredentialService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl CredentialService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn issue(&self, room_id: &str, ttl: Duration) -> Result<String, CredentialError> {
        let claims = InviteClaims {
            room_id: room_id.to_owned(),
            invite: true,
            exp: (OffsetDateTime::now_utc() + ttl).unix_timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(CredentialError::Signing)
    }

    /// Returns the room the token was issued for.
    ///
    /// Claims are read as a plain map, so any failure inside `decode` is a
    /// bad header, signature or expiry; only a verified token can be malformed.
    pub fn validate(&self, token: &str) -> Result<String, CredentialError> {
        let claims = jsonwebtoken::decode::<Map<String, Value>>(token, &self.decoding, &self.validation)
            .map_err(CredentialError::Invalid)?
            .claims;

        match (claims.get("room_id"), claims.get("invite")) {
            (Some(Value::String(room_id)), Some(Value::Bool(true))) => Ok(room_id.clone()),
            _ => Err(CredentialError::Malformed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> CredentialService {
        CredentialService::new("test-secret")
    }

    #[test]
    fn issued_invite_validates_to_its_room() {
        let service = service();
        let token = service.issue("abc123", DEFAULT_INVITE_TTL).unwrap();

        assert_eq!(service.validate(&token).unwrap(), "abc123");
        // reusable until expiry
        assert_eq!(service.validate(&token).unwrap(), "abc123");
    }

    #[test]
    fn expired_invite_is_invalid() {
        let service = service();
        let token = service.issue("abc123", Duration::minutes(-5)).unwrap();

        assert!(matches!(service.validate(&token), Err(CredentialError::Invalid(_))));
    }

    #[test]
    fn tampered_invite_is_invalid() {
        let service = service();
        let token = service.issue("abc123", DEFAULT_INVITE_TTL).unwrap();

        let other = CredentialService::new("other-secret");
        assert!(matches!(other.validate(&token), Err(CredentialError::Invalid(_))));

        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = service.issue("zzz999", DEFAULT_INVITE_TTL).unwrap();
        parts[1] = forged.split('.').nth(1).unwrap();
        assert!(matches!(service.validate(&parts.join(".")), Err(CredentialError::Invalid(_))));

        assert!(matches!(service.validate("not.a.token"), Err(CredentialError::Invalid(_))));
    }

    #[test]
    fn non_json_header_is_invalid() {
        let service = service();
        let token = service.issue("abc123", DEFAULT_INVITE_TTL).unwrap();

        let mut parts: Vec<&str> = token.split('.').collect();
        // base64url of "hello"
        parts[0] = "aGVsbG8";
        let err = service.validate(&parts.join(".")).unwrap_err();

        assert!(matches!(err, CredentialError::Invalid(_)));
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn missing_claims_are_malformed() {
        let service = service();
        let exp = (OffsetDateTime::now_utc() + Duration::hours(1)).unix_timestamp();

        let no_invite = jsonwebtoken::encode(
            &Header::default(),
            &serde_json::json!({ "room_id": "abc123", "exp": exp }),
            &EncodingKey::from_secret(b"test-secret"),
        ).unwrap();
        assert!(matches!(service.validate(&no_invite), Err(CredentialError::Malformed)));

        let no_room = jsonwebtoken::encode(
            &Header::default(),
            &serde_json::json!({ "invite": true, "exp": exp }),
            &EncodingKey::from_secret(b"test-secret"),
        ).unwrap();
        assert!(matches!(service.validate(&no_room), Err(CredentialError::Malformed)));

        let not_invite = jsonwebtoken::encode(
            &Header::default(),
            &serde_json::json!({ "room_id": "abc123", "invite": false, "exp": exp }),
            &EncodingKey::from_secret(b"test-secret"),
        ).unwrap();
        assert!(matches!(service.validate(&not_invite), Err(CredentialError::Malformed)));

        let numeric_room = jsonwebtoken::encode(
            &Header::default(),
            &serde_json::json!({ "room_id": 7, "invite": true, "exp": exp }),
            &EncodingKey::from_secret(b"test-secret"),
        ).unwrap();
        assert!(matches!(service.validate(&numeric_room), Err(CredentialError::Malformed)));
    }

    #[test]
    fn invite_without_expiry_is_invalid() {
        let service = service();
        let no_expiry = jsonwebtoken::encode(
            &Header::default(),
            &serde_json::json!({ "room_id": "abc123", "invite": true }),
            &EncodingKey::from_secret(b"test-secret"),
        ).unwrap();
        assert!(matches!(service.validate(&no_expiry), Err(CredentialError::Invalid(_))));
    }

    #[test]
    fn status_codes() {
        assert_eq!(CredentialError::Malformed.status(), StatusCode::BAD_REQUEST);
        let err = service().validate("garbage").unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }
}
