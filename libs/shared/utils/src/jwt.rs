use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{TimeZone, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use shared_models::auth::{AuthUser, JwtClaims, JwtHeader, Role};

type HmacSha256 = Hmac<Sha256>;

const TOKEN_LIFETIME_SECS: u64 = 7 * 24 * 60 * 60;

/// Issue a signed token for a principal. `sub` is the document id of the
/// patient or doctor (for the admin, the configured email).
pub fn issue_token(
    sub: &str,
    role: Role,
    email: Option<&str>,
    jwt_secret: &str,
) -> Result<String, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let now = Utc::now().timestamp() as u64;
    let header = JwtHeader {
        alg: "HS256".to_string(),
        typ: "JWT".to_string(),
    };
    let claims = JwtClaims {
        sub: sub.to_string(),
        role,
        exp: Some(now + TOKEN_LIFETIME_SECS),
        iat: Some(now),
        email: email.map(|e| e.to_string()),
    };

    let header_json =
        serde_json::to_vec(&header).map_err(|_| "Failed to encode header".to_string())?;
    let claims_json =
        serde_json::to_vec(&claims).map_err(|_| "Failed to encode claims".to_string())?;

    let header_b64 = URL_SAFE_NO_PAD.encode(header_json);
    let claims_b64 = URL_SAFE_NO_PAD.encode(claims_json);
    let signing_input = format!("{}.{}", header_b64, claims_b64);

    let mut mac = HmacSha256::new_from_slice(jwt_secret.as_bytes())
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", signing_input, signature))
}

pub fn validate_token(token: &str, jwt_secret: &str) -> Result<AuthUser, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err("Invalid token format".to_string());
    }

    let header_b64 = parts[0];
    let claims_b64 = parts[1];
    let signature_b64 = parts[2];

    let signature = match URL_SAFE_NO_PAD.decode(signature_b64) {
        Ok(sig) => sig,
        Err(e) => {
            debug!("Failed to decode signature: {}", e);
            return Err("Invalid signature encoding".to_string());
        }
    };

    let signing_input = format!("{}.{}", header_b64, claims_b64);

    let mut mac = match HmacSha256::new_from_slice(jwt_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return Err("Failed to create HMAC".to_string()),
    };
    mac.update(signing_input.as_bytes());

    if mac.verify_slice(&signature).is_err() {
        debug!("Token signature verification failed");
        return Err("Invalid token signature".to_string());
    }

    let claims_json = match URL_SAFE_NO_PAD.decode(claims_b64) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(json_str) => json_str,
            Err(_) => return Err("Invalid claims encoding".to_string()),
        },
        Err(_) => return Err("Invalid claims encoding".to_string()),
    };

    let claims: JwtClaims = match serde_json::from_str(&claims_json) {
        Ok(c) => c,
        Err(e) => {
            debug!("Failed to parse claims: {}", e);
            return Err("Invalid claims format".to_string());
        }
    };

    if let Some(exp) = claims.exp {
        let now = Utc::now().timestamp() as u64;
        if exp < now {
            debug!("Token expired at {} (now: {})", exp, now);
            return Err("Token expired".to_string());
        }
    }

    let issued_at = claims
        .iat
        .map(|timestamp| Utc.timestamp_opt(timestamp as i64, 0).single());

    let user = AuthUser {
        id: claims.sub,
        role: claims.role,
        email: claims.email,
        issued_at: issued_at.flatten(),
    };

    debug!("Token validated successfully for {} {}", user.role, user.id);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret-key-long-enough-for-hmac";

    #[test]
    fn issued_token_round_trips() {
        let token = issue_token("user-1", Role::Patient, Some("p@example.com"), SECRET).unwrap();
        let user = validate_token(&token, SECRET).unwrap();
        assert_eq!(user.id, "user-1");
        assert_eq!(user.role, Role::Patient);
        assert_eq!(user.email.as_deref(), Some("p@example.com"));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let token = issue_token("user-1", Role::Doctor, None, SECRET).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = URL_SAFE_NO_PAD.encode(b"forged-signature-bytes");
        parts[2] = &forged;
        let tampered = parts.join(".");
        assert!(validate_token(&tampered, SECRET).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token("user-1", Role::Admin, None, SECRET).unwrap();
        assert!(validate_token(&token, "some-other-secret").is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(validate_token("not.a-token", SECRET).is_err());
        assert!(validate_token("", SECRET).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        // Correctly signed token whose exp is already in the past.
        let now = Utc::now().timestamp() as u64;
        let header = JwtHeader {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        };
        let claims = JwtClaims {
            sub: "user-1".to_string(),
            role: Role::Patient,
            exp: Some(now - 60),
            iat: Some(now - 3600),
            email: None,
        };

        let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header).unwrap());
        let claims_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
        let signing_input = format!("{}.{}", header_b64, claims_b64);
        let mut mac = HmacSha256::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        let token = format!("{}.{}", signing_input, signature);

        let err = validate_token(&token, SECRET).unwrap_err();
        assert_eq!(err, "Token expired");
    }
}
