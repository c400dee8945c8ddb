//! Authentication Models
//! Mission: Define the token and login data structures

use serde::{Deserialize, Serialize};

/// JWT Claims payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // subject (username)
    pub iat: i64,    // issued at
    pub exp: i64,    // expiration timestamp
}

/// Login request body
///
/// Deliberately unconstrained: any mismatch is reported as bad credentials.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64, // seconds until expiration
}

impl TokenResponse {
    pub fn bearer(access_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            expires_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_shape() {
        let response = TokenResponse::bearer("abc".to_string(), 1800);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["access_token"], "abc");
        assert_eq!(json["token_type"], "bearer");
        assert_eq!(json["expires_in"], 1800);
    }

    #[test]
    fn test_login_request_accepts_short_values() {
        let login: LoginRequest =
            serde_json::from_str(r#"{"username":"a","password":"b"}"#).unwrap();
        assert_eq!(login.username, "a");
        assert_eq!(login.password, "b");
    }
}
