use serde::{Deserialize, Serialize};

/// A login session. Both tokens of a pair reference the same session, so
/// revoking it invalidates the access and the refresh token together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session id (UUIDv4, no dashes).
    pub id: String,

    /// User id that owns this session.
    pub user_id: String,

    /// RFC 3339 timestamp when the pair was issued.
    pub issued_at: String,

    /// RFC 3339 timestamp when the refresh token expires.
    pub expires_at: String,

    #[serde(default)]
    pub revoked: bool,
}

/// Which half of a token pair a JWT is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Access => write!(f, "access"),
            Self::Refresh => write!(f, "refresh"),
        }
    }
}

/// JWT claims payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id.
    pub sub: String,

    pub username: String,

    /// Session id (for refresh/revoke).
    pub sid: String,

    pub token_type: TokenType,

    /// Unique token id.
    pub jti: String,

    /// Issued at (unix timestamp).
    pub iat: i64,

    /// Expiration (unix timestamp).
    pub exp: i64,
}

/// Token pair returned after login or refresh.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyRequest {
    pub token: String,
}

/// Body returned by endpoints that only report success.
#[derive(Debug, Clone, Serialize)]
pub struct Success {
    pub success: bool,
}

impl Default for Success {
    fn default() -> Self {
        Self { success: true }
    }
}
