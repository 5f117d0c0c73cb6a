use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{decode, encode};
use tracing::{info, warn};

use tollgate_core::new_id;
use tollgate_sql::Value;

use crate::model::{Claims, Session, TokenPair, TokenType, User};
use crate::service::password::verify_password_or_dummy;
use crate::service::{AuthError, AuthService};

/// `now + ttl_secs`, or an error when the lifetime does not fit a timestamp.
fn expiry(now: DateTime<Utc>, ttl_secs: i64) -> Result<DateTime<Utc>, AuthError> {
    TimeDelta::try_seconds(ttl_secs)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| AuthError::Internal(format!("token lifetime {}s is out of range", ttl_secs)))
}

impl AuthService {
    /// Check credentials and issue a token pair.
    ///
    /// Unknown users, wrong passwords and inactive accounts all get the
    /// same error, and all pay for one password verification.
    pub fn login(&self, username: &str, password: &str) -> Result<(User, TokenPair), AuthError> {
        let found = self.find_user_by_username(username)?;
        let matched =
            verify_password_or_dummy(password, found.as_ref().map(|u| u.password_hash.as_str()));

        let mut user = match found {
            Some(user) if matched && user.is_active => user,
            _ => {
                warn!(username = %username, "login rejected");
                return Err(AuthError::Unauthorized(
                    "no active account found with the given credentials".into(),
                ));
            }
        };

        let tokens = self.issue_tokens(&user)?;
        self.touch_last_login(&mut user)?;
        info!(user_id = %user.id, "login");
        Ok((user, tokens))
    }

    /// Issue a JWT token pair (access + refresh) for a user.
    ///
    /// Creates a session record; both tokens carry its id.
    pub fn issue_tokens(&self, user: &User) -> Result<TokenPair, AuthError> {
        let session_id = new_id();
        let now = Utc::now();
        let access_exp = expiry(now, self.config.access_token_ttl)?;
        let refresh_exp = expiry(now, self.config.refresh_token_ttl)?;

        let claims = |token_type, exp: i64| Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            sid: session_id.clone(),
            token_type,
            jti: new_id(),
            iat: now.timestamp(),
            exp,
        };
        let access = self.sign(&claims(TokenType::Access, access_exp.timestamp()))?;
        let refresh = self.sign(&claims(TokenType::Refresh, refresh_exp.timestamp()))?;

        let session = Session {
            id: session_id.clone(),
            user_id: user.id.clone(),
            issued_at: now.to_rfc3339(),
            expires_at: refresh_exp.to_rfc3339(),
            revoked: false,
        };
        self.insert_record(
            "sessions",
            &session.id,
            &session,
            &[
                ("user_id", Value::Text(session.user_id.clone())),
                ("revoked", Value::from(false)),
                ("issued_at", Value::Text(session.issued_at.clone())),
                ("expires_at", Value::Text(session.expires_at.clone())),
            ],
        )?;

        Ok(TokenPair {
            access,
            refresh,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_ttl,
        })
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&self.keys.header, claims, &self.keys.encoding)
            .map_err(|e| AuthError::Internal(format!("JWT encode failed: {}", e)))
    }

    /// Verify and decode a JWT.
    ///
    /// Checks signature and expiry, the token type when `expected` is given,
    /// and that the session has not been revoked.
    pub fn verify_token(
        &self,
        token: &str,
        expected: Option<TokenType>,
    ) -> Result<Claims, AuthError> {
        let claims = decode::<Claims>(token, &self.keys.decoding, &self.keys.validation)
            .map_err(|e| AuthError::Unauthorized(format!("invalid token: {}", e)))?
            .claims;

        if let Some(expected) = expected {
            if claims.token_type != expected {
                return Err(AuthError::Unauthorized(format!(
                    "expected {} token, got {}",
                    expected, claims.token_type
                )));
            }
        }

        let session: Option<Session> = self.find_one(
            "SELECT data FROM sessions WHERE id = ?1",
            &[Value::Text(claims.sid.clone())],
        )?;
        match session {
            Some(s) if !s.revoked => Ok(claims),
            Some(_) => Err(AuthError::Unauthorized("session has been revoked".into())),
            None => Err(AuthError::Unauthorized("unknown session".into())),
        }
    }

    /// Resolve an access token to its claims and an active user.
    pub fn authenticate(&self, token: &str) -> Result<(Claims, User), AuthError> {
        let claims = self.verify_token(token, Some(TokenType::Access))?;
        let user = match self.get_user(&claims.sub) {
            Ok(u) => u,
            Err(AuthError::NotFound(_)) => {
                return Err(AuthError::Unauthorized("user not found".into()));
            }
            Err(e) => return Err(e),
        };
        if !user.is_active {
            return Err(AuthError::Unauthorized("user is inactive".into()));
        }
        Ok((claims, user))
    }

    /// Exchange a refresh token for a new pair. The old session is revoked.
    pub fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.verify_token(refresh_token, Some(TokenType::Refresh))?;

        let user = self
            .get_user(&claims.sub)
            .map_err(|_| AuthError::Unauthorized("user not found".into()))?;
        if !user.is_active {
            return Err(AuthError::Unauthorized("user is inactive".into()));
        }

        // Only the caller that flips the session gets a new pair.
        if !self.revoke_session(&claims.sid)? {
            return Err(AuthError::Unauthorized("session has been revoked".into()));
        }
        self.issue_tokens(&user)
    }

    /// Revoke a session (both tokens of its pair become invalid).
    ///
    /// Returns `false` when the session was already revoked. The check and
    /// the write are one statement, so concurrent callers see exactly one
    /// `true`.
    pub fn revoke_session(&self, session_id: &str) -> Result<bool, AuthError> {
        let mut session: Session = self.get_record("sessions", session_id)?;
        session.revoked = true;
        let data = serde_json::to_string(&session)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let changed = self.sql.exec(
            "UPDATE sessions SET data = ?1, revoked = 1 WHERE id = ?2 AND revoked = 0",
            &[Value::Text(data), Value::Text(session_id.to_string())],
        )?;
        Ok(changed > 0)
    }

    /// Revoke all live sessions for a user. Returns how many were revoked.
    pub fn revoke_all_user_sessions(&self, user_id: &str) -> Result<u64, AuthError> {
        let mut revoked = 0;
        for session in self.list_user_sessions(user_id)? {
            if self.revoke_session(&session.id)? {
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    /// List non-revoked sessions for a user, newest first.
    pub fn list_user_sessions(&self, user_id: &str) -> Result<Vec<Session>, AuthError> {
        let rows = self.sql.query(
            "SELECT data FROM sessions WHERE user_id = ?1 AND revoked = 0 ORDER BY issued_at DESC",
            &[Value::Text(user_id.to_string())],
        )?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(data) = row.get_str("data") {
                let session: Session = serde_json::from_str(data)
                    .map_err(|e| AuthError::Internal(e.to_string()))?;
                sessions.push(session);
            }
        }
        Ok(sessions)
    }
}
