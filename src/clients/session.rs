use crate::error::{AppResult, SessionError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

/// 访问会话
///
/// 对编排器是不透明的，原样传给每次传输调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// 会话提供者，负责获取（以及必要时续期）会话
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn get_session(&self) -> AppResult<Session>;
}

/// 使用固定访问令牌的会话提供者
///
/// 令牌过期后直接报错，不会自行续期
pub struct StaticSessionProvider {
    session: Session,
}

impl StaticSessionProvider {
    pub fn new(access_token: impl Into<String>, lifetime_secs: i64) -> AppResult<Self> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(SessionError::MissingToken.into());
        }
        Ok(Self {
            session: Session::new(access_token, Utc::now() + Duration::seconds(lifetime_secs)),
        })
    }
}

#[async_trait]
impl SessionProvider for StaticSessionProvider {
    async fn get_session(&self) -> AppResult<Session> {
        if self.session.is_expired() {
            return Err(SessionError::Expired {
                expired_at: self.session.expires_at().to_rfc3339(),
            }
            .into());
        }
        Ok(self.session.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_static_provider_hands_out_token() {
        let provider = StaticSessionProvider::new("token", 60).unwrap();
        let session = provider.get_session().await.unwrap();
        assert_eq!(session.access_token(), "token");
        assert!(!session.is_expired());
    }

    #[tokio::test]
    async fn test_static_provider_rejects_expired_token() {
        let provider = StaticSessionProvider::new("token", -1).unwrap();
        let result = provider.get_session().await;
        assert!(matches!(
            result,
            Err(AppError::Session(SessionError::Expired { .. }))
        ));
    }

    #[test]
    fn test_static_provider_requires_token() {
        assert!(StaticSessionProvider::new("", 60).is_err());
    }
}
