use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use validator::Validate;

/// Identity関連のエラー
#[derive(Debug, Error, PartialEq)]
pub enum IdentityError {
    #[error("Identity name must not be empty")]
    EmptyName,

    #[error("Invalid e-mail address: {0}")]
    InvalidEmail(String),
}

/// コミットの作成者・コミッターを表す名前とメールアドレスの組
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Identity {
    /// 表示名
    #[validate(length(min = 1))]
    pub name: String,

    /// メールアドレス
    #[validate(email)]
    pub email: String,
}

impl Identity {
    /// 新しいIdentityを作成（検証付き）
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Result<Self, IdentityError> {
        let identity = Self {
            name: name.into().trim().to_string(),
            email: email.into().trim().to_string(),
        };
        identity.check()?;
        Ok(identity)
    }

    /// 自動コミット用のデフォルトのボットIdentity
    pub fn default_committer() -> Self {
        Self {
            name: "GitStatusBot".to_string(),
            email: "gitstat@noreply.localhost".to_string(),
        }
    }

    /// フィールドの妥当性を確認する
    pub fn check(&self) -> Result<(), IdentityError> {
        if self.name.trim().is_empty() {
            return Err(IdentityError::EmptyName);
        }
        if !validator::ValidateEmail::validate_email(&self.email) {
            return Err(IdentityError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_creation() {
        let identity = Identity::new("Release Bot", "bot@example.com").unwrap();
        assert_eq!(identity.name, "Release Bot");
        assert_eq!(identity.to_string(), "Release Bot <bot@example.com>");
    }

    #[test]
    fn test_identity_rejects_empty_name() {
        assert_eq!(
            Identity::new("  ", "bot@example.com"),
            Err(IdentityError::EmptyName)
        );
    }

    #[test]
    fn test_identity_rejects_bad_email() {
        assert!(matches!(
            Identity::new("bot", "not-an-email"),
            Err(IdentityError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_default_committer_is_valid() {
        let committer = Identity::default_committer();
        assert!(committer.check().is_ok());
        assert!(committer.validate().is_ok());
    }
}
