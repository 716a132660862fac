//! User Name Value Object
//!
//! ユーザー名はログインと画面表示に使う**公開ハンドル**。
//! 認証プロバイダーへはユーザー名から導出したメールアドレスで登録するため、
//! メールのローカル部として成立する文字だけを許可する。
//!
//! ## 設計方針
//! - NFKC正規化 → 前後の空白除去 → 検証 の順で処理
//! - 入力時の大文字小文字は表示用にそのまま保持
//! - 一意性・メール導出には小文字化した canonical 形を使う
//!
//! ## 不変条件
//! - 長さ: 1〜64文字（正規化後）
//! - 空白・`@`・制御文字を含まない

use std::fmt;

use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

/// Maximum length for user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 64;

/// Error returned when user name validation fails
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserNameError {
    #[error("User name cannot be empty")]
    Empty,

    #[error("User name must be at most {max} characters (got {length})")]
    TooLong { length: usize, max: usize },

    #[error("User name contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Validated user name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserName {
    display: String,
    canonical: String,
}

impl UserName {
    pub fn new(raw: &str) -> Result<Self, UserNameError> {
        let normalized: String = raw.nfkc().collect();
        let display = normalized.trim();

        if display.is_empty() {
            return Err(UserNameError::Empty);
        }

        let length = display.chars().count();
        if length > USER_NAME_MAX_LENGTH {
            return Err(UserNameError::TooLong {
                length,
                max: USER_NAME_MAX_LENGTH,
            });
        }

        if let Some(ch) = display
            .chars()
            .find(|ch| ch.is_whitespace() || ch.is_control() || *ch == '@')
        {
            return Err(UserNameError::InvalidCharacter(ch));
        }

        Ok(Self {
            display: display.to_string(),
            canonical: display.to_lowercase(),
        })
    }

    /// The name as the user typed it
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// Lowercase form used for uniqueness and email derivation
    #[inline]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Case-insensitive comparison against a stored name
    ///
    /// Stored names that no longer validate only match on exact text.
    pub fn matches(&self, stored: &str) -> bool {
        match Self::new(stored) {
            Ok(other) => other.canonical == self.canonical,
            Err(_) => stored == self.display,
        }
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}
