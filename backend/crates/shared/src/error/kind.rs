//! Error Kind - Classification of errors
//!
//! Defines the [`ErrorKind`] enum shared by every crate in the workspace.

use serde::Serialize;

/// エラー種別の列挙体
///
/// 利用者向けの画面が「何が起きたか」を判断するための分類です。
/// ドメイン固有のエラー（`SessionError` など）はすべてこの分類へ写像されます。
///
/// ## Notes
/// * `non_exhaustive` - 将来的に列挙子が追加される可能性があることを示す
///
/// ## Examples
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// let kind = ErrorKind::Conflict;
/// assert_eq!(kind.code(), "CONFLICT");
/// assert_eq!(kind.as_str(), "Conflict");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// 入力が不正
    BadRequest,
    /// 認証されていない、または資格情報が誤っている
    Unauthorized,
    /// 認証済みだが権限がない（承認待ちを含む）
    Forbidden,
    /// 対象が存在しない
    NotFound,
    /// 現在の状態と競合（ユーザー名の重複など）
    Conflict,
    /// 外部から取得したデータが期待する形式と一致しない
    UnprocessableEntity,
    /// レート制限超過
    TooManyRequests,
    /// 内部エラー
    Internal,
    /// 外部サービス（認証基盤・ドキュメントストア）が利用不可
    ServiceUnavailable,
}

impl ErrorKind {
    /// 機械可読なコードを取得
    ///
    /// ## Examples
    /// ```rust
    /// use kernel::error::kind::ErrorKind;
    /// assert_eq!(ErrorKind::TooManyRequests.code(), "TOO_MANY_REQUESTS");
    /// ```
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BAD_REQUEST",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::UnprocessableEntity => "UNPROCESSABLE_ENTITY",
            ErrorKind::TooManyRequests => "TOO_MANY_REQUESTS",
            ErrorKind::Internal => "INTERNAL",
            ErrorKind::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        }
    }

    /// ユーザー向けの文字列表現を取得
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::UnprocessableEntity => "Unprocessable Entity",
            ErrorKind::TooManyRequests => "Too Many Requests",
            ErrorKind::Internal => "Internal Error",
            ErrorKind::ServiceUnavailable => "Service Unavailable",
        }
    }

    /// システム側の障害かどうかを判定
    ///
    /// `true` の場合はログに記録すべきです。
    #[inline]
    pub const fn is_system_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::UnprocessableEntity | ErrorKind::Internal | ErrorKind::ServiceUnavailable
        )
    }

    /// 利用者の再送信で解消しうるかどうか
    #[inline]
    pub const fn is_transient(&self) -> bool {
        matches!(self, ErrorKind::TooManyRequests | ErrorKind::ServiceUnavailable)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(ErrorKind::BadRequest.code(), "BAD_REQUEST");
        assert_eq!(ErrorKind::Unauthorized.code(), "UNAUTHORIZED");
        assert_eq!(ErrorKind::UnprocessableEntity.code(), "UNPROCESSABLE_ENTITY");
        assert_eq!(ErrorKind::ServiceUnavailable.code(), "SERVICE_UNAVAILABLE");
    }

    #[test]
    fn test_code_matches_serde() {
        let json = serde_json::to_string(&ErrorKind::TooManyRequests).unwrap();
        assert_eq!(json, format!("\"{}\"", ErrorKind::TooManyRequests.code()));
    }

    #[test]
    fn test_is_system_error() {
        assert!(!ErrorKind::Conflict.is_system_error());
        assert!(!ErrorKind::Unauthorized.is_system_error());
        assert!(ErrorKind::Internal.is_system_error());
        assert!(ErrorKind::UnprocessableEntity.is_system_error());
    }

    #[test]
    fn test_is_transient() {
        assert!(ErrorKind::TooManyRequests.is_transient());
        assert!(ErrorKind::ServiceUnavailable.is_transient());
        assert!(!ErrorKind::Forbidden.is_transient());
    }
}
