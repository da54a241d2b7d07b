use crate::api::auth::error::AuthError;

/// Who is making a request, as far as write permission is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    Admin,
    Anonymous,
}

impl Caller {
    /// Resolves the caller from an optional bearer token.
    ///
    /// A missing token yields [`Caller::Anonymous`], a token that does not match is an error.
    pub fn from_bearer(token: Option<&str>, admin_token: &str) -> Result<Self, AuthError> {
        match token {
            None => Ok(Self::Anonymous),
            Some(token) if !admin_token.is_empty() && constant_time_eq(token, admin_token) => {
                Ok(Self::Admin)
            }
            Some(_) => Err(AuthError::InvalidToken),
        }
    }

    #[must_use]
    pub const fn can_write(self) -> bool {
        matches!(self, Self::Admin)
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_token_is_anonymous() -> color_eyre::Result<()> {
        let caller = Caller::from_bearer(None, "secret")?;
        assert_eq!(caller, Caller::Anonymous);
        assert!(!caller.can_write());
        Ok(())
    }

    #[test]
    fn test_matching_token_is_admin() -> color_eyre::Result<()> {
        let caller = Caller::from_bearer(Some("secret"), "secret")?;
        assert!(caller.can_write());
        Ok(())
    }

    #[test]
    fn test_wrong_token_is_rejected() {
        assert!(matches!(
            Caller::from_bearer(Some("secreT"), "secret"),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            Caller::from_bearer(Some(""), ""),
            Err(AuthError::InvalidToken)
        ));
    }
}
