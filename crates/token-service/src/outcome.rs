use token_core::{Result, TokenError};

/// Result of a facade operation.
///
/// `data` always holds a usable value: on failure it is the operation's
/// fallback and `error` carries what went wrong.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub data: T,
    pub error: Option<TokenError>,
}

impl<T> Outcome<T> {
    pub fn ok(data: T) -> Self {
        Self { data, error: None }
    }

    pub fn failed(fallback: T, error: TokenError) -> Self {
        Self {
            data: fallback,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Drop the fallback and surface the error, if any
    pub fn into_result(self) -> Result<T> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.data),
        }
    }
}

impl<T> Outcome<Vec<T>> {
    /// A full page came back, so older rows may exist
    pub fn may_have_more(&self, limit: usize) -> bool {
        limit > 0 && self.data.len() >= limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_keeps_fallback() {
        let outcome = Outcome::failed(18u8, TokenError::Transport("down".to_string()));
        assert!(!outcome.is_ok());
        assert_eq!(outcome.data, 18);
        assert_eq!(
            outcome.into_result(),
            Err(TokenError::Transport("down".to_string()))
        );
    }

    #[test]
    fn test_may_have_more() {
        let page = Outcome::ok(vec![1, 2, 3]);
        assert!(page.may_have_more(3));
        assert!(!page.may_have_more(4));
        assert!(!Outcome::ok(Vec::<u8>::new()).may_have_more(0));
    }
}
