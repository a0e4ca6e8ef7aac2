/// Azure DevOps personal access token.
///
/// `Debug` is redacted so the token never reaches logs.
#[derive(Clone)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Token(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let token = Token::from("super-secret-pat");
        assert_eq!(token.as_str(), "super-secret-pat");
        assert!(!format!("{token:?}").contains("super-secret"));
    }
}
