//! Command token allow-list
//!
//! The single gate between user-submitted form data and the process
//! boundary. Only tokens parsed into a `CommandToken` may ever reach an
//! argument list; new commands are added here and nowhere else.

use std::str::FromStr;

/// A command the external interpreter is allowed to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandToken {
    /// Ask the hydrus client for its API version
    ApiVersion,
}

impl CommandToken {
    /// Wire form of the token, as passed to the interpreter
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApiVersion => "api_ver",
        }
    }
}

impl FromStr for CommandToken {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "api_ver" => Ok(Self::ApiVersion),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}

/// Rejection for anything outside the allow-list
#[derive(Debug, thiserror::Error)]
#[error("command '{0}' is not in the allow-list")]
pub struct UnknownCommand(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_api_version_token() {
        let token: CommandToken = "api_ver".parse().unwrap();
        assert_eq!(token, CommandToken::ApiVersion);
        assert_eq!(token.as_str(), "api_ver");
    }

    #[test]
    fn rejects_everything_else() {
        assert!("".parse::<CommandToken>().is_err());
        assert!("api_version".parse::<CommandToken>().is_err());
        assert!("API_VER".parse::<CommandToken>().is_err());
        assert!("api_ver; rm -rf /".parse::<CommandToken>().is_err());
    }

    #[test]
    fn rejection_names_the_offending_token() {
        let err = "shutdown".parse::<CommandToken>().unwrap_err();
        assert!(err.to_string().contains("'shutdown'"));
    }
}
