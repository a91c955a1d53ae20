use secrecy::SecretString;
use std::path::PathBuf;

/// Deployment environment, controls the `Secure` attribute on cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Production,
}

impl Environment {
    #[must_use]
    pub fn from_flag(flag: &str) -> Self {
        if flag.eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Dev
        }
    }
}

/// Immutable process configuration, assembled once at startup from CLI
/// arguments and environment variables.
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub admin_username: String,
    pub admin_password: SecretString,
    pub jwt_secret: SecretString,
    pub frontend_url: String,
    pub uploads_dir: PathBuf,
    pub environment: Environment,
    pub token_ttl_hours: i64,
}

impl Settings {
    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.environment == Environment::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn settings(environment: Environment) -> Settings {
        Settings {
            port: 3001,
            admin_username: "admin".to_string(),
            admin_password: SecretString::from("hunter2"),
            jwt_secret: SecretString::from("secret"),
            frontend_url: "http://localhost:5173".to_string(),
            uploads_dir: PathBuf::from("./uploads"),
            environment,
            token_ttl_hours: 24,
        }
    }

    #[test]
    fn test_environment_from_flag() {
        assert_eq!(Environment::from_flag("production"), Environment::Production);
        assert_eq!(Environment::from_flag("PRODUCTION"), Environment::Production);
        assert_eq!(Environment::from_flag("dev"), Environment::Dev);
        assert_eq!(Environment::from_flag("staging"), Environment::Dev);
    }

    #[test]
    fn test_cookie_secure_follows_environment() {
        assert!(!settings(Environment::Dev).cookie_secure());
        assert!(settings(Environment::Production).cookie_secure());
    }

    #[test]
    fn test_secrets_are_not_printed_in_debug() {
        let settings = settings(Environment::Dev);
        let debug = format!("{settings:?}");
        assert!(!debug.contains("hunter2"));
        assert_eq!(settings.admin_password.expose_secret(), "hunter2");
    }
}
