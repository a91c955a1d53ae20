use crate::cli::{
    actions::Action,
    settings::{Environment, Settings},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::path::PathBuf;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let required = |name: &str| -> Result<String> {
        matches
            .get_one::<String>(name)
            .map(String::to_string)
            .with_context(|| format!("missing required argument: --{name}"))
    };

    let settings = Settings {
        port: matches.get_one::<u16>("port").copied().unwrap_or(3001),
        admin_username: required("admin-username")?,
        admin_password: SecretString::from(required("admin-password")?),
        jwt_secret: SecretString::from(required("jwt-secret")?),
        frontend_url: required("frontend-url")?,
        uploads_dir: PathBuf::from(required("uploads-dir")?),
        environment: Environment::from_flag(&required("env")?),
        token_ttl_hours: matches
            .get_one::<i64>("token-ttl-hours")
            .copied()
            .unwrap_or(24),
    };

    Ok(Action::Server { settings })
}
