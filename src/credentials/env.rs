use std::env;

use anyhow::Result;

use super::{Credentials, LoadCredentials};

/// Reads login and password from two environment variables.
#[derive(Debug, Clone)]
pub struct EnvSource {
    pub login_var: String,
    pub password_var: String,
}

impl EnvSource {
    pub fn new(login_var: &str, password_var: &str) -> Self {
        Self { login_var: login_var.to_owned(), password_var: password_var.to_owned() }
    }
}

impl LoadCredentials for EnvSource {
    fn try_load(&self) -> Result<Option<Credentials>> {
        let login = env::var(&self.login_var).ok().filter(|v| !v.is_empty());
        let password = env::var(&self.password_var).ok().filter(|v| !v.is_empty());
        Ok(login.zip(password).map(|(login, password)| Credentials::new(login, password)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn reads_both_variables() {
        env::set_var("NADEO_MAPS_TEST_LOGIN", "env_login");
        env::set_var("NADEO_MAPS_TEST_PASSWORD", "env_password");
        let source = EnvSource::new("NADEO_MAPS_TEST_LOGIN", "NADEO_MAPS_TEST_PASSWORD");
        let creds = source.try_load().unwrap().unwrap();
        assert_eq!(creds, Credentials::new("env_login", "env_password"));
        env::remove_var("NADEO_MAPS_TEST_LOGIN");
        env::remove_var("NADEO_MAPS_TEST_PASSWORD");
    }

    #[test]
    #[serial]
    fn missing_password_yields_nothing() {
        env::set_var("NADEO_MAPS_TEST_LOGIN", "env_login");
        env::remove_var("NADEO_MAPS_TEST_PASSWORD");
        let source = EnvSource::new("NADEO_MAPS_TEST_LOGIN", "NADEO_MAPS_TEST_PASSWORD");
        assert_eq!(source.try_load().unwrap(), None);
        env::remove_var("NADEO_MAPS_TEST_LOGIN");
    }
}
