use std::collections::HashMap;

use secrecy::{ExposeSecret, Secret};

/// Checks a username/password pair.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;

    fn knows_user(&self, username: &str) -> bool;
}

/// Plaintext username → password mapping from the config file.
#[derive(Default)]
pub struct StaticCredentials {
    users: HashMap<String, Secret<String>>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            users: pairs
                .into_iter()
                .map(|(user, pass)| (user.to_owned(), Secret::new(pass.to_owned())))
                .collect(),
        }
    }

    pub fn insert(&mut self, username: impl Into<String>, password: impl Into<String>) {
        self.users
            .insert(username.into(), Secret::new(password.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut users: Vec<_> = self.users.keys().collect();
        users.sort();
        f.debug_struct("StaticCredentials")
            .field("users", &users)
            .finish()
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .is_some_and(|expected| safe_equal(expected.expose_secret(), password))
    }

    fn knows_user(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }
}

/// Constant-time string comparison.
fn safe_equal(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes()
        .iter()
        .zip(b.as_bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
