//! Environment snapshots consumed by the resolver

use indexmap::IndexMap;
use std::env;
use std::ffi::OsString;

/// An ordered, immutable-by-convention view of environment variables
///
/// The resolver only ever sees one of these, never the live process
/// environment, so tests can build one directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: IndexMap<String, String>,
}

impl Environment {
    /// Create an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment
    pub fn from_process() -> Self {
        Self::from_os_vars(env::vars_os())
    }

    /// Build a snapshot from raw OS strings
    ///
    /// Entries that are not valid UTF-8 are kept with lossy conversion so a
    /// broken `PORT*` value still reaches the resolver and gets reported.
    pub fn from_os_vars<I: IntoIterator<Item = (OsString, OsString)>>(vars: I) -> Self {
        let mut snapshot = IndexMap::new();
        for (key, value) in vars {
            let (key, value) = match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => (key, value),
                (key, value) => {
                    let key = key.unwrap_or_else(|k| k.to_string_lossy().into_owned());
                    let value = value.unwrap_or_else(|v| v.to_string_lossy().into_owned());
                    tracing::warn!("Environment variable {} is not valid UTF-8: {:?}", key, value);
                    (key, value)
                }
            };
            snapshot.insert(key, value);
        }
        Self { vars: snapshot }
    }

    /// Set a variable
    pub fn set<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) -> &mut Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Look up a variable
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Iterate over every variable whose name starts with `prefix` (case-sensitive)
    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.vars
            .iter()
            .filter(move |(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Get the variables as a map
    pub fn vars(&self) -> &IndexMap<String, String> {
        &self.vars
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}
