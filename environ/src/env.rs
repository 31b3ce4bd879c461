//! Sources of environment variable values

use crate::error::InjectError;
use std::collections::{BTreeMap, HashMap};
use std::env::{self, VarError};

/// Key/value lookup queried once per annotated field.
///
/// [`ProcessEnv`] reads the real process environment; maps implement the
/// trait so records can be populated from a fixed set of values.
pub trait Environment {
    /// Value of `key`, or `None` if it is not set.
    ///
    /// A variable that is set but cannot be read as a string is an error,
    /// never `None`, so it does not fall back to a default.
    fn lookup(&self, key: &str) -> Result<Option<String>, InjectError>;
}

/// The environment of the current process.
///
/// Variables whose value is not valid Unicode are reported as
/// [`InjectError::NotUnicode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn lookup(&self, key: &str) -> Result<Option<String>, InjectError> {
        match env::var(key) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(InjectError::NotUnicode {
                name: key.to_string(),
            }),
        }
    }
}

impl Environment for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Result<Option<String>, InjectError> {
        Ok(self.get(key).cloned())
    }
}

impl Environment for BTreeMap<String, String> {
    fn lookup(&self, key: &str) -> Result<Option<String>, InjectError> {
        Ok(self.get(key).cloned())
    }
}

impl<E: Environment + ?Sized> Environment for &E {
    fn lookup(&self, key: &str) -> Result<Option<String>, InjectError> {
        (**self).lookup(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_process_env_lookup() {
        env::set_var("ENVIRON_TEST_LOOKUP", "hello world");
        assert_eq!(
            ProcessEnv.lookup("ENVIRON_TEST_LOOKUP").unwrap().as_deref(),
            Some("hello world")
        );
        env::remove_var("ENVIRON_TEST_LOOKUP");
        assert_eq!(ProcessEnv.lookup("ENVIRON_TEST_LOOKUP").unwrap(), None);
    }

    #[test]
    #[serial]
    #[cfg(unix)]
    fn test_process_env_not_unicode() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        env::set_var("ENVIRON_TEST_NOT_UNICODE", OsStr::from_bytes(b"\xff\xfe"));
        let result = ProcessEnv.lookup("ENVIRON_TEST_NOT_UNICODE");
        assert!(matches!(
            result,
            Err(InjectError::NotUnicode { ref name }) if name == "ENVIRON_TEST_NOT_UNICODE"
        ));
        env::remove_var("ENVIRON_TEST_NOT_UNICODE");
    }

    #[test]
    fn test_map_lookup() {
        let vars = HashMap::from([("HOST".to_string(), "localhost".to_string())]);
        assert_eq!(vars.lookup("HOST").unwrap().as_deref(), Some("localhost"));
        assert_eq!(vars.lookup("PORT").unwrap(), None);
    }

    #[test]
    fn test_value_is_untouched() {
        let vars = BTreeMap::from([("PADDED".to_string(), "  spaced  ".to_string())]);
        assert_eq!(vars.lookup("PADDED").unwrap().as_deref(), Some("  spaced  "));
    }
}
