//! Environment-driven session cookie configuration.
//!
//! Debug builds tolerate missing toggles and fall back to safe defaults with
//! a warning; release builds require every toggle to be explicit and valid.

use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use tracing::warn;
use zeroize::Zeroize;

const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;
const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const SAMESITE_ENV: &str = "SESSION_SAMESITE";
const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";
const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Build mode governing how strictly toggles are validated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Missing or invalid toggles default with a warning.
    Debug,
    /// Every toggle must be present and valid.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Validated session cookie settings.
pub struct SessionSettings {
    /// Signing key for cookie sessions.
    pub key: Key,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// `SameSite` policy for session cookies.
    pub same_site: SameSite,
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv {
        /// Name of the missing variable.
        name: &'static str,
    },
    /// A variable is present but holds an unrecognised value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        /// Name of the offending variable.
        name: &'static str,
        /// Raw value supplied.
        value: String,
        /// Accepted forms.
        expected: &'static str,
    },
    /// Reading the session key file failed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        /// Key file path that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The session key file is shorter than release builds permit.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        /// Key file path that was read.
        path: PathBuf,
        /// Bytes actually present.
        length: usize,
        /// Minimum accepted length.
        min_len: usize,
    },
    /// `SameSite=None` requires a secure cookie in release builds.
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    /// Release builds must not run on a generated session key.
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Build session settings from environment variables and build mode.
///
/// Reads `SESSION_COOKIE_SECURE`, `SESSION_SAMESITE`,
/// `SESSION_ALLOW_EPHEMERAL` and `SESSION_KEY_FILE`. The key file must hold
/// at least 64 bytes in release builds; debug builds (or an explicit
/// ephemeral opt-in) fall back to a generated key when the file is absent.
///
/// # Errors
/// Returns a [`SessionConfigError`] when a toggle is missing or invalid
/// under the given [`BuildMode`].
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = bool_toggle(env, COOKIE_SECURE_ENV, mode, true)?;
    let same_site = same_site_from_env(env, mode, cookie_secure)?;
    let allow_ephemeral = allow_ephemeral_from_env(env, mode)?;
    let key = session_key_from_env(env, mode, allow_ephemeral)?;

    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

fn bool_toggle<E: Env>(
    env: &E,
    name: &'static str,
    mode: BuildMode,
    debug_default: bool,
) -> Result<bool, SessionConfigError> {
    let Some(value) = env.string(name) else {
        if mode.is_debug() {
            warn!(name, debug_default, "session toggle not set; using default");
            return Ok(debug_default);
        }
        return Err(SessionConfigError::MissingEnv { name });
    };
    match parse_bool(&value) {
        Some(flag) => Ok(flag),
        None => {
            if mode.is_debug() {
                warn!(name, value = %value, "invalid session toggle; using default");
                Ok(debug_default)
            } else {
                Err(SessionConfigError::InvalidEnv {
                    name,
                    value,
                    expected: BOOL_EXPECTED,
                })
            }
        }
    }
}

fn same_site_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let default_same_site = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };

    let Some(value) = env.string(SAMESITE_ENV) else {
        if mode.is_debug() {
            warn!("SESSION_SAMESITE not set; using default");
            return Ok(default_same_site);
        }
        return Err(SessionConfigError::MissingEnv { name: SAMESITE_ENV });
    };

    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" => {
            if !cookie_secure {
                if !mode.is_debug() {
                    return Err(SessionConfigError::InsecureSameSiteNone);
                }
                warn!(
                    "SESSION_SAMESITE=None with SESSION_COOKIE_SECURE=0; \
                     browsers may reject third-party cookies"
                );
            }
            Ok(SameSite::None)
        }
        _ => {
            if mode.is_debug() {
                warn!(value = %value, "invalid SESSION_SAMESITE; using default");
                Ok(default_same_site)
            } else {
                Err(SessionConfigError::InvalidEnv {
                    name: SAMESITE_ENV,
                    value,
                    expected: SAMESITE_EXPECTED,
                })
            }
        }
    }
}

fn allow_ephemeral_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<bool, SessionConfigError> {
    let allowed = bool_toggle(env, ALLOW_EPHEMERAL_ENV, mode, false)?;
    if allowed && !mode.is_debug() {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    Ok(allowed)
}

fn session_key_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| SESSION_KEY_DEFAULT_PATH.to_owned()),
    );

    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if mode == BuildMode::Release && length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(SessionConfigError::KeyTooShort {
                    path,
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) => {
            if mode.is_debug() || allow_ephemeral {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "using temporary session key (dev only)"
                );
                Ok(Key::generate())
            } else {
                Err(SessionConfigError::KeyRead {
                    path,
                    source: error,
                })
            }
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use std::collections::HashMap;
    use std::io::Write;

    use mockable::MockEnv;
    use rstest::rstest;

    use super::*;

    fn env_of(pairs: &[(&'static str, &str)]) -> MockEnv {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        let mut env = MockEnv::new();
        env.expect_string()
            .returning(move |name| vars.get(name).cloned());
        env
    }

    fn key_file(len: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp key file");
        file.write_all(&vec![b'k'; len]).expect("write key bytes");
        file
    }

    fn path_str(file: &tempfile::NamedTempFile) -> String {
        file.path().to_str().expect("utf8 path").to_owned()
    }

    #[rstest]
    fn release_accepts_a_full_valid_environment() {
        let file = key_file(SESSION_KEY_MIN_LEN);
        let env = env_of(&[
            (KEY_FILE_ENV, &path_str(&file)),
            (COOKIE_SECURE_ENV, "1"),
            (SAMESITE_ENV, "Strict"),
            (ALLOW_EPHEMERAL_ENV, "0"),
        ]);

        let settings =
            session_settings_from_env(&env, BuildMode::Release).expect("valid settings");

        assert!(settings.cookie_secure);
        assert_eq!(settings.same_site, SameSite::Strict);
    }

    #[rstest]
    fn release_rejects_a_missing_cookie_secure_toggle() {
        let env = env_of(&[]);

        let error = session_settings_from_env(&env, BuildMode::Release)
            .err()
            .expect("missing toggle fails");

        assert!(matches!(
            error,
            SessionConfigError::MissingEnv {
                name: COOKIE_SECURE_ENV
            }
        ));
    }

    #[rstest]
    fn release_rejects_a_short_key_file() {
        let file = key_file(16);
        let env = env_of(&[
            (KEY_FILE_ENV, &path_str(&file)),
            (COOKIE_SECURE_ENV, "1"),
            (SAMESITE_ENV, "Lax"),
            (ALLOW_EPHEMERAL_ENV, "0"),
        ]);

        let error = session_settings_from_env(&env, BuildMode::Release)
            .err()
            .expect("short key fails");

        assert!(matches!(
            error,
            SessionConfigError::KeyTooShort { length: 16, .. }
        ));
    }

    #[rstest]
    fn release_rejects_samesite_none_without_secure_cookies() {
        let file = key_file(SESSION_KEY_MIN_LEN);
        let env = env_of(&[
            (KEY_FILE_ENV, &path_str(&file)),
            (COOKIE_SECURE_ENV, "0"),
            (SAMESITE_ENV, "None"),
            (ALLOW_EPHEMERAL_ENV, "0"),
        ]);

        let error = session_settings_from_env(&env, BuildMode::Release)
            .err()
            .expect("insecure SameSite=None fails");

        assert!(matches!(error, SessionConfigError::InsecureSameSiteNone));
    }

    #[rstest]
    fn release_rejects_ephemeral_keys() {
        let env = env_of(&[
            (COOKIE_SECURE_ENV, "1"),
            (SAMESITE_ENV, "Lax"),
            (ALLOW_EPHEMERAL_ENV, "1"),
        ]);

        let error = session_settings_from_env(&env, BuildMode::Release)
            .err()
            .expect("ephemeral opt-in fails");

        assert!(matches!(error, SessionConfigError::EphemeralNotAllowed));
    }

    #[rstest]
    fn debug_defaults_when_nothing_is_configured() {
        let env = env_of(&[(KEY_FILE_ENV, "/nonexistent/session_key")]);

        let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug defaults");

        assert!(settings.cookie_secure);
        assert_eq!(settings.same_site, SameSite::Lax);
    }

    #[rstest]
    #[case("1", Some(true))]
    #[case("yes", Some(true))]
    #[case("Y", Some(true))]
    #[case("0", Some(false))]
    #[case("No", Some(false))]
    #[case("maybe", None)]
    fn parse_bool_accepts_the_documented_forms(
        #[case] raw: &str,
        #[case] expected: Option<bool>,
    ) {
        assert_eq!(parse_bool(raw), expected);
    }
}
