//! Acting-user resolution for CLI commands.
//!
//! The resolution chain: `--as` flag > `LECTERN_USER` env > `user` in the user
//! config. The resolved identifier is matched by id or email against the
//! store's user list. Only comment and user-management commands need one.

use lectern_core::Store;
use lectern_core::model::User;
use std::env;

/// Errors from identity resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityError {
    pub message: String,
    pub code: &'static str,
    pub suggestion: &'static str,
}

impl std::fmt::Display for IdentityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for IdentityError {}

/// Environment reader trait for dependency injection in tests.
trait EnvReader {
    fn get(&self, key: &str) -> Option<String>;
}

struct RealEnv;

impl EnvReader for RealEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.is_empty())
    }
}

fn resolve_ident_with(
    cli_flag: Option<&str>,
    config_user: Option<&str>,
    env: &dyn EnvReader,
) -> Option<String> {
    if let Some(ident) = cli_flag.map(str::trim).filter(|s| !s.is_empty()) {
        return Some(ident.to_string());
    }

    if let Some(val) = env.get("LECTERN_USER") {
        return Some(val);
    }

    config_user
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// The raw identifier from flag, env, or config, if any.
pub fn resolve_ident(cli_flag: Option<&str>, config_user: Option<&str>) -> Option<String> {
    resolve_ident_with(cli_flag, config_user, &RealEnv)
}

/// Resolve the acting user against the store's user list.
pub fn require_user(
    store: &Store,
    cli_flag: Option<&str>,
    config_user: Option<&str>,
) -> Result<User, IdentityError> {
    let ident = resolve_ident(cli_flag, config_user).ok_or_else(|| IdentityError {
        message: "User identity required for this command.".to_string(),
        code: "missing_user",
        suggestion: "Pass --as <email>, or set LECTERN_USER, or `user` in the user config",
    })?;

    store.find_user(&ident).cloned().ok_or_else(|| IdentityError {
        message: format!("no user matches '{ident}'"),
        code: "unknown_user",
        suggestion: "Run `lec user list` to see known ids and emails",
    })
}

/// Like [`require_user`], additionally requiring the admin role.
pub fn require_admin(
    store: &Store,
    cli_flag: Option<&str>,
    config_user: Option<&str>,
) -> Result<User, IdentityError> {
    let user = require_user(store, cli_flag, config_user)?;
    if user.is_admin() {
        Ok(user)
    } else {
        Err(IdentityError {
            message: format!("user '{}' is not an admin", user.email),
            code: "not_admin",
            suggestion: "Act as an admin with --as <admin email>",
        })
    }
}
