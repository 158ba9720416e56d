use anyhow::{Context, Result, bail};
use nix::unistd::{Uid, User};
use std::env;
use std::path::PathBuf;

/// Whose data is being cleaned. Resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub name: Option<String>,
    pub home: PathBuf,
    pub elevated: bool,
}

impl UserContext {
    /// Under `sudo` this is the invoking user, not root.
    pub fn from_env() -> Result<Self> {
        let sudo_user = env::var("SUDO_USER").ok();
        let user = env::var("USER").ok().or_else(|| {
            User::from_uid(Uid::current())
                .ok()
                .flatten()
                .map(|u| u.name)
        });

        let (name, home) = resolve_home(
            sudo_user.as_deref(),
            user.as_deref(),
            |name| User::from_name(name).ok().flatten().map(|u| u.dir),
            dirs::home_dir(),
        )
        .context("could not determine the home directory to clean")?;

        Ok(Self {
            name,
            home,
            elevated: Uid::effective().is_root(),
        })
    }
}

/// Picks the target user (`SUDO_USER` wins over `USER`) and its home from
/// the password database, falling back to `fallback_home`.
pub fn resolve_home(
    sudo_user: Option<&str>,
    user: Option<&str>,
    lookup: impl Fn(&str) -> Option<PathBuf>,
    fallback_home: Option<PathBuf>,
) -> Result<(Option<String>, PathBuf)> {
    let name = sudo_user
        .filter(|s| !s.is_empty())
        .or_else(|| user.filter(|s| !s.is_empty()))
        .map(str::to_string);

    if let Some(home) = name.as_deref().and_then(&lookup) {
        return Ok((name, home));
    }

    match fallback_home {
        Some(home) => Ok((name, home)),
        None => bail!("no passwd entry and no $HOME"),
    }
}
