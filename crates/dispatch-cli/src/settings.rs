use anyhow::{bail, Context};
use dispatch_core::{Config, Credential, Session};
use std::path::PathBuf;

/// Values taken from flags or their environment variables. The API key is
/// wrapped as soon as it is parsed so no rendering of `Flags` shows it.
#[derive(Debug, Default)]
pub struct Flags {
    pub server: Option<String>,
    pub site: Option<String>,
    pub user: Option<String>,
    pub apikey: Option<Credential>,
    pub config: Option<PathBuf>,
}

pub struct Settings {
    pub session: Session,
    pub user: String,
    pub config: Config,
}

/// Merge flags over the optional config file.
///
/// Priority per value:
/// 1. `--flag` / environment variable
/// 2. config file (except the API key, which is never read from a file)
pub fn resolve(flags: &Flags) -> anyhow::Result<Settings> {
    let config = match &flags.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    let server = non_empty(flags.server.as_ref().or(config.server.as_ref()));
    let site = non_empty(flags.site.as_ref().or(config.site.as_ref()));
    let user = non_empty(flags.user.as_ref().or(config.user.as_ref()));
    let apikey = flags
        .apikey
        .as_ref()
        .map(|key| key.expose().trim())
        .filter(|key| !key.is_empty());

    let (Some(server), Some(site), Some(user), Some(apikey)) = (server, site, user, apikey) else {
        let missing: Vec<&str> = [
            ("server", server.is_none()),
            ("site", site.is_none()),
            ("user", user.is_none()),
            ("apikey", apikey.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();
        bail!(
            "missing required arguments: {}\n\
             Pass --server, --site, --user and --apikey (or set DISPATCH_SERVER, \
             DISPATCH_SITE, DISPATCH_USER and DISPATCH_API_KEY)",
            missing.join(", ")
        );
    };

    let session = Session::new(server, site, Credential::new(apikey))
        .context("invalid server address")?;

    Ok(Settings {
        session,
        user: user.to_string(),
        config,
    })
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}
