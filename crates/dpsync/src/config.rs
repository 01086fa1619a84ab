//! CLI configuration — thin wrapper around `dpsync_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--server, --site, --api-key, ...).

use std::time::Duration;

use clap::ValueEnum;
use secrecy::SecretString;

use dpsync_core::{AuthCredentials, ServerConfig, TlsVerification};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use dpsync_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Fill unset global flags from the config `[defaults]` section.
///
/// Flags and env vars always win; the config supplies values only where
/// the operator said nothing. An unparseable default falls back to the
/// built-in (table / auto).
pub fn apply_defaults(global: &mut GlobalOpts, defaults: &Defaults) {
    if global.output.is_none() {
        global.output = OutputFormat::from_str(&defaults.output, true).ok();
    }
    if global.color.is_none() {
        global.color = ColorMode::from_str(&defaults.color, true).ok();
    }
    global.insecure = global.insecure || defaults.insecure;
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Translate a `Profile` + global flags into a `ServerConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
    default_timeout: u64,
) -> Result<ServerConfig, CliError> {
    // 1. Server URL (flag > env > profile)
    let url_str = global.server.as_deref().unwrap_or(&profile.server);
    let url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    // 2. Auth credentials (CLI flag overrides take priority)
    let auth = match profile.auth_mode.as_str() {
        "api-key" => {
            let secret = resolve_api_key_with_flag(profile, profile_name, global)?;
            AuthCredentials::ApiKey(secret)
        }
        "password" => {
            let (username, password) =
                dpsync_config::resolve_password_credentials(profile, profile_name)?;
            AuthCredentials::Credentials { username, password }
        }
        other => {
            return Err(CliError::Validation {
                field: "auth_mode".into(),
                reason: format!("expected 'api-key' or 'password', got '{other}'"),
            });
        }
    };

    // 3. TLS verification
    let tls = if global.insecure || profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    // 4. Site code (flag > env > profile)
    let site = global.site.as_deref().unwrap_or(&profile.site).to_string();

    // 5. Timeout (flag > profile > config defaults)
    let timeout = Duration::from_secs(
        global
            .timeout
            .or(profile.timeout)
            .unwrap_or(default_timeout),
    );

    Ok(ServerConfig {
        url,
        site,
        auth,
        tls,
        timeout,
    })
}

/// Build a `ServerConfig` from the config file, profile, and CLI overrides.
pub fn build_server_config(global: &GlobalOpts, config: &Config) -> Result<ServerConfig, CliError> {
    let profile_name = active_profile_name(global, config);

    // If a profile exists, use it with CLI flag overrides
    if let Some(profile) = config.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, global, config.defaults.timeout);
    }

    // No profile found -- try to build from CLI flags / env vars alone
    let url_str = global.server.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;

    let url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    let auth = if let Some(ref key) = global.api_key {
        AuthCredentials::ApiKey(SecretString::from(key.clone()))
    } else {
        return Err(CliError::NoCredentials {
            profile: profile_name,
        });
    };

    let tls = if global.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        TlsVerification::SystemDefaults
    };

    let site = global.site.clone().ok_or_else(|| CliError::Validation {
        field: "site".into(),
        reason: "site code is required (--site or profile)".into(),
    })?;

    Ok(ServerConfig {
        url,
        site,
        auth,
        tls,
        timeout: Duration::from_secs(global.timeout.unwrap_or(config.defaults.timeout)),
    })
}

/// Resolve API key with CLI flag override, then fall through to shared resolution.
fn resolve_api_key_with_flag(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<SecretString, CliError> {
    // CLI flag takes priority
    if let Some(ref key) = global.api_key {
        return Ok(SecretString::from(key.clone()));
    }
    Ok(dpsync_config::resolve_api_key(profile, profile_name)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn bare_global() -> GlobalOpts {
        GlobalOpts {
            profile: None,
            server: None,
            site: None,
            api_key: None,
            output: None,
            color: None,
            verbose: 0,
            quiet: false,
            yes: false,
            insecure: false,
            timeout: None,
            log_file: None,
        }
    }

    fn profile() -> Profile {
        Profile {
            server: "https://siteserver.corp.example.com".into(),
            site: "HQ1".into(),
            auth_mode: "api-key".into(),
            api_key: Some("test-key".into()),
            api_key_env: None,
            username: None,
            password: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
        }
    }

    #[test]
    fn profile_timeout_applies_when_flag_is_absent() {
        let mut p = profile();
        p.timeout = Some(120);
        let server = resolve_profile(&p, "default", &bare_global(), 30).unwrap();
        assert_eq!(server.timeout, Duration::from_secs(120));
    }

    #[test]
    fn timeout_flag_overrides_profile_and_defaults() {
        let mut p = profile();
        p.timeout = Some(120);
        let mut global = bare_global();
        global.timeout = Some(5);
        let server = resolve_profile(&p, "default", &global, 30).unwrap();
        assert_eq!(server.timeout, Duration::from_secs(5));
    }

    #[test]
    fn config_default_timeout_is_the_fallback() {
        let server = resolve_profile(&profile(), "default", &bare_global(), 45).unwrap();
        assert_eq!(server.timeout, Duration::from_secs(45));
    }

    #[test]
    fn defaults_fill_unset_output_color_and_insecure() {
        let mut global = bare_global();
        let defaults = Defaults {
            output: "json".into(),
            color: "never".into(),
            insecure: true,
            timeout: 30,
            item_delay_ms: 250,
        };
        apply_defaults(&mut global, &defaults);

        assert!(matches!(global.output, Some(OutputFormat::Json)));
        assert!(matches!(global.color, Some(ColorMode::Never)));
        assert!(global.insecure);
        assert!(matches!(
            global.output_format(),
            OutputFormat::Json
        ));
    }

    #[test]
    fn flags_win_over_defaults() {
        let mut global = bare_global();
        global.output = Some(OutputFormat::Yaml);
        let defaults = Defaults::default();
        apply_defaults(&mut global, &defaults);
        assert!(matches!(global.output, Some(OutputFormat::Yaml)));
        assert!(matches!(global.color, Some(ColorMode::Auto)));
    }
}
