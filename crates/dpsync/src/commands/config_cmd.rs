//! Config subcommand handlers.

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "item_delay_ms = {}", cfg.defaults.item_delay_ms);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "server = \"{}\"", p.server);
        let _ = writeln!(out, "site = \"{}\"", p.site);
        let _ = writeln!(out, "auth_mode = \"{}\"", p.auth_mode);
        if p.api_key.is_some() {
            let _ = writeln!(out, "api_key = \"****\"");
        }
        if let Some(ref env) = p.api_key_env {
            let _ = writeln!(out, "api_key_env = \"{env}\"");
        }
        if let Some(ref u) = p.username {
            let _ = writeln!(out, "username = \"{u}\"");
        }
        if p.password.is_some() {
            let _ = writeln!(out, "password = \"****\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    out
}

/// Offer to store a secret in the system keyring or return it for
/// plaintext config. Returns `Some(secret)` if the user chose plaintext,
/// `None` if stored in the keyring.
fn prompt_keyring_storage(secret: &str, keyring_key: &str) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where should the secret be stored?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        let entry = keyring::Entry::new("dpsync", keyring_key).map_err(|e| CliError::Validation {
            field: "keyring".into(),
            reason: format!("keyring unavailable: {e}"),
        })?;
        entry.set_password(secret).map_err(|e| CliError::Validation {
            field: "keyring".into(),
            reason: format!("failed to store secret: {e}"),
        })?;
        eprintln!("Secret stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(secret.to_owned()))
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),

        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            output::print_output(&format_config_redacted(&cfg), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
    }
}

/// Interactive profile setup: the two site values (server URL and site
/// code), then credentials.
fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load_config_or_default();

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let server: String = Input::new()
        .with_prompt("Management server URL")
        .validate_with(|input: &String| -> Result<(), String> {
            input
                .parse::<url::Url>()
                .map(|_| ())
                .map_err(|e| format!("invalid URL: {e}"))
        })
        .interact_text()
        .map_err(prompt_err)?;

    let site: String = Input::new()
        .with_prompt("Site code")
        .interact_text()
        .map_err(prompt_err)?;

    let auth_selection = Select::new()
        .with_prompt("Authentication method")
        .items(&["API key", "Username + password"])
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let mut profile = Profile {
        server,
        site,
        auth_mode: String::new(),
        api_key: None,
        api_key_env: None,
        username: None,
        password: None,
        ca_cert: None,
        insecure: None,
        timeout: None,
    };

    if auth_selection == 0 {
        profile.auth_mode = "api-key".into();
        let key = rpassword::prompt_password("API key: ").map_err(prompt_err)?;
        if key.is_empty() {
            return Err(CliError::Validation {
                field: "api_key".into(),
                reason: "API key cannot be empty".into(),
            });
        }
        profile.api_key = prompt_keyring_storage(&key, &format!("{profile_name}/api-key"))?;
    } else {
        profile.auth_mode = "password".into();
        let username: String = Input::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(prompt_err)?;
        let password = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
        if username.is_empty() || password.is_empty() {
            return Err(CliError::Validation {
                field: "credentials".into(),
                reason: "username and password cannot be empty".into(),
            });
        }
        profile.username = Some(username);
        profile.password = prompt_keyring_storage(&password, &format!("{profile_name}/password"))?;
    }

    if cfg.default_profile.is_none() {
        cfg.default_profile = Some(profile_name.clone());
    }
    cfg.profiles.insert(profile_name.clone(), profile);
    config::save_config(&cfg)?;

    if !global.quiet {
        eprintln!(
            "Profile '{profile_name}' saved to {}",
            config::config_path().display()
        );
    }
    Ok(())
}
