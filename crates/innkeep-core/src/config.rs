use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{errors::Error, Result};

/// Typed configuration for the admin console.
#[derive(Clone, Debug)]
pub struct Config {
    // Collaborator API
    pub api_base_url: String,
    pub http_timeout: Duration,

    // Local key-value state (seen bookings, session flag)
    pub state_file: PathBuf,

    // Notification poller
    pub poll_interval: Duration,
    pub notification_dwell: Duration,
    pub alert_pulse: Duration,
    pub alert_sound: bool,

    // Login gate
    pub admin_username: String,
    pub admin_password: String,

    // Guest contact
    pub resthouse_name: String,
    pub open_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            http_timeout: Duration::from_secs(10),
            state_file: default_state_file(),
            poll_interval: Duration::from_secs(5),
            notification_dwell: Duration::from_secs(60),
            alert_pulse: Duration::from_millis(100),
            alert_sound: true,
            admin_username: "admin".to_string(),
            admin_password: "admin123".to_string(),
            resthouse_name: "Ganesh Resthouse".to_string(),
            open_command: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let defaults = Self::default();

        let api_base_url = env_str("INNKEEP_API_BASE_URL")
            .and_then(non_empty)
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);

        let http_timeout = env_millis("INNKEEP_HTTP_TIMEOUT_MS").unwrap_or(defaults.http_timeout);
        let state_file = env_path("INNKEEP_STATE_FILE").unwrap_or(defaults.state_file);

        let poll_interval =
            env_millis("INNKEEP_POLL_INTERVAL_MS").unwrap_or(defaults.poll_interval);
        let notification_dwell =
            env_millis("INNKEEP_NOTIFICATION_DWELL_MS").unwrap_or(defaults.notification_dwell);
        let alert_pulse = env_millis("INNKEEP_ALERT_PULSE_MS").unwrap_or(defaults.alert_pulse);
        let alert_sound = env_bool("INNKEEP_ALERT_SOUND").unwrap_or(defaults.alert_sound);

        let admin_username = env_str("INNKEEP_ADMIN_USERNAME")
            .and_then(non_empty)
            .unwrap_or(defaults.admin_username);
        let admin_password = env_str("INNKEEP_ADMIN_PASSWORD")
            .and_then(non_empty)
            .unwrap_or(defaults.admin_password);

        let resthouse_name = env_str("INNKEEP_RESTHOUSE_NAME")
            .and_then(non_empty)
            .unwrap_or(defaults.resthouse_name);
        let open_command = env_str("INNKEEP_OPEN_COMMAND").and_then(non_empty);

        let cfg = Self {
            api_base_url,
            http_timeout,
            state_file,
            poll_interval,
            notification_dwell,
            alert_pulse,
            alert_sound,
            admin_username,
            admin_password,
            resthouse_name,
            open_command,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects a non-http(s) API URL and zero durations.
    pub fn validate(&self) -> Result<()> {
        let url = &self.api_base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "INNKEEP_API_BASE_URL must be an http(s) URL, got {url}"
            )));
        }

        for (key, value) in [
            ("INNKEEP_HTTP_TIMEOUT_MS", self.http_timeout),
            ("INNKEEP_POLL_INTERVAL_MS", self.poll_interval),
            ("INNKEEP_NOTIFICATION_DWELL_MS", self.notification_dwell),
            ("INNKEEP_ALERT_PULSE_MS", self.alert_pulse),
        ] {
            if value.is_zero() {
                return Err(Error::Config(format!("{key} must be greater than zero")));
            }
        }
        Ok(())
    }
}

fn default_state_file() -> PathBuf {
    match home_dir() {
        Some(home) => home.join(".innkeep").join("state.json"),
        None => PathBuf::from("/tmp/innkeep-state.json"),
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim().trim_start_matches("export ").trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn env_bool(key: &str) -> Option<bool> {
    env_str(key).map(|s| parse_bool(&s))
}

fn env_millis(key: &str) -> Option<Duration> {
    env_str(key)
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME").map(PathBuf::from)
}
