// ABOUTME: Configuration types and parsing for noderoll.yml.
// ABOUTME: File values are optional; command-line overrides are applied on top.

use crate::backend::AwsCliConfig;
use crate::error::{Error, Result};
use crate::fleet::PollPolicy;
use crate::renew::RenewalSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "noderoll.yml";
pub const CONFIG_FILENAME_ALT: &str = "noderoll.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".noderoll/config.yml";

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV: &str = "NODEROLL_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    #[serde(default = "default_wait_timeout", with = "humantime_serde")]
    pub drain_timeout: Duration,

    #[serde(default = "default_wait_timeout", with = "humantime_serde")]
    pub registration_timeout: Duration,

    #[serde(default = "default_command_timeout", with = "humantime_serde")]
    pub command_timeout: Duration,

    #[serde(default = "default_true")]
    pub await_registration: bool,

    #[serde(default)]
    pub aws_profile: Option<String>,

    #[serde(default)]
    pub aws_region: Option<String>,

    #[serde(default = "default_aws_binary")]
    pub aws_binary: String,
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_wait_timeout() -> Duration {
    Duration::from_secs(600)
}

fn default_command_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_true() -> bool {
    true
}

fn default_aws_binary() -> String {
    "aws".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            poll_interval: default_poll_interval(),
            drain_timeout: default_wait_timeout(),
            registration_timeout: default_wait_timeout(),
            command_timeout: default_command_timeout(),
            await_registration: true,
            aws_profile: None,
            aws_region: None,
            aws_binary: default_aws_binary(),
        }
    }
}

/// Values given on the command line. `None` keeps the file value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub poll_interval: Option<Duration>,
    pub drain_timeout: Option<Duration>,
    pub registration_timeout: Option<Duration>,
    pub no_wait_registration: bool,
    pub aws_profile: Option<String>,
    pub aws_region: Option<String>,
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty file deserializes as null, not as an empty mapping.
        if yaml.trim().is_empty() {
            return Ok(Settings::default());
        }
        let settings: Settings = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Find a configuration file in `dir`, falling back to defaults when none exists.
    pub fn discover(dir: &Path) -> Result<Self> {
        match Self::find(dir) {
            Some(path) => {
                tracing::debug!("loading configuration from {}", path.display());
                Self::load(&path)
            }
            None => Ok(Settings::default()),
        }
    }

    /// Resolve settings for one invocation: explicit path, then `NODEROLL_CONFIG`,
    /// then discovery in `dir`.
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::load(Path::new(&path));
        }
        Self::discover(dir)
    }

    fn find(dir: &Path) -> Option<PathBuf> {
        [CONFIG_FILENAME, CONFIG_FILENAME_ALT, CONFIG_FILENAME_DIR]
            .into_iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Apply command-line overrides and re-validate.
    pub fn with_overrides(mut self, overrides: Overrides) -> Result<Self> {
        if let Some(v) = overrides.poll_interval {
            self.poll_interval = v;
        }
        if let Some(v) = overrides.drain_timeout {
            self.drain_timeout = v;
        }
        if let Some(v) = overrides.registration_timeout {
            self.registration_timeout = v;
        }
        if overrides.no_wait_registration {
            self.await_registration = false;
        }
        if overrides.aws_profile.is_some() {
            self.aws_profile = overrides.aws_profile;
        }
        if overrides.aws_region.is_some() {
            self.aws_region = overrides.aws_region;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.command_timeout.is_zero() {
            return Err(Error::InvalidConfig(
                "command_timeout must be greater than zero".to_string(),
            ));
        }
        if self.aws_binary.trim().is_empty() {
            return Err(Error::InvalidConfig("aws_binary cannot be empty".to_string()));
        }
        self.drain_policy().map_err(|e| Error::InvalidConfig(e.to_string()))?;
        if self.await_registration {
            self.registration_policy().map_err(|e| Error::InvalidConfig(e.to_string()))?;
        }
        Ok(())
    }

    pub fn drain_policy(&self) -> std::result::Result<PollPolicy, crate::fleet::ValidationError> {
        PollPolicy::new(self.poll_interval, self.drain_timeout)
    }

    pub fn registration_policy(
        &self,
    ) -> std::result::Result<PollPolicy, crate::fleet::ValidationError> {
        PollPolicy::new(self.poll_interval, self.registration_timeout)
    }

    pub fn renewal_settings(&self) -> RenewalSettings {
        RenewalSettings {
            poll_interval: self.poll_interval,
            drain_timeout: self.drain_timeout,
            await_registration: self.await_registration,
            registration_timeout: self.registration_timeout,
        }
    }

    pub fn aws_cli_config(&self) -> AwsCliConfig {
        AwsCliConfig {
            program: self.aws_binary.clone(),
            profile: self.aws_profile.clone(),
            region: self.aws_region.clone(),
            timeout: self.command_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_gives_defaults() {
        assert_eq!(Settings::from_yaml("").unwrap(), Settings::default());
    }

    #[test]
    fn durations_use_humantime() {
        let settings = Settings::from_yaml("poll_interval: 2s\ndrain_timeout: 15m\n").unwrap();
        assert_eq!(settings.poll_interval, Duration::from_secs(2));
        assert_eq!(settings.drain_timeout, Duration::from_secs(900));
        assert_eq!(settings.registration_timeout, Duration::from_secs(600));
    }

    #[test]
    fn interval_longer_than_timeout_is_rejected() {
        let err = Settings::from_yaml("poll_interval: 20m\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Settings::from_yaml("pol_interval: 5s\n").is_err());
    }

    #[test]
    fn overrides_replace_file_values() {
        let settings = Settings::from_yaml("aws_profile: prod\n")
            .unwrap()
            .with_overrides(Overrides {
                aws_profile: Some("staging".to_string()),
                no_wait_registration: true,
                ..Overrides::default()
            })
            .unwrap();
        assert_eq!(settings.aws_profile.as_deref(), Some("staging"));
        assert!(!settings.renewal_settings().await_registration);
    }

    #[test]
    fn aws_cli_config_carries_profile_region_and_timeout() {
        let settings = Settings {
            aws_region: Some("eu-west-1".to_string()),
            command_timeout: Duration::from_secs(30),
            ..Settings::default()
        };
        let cli = settings.aws_cli_config();
        assert_eq!(cli.region.as_deref(), Some("eu-west-1"));
        assert_eq!(cli.timeout, Duration::from_secs(30));
        assert_eq!(cli.program, "aws");
    }
}
