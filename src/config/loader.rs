use super::Config;
use crate::error::ConfigError;
use anyhow::{Context, Result};
use directories::UserDirs;
use std::fs;
use std::path::{Path, PathBuf};

impl Config {
    /// Load `~/.scribetwin/config.toml`, writing defaults on first run.
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        let scribetwin_dir = home.join(".scribetwin");
        let config_path = scribetwin_dir.join("config.toml");

        if !scribetwin_dir.exists() {
            fs::create_dir_all(&scribetwin_dir)
                .context("Failed to create .scribetwin directory")?;
        }

        Self::load_or_init_at(&config_path)
    }

    /// Load an explicit config path (`~` is expanded), writing defaults when missing.
    pub fn load_or_init_at(path: &Path) -> Result<Self> {
        let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref());

        let mut config = if expanded.exists() {
            let contents = fs::read_to_string(&expanded).context("Failed to read config file")?;
            let mut config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;
            config.config_path.clone_from(&expanded);
            config
        } else {
            let config = Self {
                config_path: expanded,
                ..Self::default()
            };
            config.save()?;
            config
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }

    /// Reject settings the refinement loop cannot honour.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let style = &self.style;
        if !(0.0..=1.0).contains(&style.similarity_threshold) {
            return Err(ConfigError::Validation(format!(
                "style.similarity_threshold must be within [0, 1], got {}",
                style.similarity_threshold
            )));
        }
        if style.embedding_weight < 0.0 || style.llm_weight < 0.0 {
            return Err(ConfigError::Validation(
                "style weights must not be negative".into(),
            ));
        }
        if style.min_sample_texts == 0 {
            return Err(ConfigError::Validation(
                "style.min_sample_texts must be at least 1".into(),
            ));
        }
        if style.chunk_size == 0 || style.chunk_overlap >= style.chunk_size {
            return Err(ConfigError::Validation(format!(
                "style.chunk_overlap ({}) must be smaller than style.chunk_size ({})",
                style.chunk_overlap, style.chunk_size
            )));
        }
        if self.content.min_word_count > self.content.max_word_count {
            return Err(ConfigError::Validation(format!(
                "content.min_word_count ({}) exceeds content.max_word_count ({})",
                self.content.min_word_count, self.content.max_word_count
            )));
        }
        if !(0.0..=1.0).contains(&self.content.min_unique_word_ratio) {
            return Err(ConfigError::Validation(
                "content.min_unique_word_ratio must be within [0, 1]".into(),
            ));
        }
        if self.reliability.call_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "reliability.call_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.toml");

        let config = Config::load_or_init_at(&path).unwrap();

        assert!(path.exists());
        assert_eq!(config.config_path, path);
        assert_eq!(config.style.max_rewrite_attempts, 3);
    }

    #[test]
    fn existing_file_is_parsed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            "[style]\nmax_rewrite_attempts = 5\n\n[gateway]\nport = 9100\n",
        )
        .unwrap();

        let config = Config::load_or_init_at(&path).unwrap();
        assert_eq!(config.style.max_rewrite_attempts, 5);
        assert_eq!(config.gateway.port, 9100);
    }

    #[test]
    fn invalid_threshold_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[style]\nsimilarity_threshold = 1.5\n").unwrap();

        let err = Config::load_or_init_at(&path).unwrap_err();
        assert!(err.to_string().contains("similarity_threshold"));
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk() {
        let mut config = Config::default();
        config.style.chunk_overlap = config.style.chunk_size;
        assert!(config.validate().is_err());
    }

    #[test]
    fn inverted_word_bounds_are_rejected() {
        let mut config = Config::default();
        config.content.min_word_count = 900;
        config.content.max_word_count = 100;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("min_word_count"));
    }

    #[test]
    fn negative_weight_is_rejected() {
        let mut config = Config::default();
        config.style.llm_weight = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn save_roundtrips_through_disk() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config {
            config_path: tmp.path().join("config.toml"),
            ..Config::default()
        };
        config.style.similarity_threshold = 0.42;
        config.save().unwrap();

        let text = fs::read_to_string(&config.config_path).unwrap();
        let reloaded: Config = toml::from_str(&text).unwrap();
        assert!((reloaded.style.similarity_threshold - 0.42).abs() < f64::EPSILON);
    }
}
