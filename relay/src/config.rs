use gemini_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Production,
    Development,
}

/// Process-wide settings, read once at startup and never mutated.
#[derive(Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub gemini_base_url: String,
    pub mode: Mode,
}

impl Config {
    pub fn new(api_key: Option<String>, mode: Mode) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            model: DEFAULT_MODEL.to_string(),
            gemini_base_url: DEFAULT_BASE_URL.to_string(),
            mode,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_gemini_base_url(mut self, url: impl Into<String>) -> Self {
        self.gemini_base_url = url.into();
        self
    }

    pub fn is_development(&self) -> bool {
        self.mode == Mode::Development
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<set>"))
            .field("model", &self.model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("mode", &self.mode)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_key_counts_as_missing() {
        assert!(Config::new(Some("   ".into()), Mode::Production)
            .api_key
            .is_none());
        assert!(Config::new(None, Mode::Production).api_key.is_none());
    }

    #[test]
    fn debug_output_hides_key() {
        let config = Config::new(Some("super-secret".into()), Mode::Development);
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<set>"));
    }
}
