use std::path::Path;

use secrecy::ExposeSecret;

use crate::{BUILTIN_TOOLS, Config};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the model default, auth token, or tool list is invalid
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_llm_config()?;
        self.validate_auth_config()?;
        self.validate_tools_config()?;
        Ok(())
    }

    fn validate_llm_config(&self) -> anyhow::Result<()> {
        if self.llm.default_model.trim().is_empty() {
            anyhow::bail!("llm.default_model must not be empty");
        }

        Ok(())
    }

    fn validate_auth_config(&self) -> anyhow::Result<()> {
        let Some(ref auth) = self.server.auth else {
            return Ok(());
        };

        if auth.token.expose_secret().is_empty() {
            anyhow::bail!("server.auth.token must not be empty");
        }

        Ok(())
    }

    fn validate_tools_config(&self) -> anyhow::Result<()> {
        if let Some(unknown) = self.tools.enabled.iter().find(|name| !BUILTIN_TOOLS.contains(&name.as_str())) {
            anyhow::bail!("unknown tool in tools.enabled: '{unknown}'");
        }

        Ok(())
    }
}
