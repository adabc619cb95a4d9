//! Relay configuration parsed from environment variables.
//!
//! The persona is the system instruction prepended to every provider
//! request. It is configuration, not code: `SUPPORT_PERSONA` takes inline
//! text, `SUPPORT_PERSONA_FILE` a path, and the built-in text applies when
//! neither is set.

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;

pub const DEFAULT_PERSONA: &str = "\
You are an AI-powered customer support assistant for HeadStarterAI, a platform that provides AI-driven interviews for software engineering positions.

1. HeadStarterAI offers AI-powered interviews for software engineering positions.
2. Our platform helps candidates practice and prepare for real job interviews.
3. We cover a wide range of topics, including algorithms, data structures, system design, and behavioral questions.
4. Users can access our services through our website or mobile app.
5. If asked about technical issues, guide users to our troubleshooting page or suggest contacting our technical support team.
6. Always maintain user privacy and do not share personal information.
7. If you're unsure about any information, it's okay to say you don't know and offer to connect the user with a human representative.

Your goal is to provide accurate information, assist with common inquiries, and ensure a positive experience for all HeadStarterAI users.";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid PORT: {0}")]
    InvalidPort(String),
    #[error("failed to read persona file {path}: {source}")]
    PersonaFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("persona is empty")]
    EmptyPersona,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub port: u16,
    pub persona: String,
}

impl RelayConfig {
    /// Build relay config from the process environment.
    ///
    /// # Errors
    ///
    /// See [`RelayConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build relay config from an arbitrary key lookup.
    ///
    /// - `PORT`: default 3000
    /// - `SUPPORT_PERSONA`: inline persona text (wins over the file)
    /// - `SUPPORT_PERSONA_FILE`: path to a persona text file
    ///
    /// # Errors
    ///
    /// Returns an error for an unparsable port, an unreadable persona file,
    /// or a persona that is blank after trimming.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let persona = match (lookup("SUPPORT_PERSONA"), lookup("SUPPORT_PERSONA_FILE")) {
            (Some(inline), _) => inline,
            (None, Some(path)) => {
                let path = PathBuf::from(path);
                std::fs::read_to_string(&path).map_err(|source| ConfigError::PersonaFile { path, source })?
            }
            (None, None) => DEFAULT_PERSONA.to_string(),
        };
        let persona = persona.trim().to_string();
        if persona.is_empty() {
            return Err(ConfigError::EmptyPersona);
        }

        Ok(Self { port, persona })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
