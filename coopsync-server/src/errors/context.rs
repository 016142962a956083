#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("Preferences file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Preferences file is not valid: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Preferences could not be written: {0}")]
    Serialize(#[from] toml::ser::Error),
}
