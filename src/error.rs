//! Error types for apparition

use thiserror::Error;

/// Result type alias for advertisement operations
pub type Result<T> = std::result::Result<T, ApparitionError>;

/// Main error type for frame synthesis and injection
#[derive(Error, Debug)]
pub enum ApparitionError {
    /// Invalid advertisement configuration (detected before any loop starts)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Interface not found or invalid
    #[error("Interface error: {0}")]
    Interface(String),

    /// Socket operation failed
    #[error("Socket error: {0}")]
    Socket(String),

    /// Frame transmission failed
    #[error("Injection error: {0}")]
    Injection(String),

    /// Insufficient privileges
    #[error("Permission denied: {0}")]
    Permission(String),

    /// Invalid MAC address
    #[error("Invalid MAC address: {0}")]
    InvalidMac(String),

    /// Driver or hardware doesn't support operation
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// System/OS error
    #[error("System error: {0}")]
    System(String),

    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApparitionError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a socket error
    pub fn socket(msg: impl Into<String>) -> Self {
        Self::Socket(msg.into())
    }

    /// Create a permission error
    pub fn permission(msg: impl Into<String>) -> Self {
        Self::Permission(msg.into())
    }

    /// Check if this is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is a permission error
    pub fn is_permission_error(&self) -> bool {
        matches!(self, Self::Permission(_))
    }
}

impl From<nix::Error> for ApparitionError {
    fn from(err: nix::Error) -> Self {
        match err {
            nix::Error::EPERM | nix::Error::EACCES => {
                Self::Permission(format!("Operation not permitted: {}", err))
            }
            nix::Error::ENODEV | nix::Error::ENOENT | nix::Error::ENXIO => {
                Self::Interface(format!("Interface not found: {}", err))
            }
            nix::Error::EBUSY => Self::Interface(format!("Interface busy: {}", err)),
            nix::Error::EOPNOTSUPP => {
                Self::Unsupported(format!("Operation not supported: {}", err))
            }
            _ => Self::System(format!("System error: {}", err)),
        }
    }
}
