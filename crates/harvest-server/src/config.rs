use harvest_core::AppError;

/// Port used when `HARVEST_PORT` is not set.
pub const DEFAULT_PORT: u16 = 3010;

/// Configuration for the HTTP listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
}

impl ServerConfig {
    /// Read configuration from environment variables.
    ///
    /// - `HARVEST_PORT` (optional, defaults to 3010)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_port_var(std::env::var("HARVEST_PORT").ok())
    }

    fn from_port_var(raw: Option<String>) -> Result<Self, AppError> {
        let port = match raw {
            None => DEFAULT_PORT,
            Some(raw) => {
                let parsed: u16 = raw.trim().parse().map_err(|_| {
                    AppError::ConfigError(format!(
                        "Invalid HARVEST_PORT '{raw}': must be an integer between 1 and 65535"
                    ))
                })?;
                if parsed == 0 {
                    return Err(AppError::ConfigError(
                        "HARVEST_PORT must be at least 1".into(),
                    ));
                }
                parsed
            }
        };

        Ok(Self { port })
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
