use super::{types::Config, ConfigError};

/// Largest batch accepted by the users/lookup endpoint.
const MAX_LOOKUP_BATCH: usize = 100;

/// Validate configuration
/// Currently validates:
/// - API base URL is not empty
/// - Lookup batch size is within 1..=100
/// - Block retries stay below 10
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.api.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "api.base_url cannot be empty".to_string(),
        ));
    }

    let batch = config.daemon.lookup_batch_size;
    if batch == 0 || batch > MAX_LOOKUP_BATCH {
        return Err(ConfigError::ValidationError(format!(
            "daemon.lookup_batch_size must be between 1 and {}, got {}",
            MAX_LOOKUP_BATCH, batch
        )));
    }

    if config.block.max_retries > 10 {
        return Err(ConfigError::ValidationError(format!(
            "block.max_retries cannot exceed 10, got {}",
            config.block.max_retries
        )));
    }

    Ok(())
}
