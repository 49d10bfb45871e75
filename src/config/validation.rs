use crate::config::types::{Config, CrawlerConfig, FetchConfig, OutputConfig, SiteConfig};
use crate::record::Field;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_fetch_config(&config.fetch)?;
    validate_site_config(&config.site)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates work distribution and pool settings
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.worker_count < 1 || config.worker_count > 64 {
        return Err(ConfigError::Validation(format!(
            "worker_count must be between 1 and 64, got {}",
            config.worker_count
        )));
    }

    if config.max_tasks_per_worker < 1 {
        return Err(ConfigError::Validation(format!(
            "max_tasks_per_worker must be >= 1, got {}",
            config.max_tasks_per_worker
        )));
    }

    if config.chunk_multiplier < 1 {
        return Err(ConfigError::Validation(format!(
            "chunk_multiplier must be >= 1, got {}",
            config.chunk_multiplier
        )));
    }

    if config.combination_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "combination_attempts must be >= 1, got {}",
            config.combination_attempts
        )));
    }

    if config.max_pages_per_combination < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages_per_combination must be >= 1, got {}",
            config.max_pages_per_combination
        )));
    }

    if config.max_combinations == Some(0) {
        return Err(ConfigError::Validation(
            "max_combinations must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates page fetching settings
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "fetch attempts must be >= 1, got {}",
            config.attempts
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "fetch timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if let Some(agent) = &config.user_agent {
        if agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user_agent cannot be blank when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates the target site section
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.search_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid search_url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "search_url '{}' must use http or https",
            config.search_url
        )));
    }

    for (name, locator) in [
        ("make_select", &config.make_select),
        ("model_select", &config.model_select),
        ("search_button", &config.search_button),
        ("consent_button", &config.consent_button),
    ] {
        if locator.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    if config.offer_link_marker.is_empty() {
        return Err(ConfigError::Validation(
            "offer_link_marker cannot be empty".to_string(),
        ));
    }

    if config.page_load_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "page_load_timeout_secs must be >= 1, got {}",
            config.page_load_timeout_secs
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.partial_dir.is_empty() {
        return Err(ConfigError::Validation(
            "partial_dir cannot be empty".to_string(),
        ));
    }

    if config.output_dir.is_empty() {
        return Err(ConfigError::Validation(
            "output_dir cannot be empty".to_string(),
        ));
    }

    if config.dataset_prefix.is_empty() || config.dataset_prefix.contains('/') {
        return Err(ConfigError::Validation(format!(
            "dataset_prefix must be a non-empty file name, got '{}'",
            config.dataset_prefix
        )));
    }

    for column in &config.dedup_ignore {
        if Field::from_output_label(column).is_none() {
            return Err(ConfigError::Validation(format!(
                "dedup_ignore entry '{}' is not an output column",
                column
            )));
        }
    }

    Ok(())
}
