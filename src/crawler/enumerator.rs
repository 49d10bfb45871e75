//! Combination enumeration through the search form
//!
//! The model dropdown cascades from the make dropdown, so the only way to
//! learn which models exist for a make is to select it and read what the
//! form then offers.

use crate::browser::{dismiss_consent, ensure_on_page, BrowserSession, DriverResult};
use crate::config::SiteConfig;
use crate::record::Combination;

/// Reads every (make, model) pair advertised by the search form
///
/// The first option of each dropdown is a placeholder and is skipped. Any
/// driver failure, including a missing dropdown, is returned as-is: a
/// partial enumeration is not useful, so callers treat it as fatal.
///
/// # Arguments
///
/// * `session` - A session already on, or able to reach, the search page
/// * `site` - Search page URL and dropdown locators
/// * `limit` - Optional cap on the number of combinations returned
pub fn enumerate_combinations<S: BrowserSession>(
    session: &mut S,
    site: &SiteConfig,
    limit: Option<usize>,
) -> DriverResult<Vec<Combination>> {
    tracing::info!("Getting all models");

    ensure_on_page(session, &site.search_url)?;
    dismiss_consent(session, &site.consent_button)?;

    let makes: Vec<String> = session
        .option_labels(&site.make_select)?
        .into_iter()
        .skip(1)
        .map(|make| make.trim().to_string())
        .collect();
    tracing::info!("Found {} makes", makes.len());

    let mut combinations = Vec::new();

    'makes: for make in makes {
        ensure_on_page(session, &site.search_url)?;
        session.select_option(&site.make_select, &make)?;

        let models = session.option_labels(&site.model_select)?;
        for model in models.into_iter().skip(1) {
            if limit.is_some_and(|limit| combinations.len() >= limit) {
                tracing::warn!("Combination cap of {} reached", combinations.len());
                break 'makes;
            }
            combinations.push(Combination::new(make.clone(), model.trim()));
        }
    }

    tracing::info!("Found {} models", combinations.len());

    Ok(combinations)
}
