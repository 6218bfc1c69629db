//! Topic resource recommendations: AI-generated bundles cached locally.
//!
//! Generation is explicit (never triggered by a read), overwrites any prior
//! bundle for the topic, and normalizes every URL before storage.

use tracing::{info, instrument};

use crate::domain::ResourceBundle;
use crate::error::TutorError;
use crate::state::AppState;
use crate::util::normalize_url;

fn cache_key(topic: &str) -> String {
    format!("resources_{topic}")
}

/// Cached bundle for a topic, or None (absent or expired). Callers decide
/// whether to trigger generation.
pub fn get_resources(state: &AppState, topic: &str) -> Option<ResourceBundle> {
    state.cache.get(&cache_key(topic))
}

/// Generate a fresh bundle with web context enabled and cache it under the
/// topic key. A second call for the same topic overwrites, never merges.
#[instrument(level = "info", skip(state, outcomes), fields(%topic, %level))]
pub async fn generate_and_cache(
    state: &AppState,
    topic: &str,
    outcomes: &[String],
    level: &str,
) -> Result<ResourceBundle, TutorError> {
    let ai = state.openai.as_ref().ok_or(TutorError::AiUnavailable)?;
    let raw = ai
        .generate_resources(&state.prompts, topic, outcomes, level)
        .await
        .map_err(TutorError::Generation)?;

    let bundle = normalize_bundle(raw);
    state.cache.put(&cache_key(topic), &bundle);
    info!(
        target: "sciencespark_backend",
        %topic,
        videos = bundle.videos.len(),
        simulations = bundle.simulations.len(),
        readings = bundle.readings.len(),
        "Resource bundle generated and cached"
    );
    Ok(bundle)
}

/// Prefix `https://` onto any link the provider returned without a scheme.
fn normalize_bundle(mut bundle: ResourceBundle) -> ResourceBundle {
    for sim in &mut bundle.simulations {
        sim.url = normalize_url(&sim.url);
    }
    for reading in &mut bundle.readings {
        reading.url = normalize_url(&reading.url);
    }
    bundle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ResourceReading, ResourceSimulation};

    #[test]
    fn bundle_urls_are_normalized() {
        let bundle = ResourceBundle {
            simulations: vec![ResourceSimulation {
                title: "Forces and Motion".into(),
                description: "PhET".into(),
                url: "phet.colorado.edu/en/simulations/forces-and-motion-basics".into(),
            }],
            readings: vec![
                ResourceReading {
                    title: "Physics".into(),
                    description: "OpenStax K12".into(),
                    url: "openstax.org/k12".into(),
                    source: "OpenStax".into(),
                },
                ResourceReading {
                    title: "OER".into(),
                    description: "search".into(),
                    url: "https://oercommons.org/oer".into(),
                    source: "OER Commons".into(),
                },
            ],
            ..Default::default()
        };
        let out = normalize_bundle(bundle);
        assert_eq!(out.simulations[0].url, "https://phet.colorado.edu/en/simulations/forces-and-motion-basics");
        assert_eq!(out.readings[0].url, "https://openstax.org/k12");
        assert_eq!(out.readings[1].url, "https://oercommons.org/oer");
    }

    #[tokio::test]
    async fn read_never_triggers_generation() {
        let state = crate::state::AppState::for_tests();
        assert!(get_resources(&state, "forces").is_none());
    }

    #[tokio::test]
    async fn generated_bundle_round_trips_through_cache() {
        let state = crate::state::AppState::for_tests();
        // No AI in tests: store a bundle the way generate_and_cache would.
        let bundle = normalize_bundle(ResourceBundle {
            key_concepts: vec!["balanced forces".into()],
            australian_connection: "Questacon exhibits".into(),
            ..Default::default()
        });
        state.cache.put(&cache_key("forces"), &bundle);

        let got = get_resources(&state, "forces").expect("cached");
        assert_eq!(got.key_concepts, bundle.key_concepts);
        assert_eq!(got.australian_connection, "Questacon exhibits");
    }
}
