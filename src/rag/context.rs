//! Context assembly for RAG prompts
//!
//! Decides from the user query which live-data and search calls to make,
//! and assembles the bracketed factual preamble prepended to the prompt.
//! Live-data lines always precede the web-search line. A failed sub-fetch
//! omits its line; it never aborts assembly.

use std::sync::Arc;

use crate::cities::{self, City};
use crate::live::{AqiReading, LiveDataProvider, WeatherReading};
use crate::search::SearchProvider;

use super::intent;

/// Snippets longer than this are truncated before entering the context.
const SNIPPET_LIMIT: usize = 150;

/// Live readings fetched while building one request's context.
///
/// Request-scoped: the display summary reuses these instead of fetching the
/// same data a second time.
#[derive(Debug, Clone, Default)]
pub struct LiveSnapshot {
    pub aqi: Option<AqiReading>,
    pub weather: Option<WeatherReading>,
}

/// Result of context assembly for one query.
#[derive(Debug, Clone)]
pub struct BuiltContext {
    /// Bracketed fact block, empty when no signal triggered
    pub context: String,
    /// First registry match in the query, if any
    pub city: Option<&'static City>,
    pub snapshot: LiveSnapshot,
}

/// Builds the factual context block for a query.
pub struct ContextBuilder {
    live: Arc<dyn LiveDataProvider>,
    search: Arc<dyn SearchProvider>,
}

impl ContextBuilder {
    pub fn new(live: Arc<dyn LiveDataProvider>, search: Arc<dyn SearchProvider>) -> Self {
        Self { live, search }
    }

    /// Assemble the context block for a query.
    ///
    /// City detection and search triggering are independent; both may
    /// contribute. Order in the output is fixed: live data, then weather,
    /// then web search.
    pub async fn build(&self, query: &str) -> BuiltContext {
        let mut context = String::new();
        let mut snapshot = LiveSnapshot::default();

        let city = cities::detect(query);
        if let Some(city) = city {
            match self.live.air_quality(city).await {
                Ok(aqi) => {
                    context.push_str(&format!(
                        "[LIVE DATA: {} AQI={} ({}), PM2.5={:.1}]\n",
                        city.display_name(),
                        aqi.aqi,
                        aqi.category,
                        aqi.pm25
                    ));
                    snapshot.aqi = Some(aqi);
                }
                Err(e) => tracing::warn!(city = city.name, error = %e, "air quality fetch failed"),
            }

            match self.live.weather(city).await {
                Ok(weather) => {
                    context.push_str(&format!(
                        "[WEATHER: {}°C, {}% humidity, {}]\n",
                        weather.temp, weather.humidity, weather.desc
                    ));
                    snapshot.weather = Some(weather);
                }
                Err(e) => tracing::warn!(city = city.name, error = %e, "weather fetch failed"),
            }
        }

        if intent::wants_web_search(query) {
            match self.search.search(&format!("{query} India environment")).await {
                Ok(results) => {
                    if let Some(first) = results.first() {
                        let snippet: String = first.snippet.chars().take(SNIPPET_LIMIT).collect();
                        context.push_str(&format!("[WEB SEARCH: {snippet}]\n"));
                    }
                }
                Err(e) => tracing::warn!(error = %e, "web search failed"),
            }
        }

        BuiltContext {
            context,
            city,
            snapshot,
        }
    }
}
