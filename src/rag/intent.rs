//! Query intent classification
//!
//! Replaces ad hoc substring checks scattered across call sites with one
//! testable classifier over a small closed set of intents. Matching is
//! case-insensitive substring containment, so "predict" also covers
//! "prediction" and "unpredictable".

/// Keywords that route a query (with a detected city) to the tabular
/// forecast path instead of generation.
const FORECAST_KEYWORDS: [&str; 8] = [
    "forecast",
    "next days",
    "future",
    "tomorrow",
    "week",
    "coming days",
    "predict",
    "prediction",
];

/// Keywords that trigger one web search during context assembly.
const SEARCH_KEYWORDS: [&str; 12] = [
    "news", "latest", "research", "study", "why", "how", "cause", "effect", "climate", "forecast",
    "future", "predict",
];

/// Closed set of query intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryIntent {
    /// Forecast-style question; routed to the tabular report when a city is
    /// detected, otherwise handled generatively
    Forecast,
    /// Generative answer enriched with a web-search snippet
    SearchAugmented,
    /// Generative answer from live data alone
    Plain,
}

impl QueryIntent {
    /// Classify a query. Forecast takes precedence over search-augmented.
    pub fn classify(query: &str) -> Self {
        if wants_forecast(query) {
            Self::Forecast
        } else if wants_web_search(query) {
            Self::SearchAugmented
        } else {
            Self::Plain
        }
    }
}

/// Whether the query asks for a multi-day forecast.
pub fn wants_forecast(query: &str) -> bool {
    contains_any(query, &FORECAST_KEYWORDS)
}

/// Whether context assembly should issue a web search.
///
/// Independent of forecast routing: a forecast-worded query with no detected
/// city still gets search augmentation on the generative path.
pub fn wants_web_search(query: &str) -> bool {
    contains_any(query, &SEARCH_KEYWORDS)
}

fn contains_any(query: &str, keywords: &[&str]) -> bool {
    let lower = query.to_lowercase();
    keywords.iter().any(|kw| lower.contains(kw))
}
