//! RAG pipeline orchestration
//!
//! The single entry point shared by the chat CLI, the one-shot command, and
//! the HTTP server. Routes each query to either the tabular forecast path
//! or the generative path, and attaches the structured live-data payload
//! for the caller to render or forward.

use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;

use crate::cities::{self, City};
use crate::live::{AqiReading, LiveDataProvider, WeatherReading};
use crate::search::SearchProvider;

use super::context::{ContextBuilder, LiveSnapshot};
use super::engine::Generator;
use super::intent::QueryIntent;
use super::report;

const FORECAST_DAYS: usize = 5;

/// Structured live-data payload returned alongside the response text.
#[derive(Debug, Clone, Serialize)]
pub struct LiveData {
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aqi: Option<AqiReading>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<WeatherReading>,
}

/// One answered query: augmented text plus machine-readable live data.
#[derive(Debug, Clone)]
pub struct Answer {
    pub response: String,
    pub live_data: Option<LiveData>,
}

/// Caller-facing contract for the one-shot command and the HTTP server.
#[derive(Debug, Clone, Serialize)]
pub struct PredictResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(rename = "liveData", skip_serializing_if = "Option::is_none")]
    pub live_data: Option<LiveData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictResponse {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            response: None,
            live_data: None,
            error: Some(error.into()),
        }
    }
}

/// Orchestrates context assembly, generation, and live-data display.
pub struct RagPipeline {
    live: Arc<dyn LiveDataProvider>,
    generator: Arc<dyn Generator>,
    context_builder: ContextBuilder,
}

impl RagPipeline {
    pub fn new(
        live: Arc<dyn LiveDataProvider>,
        search: Arc<dyn SearchProvider>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        let context_builder = ContextBuilder::new(live.clone(), search);
        Self {
            live,
            generator,
            context_builder,
        }
    }

    /// Answer a query.
    ///
    /// Forecast-intent queries with a detected city take the tabular report
    /// path and never touch the model; everything else is generative. The
    /// two paths are mutually exclusive per request. Expected provider
    /// failures degrade to absent fields and never abort the request.
    pub async fn answer(&self, query: &str) -> Result<Answer> {
        let city = cities::detect(query);

        match (QueryIntent::classify(query), city) {
            (QueryIntent::Forecast, Some(city)) => self.forecast_answer(city).await,
            _ => self.generative_answer(query).await,
        }
    }

    /// Answer a query under the caller-facing contract: unexpected errors
    /// become a structured failure instead of propagating, so one bad
    /// request never stops the process from serving the next.
    pub async fn predict(&self, query: &str) -> PredictResponse {
        match self.answer(query).await {
            Ok(answer) => PredictResponse {
                success: true,
                response: Some(answer.response),
                live_data: answer.live_data,
                error: None,
            },
            Err(e) => {
                tracing::error!(error = %e, "request failed");
                PredictResponse::failure(e.to_string())
            }
        }
    }

    async fn forecast_answer(&self, city: &'static City) -> Result<Answer> {
        let forecast = match self.live.forecast(city, FORECAST_DAYS).await {
            Ok(points) => Some(points),
            Err(e) => {
                tracing::warn!(city = city.name, error = %e, "forecast fetch failed");
                None
            }
        };
        let aqi = self.live.air_quality(city).await.ok();
        let weather = self.live.weather(city).await.ok();

        let response = report::render(
            &city.display_name(),
            forecast.as_deref(),
            aqi.as_ref(),
            weather.as_ref(),
        );

        Ok(Answer {
            response,
            live_data: Some(LiveData {
                city: city.display_name(),
                aqi,
                weather,
            }),
        })
    }

    async fn generative_answer(&self, query: &str) -> Result<Answer> {
        let built = self.context_builder.build(query).await;

        let prompt = if built.context.is_empty() {
            format!("User: {query}\nAssistant:")
        } else {
            format!("{}User: {query}\nAssistant:", built.context)
        };

        let mut response = self.generator.generate(&prompt)?;

        // Reuse the readings fetched during context assembly for the display
        // summary; one fetch per request.
        let live_data = built.city.map(|city| {
            append_live_summary(&mut response, city, &built.snapshot);
            LiveData {
                city: city.display_name(),
                aqi: built.snapshot.aqi.clone(),
                weather: built.snapshot.weather.clone(),
            }
        });

        Ok(Answer {
            response,
            live_data,
        })
    }
}

/// Append the human-readable live-data block to a generated response.
fn append_live_summary(response: &mut String, city: &City, snapshot: &LiveSnapshot) {
    if let Some(aqi) = &snapshot.aqi {
        response.push_str(&format!("\n\n📊 LIVE DATA ({}):", city.display_name()));
        response.push_str(&format!("\n🔴 AQI: {} ({})", aqi.aqi, aqi.category));
        response.push_str(&format!("\n💨 PM2.5: {:.1} μg/m³", aqi.pm25));
    }
    if let Some(weather) = &snapshot.weather {
        response.push_str(&format!(
            "\n🌡️  Weather: {}°C, {}% humidity",
            weather.temp, weather.humidity
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::context::tests::{StubLive, StubSearch};
    use std::sync::Mutex;

    /// Generator returning canned text and recording the prompt it saw.
    struct StubGenerator {
        reply: String,
        seen_prompt: Mutex<Option<String>>,
    }

    impl StubGenerator {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                seen_prompt: Mutex::new(None),
            }
        }
    }

    impl Generator for StubGenerator {
        fn generate(&self, prompt: &str) -> Result<String> {
            *self.seen_prompt.lock().unwrap() = Some(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    fn pipeline(live: StubLive, search: StubSearch, generator: Arc<StubGenerator>) -> RagPipeline {
        RagPipeline::new(Arc::new(live), Arc::new(search), generator)
    }

    #[tokio::test]
    async fn test_forecast_query_routes_to_report() {
        let generator = Arc::new(StubGenerator::new("should not be called"));
        let p = pipeline(
            StubLive::healthy(45.0),
            StubSearch { snippet: None },
            generator.clone(),
        );

        let answer = p
            .answer("weather forecast for Delhi for next 5 days")
            .await
            .unwrap();

        assert!(answer.response.contains("WEATHER FORECAST: DELHI"));
        assert!(answer.response.contains("5-DAY FORECAST"));
        assert!(generator.seen_prompt.lock().unwrap().is_none());
        assert_eq!(answer.live_data.unwrap().city, "Delhi");
    }

    #[tokio::test]
    async fn test_generative_query_gets_live_context() {
        let generator = Arc::new(StubGenerator::new("Because of traffic and weather."));
        let p = pipeline(
            StubLive::healthy(45.0),
            StubSearch {
                snippet: Some("Delhi air quality worsens in winter".to_string()),
            },
            generator.clone(),
        );

        let answer = p.answer("why is pollution high in Delhi").await.unwrap();

        let prompt = generator.seen_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("[LIVE DATA:"));
        assert!(prompt.contains("[WEB SEARCH:"));
        assert!(prompt.ends_with("User: why is pollution high in Delhi\nAssistant:"));
        assert!(!answer.response.contains("WEATHER FORECAST"));
    }

    #[tokio::test]
    async fn test_forecast_wording_without_city_is_generative() {
        let generator = Arc::new(StubGenerator::new("Hard to say."));
        let p = pipeline(
            StubLive::healthy(45.0),
            StubSearch { snippet: None },
            generator.clone(),
        );

        let answer = p.answer("what is the forecast for the monsoon").await.unwrap();

        assert!(generator.seen_prompt.lock().unwrap().is_some());
        assert!(answer.live_data.is_none());
    }

    #[tokio::test]
    async fn test_live_summary_appended_with_computed_aqi() {
        // PM2.5 = 45 interpolates to AQI 75, band Satisfactory
        let generator = Arc::new(StubGenerator::new("The air is acceptable today."));
        let p = pipeline(
            StubLive::healthy(45.0),
            StubSearch { snippet: None },
            generator,
        );

        let answer = p.answer("current AQI in kolkata").await.unwrap();

        assert!(answer.response.contains("LIVE DATA (Kolkata):"));
        assert!(answer.response.contains("AQI: 75 (Satisfactory)"));
        let live = answer.live_data.unwrap();
        assert_eq!(live.aqi.unwrap().aqi, 75);
    }

    #[tokio::test]
    async fn test_degraded_fetches_still_answer() {
        let generator = Arc::new(StubGenerator::new("No live data available."));
        let p = pipeline(
            StubLive {
                pm25: 45.0,
                fail_aqi: true,
                fail_weather: true,
            },
            StubSearch { snippet: None },
            generator.clone(),
        );

        let answer = p.answer("AQI in delhi please").await.unwrap();

        let prompt = generator.seen_prompt.lock().unwrap().clone().unwrap();
        assert_eq!(prompt, "User: AQI in delhi please\nAssistant:");
        let live = answer.live_data.unwrap();
        assert!(live.aqi.is_none());
        assert!(live.weather.is_none());
    }

    #[tokio::test]
    async fn test_predict_wraps_errors_as_structured_failure() {
        struct FailingGenerator;
        impl Generator for FailingGenerator {
            fn generate(&self, _prompt: &str) -> Result<String> {
                anyhow::bail!("device out of memory")
            }
        }

        let p = RagPipeline::new(
            Arc::new(StubLive::healthy(45.0)),
            Arc::new(StubSearch { snippet: None }),
            Arc::new(FailingGenerator),
        );

        let outcome = p.predict("hello kolkata").await;
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("out of memory"));
        assert!(outcome.response.is_none());
    }

    #[test]
    fn test_predict_response_serialization() {
        let outcome = PredictResponse {
            success: true,
            response: Some("ok".to_string()),
            live_data: Some(LiveData {
                city: "Kolkata".to_string(),
                aqi: Some(crate::live::AqiReading::from_components(45.0, 90.0, 400.0, 18.0)),
                weather: None,
            }),
            error: None,
        };

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["liveData"]["city"], "Kolkata");
        assert_eq!(json["liveData"]["aqi"]["aqi"], 75);
        assert_eq!(json["liveData"]["aqi"]["category"], "Satisfactory");
        assert!(json.get("error").is_none());
    }
}
