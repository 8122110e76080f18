//! Tabular forecast report
//!
//! Renders the fixed text report for the forecast path: current conditions,
//! air quality, and a 5-day summary built by grouping 3-hour forecast
//! samples into calendar days.

use chrono::NaiveDate;

use crate::live::{AqiReading, ForecastPoint, WeatherReading};

const RULE: &str = "======================================================================";
const REPORT_DAYS: usize = 5;

/// Render the full forecast report. Absent sections are skipped.
pub fn render(
    city_display: &str,
    forecast: Option<&[ForecastPoint]>,
    aqi: Option<&AqiReading>,
    weather: Option<&WeatherReading>,
) -> String {
    let mut out: Vec<String> = Vec::new();

    out.push(String::new());
    out.push(RULE.to_string());
    out.push(format!("🌍  WEATHER FORECAST: {}", city_display.to_uppercase()));
    out.push(RULE.to_string());
    out.push(String::new());

    if let Some(weather) = weather {
        out.push("📍 CURRENT CONDITIONS".to_string());
        out.push(format!(
            "   🌡️  Temperature: {}°C (feels like {}°C)",
            weather.temp, weather.feels_like
        ));
        out.push(format!("   💧 Humidity: {}%", weather.humidity));
        out.push(format!("   🌬️  Wind: {} m/s", weather.wind_speed));
        out.push(format!("   ☁️  Conditions: {}", title_case(&weather.desc)));
        out.push(String::new());
    }

    if let Some(aqi) = aqi {
        out.push("🏭 AIR QUALITY".to_string());
        out.push(format!("   🔴 AQI: {} ({})", aqi.aqi, aqi.category));
        out.push(format!("   💨 PM2.5: {:.1} μg/m³", aqi.pm25));
        out.push(format!("   💨 PM10: {:.1} μg/m³", aqi.pm10));
        out.push(String::new());
    }

    if let Some(forecast) = forecast {
        out.push("📅 5-DAY FORECAST".to_string());
        out.push(String::new());

        for (i, (date, samples)) in group_by_day(forecast).iter().take(REPORT_DAYS).enumerate() {
            let avg_temp =
                samples.iter().map(|p| p.temp).sum::<f64>() / samples.len() as f64;
            let avg_humidity =
                samples.iter().map(|p| p.humidity).sum::<f64>() / samples.len() as f64;
            // Mid-list sample stands in for the day's conditions
            let desc = &samples[samples.len() / 2].desc;

            out.push(format!("   Day {} ({}):", i + 1, day_label(date)));
            out.push(format!("      🌡️  Avg Temp: {avg_temp:.1}°C"));
            out.push(format!("      💧 Avg Humidity: {avg_humidity:.0}%"));
            out.push(format!("      ☁️  Conditions: {}", title_case(desc)));
            out.push(String::new());
        }
    }

    out.push(RULE.to_string());
    out.push(String::new());

    out.join("\n")
}

/// Group forecast points by the calendar-date prefix of their timestamp,
/// preserving first-seen order.
fn group_by_day(points: &[ForecastPoint]) -> Vec<(String, Vec<&ForecastPoint>)> {
    let mut days: Vec<(String, Vec<&ForecastPoint>)> = Vec::new();
    for point in points {
        let date = point
            .stamp
            .split_whitespace()
            .next()
            .unwrap_or(&point.stamp)
            .to_string();
        match days.iter_mut().find(|(d, _)| *d == date) {
            Some((_, samples)) => samples.push(point),
            None => days.push((date, vec![point])),
        }
    }
    days
}

/// `"Mon 02 Jun"`-style label; falls back to the raw date on parse failure.
fn day_label(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => d.format("%a %d %b").to_string(),
        Err(_) => date.to_string(),
    }
}

/// Capitalize the first letter of each whitespace-separated word.
pub(crate) fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::AqiCategory;

    fn point(stamp: &str, temp: f64, humidity: f64, desc: &str) -> ForecastPoint {
        ForecastPoint {
            stamp: stamp.to_string(),
            temp,
            humidity,
            desc: desc.to_string(),
            wind: 2.0,
        }
    }

    #[test]
    fn test_group_by_day_preserves_order() {
        let points = vec![
            point("2025-06-01 09:00:00", 30.0, 60.0, "haze"),
            point("2025-06-01 12:00:00", 34.0, 50.0, "clear sky"),
            point("2025-06-02 09:00:00", 29.0, 70.0, "light rain"),
        ];

        let days = group_by_day(&points);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].0, "2025-06-01");
        assert_eq!(days[0].1.len(), 2);
        assert_eq!(days[1].0, "2025-06-02");
    }

    #[test]
    fn test_render_averages_and_mid_sample() {
        let points = vec![
            point("2025-06-01 06:00:00", 28.0, 80.0, "mist"),
            point("2025-06-01 12:00:00", 34.0, 50.0, "scattered clouds"),
            point("2025-06-01 18:00:00", 31.0, 62.0, "haze"),
        ];

        let report = render("Delhi", Some(&points), None, None);

        assert!(report.contains("WEATHER FORECAST: DELHI"));
        // (28 + 34 + 31) / 3 = 31.0
        assert!(report.contains("Avg Temp: 31.0°C"));
        // (80 + 50 + 62) / 3 = 64
        assert!(report.contains("Avg Humidity: 64%"));
        // Mid sample of three is the second
        assert!(report.contains("Conditions: Scattered Clouds"));
        assert!(report.contains("Day 1 (Sun 01 Jun):"));
    }

    #[test]
    fn test_render_caps_at_five_days() {
        let points: Vec<ForecastPoint> = (0..7)
            .map(|d| point(&format!("2025-06-{:02} 12:00:00", d + 1), 30.0, 60.0, "haze"))
            .collect();

        let report = render("Delhi", Some(&points), None, None);
        assert!(report.contains("Day 5"));
        assert!(!report.contains("Day 6"));
    }

    #[test]
    fn test_render_skips_absent_sections() {
        let aqi = AqiReading {
            aqi: 180,
            category: AqiCategory::Poor,
            pm25: 85.0,
            pm10: 120.0,
            co: 500.0,
            no2: 30.0,
        };

        let report = render("Mumbai", None, Some(&aqi), None);

        assert!(report.contains("AQI: 180 (Poor)"));
        assert!(!report.contains("CURRENT CONDITIONS"));
        assert!(!report.contains("5-DAY FORECAST"));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("light rain"), "Light Rain");
        assert_eq!(title_case("haze"), "Haze");
        assert_eq!(title_case(""), "");
    }
}
