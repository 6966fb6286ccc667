//! Human-friendly output for the terminal dashboard.

use chrono::{DateTime, TimeZone, Timelike};

use dashboard_core::{DashboardSnapshot, LocationResult, QuoteResult, WeatherResult};

pub fn greeting(hour: u32) -> &'static str {
    if hour < 12 {
        "Good Morning"
    } else if hour < 17 {
        "Good Afternoon"
    } else {
        "Good Evening"
    }
}

pub fn weather_icon(condition: &str) -> &'static str {
    let condition = condition.to_lowercase();
    let has = |needle: &str| condition.contains(needle);

    if has("sun") || has("clear") {
        "☀️"
    } else if has("cloud") {
        "☁️"
    } else if has("rain") {
        "🌧️"
    } else if has("snow") {
        "❄️"
    } else if has("storm") {
        "⛈️"
    } else if has("fog") || has("mist") {
        "🌫️"
    } else {
        "🌤️"
    }
}

const COUNTRIES: &[(&str, &str)] = &[
    ("AE", "United Arab Emirates"),
    ("AR", "Argentina"),
    ("AU", "Australia"),
    ("BD", "Bangladesh"),
    ("BR", "Brazil"),
    ("CA", "Canada"),
    ("CL", "Chile"),
    ("CN", "China"),
    ("CO", "Colombia"),
    ("DE", "Germany"),
    ("EG", "Egypt"),
    ("ES", "Spain"),
    ("FI", "Finland"),
    ("FR", "France"),
    ("GB", "United Kingdom"),
    ("ID", "Indonesia"),
    ("IL", "Israel"),
    ("IN", "India"),
    ("IR", "Iran"),
    ("IS", "Iceland"),
    ("IT", "Italy"),
    ("JP", "Japan"),
    ("KE", "Kenya"),
    ("MA", "Morocco"),
    ("MX", "Mexico"),
    ("MY", "Malaysia"),
    ("NG", "Nigeria"),
    ("NO", "Norway"),
    ("NZ", "New Zealand"),
    ("PH", "Philippines"),
    ("PK", "Pakistan"),
    ("RU", "Russia"),
    ("SA", "Saudi Arabia"),
    ("SE", "Sweden"),
    ("SG", "Singapore"),
    ("TH", "Thailand"),
    ("TR", "Turkey"),
    ("UK", "United Kingdom"),
    ("US", "United States"),
    ("VN", "Vietnam"),
    ("ZA", "South Africa"),
];

/// Full country name for an ISO code; unknown codes come back unchanged.
pub fn country_name(code: &str) -> String {
    let upper = code.to_uppercase();
    COUNTRIES
        .iter()
        .find(|(c, _)| *c == upper)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| code.to_string())
}

/// e.g. "Friday, January 12, 2024".
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%A, %B %-d, %Y").to_string()
}

pub fn render<Tz: TimeZone>(
    snapshot: &DashboardSnapshot,
    user_name: Option<&str>,
    now: &DateTime<Tz>,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let who = user_name
        .map(str::to_string)
        .or_else(|| snapshot.location.as_ref().ok().map(|l| l.city.clone()))
        .unwrap_or_else(|| "User".to_string());

    let mut lines = vec![
        format!("{}, {}!", greeting(now.hour()), who),
        format_date(now),
        String::new(),
    ];

    lines.push(match &snapshot.location {
        Ok(location) => render_location(location),
        Err(err) => format!("📍 Location unavailable: {err}"),
    });

    match &snapshot.weather {
        Some(Ok(weather)) => lines.extend(render_weather(weather)),
        Some(Err(err)) => lines.push(format!("Weather unavailable: {err}")),
        None => {}
    }
    lines.push(String::new());

    match &snapshot.quote {
        Ok(quote) => lines.extend(render_quote(quote)),
        Err(err) => lines.push(format!("Quote unavailable: {err}")),
    }

    if snapshot.has_errors() {
        lines.push(String::new());
        lines.push("Some data couldn't be loaded. Try again in a moment.".to_string());
    }

    lines.push(String::new());
    lines.push("Data provided by WeatherAPI.com and Quotable.io".to_string());
    lines.join("\n")
}

fn render_location(location: &LocationResult) -> String {
    format!(
        "📍 {}, {}, {}  ({})",
        location.city,
        location.region,
        country_name(&location.country),
        location.source
    )
}

fn render_weather(weather: &WeatherResult) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {:.0}°C  {}",
        weather_icon(&weather.condition),
        weather.temp_c,
        weather.condition
    )];

    let mut details = Vec::new();
    if let Some(feels) = weather.feelslike_c {
        details.push(format!("feels like {feels:.0}°C"));
    }
    if let Some(humidity) = weather.humidity {
        details.push(format!("humidity {humidity}%"));
    }
    if let Some(wind) = weather.wind_kph {
        details.push(format!("wind {wind:.0} km/h"));
    }
    if !details.is_empty() {
        lines.push(format!("   {}", details.join(" · ")));
    }
    lines
}

fn render_quote(quote: &QuoteResult) -> [String; 2] {
    [
        format!("“{}”", quote.content()),
        format!("    — {}", quote.author()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use dashboard_core::{LocationSource, client::ClientError};

    #[test]
    fn greeting_follows_the_clock() {
        assert_eq!(greeting(6), "Good Morning");
        assert_eq!(greeting(11), "Good Morning");
        assert_eq!(greeting(12), "Good Afternoon");
        assert_eq!(greeting(16), "Good Afternoon");
        assert_eq!(greeting(17), "Good Evening");
        assert_eq!(greeting(23), "Good Evening");
    }

    #[test]
    fn icon_matches_condition_keywords() {
        assert_eq!(weather_icon("Sunny"), "☀️");
        assert_eq!(weather_icon("clear"), "☀️");
        assert_eq!(weather_icon("Partly cloudy"), "☁️");
        assert_eq!(weather_icon("Patchy rain possible"), "🌧️");
        assert_eq!(weather_icon("snow"), "❄️");
        assert_eq!(weather_icon("storm"), "⛈️");
        assert_eq!(weather_icon("Freezing fog"), "🌫️");
        assert_eq!(weather_icon("unknown"), "🌤️");
    }

    #[test]
    fn country_codes_are_case_insensitive() {
        assert_eq!(country_name("US"), "United States");
        assert_eq!(country_name("no"), "Norway");
        assert_eq!(country_name("UNKNOWN"), "UNKNOWN");
    }

    #[test]
    fn date_is_long_form() {
        let date = Utc.with_ymd_and_hms(2024, 1, 12, 8, 0, 0).unwrap();
        assert_eq!(format_date(&date), "Friday, January 12, 2024");
    }

    fn snapshot(quote: Result<QuoteResult, ClientError>) -> DashboardSnapshot {
        DashboardSnapshot {
            location: Ok(LocationResult {
                city: "Tromsø".into(),
                latitude: "69.6492".into(),
                longitude: "18.9553".into(),
                country: "NO".into(),
                region: "Troms og Finnmark".into(),
                source: LocationSource::Fallback,
            }),
            weather: Some(Ok(WeatherResult {
                temp_c: -3.6,
                condition: "Light snow".into(),
                icon: String::new(),
                humidity: Some(90),
                wind_kph: None,
                feelslike_c: Some(-8.0),
            })),
            quote,
        }
    }

    #[test]
    fn renders_full_dashboard() {
        let now = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 12, 7, 30, 0)
            .unwrap();
        let quote = QuoteResult::new("Begin anywhere.", "John Cage").unwrap();

        let text = render(&snapshot(Ok(quote)), Some("Ingrid"), &now);

        assert!(text.starts_with("Good Morning, Ingrid!"));
        assert!(text.contains("Tromsø, Troms og Finnmark, Norway  (fallback)"));
        assert!(text.contains("❄️ -4°C  Light snow"));
        assert!(text.contains("feels like -8°C · humidity 90%"));
        assert!(text.contains("“Begin anywhere.”"));
        assert!(!text.contains("Some data couldn't be loaded"));
    }

    #[test]
    fn dashboard_sections_appear_in_order() {
        let now = Utc.with_ymd_and_hms(2024, 1, 12, 13, 0, 0).unwrap();
        let quote = QuoteResult::new("Begin anywhere.", "John Cage").unwrap();

        let text = render(&snapshot(Ok(quote)), Some("Ingrid"), &now);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Good Afternoon, Ingrid!");
        assert_eq!(lines[1], "Friday, January 12, 2024");
        assert_eq!(lines[2], "");
        assert!(lines[3].starts_with("📍 Tromsø"));
        assert!(lines[4].starts_with("❄️"));
        assert_eq!(lines[5], "   feels like -8°C · humidity 90%");
        assert_eq!(lines[7], "“Begin anywhere.”");
        assert_eq!(lines[8], "    — John Cage");
        assert_eq!(lines.last(), Some(&"Data provided by WeatherAPI.com and Quotable.io"));
    }

    #[test]
    fn greets_by_city_without_a_name_and_flags_errors() {
        let now = Utc.with_ymd_and_hms(2024, 1, 12, 18, 0, 0).unwrap();
        let err = ClientError::Decode("eof".into());

        let text = render(&snapshot(Err(err)), None, &now);

        assert!(text.starts_with("Good Evening, Tromsø!"));
        assert!(text.contains("Quote unavailable"));
        assert!(text.contains("Some data couldn't be loaded"));
    }
}
