//! Plain-text forecast emails built from a subscription's report flags.

use super::city::CityName;
use super::subscription::ReportFlags;
use super::user::{EmailAddress, Username};
use super::weather::WeatherReport;

/// Who receives a forecast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub username: Username,
    pub email: EmailAddress,
}

/// Message handed to the mailer port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastEmail {
    pub to: EmailAddress,
    pub subject: String,
    pub body: String,
}

/// Compose the email for one subscription.
///
/// Only the sections enabled in `flags` are emitted, in a fixed order.
/// Sections whose readings are absent from the payload are skipped.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use weather_reminder::domain::{
///     compose_forecast, CityName, EmailAddress, Recipient, ReportFlags, Username, WeatherReport,
/// };
///
/// let report = WeatherReport::from_payload(&json!({
///     "main": { "temp": 21.5, "feels_like": 20, "humidity": 40, "pressure": 1015 },
///     "clouds": { "all": 75 },
///     "weather": [{ "description": "light rain" }],
/// }))
/// .unwrap();
/// let recipient = Recipient {
///     username: Username::new("ada").unwrap(),
///     email: EmailAddress::new("ada@example.com").unwrap(),
/// };
/// let email = compose_forecast(
///     &recipient,
///     &CityName::new("Kyiv").unwrap(),
///     &ReportFlags::default(),
///     &report,
/// );
/// assert_eq!(
///     email.body,
///     "Weather forecast for Kyiv:\nTemperature: 21.5°C\nCloudiness: 75%\nPrecipitation: light rain\n"
/// );
/// ```
pub fn compose_forecast(
    recipient: &Recipient,
    city: &CityName,
    flags: &ReportFlags,
    report: &WeatherReport,
) -> ForecastEmail {
    let main = &report.main;
    let mut lines = vec![format!("Weather forecast for {city}:")];

    if flags.temperature {
        lines.push(format!("Temperature: {}°C", main.temp));
    }
    if flags.feels_like {
        lines.push(format!("Feels like: {}°C", main.feels_like));
    }
    if flags.humidity {
        lines.push(format!("Humidity: {}%", main.humidity));
    }
    if flags.pressure {
        lines.push(format!("Pressure: {} hPa", main.pressure));
    }
    if let Some(wind) = &report.wind {
        if flags.wind {
            lines.push(match wind.deg {
                Some(deg) => format!("Wind: {} m/s at {deg}°", wind.speed),
                None => format!("Wind: {} m/s", wind.speed),
            });
        }
        if let (true, Some(gust)) = (flags.wind_speed, wind.gust) {
            lines.push(format!("Wind gusts: {gust} m/s"));
        }
    }
    if let (true, Some(clouds)) = (flags.cloudiness, &report.clouds) {
        lines.push(format!("Cloudiness: {}%", clouds.all));
    }
    if let (true, Some(condition)) = (flags.precipitation, report.weather.first()) {
        lines.push(format!("Precipitation: {}", condition.description));
    }
    let mut body = lines.join("\n");
    body.push('\n');

    ForecastEmail {
        to: recipient.email.clone(),
        subject: format!(
            "{}, here is your {city} weather forecast for closest hour",
            recipient.username
        ),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn recipient() -> Recipient {
        Recipient {
            username: Username::new("grace").expect("valid"),
            email: EmailAddress::new("grace@example.com").expect("valid"),
        }
    }

    #[fixture]
    fn report() -> WeatherReport {
        WeatherReport::from_payload(&json!({
            "main": { "temp": -2.5, "feels_like": -6, "humidity": 93, "pressure": 1009 },
            "wind": { "speed": 4.1, "deg": 250, "gust": 9.3 },
            "clouds": { "all": 100 },
            "weather": [{ "description": "snow" }, { "description": "mist" }],
        }))
        .expect("fixture payload decodes")
    }

    fn city() -> CityName {
        CityName::new("Oslo").expect("valid")
    }

    #[rstest]
    fn every_section_in_order(recipient: Recipient, report: WeatherReport) {
        let flags = ReportFlags {
            temperature: true,
            precipitation: true,
            cloudiness: true,
            humidity: true,
            wind: true,
            wind_speed: true,
            pressure: true,
            feels_like: true,
        };
        let email = compose_forecast(&recipient, &city(), &flags, &report);
        assert_eq!(
            email.body,
            concat!(
                "Weather forecast for Oslo:\n",
                "Temperature: -2.5°C\n",
                "Feels like: -6°C\n",
                "Humidity: 93%\n",
                "Pressure: 1009 hPa\n",
                "Wind: 4.1 m/s at 250°\n",
                "Wind gusts: 9.3 m/s\n",
                "Cloudiness: 100%\n",
                "Precipitation: snow\n",
            )
        );
    }

    #[rstest]
    fn no_sections_leaves_only_the_heading(recipient: Recipient, report: WeatherReport) {
        let flags = ReportFlags {
            temperature: false,
            precipitation: false,
            cloudiness: false,
            ..ReportFlags::default()
        };
        let email = compose_forecast(&recipient, &city(), &flags, &report);
        assert_eq!(email.body, "Weather forecast for Oslo:\n");
    }

    #[rstest]
    fn gusts_are_skipped_when_absent(recipient: Recipient) {
        let report = WeatherReport::from_payload(&json!({
            "main": { "temp": 1, "feels_like": 1, "humidity": 1, "pressure": 1 },
            "wind": { "speed": 2 },
        }))
        .expect("decodes");
        let flags = ReportFlags {
            temperature: false,
            precipitation: false,
            cloudiness: false,
            wind: true,
            wind_speed: true,
            ..ReportFlags::default()
        };
        let email = compose_forecast(&recipient, &city(), &flags, &report);
        assert_eq!(email.body, "Weather forecast for Oslo:\nWind: 2 m/s\n");
    }

    #[rstest]
    fn subject_and_recipient(recipient: Recipient, report: WeatherReport) {
        let email = compose_forecast(&recipient, &city(), &ReportFlags::default(), &report);
        assert_eq!(
            email.subject,
            "grace, here is your Oslo weather forecast for closest hour"
        );
        assert_eq!(email.to.as_ref(), "grace@example.com");
    }
}
