//! `current_time`.

use std::fmt::Display;

use chrono::{DateTime, Datelike, Local, SecondsFormat, TimeZone, Utc, Weekday};

use crate::registry::{Arguments, InputSchema, ParamSpec, ToolDescriptor, ToolEntry};
use crate::tools::ToolFault;

/// Output formats accepted by `current_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    /// RFC 3339 in UTC with millisecond precision; sorts lexically.
    Iso,
    /// `YYYY年MM月DD日 HH時MM分SS秒 (曜日)` in local time.
    Japanese,
    /// Seconds since the Unix epoch.
    Unix,
}

impl TimeFormat {
    /// Wire names, in advertisement order.
    pub const NAMES: [&'static str; 3] = ["iso", "japanese", "unix"];

    /// Parses a wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "iso" => Some(Self::Iso),
            "japanese" => Some(Self::Japanese),
            "unix" => Some(Self::Unix),
            _ => None,
        }
    }
}

/// Registers the `current_time` tool.
#[must_use]
pub fn current_time() -> ToolEntry {
    ToolEntry {
        descriptor: ToolDescriptor {
            name: "current_time".to_string(),
            description: "Returns the current date and time".to_string(),
            input_schema: InputSchema::new().param(
                ParamSpec::string("format")
                    .describe("Output format")
                    .one_of(TimeFormat::NAMES)
                    .default_value("iso"),
            ),
        },
        handler: run_current_time,
    }
}

fn run_current_time(args: &Arguments) -> Result<String, ToolFault> {
    let format = match args.get("format").and_then(serde_json::Value::as_str) {
        None => TimeFormat::Iso,
        Some(name) => TimeFormat::from_name(name).ok_or_else(|| ToolFault::Argument {
            name: "format".to_string(),
            reason: format!("unsupported format '{name}'"),
        })?,
    };

    Ok(format!("Current time: {}", format_time(&Local::now(), format)))
}

/// Renders `now` in the requested format.
#[must_use]
pub fn format_time<Tz>(now: &DateTime<Tz>, format: TimeFormat) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match format {
        TimeFormat::Iso => now
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        TimeFormat::Japanese => format!(
            "{} ({})",
            now.format("%Y年%m月%d日 %H時%M分%S秒"),
            japanese_weekday(now.weekday())
        ),
        TimeFormat::Unix => now.timestamp().to_string(),
    }
}

const fn japanese_weekday(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "月曜日",
        Weekday::Tue => "火曜日",
        Weekday::Wed => "水曜日",
        Weekday::Thu => "木曜日",
        Weekday::Fri => "金曜日",
        Weekday::Sat => "土曜日",
        Weekday::Sun => "日曜日",
    }
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;
    use serde_json::json;

    use super::*;

    fn sample() -> DateTime<FixedOffset> {
        // 2024-03-05 was a Tuesday
        DateTime::parse_from_rfc3339("2024-03-05T09:07:03.250+09:00").unwrap()
    }

    #[test]
    fn iso_is_utc() {
        assert_eq!(
            format_time(&sample(), TimeFormat::Iso),
            "2024-03-05T00:07:03.250Z"
        );
    }

    #[test]
    fn japanese_uses_local_offset() {
        assert_eq!(
            format_time(&sample(), TimeFormat::Japanese),
            "2024年03月05日 09時07分03秒 (火曜日)"
        );
    }

    #[test]
    fn unix_seconds() {
        assert_eq!(format_time(&sample(), TimeFormat::Unix), "1709597223");
    }

    #[test]
    fn iso_sorts_chronologically() {
        let earlier = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(format_time(&earlier, TimeFormat::Iso) < format_time(&later, TimeFormat::Iso));
    }

    #[test]
    fn default_format_is_iso() {
        let out = run_current_time(&Arguments::new()).unwrap();
        let stamp = out.strip_prefix("Current time: ").unwrap();
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok());
        assert!(stamp.ends_with('Z'));
    }

    #[test]
    fn unknown_format_is_fault() {
        let args = json!({"format": "klingon"});
        let err = run_current_time(args.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, ToolFault::Argument { .. }));
    }

    #[test]
    fn names_round_trip() {
        for name in TimeFormat::NAMES {
            assert!(TimeFormat::from_name(name).is_some());
        }
    }
}
