//! Serde helpers for human-readable durations ("10s", "1m30s") in configuration.

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::{fmt, time::Duration};

/// Duration fields accepting either whole seconds or a humantime string
pub mod duration {
    use super::*;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration_str = humantime::format_duration(*duration).to_string();
        serializer.serialize_str(&duration_str)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DurationVisitor;

        impl<'de> Visitor<'de> for DurationVisitor {
            type Value = Duration;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a duration as seconds or a humantime string such as '10s'")
            }

            fn visit_u64<E>(self, seconds: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Duration::from_secs(seconds))
            }

            // Environment providers hand numbers over as signed integers
            fn visit_i64<E>(self, seconds: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                u64::try_from(seconds).map(Duration::from_secs).map_err(|_| {
                    de::Error::custom(format!("Duration cannot be negative: {seconds}"))
                })
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                humantime::parse_duration(value)
                    .map_err(|e| de::Error::custom(format!("Invalid duration '{value}': {e}")))
            }
        }

        deserializer.deserialize_any(DurationVisitor)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Holder {
        #[serde(with = "super::duration")]
        timeout: Duration,
    }

    #[test]
    fn parses_human_readable_and_numeric_durations() {
        let h: Holder = toml::from_str(r#"timeout = "1m30s""#).unwrap();
        assert_eq!(h.timeout, Duration::from_secs(90));

        let h: Holder = toml::from_str("timeout = 15").unwrap();
        assert_eq!(h.timeout, Duration::from_secs(15));

        assert!(toml::from_str::<Holder>(r#"timeout = "soon""#).is_err());
    }

    #[test]
    fn serializes_as_humantime_string() {
        let out = toml::to_string(&Holder {
            timeout: Duration::from_secs(10),
        })
        .unwrap();
        assert_eq!(out.trim(), r#"timeout = "10s""#);
    }
}
