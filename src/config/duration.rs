// ABOUTME: A duration deserializer that accepts both a humantime string ("10s") and plain seconds.
// ABOUTME: The YAML layer favors humantime strings; the environment layer supplies bare integers.

use serde::de::{self, Visitor};
use serde::Deserializer;
use std::fmt;
use std::time::Duration;

struct FlexibleDurationVisitor;

impl<'de> Visitor<'de> for FlexibleDurationVisitor {
    type Value = Duration;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a duration, either plain seconds or a humantime string like \"10s\"")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Duration, E> {
        Ok(Duration::from_secs(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Duration, E> {
        Ok(Duration::from_secs(v.max(0) as u64))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Duration, E> {
        if let Ok(secs) = v.parse::<u64>() {
            return Ok(Duration::from_secs(secs));
        }
        humantime::parse_duration(v).map_err(de::Error::custom)
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(FlexibleDurationVisitor)
}
