use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One link to bring up and open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkConfig {
    /// Interface name, e.g. `canfd1`.
    pub name: String,
    /// Bit rate to configure. `None` leaves the interface as the OS has it.
    #[serde(default)]
    pub bitrate: Option<u32>,
}

impl LinkConfig {
    pub fn new(name: impl Into<String>, bitrate: Option<u32>) -> Self {
        Self {
            name: name.into(),
            bitrate,
        }
    }
}

impl FromStr for LinkConfig {
    type Err = String;

    /// Parses `NAME` or `NAME@BITRATE`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, bitrate) = match s.split_once('@') {
            Some((name, rate)) => {
                let rate = rate
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| format!("invalid bitrate in link spec: {s}"))?;
                (name.trim(), Some(rate))
            }
            None => (s.trim(), None),
        };
        if name.is_empty() {
            return Err(format!("missing interface name in link spec: {s}"));
        }
        Ok(Self::new(name, bitrate))
    }
}

/// A directed forwarding rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Route {
    pub source: String,
    pub destination: String,
}

impl Route {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

impl FromStr for Route {
    type Err = String;

    /// Parses `SOURCE:DESTINATION`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((src, dst)) if !src.trim().is_empty() && !dst.trim().is_empty() => {
                Ok(Self::new(src.trim(), dst.trim()))
            }
            _ => Err(format!("route must be SOURCE:DESTINATION, got {s}")),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.destination)
    }
}

/// Which frames get retransmitted, chosen once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Each link forwards to the next one in configuration order, the last
    /// wrapping to the first.
    #[default]
    Forward,
    /// Observe only; nothing is retransmitted.
    Monitor,
    /// Explicit source → destination rules.
    Routes(Vec<Route>),
}

impl Policy {
    pub fn name(&self) -> &'static str {
        match self {
            Policy::Forward => "forward",
            Policy::Monitor => "monitor",
            Policy::Routes(_) => "routes",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_link_specs() {
        assert_eq!(
            "canfd1@250000".parse::<LinkConfig>().unwrap(),
            LinkConfig::new("canfd1", Some(250_000))
        );
        assert_eq!(
            "vcan0".parse::<LinkConfig>().unwrap(),
            LinkConfig::new("vcan0", None)
        );
        assert!("@500000".parse::<LinkConfig>().is_err());
        assert!("can0@fast".parse::<LinkConfig>().is_err());
    }

    #[test]
    fn parses_routes() {
        assert_eq!(
            "canfd1:canfd2".parse::<Route>().unwrap(),
            Route::new("canfd1", "canfd2")
        );
        assert!("canfd1".parse::<Route>().is_err());
        assert!(":canfd2".parse::<Route>().is_err());
    }

    #[test]
    fn policy_json_forms() {
        let forward: Policy = serde_json::from_str("\"forward\"").unwrap();
        assert_eq!(forward, Policy::Forward);

        let monitor: Policy = serde_json::from_str("\"monitor\"").unwrap();
        assert_eq!(monitor, Policy::Monitor);

        let routes: Policy = serde_json::from_str(
            r#"{"routes":[{"source":"a","destination":"b"}]}"#,
        )
        .unwrap();
        assert_eq!(routes, Policy::Routes(vec![Route::new("a", "b")]));
    }
}
