use std::path::{Path, PathBuf};
use std::time::Duration;

use canbridge_decode::DecoderIds;
use canbridge_router::{
    ForwardingTable, LinkConfig, Policy, PolicyError, DEFAULT_POLL_TIMEOUT, DEFAULT_SETTLE_DELAY,
};
use serde::{Deserialize, Serialize};

/// Errors loading or resolving the bridge configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid duration {value:?}: {reason}")]
    InvalidDuration { value: String, reason: &'static str },

    #[error("poll timeout must be greater than zero")]
    ZeroPollTimeout,

    #[error(transparent)]
    Policy(#[from] PolicyError),
}

/// On-disk configuration. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    pub links: Vec<LinkConfig>,
    pub policy: Policy,
    pub poll_timeout_ms: u64,
    pub settle_delay_ms: u64,
    pub decoders: DecoderIds,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            links: vec![
                LinkConfig::new("canfd1", Some(250_000)),
                LinkConfig::new("canfd2", Some(500_000)),
                LinkConfig::new("canfd3", Some(500_000)),
            ],
            policy: Policy::Forward,
            poll_timeout_ms: millis(DEFAULT_POLL_TIMEOUT),
            settle_delay_ms: millis(DEFAULT_SETTLE_DELAY),
            decoders: DecoderIds::default(),
        }
    }
}

/// Values given on the command line. Set fields replace file values.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub links: Vec<LinkConfig>,
    pub policy: Option<Policy>,
    pub poll_timeout: Option<Duration>,
    pub settle_delay: Option<Duration>,
    pub keypad_id: Option<u32>,
    pub control_id: Option<u32>,
}

/// Fully resolved settings, ready to start a bridge.
#[derive(Debug, Clone)]
pub struct BridgeSettings {
    pub links: Vec<LinkConfig>,
    pub policy: Policy,
    pub table: ForwardingTable,
    pub poll_timeout: Duration,
    pub settle_delay: Duration,
    pub decoders: DecoderIds,
}

impl BridgeConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if !overrides.links.is_empty() {
            self.links = overrides.links;
        }
        if let Some(policy) = overrides.policy {
            self.policy = policy;
        }
        if let Some(timeout) = overrides.poll_timeout {
            self.poll_timeout_ms = millis(timeout);
        }
        if let Some(delay) = overrides.settle_delay {
            self.settle_delay_ms = millis(delay);
        }
        if let Some(id) = overrides.keypad_id {
            self.decoders.keypad_id = id;
        }
        if let Some(id) = overrides.control_id {
            self.decoders.control_id = id;
        }
    }

    pub fn resolve(self) -> Result<BridgeSettings, ConfigError> {
        if self.poll_timeout_ms == 0 {
            return Err(ConfigError::ZeroPollTimeout);
        }
        let names: Vec<String> = self.links.iter().map(|l| l.name.clone()).collect();
        let table = ForwardingTable::resolve(&self.policy, &names)?;

        Ok(BridgeSettings {
            links: self.links,
            policy: self.policy,
            table,
            poll_timeout: Duration::from_millis(self.poll_timeout_ms),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            decoders: self.decoders,
        })
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Parses `2s`, `150ms` or a bare number of seconds.
pub fn parse_duration(value: &str) -> Result<Duration, ConfigError> {
    let trimmed = value.trim();
    let invalid = |reason| ConfigError::InvalidDuration {
        value: value.to_string(),
        reason,
    };
    if trimmed.is_empty() {
        return Err(invalid("empty"));
    }

    let (digits, unit_ms) = if let Some(ms) = trimmed.strip_suffix("ms") {
        (ms, 1)
    } else if let Some(s) = trimmed.strip_suffix('s') {
        (s, 1000)
    } else {
        (trimmed, 1000)
    };

    let amount = digits
        .trim()
        .parse::<u64>()
        .map_err(|_| invalid("expected e.g. 1s or 250ms"))?;
    let total = amount
        .checked_mul(unit_ms)
        .ok_or_else(|| invalid("too large"))?;
    Ok(Duration::from_millis(total))
}

/// Parses a CAN identifier as `0x`-prefixed hex or decimal.
pub fn parse_can_id(value: &str) -> Result<u32, String> {
    let trimmed = value.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => trimmed.parse::<u32>(),
    };
    let id = parsed.map_err(|_| format!("invalid CAN identifier: {value}"))?;
    if id > canbridge_frame::CAN_EFF_MASK {
        return Err(format!("CAN identifier out of range (max 0x1FFFFFFF): {value}"));
    }
    Ok(id)
}

/// Parses one payload byte in hex, with or without `0x`.
pub fn parse_hex_byte(value: &str) -> Result<u8, String> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() || digits.len() > 2 {
        return Err(format!("invalid payload byte: {value}"));
    }
    u8::from_str_radix(digits, 16).map_err(|_| format!("invalid payload byte: {value}"))
}

#[cfg(test)]
mod tests {
    use canbridge_router::Route;

    use super::*;

    #[test]
    fn defaults_match_three_link_ring() {
        let settings = BridgeConfig::default().resolve().unwrap();
        let names: Vec<&str> = settings.links.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["canfd1", "canfd2", "canfd3"]);
        assert_eq!(settings.links[0].bitrate, Some(250_000));
        assert_eq!(settings.table.destinations(2), &[0]);
        assert_eq!(settings.poll_timeout, Duration::from_secs(1));
        assert_eq!(settings.settle_delay, Duration::from_millis(100));
    }

    #[test]
    fn parses_partial_file() {
        let config: BridgeConfig = serde_json::from_str(
            r#"{
                "links": [{"name": "can0"}, {"name": "can1", "bitrate": 125000}],
                "policy": {"routes": [{"source": "can0", "destination": "can1"}]},
                "decoders": {"keypad_id": 401}
            }"#,
        )
        .unwrap();

        assert_eq!(config.links[0], LinkConfig::new("can0", None));
        assert_eq!(
            config.policy,
            Policy::Routes(vec![Route::new("can0", "can1")])
        );
        assert_eq!(config.decoders.keypad_id, 401);
        assert_eq!(config.decoders.control_id, DecoderIds::default().control_id);
        assert_eq!(config.poll_timeout_ms, 1000);
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = serde_json::from_str::<BridgeConfig>(r#"{"bitrate": 5}"#).unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = BridgeConfig::default();
        config.apply(Overrides {
            links: vec![LinkConfig::new("vcan0", None), LinkConfig::new("vcan1", None)],
            policy: Some(Policy::Monitor),
            poll_timeout: Some(Duration::from_millis(250)),
            keypad_id: Some(0x181),
            ..Overrides::default()
        });

        let settings = config.resolve().unwrap();
        assert_eq!(settings.links.len(), 2);
        assert!(settings.table.is_monitor_only());
        assert_eq!(settings.poll_timeout, Duration::from_millis(250));
        assert_eq!(settings.settle_delay, Duration::from_millis(100));
        assert_eq!(settings.decoders.keypad_id, 0x181);
    }

    #[test]
    fn unknown_route_endpoint_fails_to_resolve() {
        let mut config = BridgeConfig::default();
        config.policy = Policy::Routes(vec![Route::new("canfd1", "canfd9")]);
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::Policy(PolicyError::UnknownLink(name))) if name == "canfd9"
        ));
    }

    #[test]
    fn zero_poll_timeout_is_rejected() {
        let mut config = BridgeConfig::default();
        config.poll_timeout_ms = 0;
        assert!(matches!(config.resolve(), Err(ConfigError::ZeroPollTimeout)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = BridgeConfig::load(Path::new("/nonexistent/canbridge.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/canbridge.json"));
    }

    #[test]
    fn duration_forms() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
        assert_eq!(parse_duration("0ms").unwrap(), Duration::ZERO);
        assert!(parse_duration("").is_err());
        assert!(parse_duration("fast").is_err());
    }

    #[test]
    fn can_id_forms() {
        assert_eq!(parse_can_id("0x195").unwrap(), 0x195);
        assert_eq!(parse_can_id("405").unwrap(), 405);
        assert_eq!(parse_can_id("0x0C000003").unwrap(), 0x0C00_0003);
        assert!(parse_can_id("0x20000000").is_err());
        assert!(parse_can_id("keypad").is_err());
    }

    #[test]
    fn payload_bytes() {
        assert_eq!(parse_hex_byte("7D").unwrap(), 0x7D);
        assert_eq!(parse_hex_byte("0x08").unwrap(), 0x08);
        assert_eq!(parse_hex_byte("f").unwrap(), 0x0F);
        assert!(parse_hex_byte("100").is_err());
        assert!(parse_hex_byte("zz").is_err());
    }
}
