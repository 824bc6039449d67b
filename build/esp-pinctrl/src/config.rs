// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-chip pin configuration, as read from `<soc>.yml`.
//!
//! The document is a mapping of device name to pin name to descriptor:
//!
//! ```yaml
//! uart0:
//!   tx:
//!     gpio: [1, [4, 6]]
//!     sigo: u0txd
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Prefix applied to every signal identifier.
const SIGNAL_PREFIX: &str = "ESP_";

/// Signal name used when a descriptor doesn't route a signal.
const NO_SIGNAL: &str = "NOSIG";

/// Device name to pin name to descriptor. Both levels iterate in byte-wise
/// lexicographic key order.
pub type PinctrlConfig = BTreeMap<String, BTreeMap<String, PinDescriptor>>;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PinDescriptor {
    /// Kept untyped so that a malformed list is reported against `gpio`
    /// instead of surfacing as a parse error.
    #[serde(default)]
    pub gpio: Option<Value>,
    #[serde(default)]
    pub sigi: Option<String>,
    #[serde(default)]
    pub sigo: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

impl PinDescriptor {
    /// Resolves every GPIO number this pin can be muxed to, in the order
    /// they're listed.
    pub fn gpios(&self) -> Result<Vec<i64>> {
        match &self.gpio {
            Some(gpio) => expand_gpios(gpio),
            None => Err(ConfigError::new("gpio", "missing property").into()),
        }
    }

    /// Returns the `ESP_`-prefixed signal identifier for one direction,
    /// falling back to `ESP_NOSIG`.
    pub fn signal(&self, dir: Direction) -> String {
        let sig = match dir {
            Direction::Input => self.sigi.as_deref(),
            Direction::Output => self.sigo.as_deref(),
        };
        match sig {
            Some(s) => format!("{SIGNAL_PREFIX}{}", s.to_uppercase()),
            None => format!("{SIGNAL_PREFIX}{NO_SIGNAL}"),
        }
    }
}

/// A problem with the contents of an otherwise well-formed document. These
/// are for whoever maintains the chip's pin table, so `Display` produces
/// the `ERR(source):message` line the tool exits with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigError {
    pub source: &'static str,
    pub message: &'static str,
}

impl ConfigError {
    pub fn new(source: &'static str, message: &'static str) -> Self {
        Self { source, message }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ERR({}):{}", self.source, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Expands a `gpio` list. Each entry is either a single GPIO number or an
/// inclusive `[start, end]` pair. A pair with `start > end` expands to
/// nothing.
pub fn expand_gpios(gpio: &Value) -> Result<Vec<i64>> {
    let bad_shape = || ConfigError::new("gpio", "bad type / wrong list size");

    let Value::Sequence(entries) = gpio else {
        return Err(bad_shape().into());
    };

    let mut ios = vec![];
    for entry in entries {
        match entry {
            Value::Number(n) => {
                ios.push(n.as_i64().ok_or_else(bad_shape)?);
            }
            Value::Sequence(range) if range.len() == 2 => {
                let start = range[0].as_i64().ok_or_else(bad_shape)?;
                let end = range[1].as_i64().ok_or_else(bad_shape)?;
                if start > end {
                    log::warn!("gpio range [{start}, {end}] is empty");
                }
                ios.extend(start..=end);
            }
            _ => return Err(bad_shape().into()),
        }
    }
    Ok(ios)
}

pub fn parse(text: &str) -> Result<PinctrlConfig> {
    Ok(serde_yaml::from_str(text)?)
}

pub fn load(path: &Path) -> Result<PinctrlConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse(&text).with_context(|| format!("failed to parse {}", path.display()))
}
