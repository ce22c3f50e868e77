//! Parsers for the composite status strings of a C5 status payload.

use crate::error::{Error, Result};
use crate::scalar::{parse_byte_size, parse_unsigned};

const VERSION_PREFIX: &str = "Version: ";

/// Extract the version label from a build banner.
///
/// `"Version: 6.0.2.57, compiled on Jan 15 2020, 13:06:31 built by ..."` yields `"6.0.2.57"`.
/// A banner without the `Version: ` prefix yields its first comma-separated segment as is.
pub fn parse_build_banner(banner: &str) -> &str {
    let first = banner.split(',').next().unwrap_or_default();
    first.strip_prefix(VERSION_PREFIX).unwrap_or(first)
}

/// Heap usage reported by a C5 daemon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryHealth {
    /// Bytes in use.
    pub used: u64,
    /// Bytes available to the heap.
    pub total: u64,
    /// Peak usage in percent.
    pub max_percent: u64,
}

/// Parse the heap health line.
///
/// Two layouts are in the field and are told apart by the shape of the `Mem used`
/// clauses rather than by any version marker:
///
/// ```text
/// R6.0: C5 Heap Health: OK  - Mem used: 18%  - Mem used: 383MB  - Mem total: 2048MB  - Max: 18% - UpdCtr: 60793
/// R6.2: C5 Heap Health: OK  - Mem used: 3%  76MB  (min: 76 max: 76)  - Mem total: 2048MB  - MAX: 3% - UpdCtr: 92205
/// ```
///
/// Clauses that are absent leave their field at zero.
pub fn parse_memory_health(line: &str) -> Result<MemoryHealth> {
    let mut health = MemoryHealth::default();

    for clause in line.split('-') {
        let Some((key, value)) = clause.trim().split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        match key.trim().to_ascii_lowercase().as_str() {
            "mem used" => {
                // Percentage-only clause; the absolute size follows in its own clause.
                if value.ends_with('%') {
                    continue;
                }
                health.used = if value.contains('%') {
                    let size = value
                        .split_whitespace()
                        .nth(1)
                        .ok_or_else(|| Error::MalformedSize(value.to_string()))?;
                    parse_byte_size(size)?
                } else {
                    parse_byte_size(value)?
                };
            }
            "mem total" => {
                health.total = parse_byte_size(value)?;
            }
            "max" => {
                health.max_percent = parse_unsigned(value.strip_suffix('%').unwrap_or(value))?;
            }
            _ => {}
        }
    }

    Ok(health)
}
