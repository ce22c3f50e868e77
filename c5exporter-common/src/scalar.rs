//! Parsers for the primitive tokens found in C5 status payloads.

use crate::error::{Error, Result};

/// Largest value accepted for a counter token.
///
/// The C5 daemons format their counters as 63-bit signed integers.
pub const MAX_COUNTER_VALUE: u64 = (1 << 62) - 1;

const KIB: u64 = 1024;
const MIB: u64 = KIB * 1024;
const GIB: u64 = MIB * 1024;
const TIB: u64 = GIB * 1024;

/// Parse a strictly decimal, non-negative integer token.
pub fn parse_unsigned(token: &str) -> Result<u64> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::MalformedNumber(token.to_string()));
    }

    match token.parse::<u64>() {
        Ok(value) if value <= MAX_COUNTER_VALUE => Ok(value),
        _ => Err(Error::MalformedNumber(token.to_string())),
    }
}

/// Parse a human readable size such as `383MB` or `2048mb` into bytes.
///
/// Units are powers of 1024. A missing or unrecognized unit leaves the value in bytes.
pub fn parse_byte_size(token: &str) -> Result<u64> {
    let split = token
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(token.len());
    let (number, unit) = token.split_at(split);

    let size = parse_unsigned(number).map_err(|_| Error::MalformedSize(token.to_string()))?;

    let multiplier = match unit.to_ascii_lowercase().as_str() {
        "kb" => KIB,
        "mb" => MIB,
        "gb" => GIB,
        "tb" => TIB,
        _ => 1,
    };

    size.checked_mul(multiplier)
        .ok_or_else(|| Error::MalformedSize(token.to_string()))
}

/// Operational state of a C5 daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ProcessState {
    /// `inactive` or `passive`.
    Inactive = 0,
    /// `active`.
    Active = 1,
    /// A state word we do not know.
    Unknown = 2,
    /// No daemon reported a state at all.
    Unreported = 3,
}

impl ProcessState {
    /// Parse a single state word. Empty input is treated as unreported.
    pub fn from_word(word: &str) -> Self {
        match word {
            "" => Self::Unreported,
            "active" => Self::Active,
            "inactive" | "passive" => Self::Inactive,
            _ => Self::Unknown,
        }
    }

    /// Numeric value exported for this state.
    pub fn value(self) -> u64 {
        self as u64
    }
}

/// Resolve the daemon state from the per-role state fields.
///
/// Each daemon fills only the field of its own role (proxy, queue or registrar), so
/// the first non-empty candidate decides and the rest are ignored.
pub fn parse_process_state(candidates: &[&str]) -> ProcessState {
    candidates
        .iter()
        .find(|s| !s.is_empty())
        .map(|s| ProcessState::from_word(s))
        .unwrap_or(ProcessState::Unreported)
}

/// Map the transaction-user queue status to 1 (healthy) or 0.
pub fn parse_queue_health(status: &str) -> u64 {
    u64::from(status.starts_with("OK"))
}
