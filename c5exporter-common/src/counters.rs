//! Parsers for the fixed-width counter listings of a C5 status payload.
//!
//! ```text
//!        Event counters                              absolute   curr   last
//!   0 TRANSPORT_MESSAGE_IN                              6461     31     69
//!        Usage counters                              current    min    max   lMin   lMax   lAvg
//!  45 CALL_CONTROL_ACTIVE_CALLS                           0      0      0      0      0      0
//! ```

use crate::error::{Error, Result};
use crate::scalar::parse_unsigned;

const EVENT_FIELDS: usize = 3;
const USAGE_FIELDS: usize = 8;
const CONTINUATION_FIELDS: usize = 6;

/// A monotonically increasing count since the daemon started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCounter {
    pub id: String,
    pub name: String,
    /// Position within an indexed counter family.
    pub index: Option<usize>,
    pub total: u64,
}

/// A gauge together with the statistics of the last measuring interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageCounter {
    pub id: String,
    pub name: String,
    /// Position within an indexed counter family.
    pub index: Option<usize>,
    pub current: u64,
    pub last_min: u64,
    pub last_avg: u64,
    pub last_max: u64,
}

/// A parsed counter of either kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Counter {
    Event(EventCounter),
    Usage(UsageCounter),
}

impl Counter {
    /// Counter name as reported by the daemon.
    pub fn name(&self) -> &str {
        match self {
            Counter::Event(c) => &c.name,
            Counter::Usage(c) => &c.name,
        }
    }
}

/// Split a line into whitespace separated tokens, requiring at least `expected` of them.
fn tokenize(line: &str, expected: usize) -> Result<Vec<&str>> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < expected {
        return Err(Error::MalformedCounterLine {
            line: line.to_string(),
            expected,
            found: tokens.len(),
        });
    }
    Ok(tokens)
}

/// Parse an event counter line: `id name total [curr last]`.
pub fn parse_event_line(line: &str) -> Result<EventCounter> {
    let tokens = tokenize(line, EVENT_FIELDS)?;

    Ok(EventCounter {
        id: tokens[0].to_string(),
        name: tokens[1].to_string(),
        index: None,
        total: parse_unsigned(tokens[2])?,
    })
}

/// Parse a usage counter line: `id name current min max lMin lMax lAvg`.
///
/// The absolute `min` and `max` columns are not exported.
pub fn parse_usage_line(line: &str) -> Result<UsageCounter> {
    let tokens = tokenize(line, USAGE_FIELDS)?;

    Ok(UsageCounter {
        id: tokens[0].to_string(),
        name: tokens[1].to_string(),
        index: None,
        current: parse_unsigned(tokens[2])?,
        last_min: parse_unsigned(tokens[5])?,
        last_max: parse_unsigned(tokens[6])?,
        last_avg: parse_unsigned(tokens[7])?,
    })
}

/// Parse a usage counter spanning several lines, one per sub-instance.
///
/// ```text
///  84 TRANSACTION_AND_TU_TU_MANAGER_QUEUE_SIZE          0      0      3      0      9      0
///                                                       0      0      3      0      4      0
/// ```
///
/// Continuation lines carry no id or name; they take both from the first line. Every
/// counter of the group is indexed by its position, starting at 0.
pub fn parse_usage_group<S: AsRef<str>>(lines: &[S]) -> Result<Vec<UsageCounter>> {
    let Some((first, rest)) = lines.split_first() else {
        return Ok(Vec::new());
    };

    let mut head = parse_usage_line(first.as_ref())?;
    head.index = Some(0);

    let mut counters = Vec::with_capacity(lines.len());
    for (offset, line) in rest.iter().enumerate() {
        let tokens = tokenize(line.as_ref(), CONTINUATION_FIELDS)?;
        counters.push(UsageCounter {
            id: head.id.clone(),
            name: head.name.clone(),
            index: Some(offset + 1),
            current: parse_unsigned(tokens[0])?,
            last_min: parse_unsigned(tokens[3])?,
            last_max: parse_unsigned(tokens[4])?,
            last_avg: parse_unsigned(tokens[5])?,
        });
    }
    counters.insert(0, head);

    Ok(counters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event_line() {
        let counter =
            parse_event_line("  0 TRANSPORT_MESSAGE_IN                              6461     31     69")
                .unwrap();

        assert_eq!(
            counter,
            EventCounter {
                id: "0".to_string(),
                name: "TRANSPORT_MESSAGE_IN".to_string(),
                index: None,
                total: 6461,
            }
        );
    }

    #[test]
    fn test_parse_event_line_minimal() {
        let counter = parse_event_line("7 FOO 10").unwrap();
        assert_eq!(counter.total, 10);
    }

    #[test]
    fn test_parse_event_line_too_short() {
        let err = parse_event_line("  0 TRANSPORT_MESSAGE_IN").unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedCounterLine {
                expected: 3,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_event_line_bad_total() {
        assert!(matches!(
            parse_event_line("0 FOO many"),
            Err(Error::MalformedNumber(_))
        ));
    }

    #[test]
    fn test_parse_usage_line() {
        let counter = parse_usage_line(
            " 45 CALL_CONTROL_ACTIVE_CALLS                           7      1      9      2      8      5",
        )
        .unwrap();

        assert_eq!(
            counter,
            UsageCounter {
                id: "45".to_string(),
                name: "CALL_CONTROL_ACTIVE_CALLS".to_string(),
                index: None,
                current: 7,
                last_min: 2,
                last_avg: 5,
                last_max: 8,
            }
        );
    }

    #[test]
    fn test_parse_usage_line_too_short() {
        assert!(matches!(
            parse_usage_line(" 45 CALL_CONTROL_ACTIVE_CALLS 0 0 0 0 0"),
            Err(Error::MalformedCounterLine {
                expected: 8,
                found: 7,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_usage_group() {
        let lines = [
            " 84 TRANSACTION_AND_TU_TU_MANAGER_QUEUE_SIZE          0      0      3      0      9      0",
            "                                                      1      0      3      2      4      3",
            "                                                      5      0      2      4      6      5",
        ];
        let counters = parse_usage_group(&lines).unwrap();

        assert_eq!(counters.len(), 3);
        for (i, counter) in counters.iter().enumerate() {
            assert_eq!(counter.id, "84");
            assert_eq!(counter.name, "TRANSACTION_AND_TU_TU_MANAGER_QUEUE_SIZE");
            assert_eq!(counter.index, Some(i));
        }

        assert_eq!(counters[0].last_max, 9);
        assert_eq!(
            (
                counters[1].current,
                counters[1].last_min,
                counters[1].last_max,
                counters[1].last_avg
            ),
            (1, 2, 4, 3)
        );
        assert_eq!(counters[2].current, 5);
        assert_eq!(counters[2].last_avg, 5);
    }

    #[test]
    fn test_parse_usage_group_empty() {
        let lines: [&str; 0] = [];
        assert!(parse_usage_group(&lines).unwrap().is_empty());
    }

    #[test]
    fn test_parse_usage_group_short_continuation() {
        let lines = vec![
            " 2 BAZ 1 0 0 0 0 0".to_string(),
            " 0 0 0".to_string(),
        ];
        assert!(matches!(
            parse_usage_group(&lines),
            Err(Error::MalformedCounterLine {
                expected: 6,
                found: 3,
                ..
            })
        ));
    }
}
