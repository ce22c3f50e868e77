//! Interpretation of the interleaved `counterInfos` listing.

use crate::counters::{Counter, parse_event_line, parse_usage_group, parse_usage_line};
use crate::error::Result;
use crate::status::{CounterEntry, Section};

/// Parse a counter listing into counters.
///
/// The listing mixes event and usage counters in one stream; plain lines are read
/// according to the most recent section header, starting with event counters.
/// Continuation groups are always usage counters and leave the current section
/// untouched. The first malformed line aborts the whole listing.
pub fn classify_block(entries: &[CounterEntry]) -> Result<Vec<Counter>> {
    let mut section = Section::default();
    let mut counters = Vec::with_capacity(entries.len());

    for entry in entries {
        match entry {
            CounterEntry::Header(next) => section = *next,
            CounterEntry::Line(line) => match section {
                Section::Event => counters.push(Counter::Event(parse_event_line(line)?)),
                Section::Usage => counters.push(Counter::Usage(parse_usage_line(line)?)),
            },
            CounterEntry::Group(lines) => {
                counters.extend(parse_usage_group(lines)?.into_iter().map(Counter::Usage));
            }
        }
    }

    Ok(counters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::{EventCounter, UsageCounter};
    use crate::error::Error;

    fn line(text: &str) -> CounterEntry {
        CounterEntry::from_text(text)
    }

    fn group(lines: &[&str]) -> CounterEntry {
        CounterEntry::Group(lines.iter().map(|l| l.to_string()).collect())
    }

    #[test]
    fn test_mixed_block() {
        let entries = vec![
            line("Event counters"),
            line("0 FOO 10 1 2"),
            line("Usage counters"),
            line("1 BAR 5 0 0 0 1 2"),
            group(&[" 2 BAZ 1 0 0 0 0 0", " 0 0 0 0 0 0"]),
        ];

        let counters = classify_block(&entries).unwrap();

        assert_eq!(counters.len(), 4);
        assert_eq!(
            counters[0],
            Counter::Event(EventCounter {
                id: "0".into(),
                name: "FOO".into(),
                index: None,
                total: 10,
            })
        );
        assert_eq!(
            counters[1],
            Counter::Usage(UsageCounter {
                id: "1".into(),
                name: "BAR".into(),
                index: None,
                current: 5,
                last_min: 0,
                last_max: 1,
                last_avg: 2,
            })
        );

        let baz: Vec<_> = counters[2..]
            .iter()
            .map(|c| match c {
                Counter::Usage(u) => (u.name.as_str(), u.index),
                Counter::Event(_) => panic!("expected usage counter"),
            })
            .collect();
        assert_eq!(baz, vec![("BAZ", Some(0)), ("BAZ", Some(1))]);
    }

    #[test]
    fn test_lines_before_any_header_are_events() {
        let counters = classify_block(&[line("3 CALLS 42")]).unwrap();
        assert!(matches!(&counters[0], Counter::Event(c) if c.total == 42));
    }

    #[test]
    fn test_group_does_not_change_section() {
        let entries = vec![
            line("Event counters"),
            group(&["1 QUEUE 1 0 0 0 0 0"]),
            line("2 MSG_IN 7"),
        ];

        let counters = classify_block(&entries).unwrap();

        assert!(matches!(&counters[0], Counter::Usage(c) if c.index == Some(0)));
        assert!(matches!(&counters[1], Counter::Event(c) if c.name == "MSG_IN"));
    }

    #[test]
    fn test_switch_back_to_events() {
        let entries = vec![
            line("Usage counters"),
            line("1 BAR 5 0 0 0 1 2"),
            line("Event counters"),
            line("0 FOO 10"),
        ];

        let counters = classify_block(&entries).unwrap();
        assert!(matches!(counters[0], Counter::Usage(_)));
        assert!(matches!(counters[1], Counter::Event(_)));
    }

    #[test]
    fn test_event_row_in_usage_section_fails() {
        // Event rows have too few columns for a usage counter.
        let entries = vec![line("Usage counters"), line("0 FOO 10 1 2")];
        assert!(matches!(
            classify_block(&entries),
            Err(Error::MalformedCounterLine { .. })
        ));
    }

    #[test]
    fn test_malformed_line_aborts_block() {
        let entries = vec![line("0 FOO 10"), line(""), line("1 BAR 3")];
        assert!(classify_block(&entries).is_err());
    }

    #[test]
    fn test_empty_block() {
        assert!(classify_block(&[]).unwrap().is_empty());
    }
}
