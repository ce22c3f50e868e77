//! Mapping from parsed C5 status data to named metric values.

use std::fmt::Write;

use crate::block::classify_block;
use crate::counters::{Counter, EventCounter, UsageCounter};
use crate::error::Result;
use crate::fields::{parse_build_banner, parse_memory_health};
use crate::scalar::{parse_process_state, parse_queue_health};
use crate::status::StatusResponse;

/// A fully qualified metric name and its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedMetricValue {
    pub name: String,
    pub value: u64,
}

impl NamedMetricValue {
    pub fn new(name: impl Into<String>, value: u64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Build a metric name from a source prefix, a field name and an optional index.
///
/// The field name is lower-cased and any character outside `[a-z0-9_]` becomes `_`.
/// An index becomes an `idx` label:
/// `build_metric_name("sipproxyd", "Foo_Bar", Some(3))` is `sipproxyd_foo_bar{idx="3"}`.
pub fn build_metric_name(prefix: &str, field: &str, index: Option<usize>) -> String {
    let field: String = field
        .chars()
        .map(|c| match c.to_ascii_lowercase() {
            c @ ('a'..='z' | '0'..='9' | '_') => c,
            _ => '_',
        })
        .collect();
    let mut name = if prefix.is_empty() {
        field
    } else {
        format!("{}_{}", prefix, field)
    };

    if let Some(index) = index {
        write!(name, "{{idx=\"{}\"}}", index).ok();
    }

    name
}

/// Name of the metric family, i.e. the metric name without its label set.
pub fn metric_family(name: &str) -> &str {
    name.split('{').next().unwrap_or(name)
}

/// Escape special characters in label values.
pub fn escape_label_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            _ => result.push(c),
        }
    }
    result
}

/// Metric values of an event counter.
pub fn event_metrics(prefix: &str, counter: &EventCounter) -> Vec<NamedMetricValue> {
    vec![NamedMetricValue::new(
        build_metric_name(prefix, &format!("{}_total", counter.name), counter.index),
        counter.total,
    )]
}

/// Metric values of a usage counter.
pub fn usage_metrics(prefix: &str, counter: &UsageCounter) -> Vec<NamedMetricValue> {
    [
        ("current", counter.current),
        ("lastmin", counter.last_min),
        ("lastavg", counter.last_avg),
        ("lastmax", counter.last_max),
    ]
    .into_iter()
    .map(|(suffix, value)| {
        NamedMetricValue::new(
            build_metric_name(prefix, &format!("{}_{}", counter.name, suffix), counter.index),
            value,
        )
    })
    .collect()
}

/// Metric values of a counter of either kind.
pub fn counter_metrics(prefix: &str, counter: &Counter) -> Vec<NamedMetricValue> {
    match counter {
        Counter::Event(c) => event_metrics(prefix, c),
        Counter::Usage(c) => usage_metrics(prefix, c),
    }
}

/// The fixed set of health metrics every daemon reports.
pub fn base_metrics(prefix: &str, status: &StatusResponse) -> Result<Vec<NamedMetricValue>> {
    let memory = parse_memory_health(&status.memory_usage)?;

    let info = format!(
        "{}{{version=\"{}\",starttime=\"{}\"}}",
        build_metric_name(prefix, "info", None),
        escape_label_value(parse_build_banner(&status.build_version)),
        escape_label_value(&status.startup_time),
    );

    Ok(vec![
        NamedMetricValue::new(info, 1),
        NamedMetricValue::new(
            build_metric_name(prefix, "state", None),
            parse_process_state(&status.state_candidates()).value(),
        ),
        NamedMetricValue::new(
            build_metric_name(prefix, "tu_queue_state", None),
            parse_queue_health(&status.tu_queue_status),
        ),
        NamedMetricValue::new(
            build_metric_name(prefix, "memory_used_bytes", None),
            memory.used,
        ),
        NamedMetricValue::new(
            build_metric_name(prefix, "memory_total_bytes", None),
            memory.total,
        ),
        NamedMetricValue::new(
            build_metric_name(prefix, "memory_max_used_percent", None),
            memory.max_percent,
        ),
    ])
}

/// All metric values of one status document.
///
/// The document is parsed completely before anything is returned, so a malformed
/// counter yields an error and no partial metric set.
pub fn source_metrics(prefix: &str, status: &StatusResponse) -> Result<Vec<NamedMetricValue>> {
    let mut metrics = base_metrics(prefix, status)?;
    for counter in classify_block(&status.counter_infos)? {
        metrics.extend(counter_metrics(prefix, &counter));
    }
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::CounterEntry;
    use std::collections::HashSet;

    #[test]
    fn test_build_metric_name() {
        assert_eq!(
            build_metric_name("sipproxyd", "Foo_Bar", None),
            "sipproxyd_foo_bar"
        );
        assert_eq!(
            build_metric_name("sipproxyd", "Foo_Bar", Some(3)),
            "sipproxyd_foo_bar{idx=\"3\"}"
        );
        assert_eq!(build_metric_name("", "FOO", None), "foo");
        assert_eq!(build_metric_name("", "FOO", Some(0)), "foo{idx=\"0\"}");
    }

    #[test]
    fn test_build_metric_name_replaces_invalid_characters() {
        assert_eq!(
            build_metric_name("sipproxyd", "SIP-TRUNK.IN/OUT", None),
            "sipproxyd_sip_trunk_in_out"
        );
        assert_eq!(
            build_metric_name("sipproxyd", "LOAD{X}=\"1\" 2", Some(0)),
            "sipproxyd_load_x___1__2{idx=\"0\"}"
        );
        assert_eq!(build_metric_name("a", "Ünïcode", None), "a__n_code");
    }

    #[test]
    fn test_build_metric_name_distinct_inputs() {
        let inputs = [
            ("sipproxyd", "FOO", None),
            ("sipproxyd", "FOO", Some(0)),
            ("sipproxyd", "FOO", Some(1)),
            ("sipproxyd", "BAR", None),
            ("acdqueued", "FOO", None),
            ("acdqueued", "FOO", Some(0)),
            ("", "FOO", None),
        ];

        let names: HashSet<String> = inputs
            .iter()
            .map(|(p, f, i)| build_metric_name(p, f, *i))
            .collect();
        assert_eq!(names.len(), inputs.len());
    }

    #[test]
    fn test_metric_family() {
        assert_eq!(metric_family("a_b{idx=\"1\"}"), "a_b");
        assert_eq!(metric_family("a_b"), "a_b");
    }

    #[test]
    fn test_escape_label_value() {
        assert_eq!(escape_label_value("simple"), "simple");
        assert_eq!(escape_label_value("with\"quote"), "with\\\"quote");
        assert_eq!(escape_label_value("with\\backslash"), "with\\\\backslash");
        assert_eq!(escape_label_value("with\nnewline"), "with\\nnewline");
    }

    #[test]
    fn test_usage_metrics_names() {
        let counter = UsageCounter {
            id: "84".into(),
            name: "TU_QUEUE_SIZE".into(),
            index: Some(2),
            current: 1,
            last_min: 2,
            last_avg: 3,
            last_max: 4,
        };

        let metrics = usage_metrics("registrard", &counter);
        assert_eq!(
            metrics,
            vec![
                NamedMetricValue::new("registrard_tu_queue_size_current{idx=\"2\"}", 1),
                NamedMetricValue::new("registrard_tu_queue_size_lastmin{idx=\"2\"}", 2),
                NamedMetricValue::new("registrard_tu_queue_size_lastavg{idx=\"2\"}", 3),
                NamedMetricValue::new("registrard_tu_queue_size_lastmax{idx=\"2\"}", 4),
            ]
        );
    }

    #[test]
    fn test_event_metrics_name() {
        let counter = EventCounter {
            id: "0".into(),
            name: "TRANSPORT_MESSAGE_IN".into(),
            index: None,
            total: 6461,
        };
        assert_eq!(
            event_metrics("sipproxyd", &counter),
            vec![NamedMetricValue::new("sipproxyd_transport_message_in_total", 6461)]
        );
    }

    #[test]
    fn test_base_metrics() {
        let status = StatusResponse {
            queue_state: "active".into(),
            build_version: "Version: 6.0.2.57, compiled on Jan 15 2020".into(),
            startup_time: "2020-01-19 04:01:04.503".into(),
            memory_usage: "C5 Heap Health: OK  - Mem used: 2%  - Mem used: 57MB  - Mem total: 2048MB  - Max: 3% - UpdCtr: 13198".into(),
            tu_queue_status: "OK - checked: 1830".into(),
            ..Default::default()
        };

        let metrics = base_metrics("acdqueued", &status).unwrap();

        assert_eq!(
            metrics,
            vec![
                NamedMetricValue::new(
                    "acdqueued_info{version=\"6.0.2.57\",starttime=\"2020-01-19 04:01:04.503\"}",
                    1
                ),
                NamedMetricValue::new("acdqueued_state", 1),
                NamedMetricValue::new("acdqueued_tu_queue_state", 1),
                NamedMetricValue::new("acdqueued_memory_used_bytes", 57 * 1024 * 1024),
                NamedMetricValue::new("acdqueued_memory_total_bytes", 2048 * 1024 * 1024),
                NamedMetricValue::new("acdqueued_memory_max_used_percent", 3),
            ]
        );
    }

    #[test]
    fn test_base_metrics_empty_status() {
        let metrics = base_metrics("x", &StatusResponse::default()).unwrap();

        assert_eq!(metrics[0].name, "x_info{version=\"\",starttime=\"\"}");
        assert_eq!(metrics[1], NamedMetricValue::new("x_state", 3));
        assert_eq!(metrics[2], NamedMetricValue::new("x_tu_queue_state", 0));
    }

    #[test]
    fn test_info_labels_are_escaped() {
        let status = StatusResponse {
            build_version: "Version: 6.\"x\"".into(),
            ..Default::default()
        };
        let metrics = base_metrics("x", &status).unwrap();
        assert_eq!(metrics[0].name, "x_info{version=\"6.\\\"x\\\"\",starttime=\"\"}");
    }

    #[test]
    fn test_source_metrics_fail_fast() {
        let status = StatusResponse {
            counter_infos: vec![
                CounterEntry::from_text("0 FOO 10"),
                CounterEntry::from_text("1 BAR"),
            ],
            ..Default::default()
        };
        assert!(source_metrics("x", &status).is_err());
    }

    #[test]
    fn test_source_metrics_counts() {
        let status = StatusResponse {
            counter_infos: vec![
                CounterEntry::from_text("Event counters"),
                CounterEntry::from_text("0 FOO 10 1 2"),
                CounterEntry::from_text("Usage counters"),
                CounterEntry::from_text("1 BAR 5 0 0 0 1 2"),
            ],
            ..Default::default()
        };

        let metrics = source_metrics("x", &status).unwrap();
        // 6 base + 1 event + 4 usage
        assert_eq!(metrics.len(), 11);
        assert!(metrics.contains(&NamedMetricValue::new("x_foo_total", 10)));
        assert!(metrics.contains(&NamedMetricValue::new("x_bar_lastavg", 2)));
    }
}
