//! The status document served by a C5 daemon and its counter listing.

use serde::{Deserialize, Deserializer};

const EVENT_SECTION_MARKER: &str = "Event counters";
const USAGE_SECTION_MARKER: &str = "Usage counters";

/// Status document returned by a C5 daemon's command endpoint.
///
/// ```json
/// {
///   "proxyState": "active",
///   "buildVersion": "Version: 6.0.2.57, compiled on Jan 15 2020, 13:06:31 built by ...",
///   "startupTime": "2020-01-19 04:01:04.503",
///   "memoryUsage": "C5 Heap Health: OK  - Mem used: 2%  - Mem used: 57MB  - Mem total: 2048MB  - Max: 3% - UpdCtr: 13198",
///   "tuQueueStatus": "OK - checked: 1830",
///   "counterInfos": [ "...", ["...", "..."] ]
/// }
/// ```
///
/// Only the daemon's own role fills its state field (`proxyState` for sipproxyd,
/// `queueState` for acdqueued, `registrarState` for registrard).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    #[serde(default, deserialize_with = "nullable_string")]
    pub proxy_state: String,

    #[serde(default, deserialize_with = "nullable_string")]
    pub queue_state: String,

    #[serde(default, deserialize_with = "nullable_string")]
    pub registrar_state: String,

    /// Some firmware releases emit this key with a trailing colon.
    #[serde(default, alias = "buildVersion:", deserialize_with = "nullable_string")]
    pub build_version: String,

    #[serde(default, alias = "startupTime:", deserialize_with = "nullable_string")]
    pub startup_time: String,

    #[serde(default, deserialize_with = "nullable_string")]
    pub memory_usage: String,

    #[serde(default, deserialize_with = "nullable_string")]
    pub tu_queue_status: String,

    #[serde(default, deserialize_with = "nullable_entries")]
    pub counter_infos: Vec<CounterEntry>,
}

impl StatusResponse {
    /// Decode a status document from its JSON body.
    pub fn from_json(body: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// The state fields in the order they are consulted.
    pub fn state_candidates(&self) -> [&str; 3] {
        [
            self.proxy_state.as_str(),
            self.queue_state.as_str(),
            self.registrar_state.as_str(),
        ]
    }
}

fn nullable_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_entries<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<CounterEntry>, D::Error> {
    Ok(Option::<Vec<CounterEntry>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Kind of counters listed after a section header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Section {
    #[default]
    Event,
    Usage,
}

/// One element of the `counterInfos` listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawEntry")]
pub enum CounterEntry {
    /// A section header switching the kind of the following lines.
    Header(Section),
    /// A single counter line.
    Line(String),
    /// A usage counter spread over several lines, one per sub-instance.
    Group(Vec<String>),
}

impl CounterEntry {
    /// Classify a plain text entry.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.contains(EVENT_SECTION_MARKER) {
            CounterEntry::Header(Section::Event)
        } else if text.contains(USAGE_SECTION_MARKER) {
            CounterEntry::Header(Section::Usage)
        } else {
            CounterEntry::Line(text)
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Text(String),
    Group(Vec<String>),
}

impl From<RawEntry> for CounterEntry {
    fn from(raw: RawEntry) -> Self {
        match raw {
            RawEntry::Text(text) => CounterEntry::from_text(text),
            RawEntry::Group(lines) => CounterEntry::Group(lines),
        }
    }
}
