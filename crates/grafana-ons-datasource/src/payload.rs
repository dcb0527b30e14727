//! The JSON payload of an individual query, as built by the query editor.
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::Error;

/// The operation a query asks for.
///
/// Unknown values are kept in [`Action::Other`] and produce no data.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    /// The per-topic message backlog of a consumer group.
    ConsumerAccumulate,
    /// Produced messages per second on a topic.
    TrendTopicInputTps,
    /// Consumed messages per second for a consumer group on a topic.
    TrendGroupOutputTps,
    /// Any other value, including an empty or missing action.
    Other(String),
}

impl Default for Action {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl Action {
    /// The wire representation of this action.
    pub fn as_str(&self) -> &str {
        match self {
            Self::ConsumerAccumulate => "ConsumerAccumulate",
            Self::TrendTopicInputTps => "TrendTopicInputTps",
            Self::TrendGroupOutputTps => "TrendGroupOutputTps",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for Action {
    fn from(other: String) -> Self {
        match other.as_str() {
            "ConsumerAccumulate" => Self::ConsumerAccumulate,
            "TrendTopicInputTps" => Self::TrendTopicInputTps,
            "TrendGroupOutputTps" => Self::TrendGroupOutputTps,
            _ => Self::Other(other),
        }
    }
}

impl From<Action> for String {
    fn from(other: Action) -> Self {
        match other {
            Action::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A window of time in epoch milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimeWindow {
    /// Start of the window.
    pub begin_ms: i64,
    /// End of the window.
    pub end_ms: i64,
}

/// The payload of a single query.
///
/// Missing fields, and fields explicitly set to `null`, take their zero value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryPayload {
    /// The operation to perform.
    #[serde(deserialize_with = "nullable")]
    pub action: Action,
    /// The consumer group, for group scoped actions.
    #[serde(deserialize_with = "nullable")]
    pub group_id: String,
    /// The topic, for topic scoped actions.
    #[serde(deserialize_with = "nullable")]
    pub topic: String,
    /// Start of the query window in epoch milliseconds; `0` means the dashboard range.
    #[serde(deserialize_with = "nullable")]
    pub from: i64,
    /// End of the query window in epoch milliseconds; `0` means the dashboard range.
    #[serde(deserialize_with = "nullable")]
    pub to: i64,
    /// Whether the query is hidden, in which case it is not run at all.
    #[serde(deserialize_with = "nullable")]
    pub hide: bool,
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl QueryPayload {
    /// Parse a payload from raw JSON bytes.
    pub fn parse(json: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(json).map_err(|source| Error::Decode {
            what: "query payload",
            source,
        })
    }

    /// Parse a payload from JSON already decoded by the plugin SDK.
    pub fn from_value(json: Value) -> Result<Self, Error> {
        serde_json::from_value(json).map_err(|source| Error::Decode {
            what: "query payload",
            source,
        })
    }

    /// The window to query, falling back to `dashboard` for unset bounds.
    pub fn window(&self, dashboard: TimeWindow) -> TimeWindow {
        TimeWindow {
            begin_ms: if self.from == 0 {
                dashboard.begin_ms
            } else {
                self.from
            },
            end_ms: if self.to == 0 { dashboard.end_ms } else { self.to },
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_full_payload() {
        let payload = QueryPayload::parse(
            br#"{
                "refId": "A",
                "datasource": {"type": "ons", "uid": "abc"},
                "action": "TrendGroupOutputTps",
                "groupId": "GID_orders",
                "topic": "orders",
                "from": 1600000000000,
                "to": 1600000600000,
                "hide": false
            }"#,
        )
        .unwrap();
        assert_eq!(
            payload,
            QueryPayload {
                action: Action::TrendGroupOutputTps,
                group_id: "GID_orders".to_string(),
                topic: "orders".to_string(),
                from: 1_600_000_000_000,
                to: 1_600_000_600_000,
                hide: false,
            }
        );
    }

    #[test]
    fn round_trip() {
        for action in [
            "ConsumerAccumulate",
            "TrendTopicInputTps",
            "TrendGroupOutputTps",
            "SomethingNew",
        ] {
            let json = json!({
                "action": action,
                "groupId": "GID_a",
                "topic": "t",
                "from": 1,
                "to": 2,
                "hide": true,
            });
            let payload = QueryPayload::from_value(json.clone()).unwrap();
            assert_eq!(serde_json::to_value(&payload).unwrap(), json);
        }
    }

    #[test]
    fn missing_fields_take_zero_values() {
        let payload = QueryPayload::from_value(json!({"action": "ConsumerAccumulate"})).unwrap();
        assert_eq!(payload.group_id, "");
        assert_eq!(payload.topic, "");
        assert_eq!(payload.from, 0);
        assert_eq!(payload.to, 0);
        assert!(!payload.hide);
        assert_eq!(QueryPayload::from_value(json!({})).unwrap(), QueryPayload::default());
        assert_eq!(
            QueryPayload::from_value(json!({"action": null, "hide": null})).unwrap(),
            QueryPayload::default()
        );
    }

    #[test]
    fn unknown_action_is_accepted() {
        let payload = QueryPayload::from_value(json!({"action": "DeleteEverything"})).unwrap();
        assert_eq!(payload.action, Action::Other("DeleteEverything".to_string()));
        let payload = QueryPayload::from_value(json!({"action": ""})).unwrap();
        assert_eq!(payload.action, Action::default());
    }

    #[test]
    fn malformed_payloads() {
        assert!(QueryPayload::parse(b"{\"action\": ").is_err());
        assert!(QueryPayload::parse(b"").is_err());
        assert!(QueryPayload::from_value(json!({"from": "yesterday"})).is_err());
        assert!(QueryPayload::from_value(json!({"hide": "yes"})).is_err());
    }

    #[test]
    fn window_falls_back_to_dashboard() {
        let dashboard = TimeWindow {
            begin_ms: 100,
            end_ms: 200,
        };
        let payload = QueryPayload {
            from: 150,
            ..Default::default()
        };
        assert_eq!(
            payload.window(dashboard),
            TimeWindow {
                begin_ms: 150,
                end_ms: 200
            }
        );
        assert_eq!(QueryPayload::default().window(dashboard), dashboard);
    }
}
