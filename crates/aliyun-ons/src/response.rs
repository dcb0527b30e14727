//! Response bodies of the supported ONS operations.
//!
//! ONS omits fields freely, so every field falls back to its default when absent.
use serde::Deserialize;

/// The body ONS returns alongside a non-2xx status.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ErrorBody {
    /// The request id.
    pub request_id: String,
    /// The error code.
    pub code: String,
    /// The error message.
    pub message: String,
}

/// Response of `OnsConsumerAccumulate`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ConsumerAccumulateResponse {
    /// The request id.
    pub request_id: String,
    /// The backlog of the group.
    pub data: ConsumerAccumulateData,
}

/// Backlog of a consumer group.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ConsumerAccumulateData {
    /// Whether the group has any online consumers.
    pub online: bool,
    /// The total number of messages not yet consumed.
    pub total_diff: i64,
    /// The current consumption rate, in messages per second.
    pub consume_tps: f64,
    /// The time the last message was consumed, in epoch milliseconds.
    pub last_timestamp: i64,
    /// The consumption delay, in milliseconds.
    pub delay_time: i64,
    /// The backlog broken down by topic, only present when requested.
    pub detail_in_topic_list: DetailInTopicList,
}

/// Wrapper ONS puts around the per-topic backlog list.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DetailInTopicList {
    /// The per-topic entries.
    pub detail_in_topic_do: Vec<DetailInTopic>,
}

/// Backlog of a consumer group on a single topic.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DetailInTopic {
    /// The topic name.
    pub topic: String,
    /// The number of messages not yet consumed on this topic.
    pub total_diff: i64,
    /// The time the last message was consumed, in epoch milliseconds.
    pub last_timestamp: i64,
    /// The consumption delay, in milliseconds.
    pub delay_time: i64,
}

/// Response of the `OnsTrend*` operations.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TrendResponse {
    /// The request id.
    pub request_id: String,
    /// The trend series.
    pub data: TrendData,
}

/// A trend series.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TrendData {
    /// The title of the chart.
    pub title: String,
    /// The unit of the X axis.
    pub x_unit: String,
    /// The unit of the Y axis.
    pub y_unit: String,
    /// The data points.
    pub records: Records,
}

/// Wrapper ONS puts around the data points of a trend.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Records {
    /// The data points, oldest first.
    pub stats_data_do: Vec<StatsData>,
}

/// A single data point of a trend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StatsData {
    /// The time of the data point, in epoch milliseconds.
    #[serde(rename = "X")]
    pub x: i64,
    /// The value of the data point.
    #[serde(rename = "Y")]
    pub y: f64,
}

/// Response of `OnsInstanceBaseInfo`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct InstanceBaseInfoResponse {
    /// The request id.
    pub request_id: String,
    /// The instance information.
    pub instance_base_info: InstanceBaseInfo,
}

/// Basic information about an ONS instance.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct InstanceBaseInfo {
    /// The instance ID.
    pub instance_id: String,
    /// The instance name.
    pub instance_name: String,
    /// The instance status code.
    pub instance_status: i32,
    /// The instance type code.
    pub instance_type: i32,
    /// When the instance was released, in epoch milliseconds.
    pub release_time: i64,
    /// The instance description.
    pub remark: String,
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn accumulate_detail() {
        let response: ConsumerAccumulateResponse = serde_json::from_str(
            r#"{
                "RequestId": "5C8A6C62-6F2C-4B3A-8C9A-1F2E3D4C5B6A",
                "Data": {
                    "Online": true,
                    "TotalDiff": 13,
                    "ConsumeTps": 0.5,
                    "DetailInTopicList": {
                        "DetailInTopicDo": [
                            {"Topic": "orders", "TotalDiff": 10, "DelayTime": 3},
                            {"Topic": "refunds", "TotalDiff": 3}
                        ]
                    }
                }
            }"#,
        )
        .unwrap();
        assert!(response.data.online);
        assert_eq!(response.data.total_diff, 13);
        let topics: Vec<_> = response
            .data
            .detail_in_topic_list
            .detail_in_topic_do
            .iter()
            .map(|d| (d.topic.as_str(), d.total_diff))
            .collect();
        assert_eq!(topics, vec![("orders", 10), ("refunds", 3)]);
    }

    #[test]
    fn trend_records() {
        let response: TrendResponse = serde_json::from_str(
            r#"{
                "RequestId": "r",
                "Data": {
                    "Title": "TPS",
                    "XUnit": "time",
                    "YUnit": "tps",
                    "Records": {"StatsDataDo": [{"X": 1000, "Y": 1.5}, {"X": 2000, "Y": 2}]}
                }
            }"#,
        )
        .unwrap();
        assert_eq!(
            response.data.records.stats_data_do,
            vec![StatsData { x: 1000, y: 1.5 }, StatsData { x: 2000, y: 2.0 }]
        );
        assert_eq!(response.data.x_unit, "time");
    }

    #[test]
    fn missing_fields_default() {
        let response: TrendResponse = serde_json::from_str(r#"{"RequestId": "r"}"#).unwrap();
        assert!(response.data.records.stats_data_do.is_empty());
        let response: ConsumerAccumulateResponse = serde_json::from_str("{}").unwrap();
        assert!(response.data.detail_in_topic_list.detail_in_topic_do.is_empty());
    }

    #[test]
    fn error_body() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"RequestId": "r", "HostId": "ons.cn-shanghai.aliyuncs.com", "Code": "InvalidAccessKeyId.NotFound", "Message": "Specified access key is not found."}"#,
        )
        .unwrap();
        assert_eq!(body.code, "InvalidAccessKeyId.NotFound");
        assert_eq!(body.message, "Specified access key is not found.");
    }
}
