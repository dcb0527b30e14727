use serde::de::DeserializeOwned;

use crate::response::{ConsumerAccumulateResponse, InstanceBaseInfoResponse, TrendResponse};

/// The `Type` selector for trend queries: messages per second.
pub const TREND_TYPE_TPS: i32 = 1;
/// The `Period` selector for trend queries, in minutes.
pub const TREND_PERIOD_MINUTES: i64 = 1;

/// An ONS API operation.
///
/// Implementors describe the `Action` name, the operation specific parameters and the
/// type the response body decodes into. The common RPC parameters (credentials,
/// signature, version etc.) are added by the [`Client`][crate::Client].
pub trait OnsRequest {
    /// The response type of this operation.
    type Response: DeserializeOwned;

    /// The name of the operation, sent as the `Action` parameter.
    const ACTION: &'static str;

    /// The operation specific parameters.
    fn params(&self) -> Vec<(&'static str, String)>;
}

/// Query the message backlog of a consumer group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsumerAccumulateRequest {
    /// The ID of the ONS instance.
    pub instance_id: String,
    /// The ID of the consumer group.
    pub group_id: String,
    /// Whether to include the per-topic breakdown in the response.
    pub detail: bool,
}

impl ConsumerAccumulateRequest {
    /// Create a request for the per-topic backlog of `group_id`.
    pub fn new(instance_id: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            group_id: group_id.into(),
            detail: true,
        }
    }
}

impl OnsRequest for ConsumerAccumulateRequest {
    type Response = ConsumerAccumulateResponse;
    const ACTION: &'static str = "OnsConsumerAccumulate";

    fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("InstanceId", self.instance_id.clone()),
            ("GroupId", self.group_id.clone()),
            ("Detail", self.detail.to_string()),
        ]
    }
}

/// Query the produced-message trend of a topic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrendTopicInputTpsRequest {
    /// The ID of the ONS instance.
    pub instance_id: String,
    /// The topic to query.
    pub topic: String,
    /// Start of the window, in epoch milliseconds.
    pub begin_time: i64,
    /// End of the window, in epoch milliseconds.
    pub end_time: i64,
    /// The statistic to return, see [`TREND_TYPE_TPS`].
    pub type_: i32,
    /// The sampling period in minutes, see [`TREND_PERIOD_MINUTES`].
    pub period: i64,
}

impl TrendTopicInputTpsRequest {
    /// Create a TPS trend request for `topic` over `[begin_time, end_time]`.
    pub fn new(
        instance_id: impl Into<String>,
        topic: impl Into<String>,
        begin_time: i64,
        end_time: i64,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            topic: topic.into(),
            begin_time,
            end_time,
            type_: TREND_TYPE_TPS,
            period: TREND_PERIOD_MINUTES,
        }
    }
}

impl OnsRequest for TrendTopicInputTpsRequest {
    type Response = TrendResponse;
    const ACTION: &'static str = "OnsTrendTopicInputTps";

    fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("InstanceId", self.instance_id.clone()),
            ("Topic", self.topic.clone()),
            ("BeginTime", self.begin_time.to_string()),
            ("EndTime", self.end_time.to_string()),
            ("Type", self.type_.to_string()),
            ("Period", self.period.to_string()),
        ]
    }
}

/// Query the consumed-message trend of a consumer group on a topic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrendGroupOutputTpsRequest {
    /// The ID of the ONS instance.
    pub instance_id: String,
    /// The ID of the consumer group.
    pub group_id: String,
    /// The topic to query.
    pub topic: String,
    /// Start of the window, in epoch milliseconds.
    pub begin_time: i64,
    /// End of the window, in epoch milliseconds.
    pub end_time: i64,
    /// The statistic to return, see [`TREND_TYPE_TPS`].
    pub type_: i32,
    /// The sampling period in minutes, see [`TREND_PERIOD_MINUTES`].
    pub period: i64,
}

impl TrendGroupOutputTpsRequest {
    /// Create a TPS trend request for `group_id` consuming `topic` over `[begin_time, end_time]`.
    pub fn new(
        instance_id: impl Into<String>,
        group_id: impl Into<String>,
        topic: impl Into<String>,
        begin_time: i64,
        end_time: i64,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            group_id: group_id.into(),
            topic: topic.into(),
            begin_time,
            end_time,
            type_: TREND_TYPE_TPS,
            period: TREND_PERIOD_MINUTES,
        }
    }
}

impl OnsRequest for TrendGroupOutputTpsRequest {
    type Response = TrendResponse;
    const ACTION: &'static str = "OnsTrendGroupOutputTps";

    fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("InstanceId", self.instance_id.clone()),
            ("GroupId", self.group_id.clone()),
            ("Topic", self.topic.clone()),
            ("BeginTime", self.begin_time.to_string()),
            ("EndTime", self.end_time.to_string()),
            ("Type", self.type_.to_string()),
            ("Period", self.period.to_string()),
        ]
    }
}

/// Query basic information about an instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceBaseInfoRequest {
    /// The ID of the ONS instance.
    pub instance_id: String,
}

impl InstanceBaseInfoRequest {
    /// Create a request for the base info of `instance_id`.
    pub fn new(instance_id: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
        }
    }
}

impl OnsRequest for InstanceBaseInfoRequest {
    type Response = InstanceBaseInfoResponse;
    const ACTION: &'static str = "OnsInstanceBaseInfo";

    fn params(&self) -> Vec<(&'static str, String)> {
        vec![("InstanceId", self.instance_id.clone())]
    }
}
