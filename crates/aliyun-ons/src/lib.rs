/*! A small async client for the Alibaba Cloud ONS (RocketMQ) management API.

Only the read-only operations needed to chart a RocketMQ instance are covered:

- [`ConsumerAccumulateRequest`] - the message backlog of a consumer group, optionally per topic
- [`TrendTopicInputTpsRequest`] - produced messages per second for a topic over a time window
- [`TrendGroupOutputTpsRequest`] - consumed messages per second for a group and topic over a time window
- [`InstanceBaseInfoRequest`] - basic information about an instance, useful as a connectivity check

Requests are sent as signed RPC-style `GET` requests (see the [`signature`] module) using
[reqwest]. Responses are decoded into the types in [`response`].

# Example

```rust,no_run
use aliyun_ons::{AccessKeyCredential, Client, ClientConfig, ConsumerAccumulateRequest};

# async fn run() -> Result<(), aliyun_ons::Error> {
let client = Client::new(ClientConfig::new(
    "cn-shanghai",
    AccessKeyCredential::new("my-key-id", "my-key-secret"),
))?;
let response = client
    .call(&ConsumerAccumulateRequest::new("MQ_INST_123", "GID_orders"))
    .await?;
for topic in response.data.detail_in_topic_list.detail_in_topic_do {
    println!("{}: {}", topic.topic, topic.total_diff);
}
# Ok(())
# }
```

[reqwest]: https://docs.rs/reqwest
*/
#![deny(missing_docs)]

mod client;
mod credential;
mod error;
mod request;
pub mod response;
pub mod signature;

pub use client::{Client, ClientConfig, API_VERSION};
pub use credential::AccessKeyCredential;
pub use error::Error;
pub use request::{
    ConsumerAccumulateRequest, InstanceBaseInfoRequest, OnsRequest, TrendGroupOutputTpsRequest,
    TrendTopicInputTpsRequest, TREND_PERIOD_MINUTES, TREND_TYPE_TPS,
};
