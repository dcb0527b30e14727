//! The subset of the ONS API used by the datasource.
use aliyun_ons::{
    response::{ConsumerAccumulateResponse, InstanceBaseInfoResponse, TrendResponse},
    Client, ConsumerAccumulateRequest, Error, InstanceBaseInfoRequest, TrendGroupOutputTpsRequest,
    TrendTopicInputTpsRequest,
};
use grafana_plugin_sdk::backend::async_trait;

/// Remote ONS operations.
///
/// Implemented by [`aliyun_ons::Client`]; tests substitute an in-process fake.
#[async_trait]
pub trait OnsApi: Send + Sync {
    /// Fetch the backlog of a consumer group, with per-topic detail.
    async fn consumer_accumulate(
        &self,
        request: &ConsumerAccumulateRequest,
    ) -> Result<ConsumerAccumulateResponse, Error>;

    /// Fetch the produce TPS trend of a topic.
    async fn trend_topic_input_tps(
        &self,
        request: &TrendTopicInputTpsRequest,
    ) -> Result<TrendResponse, Error>;

    /// Fetch the consume TPS trend of a consumer group on a topic.
    async fn trend_group_output_tps(
        &self,
        request: &TrendGroupOutputTpsRequest,
    ) -> Result<TrendResponse, Error>;

    /// Fetch the basic information of an instance.
    async fn instance_base_info(
        &self,
        request: &InstanceBaseInfoRequest,
    ) -> Result<InstanceBaseInfoResponse, Error>;
}

#[async_trait]
impl OnsApi for Client {
    async fn consumer_accumulate(
        &self,
        request: &ConsumerAccumulateRequest,
    ) -> Result<ConsumerAccumulateResponse, Error> {
        self.call(request).await
    }

    async fn trend_topic_input_tps(
        &self,
        request: &TrendTopicInputTpsRequest,
    ) -> Result<TrendResponse, Error> {
        self.call(request).await
    }

    async fn trend_group_output_tps(
        &self,
        request: &TrendGroupOutputTpsRequest,
    ) -> Result<TrendResponse, Error> {
        self.call(request).await
    }

    async fn instance_base_info(
        &self,
        request: &InstanceBaseInfoRequest,
    ) -> Result<InstanceBaseInfoResponse, Error> {
        self.call(request).await
    }
}
