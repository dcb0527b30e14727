//! A configured ONS datasource and the dispatch of its queries.
use std::future::Future;

use aliyun_ons::{
    response::InstanceBaseInfo, AccessKeyCredential, Client, ClientConfig,
    ConsumerAccumulateRequest, InstanceBaseInfoRequest, OnsRequest, TrendGroupOutputTpsRequest,
    TrendTopicInputTpsRequest,
};
use futures_util::{stream::FuturesOrdered, StreamExt};
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, error, info_span, Instrument, Span};

use crate::{
    frame::ResultFrame,
    metrics::Metrics,
    payload::{Action, QueryPayload, TimeWindow},
    remote::OnsApi,
    settings::{PluginSettings, MAX_TIMEOUT},
    Error,
};

/// A query as received from Grafana, before its payload is parsed.
#[derive(Clone, Debug)]
pub struct IncomingQuery {
    /// The reference ID of the query, unique within a request.
    pub ref_id: String,
    /// The raw query JSON.
    pub json: Value,
    /// The dashboard time range.
    pub window: TimeWindow,
}

/// A datasource instance: its settings and a client for its ONS instance.
#[derive(Debug)]
pub struct Datasource<C = Client> {
    settings: PluginSettings,
    api: C,
    metrics: Metrics,
    span: Span,
}

impl Datasource {
    /// Load the settings and create the ONS client.
    ///
    /// Settings are validated before any client is created.
    pub fn load(json_data: &Value, secure: &Value, metrics: Metrics) -> Result<Self, Error> {
        Self::new(PluginSettings::from_json(json_data, secure)?, metrics)
    }

    /// Create a datasource from loaded settings.
    pub fn new(settings: PluginSettings, metrics: Metrics) -> Result<Self, Error> {
        let credential = AccessKeyCredential::new(
            settings.access_key_id.clone(),
            settings.secrets.access_key_secret.clone(),
        );
        let config = ClientConfig::new(settings.region.clone(), credential)
            .with_timeout(settings.timeout);
        let client = Client::new(config).map_err(|e| Error::config(e.to_string()))?;
        Ok(Self::with_api(settings, client, metrics))
    }
}

impl<C: OnsApi> Datasource<C> {
    /// Create a datasource using the given API implementation.
    pub fn with_api(settings: PluginSettings, api: C, metrics: Metrics) -> Self {
        let span = info_span!(
            "ons_datasource",
            instance_id = %settings.instance_id,
            region = %settings.region,
        );
        Self {
            settings,
            api,
            metrics,
            span,
        }
    }

    /// The settings of this datasource.
    pub fn settings(&self) -> &PluginSettings {
        &self.settings
    }

    /// Run a batch of queries concurrently.
    ///
    /// Returns one entry per query, in input order. A `None` frame means the query was
    /// hidden, not understood, or failed; failures are logged and never affect the
    /// other queries.
    pub async fn query_batch(
        &self,
        queries: Vec<IncomingQuery>,
    ) -> Vec<(String, Option<ResultFrame>)> {
        let deadline = self.deadline();
        queries
            .into_iter()
            .map(|query| async move {
                let ref_id = query.ref_id.clone();
                (ref_id, self.query(query, deadline).await)
            })
            .collect::<FuturesOrdered<_>>()
            .collect()
            .await
    }

    /// Run a single query, giving up on the remote call at `deadline`.
    pub async fn query(&self, query: IncomingQuery, deadline: Instant) -> Option<ResultFrame> {
        self.dispatch(query, deadline)
            .instrument(self.span.clone())
            .await
    }

    async fn dispatch(&self, query: IncomingQuery, deadline: Instant) -> Option<ResultFrame> {
        let IncomingQuery {
            ref_id,
            json,
            window,
        } = query;
        let payload = match QueryPayload::from_value(json) {
            Ok(payload) => payload,
            Err(error) => {
                debug!(%ref_id, %error, "Skipping query with undecodable payload");
                return None;
            }
        };
        if payload.hide {
            debug!(%ref_id, "Skipping hidden query");
            return None;
        }
        let window = payload.window(window);
        let instance_id = self.settings.instance_id.as_str();
        let result = match &payload.action {
            Action::ConsumerAccumulate => {
                let request = ConsumerAccumulateRequest::new(instance_id, payload.group_id.as_str());
                self.remote::<ConsumerAccumulateRequest, _>(
                    deadline,
                    self.api.consumer_accumulate(&request),
                )
                .await
                .map(|response| ResultFrame::from_accumulate(ref_id.as_str(), &response))
            }
            Action::TrendTopicInputTps => {
                let request = TrendTopicInputTpsRequest::new(
                    instance_id,
                    payload.topic.as_str(),
                    window.begin_ms,
                    window.end_ms,
                );
                self.remote::<TrendTopicInputTpsRequest, _>(
                    deadline,
                    self.api.trend_topic_input_tps(&request),
                )
                .await
                .map(|response| {
                    ResultFrame::from_trend(ref_id.as_str(), &response, self.settings.trend_mode)
                })
            }
            Action::TrendGroupOutputTps => {
                let request = TrendGroupOutputTpsRequest::new(
                    instance_id,
                    payload.group_id.as_str(),
                    payload.topic.as_str(),
                    window.begin_ms,
                    window.end_ms,
                );
                self.remote::<TrendGroupOutputTpsRequest, _>(
                    deadline,
                    self.api.trend_group_output_tps(&request),
                )
                .await
                .map(|response| {
                    ResultFrame::from_trend(ref_id.as_str(), &response, self.settings.trend_mode)
                })
            }
            Action::Other(action) => {
                debug!(%ref_id, %action, "Ignoring query with unknown action");
                return None;
            }
        };
        match result {
            Ok(frame) => {
                debug!(%ref_id, action = %payload.action, fields = frame.len(), "Query succeeded");
                Some(frame)
            }
            Err(error) => {
                error!(%ref_id, action = %payload.action, %error, "ONS query failed");
                None
            }
        }
    }

    /// Check that the configured instance can be reached with the configured credentials.
    pub async fn check_health(&self) -> Result<InstanceBaseInfo, Error> {
        let request = InstanceBaseInfoRequest::new(self.settings.instance_id.as_str());
        let deadline = self.deadline();
        let response = self
            .remote::<InstanceBaseInfoRequest, _>(deadline, self.api.instance_base_info(&request))
            .instrument(self.span.clone())
            .await?;
        Ok(response.instance_base_info)
    }

    /// The deadline for calls starting now. Settings built by hand are clamped like loaded ones.
    fn deadline(&self) -> Instant {
        Instant::now() + self.settings.timeout.min(MAX_TIMEOUT)
    }

    /// Await a remote call, bounded by `deadline`, and record it in the metrics.
    async fn remote<R, T>(
        &self,
        deadline: Instant,
        call: impl Future<Output = Result<T, aliyun_ons::Error>>,
    ) -> Result<T, aliyun_ons::Error>
    where
        R: OnsRequest,
    {
        let start = Instant::now();
        let result = tokio::time::timeout_at(deadline, call)
            .await
            .unwrap_or(Err(aliyun_ons::Error::Timeout));
        self.metrics
            .observe(R::ACTION, start.elapsed(), result.is_ok());
        result
    }
}
