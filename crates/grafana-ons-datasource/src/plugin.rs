//! The Grafana plugin services.
use std::{convert::Infallible, sync::Arc};

use chrono::{DateTime, Utc};
use futures_util::stream;
use grafana_plugin_sdk::{
    backend::{self, async_trait},
    data,
    prelude::*,
};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::{
    datasource::{Datasource, IncomingQuery},
    frame::ResultFrame,
    instance::InstanceManager,
    metrics::Metrics,
    payload::TimeWindow,
    Error,
};

const HEALTH_OK: &str = "Data source is working";
const HEALTH_FAILED: &str = "Could not query ONS instance info";

/// The ONS datasource plugin.
#[derive(Clone, Debug, GrafanaPlugin)]
#[grafana_plugin(plugin_type = "datasource")]
pub struct OnsPlugin {
    instances: Arc<InstanceManager<Datasource>>,
    metrics: Metrics,
}

impl OnsPlugin {
    /// Create the plugin and register its metrics.
    pub fn new() -> prometheus::Result<Self> {
        Ok(Self {
            instances: Arc::new(InstanceManager::new()),
            metrics: Metrics::new()?,
        })
    }

    /// Get the instance for a datasource, creating it on first use or after its
    /// settings changed.
    fn datasource(
        &self,
        uid: &str,
        updated: DateTime<Utc>,
        json_data: &Value,
        secure_json_data: &Value,
    ) -> Result<Arc<Datasource>, Error> {
        self.instances.get_or_try_insert(uid, updated, || {
            let datasource = Datasource::load(json_data, secure_json_data, self.metrics.clone())?;
            info!(uid, %updated, "Created datasource instance");
            Ok(datasource)
        })
    }

    fn instance(
        &self,
        settings: &backend::DataSourceInstanceSettings<Value, Value>,
    ) -> Result<Arc<Datasource>, Error> {
        self.datasource(
            &settings.uid,
            settings.updated,
            &settings.json_data,
            &settings.decrypted_secure_json_data,
        )
    }
}

/// An error returned for a single query.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QueryError {
    /// The request did not come from a datasource instance.
    #[error("Missing datasource instance settings")]
    MissingInstanceSettings {
        /// The reference ID of the query.
        ref_id: String,
    },
    /// The datasource instance could not be created from its settings.
    #[error("Invalid datasource settings: {message}")]
    Config {
        /// The reference ID of the query.
        ref_id: String,
        /// Why the settings were rejected.
        message: String,
    },
    /// The result could not be converted into a frame.
    #[error("Error building frame for query {ref_id}: {source}")]
    Frame {
        /// The reference ID of the query.
        ref_id: String,
        /// The underlying frame error.
        source: data::Error,
    },
}

impl backend::DataQueryError for QueryError {
    fn ref_id(self) -> String {
        match self {
            Self::MissingInstanceSettings { ref_id } => ref_id,
            Self::Config { ref_id, .. } => ref_id,
            Self::Frame { ref_id, .. } => ref_id,
        }
    }

    fn status(&self) -> backend::DataQueryStatus {
        match self {
            Self::MissingInstanceSettings { .. } | Self::Config { .. } => {
                backend::DataQueryStatus::BadRequest
            }
            Self::Frame { .. } => backend::DataQueryStatus::Internal,
        }
    }
}

fn into_response(
    (ref_id, frame): (String, Option<ResultFrame>),
) -> Result<backend::DataResponse, QueryError> {
    let Some(frame) = frame else {
        return Ok(backend::DataResponse::new(ref_id, vec![]));
    };
    let frame = frame.into_frame();
    let checked = frame.check().map_err(|source| QueryError::Frame {
        ref_id: ref_id.clone(),
        source,
    })?;
    Ok(backend::DataResponse::new(ref_id, vec![checked]))
}

#[async_trait]
impl backend::DataService for OnsPlugin {
    /// Queries are decoded by the datasource so a malformed query only affects itself.
    type Query = Value;
    type QueryError = QueryError;
    type Stream = backend::BoxDataResponseStream<Self::QueryError>;

    #[instrument(skip_all, fields(queries = request.queries.len()))]
    async fn query_data(
        &self,
        request: backend::QueryDataRequest<Self::Query, Self>,
    ) -> Self::Stream {
        let datasource = match request.plugin_context.instance_settings.as_ref() {
            Some(settings) => self.instance(settings).map_err(|e| e.to_string()),
            None => {
                return Box::pin(stream::iter(request.queries.into_iter().map(|q| {
                    Err::<backend::DataResponse, _>(QueryError::MissingInstanceSettings {
                        ref_id: q.ref_id,
                    })
                })))
            }
        };
        let datasource = match datasource {
            Ok(datasource) => datasource,
            Err(message) => {
                warn!(%message, "Could not create datasource instance");
                return Box::pin(stream::iter(request.queries.into_iter().map(
                    move |q| {
                        Err::<backend::DataResponse, _>(QueryError::Config {
                            ref_id: q.ref_id,
                            message: message.clone(),
                        })
                    },
                )));
            }
        };
        let queries = request
            .queries
            .into_iter()
            .map(|q| IncomingQuery {
                ref_id: q.ref_id,
                json: q.query,
                window: TimeWindow {
                    begin_ms: q.time_range.from.timestamp_millis(),
                    end_ms: q.time_range.to.timestamp_millis(),
                },
            })
            .collect();
        let results = datasource.query_batch(queries).await;
        Box::pin(stream::iter(results.into_iter().map(into_response)))
    }
}

#[async_trait]
impl backend::DiagnosticsService for OnsPlugin {
    type CheckHealthError = Infallible;

    async fn check_health(
        &self,
        request: backend::CheckHealthRequest<Self>,
    ) -> Result<backend::CheckHealthResponse, Self::CheckHealthError> {
        let Some(settings) = request.plugin_context.instance_settings.as_ref() else {
            return Ok(backend::CheckHealthResponse::error(
                "Missing datasource instance settings".to_string(),
            ));
        };
        let datasource = match self.instance(settings) {
            Ok(datasource) => datasource,
            Err(error) => return Ok(backend::CheckHealthResponse::error(error.to_string())),
        };
        Ok(match datasource.check_health().await {
            Ok(info) => {
                info!(instance_id = %info.instance_id, name = %info.instance_name, "Health check succeeded");
                backend::CheckHealthResponse::ok(HEALTH_OK.to_string())
            }
            Err(error) => {
                warn!(%error, "Health check failed");
                backend::CheckHealthResponse::error(HEALTH_FAILED.to_string())
            }
        })
    }

    type CollectMetricsError = prometheus::Error;

    async fn collect_metrics(
        &self,
        _request: backend::CollectMetricsRequest<Self>,
    ) -> Result<backend::CollectMetricsResponse, Self::CollectMetricsError> {
        Ok(backend::CollectMetricsResponse::new(Some(
            backend::MetricsPayload::prometheus(self.metrics.encode()?),
        )))
    }
}
