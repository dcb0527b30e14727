/*! A Grafana backend datasource for Alibaba Cloud ONS (RocketMQ).

The datasource charts three metrics of a RocketMQ instance, chosen per query by its `action`:

- `ConsumerAccumulate` - the message backlog of a consumer group, one field per topic
- `TrendTopicInputTps` - messages produced per second on a topic
- `TrendGroupOutputTps` - messages consumed per second by a consumer group on a topic

Queries that are hidden, carry an unknown action, cannot be decoded or fail remotely return no
frames rather than an error, so one broken panel never affects the others. Failures are logged
and counted in the plugin's Prometheus metrics.

The plugin is made up of:

- [`settings`], the datasource configuration as stored by Grafana
- [`payload`], the JSON of a single query
- [`Datasource`], a configured instance that dispatches queries to the ONS API
- [`frame`], the reshaping of ONS responses into frames
- [`OnsPlugin`], the `DataService` and `DiagnosticsService` implementations
*/
#![deny(missing_docs)]

mod datasource;
mod error;
pub mod frame;
mod instance;
mod metrics;
pub mod payload;
mod plugin;
pub mod remote;
pub mod settings;

pub use datasource::{Datasource, IncomingQuery};
pub use error::Error;
pub use instance::InstanceManager;
pub use metrics::Metrics;
pub use plugin::{OnsPlugin, QueryError};
