//! Reshaping ONS responses into flat tables.
use std::collections::{btree_map, BTreeMap};

use aliyun_ons::response::{ConsumerAccumulateResponse, TrendResponse};
use chrono::{DateTime, Utc};
use grafana_plugin_sdk::{data, prelude::*};

use crate::settings::TrendMode;

/// Name of the timestamp field of trend frames.
pub const TIME_FIELD: &str = "time";
/// Name of the value field of trend frames.
pub const VALUE_FIELD: &str = "value";

/// The values of a single field.
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    /// Numeric values.
    Number(Vec<f64>),
    /// Timestamps.
    Time(Vec<DateTime<Utc>>),
}

impl Column {
    fn into_field(self, name: &str) -> data::Field {
        match self {
            Self::Number(values) => values.into_field(name),
            Self::Time(values) => values.into_field(name),
        }
    }
}

/// A named table of fields, one per query.
///
/// Field names are unique: inserting a field with an existing name replaces it.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultFrame {
    name: String,
    fields: BTreeMap<String, Column>,
}

impl ResultFrame {
    /// Create an empty frame.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add a field holding a single number, replacing any field with the same name.
    pub fn with_scalar(self, name: impl Into<String>, value: f64) -> Self {
        self.with_column(name, Column::Number(vec![value]))
    }

    /// Add a field, replacing any field with the same name.
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Self {
        self.fields.insert(name.into(), column);
        self
    }

    /// Build the frame for a consumer backlog: one field per topic, valued at its backlog.
    pub fn from_accumulate(name: impl Into<String>, response: &ConsumerAccumulateResponse) -> Self {
        response
            .data
            .detail_in_topic_list
            .detail_in_topic_do
            .iter()
            .fold(Self::new(name), |frame, detail| {
                frame.with_scalar(detail.topic.clone(), detail.total_diff as f64)
            })
    }

    /// Build the frame for a trend.
    ///
    /// With [`TrendMode::Last`] only the last data point is kept, as the scalar fields
    /// `time` (epoch milliseconds) and `value`. An empty trend gives an empty frame.
    /// With [`TrendMode::Series`] every data point is kept.
    pub fn from_trend(name: impl Into<String>, response: &TrendResponse, mode: TrendMode) -> Self {
        let records = &response.data.records.stats_data_do;
        let frame = Self::new(name);
        match mode {
            TrendMode::Last => match records.last() {
                Some(last) => frame
                    .with_scalar(TIME_FIELD, last.x as f64)
                    .with_scalar(VALUE_FIELD, last.y),
                None => frame,
            },
            TrendMode::Series => {
                let (times, values): (Vec<_>, Vec<_>) = records
                    .iter()
                    .filter_map(|r| DateTime::from_timestamp_millis(r.x).map(|t| (t, r.y)))
                    .unzip();
                frame
                    .with_column(TIME_FIELD, Column::Time(times))
                    .with_column(VALUE_FIELD, Column::Number(values))
            }
        }
    }

    /// The name of the frame.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The fields, ordered by name.
    pub fn fields(&self) -> btree_map::Iter<'_, String, Column> {
        self.fields.iter()
    }

    /// The field with the given name.
    pub fn field(&self, name: &str) -> Option<&Column> {
        self.fields.get(name)
    }

    /// The value of a single-number field.
    pub fn scalar(&self, name: &str) -> Option<f64> {
        match self.fields.get(name)? {
            Column::Number(values) if values.len() == 1 => Some(values[0]),
            _ => None,
        }
    }

    /// The number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the frame has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Convert into a frame the plugin SDK can send to Grafana.
    pub fn into_frame(self) -> data::Frame {
        data::Frame::new(self.name).with_fields(
            self.fields
                .into_iter()
                .map(|(name, column)| column.into_field(&name)),
        )
    }
}

#[cfg(test)]
mod test {
    use aliyun_ons::response::{DetailInTopic, StatsData};
    use pretty_assertions::assert_eq;

    use super::*;

    fn accumulate(topics: &[(&str, i64)]) -> ConsumerAccumulateResponse {
        let mut response = ConsumerAccumulateResponse::default();
        response.data.detail_in_topic_list.detail_in_topic_do = topics
            .iter()
            .map(|(topic, total_diff)| DetailInTopic {
                topic: topic.to_string(),
                total_diff: *total_diff,
                ..Default::default()
            })
            .collect();
        response
    }

    fn trend(points: &[(i64, f64)]) -> TrendResponse {
        let mut response = TrendResponse::default();
        response.data.records.stats_data_do =
            points.iter().map(|&(x, y)| StatsData { x, y }).collect();
        response
    }

    #[test]
    fn one_field_per_topic() {
        let frame = ResultFrame::from_accumulate("A", &accumulate(&[("orders", 10), ("refunds", 3)]));
        assert_eq!(frame.name(), "A");
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.scalar("orders"), Some(10.0));
        assert_eq!(frame.scalar("refunds"), Some(3.0));
    }

    #[test]
    fn duplicate_topics_keep_last_value() {
        let frame = ResultFrame::from_accumulate("A", &accumulate(&[("orders", 10), ("orders", 4)]));
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.scalar("orders"), Some(4.0));
    }

    #[test]
    fn trend_keeps_last_point() {
        let frame = ResultFrame::from_trend(
            "B",
            &trend(&[(1_000, 1.0), (2_000, 5.0), (3_000, 2.5)]),
            TrendMode::Last,
        );
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.scalar(TIME_FIELD), Some(3_000.0));
        assert_eq!(frame.scalar(VALUE_FIELD), Some(2.5));
    }

    #[test]
    fn empty_trend_is_empty_frame() {
        assert!(ResultFrame::from_trend("B", &trend(&[]), TrendMode::Last).is_empty());
    }

    #[test]
    fn trend_series() {
        let frame = ResultFrame::from_trend(
            "B",
            &trend(&[(1_000, 1.0), (2_000, 5.0)]),
            TrendMode::Series,
        );
        assert_eq!(
            frame.field(TIME_FIELD),
            Some(&Column::Time(vec![
                DateTime::from_timestamp_millis(1_000).unwrap(),
                DateTime::from_timestamp_millis(2_000).unwrap(),
            ]))
        );
        assert_eq!(frame.field(VALUE_FIELD), Some(&Column::Number(vec![1.0, 5.0])));
        assert_eq!(frame.scalar(VALUE_FIELD), None);
    }

    #[test]
    fn into_sdk_frame() {
        let frame = ResultFrame::new("C")
            .with_scalar("b", 2.0)
            .with_scalar("a", 1.0)
            .into_frame();
        assert_eq!(frame.name, "C");
        let names: Vec<_> = frame.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(frame.check().is_ok());
    }
}
