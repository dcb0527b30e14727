//! Datasource instance settings.
//!
//! Settings are split by Grafana into plain JSON data, editable from the frontend, and
//! 'secure' JSON data which is encrypted at rest and only ever sent to the backend.
use std::{collections::HashMap, fmt, time::Duration};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Error;

/// The key of the AccessKey secret in the decrypted secure JSON data.
pub const ACCESS_KEY_SECRET: &str = "accessKeySecret";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// The longest deadline a remote call may be given; larger `timeoutSeconds` are clamped.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// How trend queries are turned into frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendMode {
    /// Only the most recent data point is returned, as two scalar fields `time` and `value`.
    #[default]
    Last,
    /// The whole series is returned as a `time` column and a `value` column.
    Series,
}

/// Secrets taken from the decrypted secure JSON data.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretSettings {
    /// The AccessKey secret. Empty if it was never configured.
    pub access_key_secret: String,
}

impl fmt::Debug for SecretSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretSettings")
            .field("access_key_secret", &"<redacted>")
            .finish()
    }
}

/// The JSON data as stored by Grafana.
///
/// The region has been stored under `endpoint` by the backend and written as `region`
/// by the config editor, so both are accepted.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawSettings {
    access_key_id: String,
    endpoint: String,
    region: String,
    instance_id: String,
    trend_mode: TrendMode,
    timeout_seconds: u64,
}

/// The settings of a datasource instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluginSettings {
    /// The AccessKey ID.
    pub access_key_id: String,
    /// The region ID, or a full endpoint host name.
    pub region: String,
    /// The ID of the ONS instance to query.
    pub instance_id: String,
    /// How trend queries are turned into frames.
    pub trend_mode: TrendMode,
    /// Deadline for each remote call.
    pub timeout: Duration,
    /// Secrets, never logged.
    pub secrets: SecretSettings,
}

impl PluginSettings {
    /// Load settings from the raw JSON data bytes and decrypted secure JSON data.
    ///
    /// Fails with [`Error::Config`] if `json_data` is absent or empty and with
    /// [`Error::Decode`] if it is not valid settings JSON. A missing secret is not
    /// an error and results in an empty secret.
    pub fn load(json_data: Option<&[u8]>, secure: &HashMap<String, String>) -> Result<Self, Error> {
        let json_data = match json_data {
            Some(bytes) if !bytes.is_empty() => bytes,
            _ => return Err(Error::config("settings JSON is missing")),
        };
        let value: Value = serde_json::from_slice(json_data).map_err(|source| Error::Decode {
            what: "settings JSON",
            source,
        })?;
        let secret = secure.get(ACCESS_KEY_SECRET).cloned().unwrap_or_default();
        Self::from_value(value, secret)
    }

    /// Load settings from the JSON values handed over by the plugin SDK.
    ///
    /// The SDK turns an empty settings blob into `{}` (or leaves it `null`), so both
    /// are treated as missing settings.
    pub fn from_json(json_data: &Value, secure: &Value) -> Result<Self, Error> {
        let secret = secure
            .get(ACCESS_KEY_SECRET)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Self::from_value(json_data.clone(), secret)
    }

    fn from_value(value: Value, access_key_secret: String) -> Result<Self, Error> {
        let is_empty = match &value {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            _ => false,
        };
        if is_empty {
            return Err(Error::config("settings JSON is missing"));
        }
        let raw: RawSettings = serde_json::from_value(value).map_err(|source| Error::Decode {
            what: "settings JSON",
            source,
        })?;
        let region = if raw.endpoint.is_empty() {
            raw.region
        } else {
            raw.endpoint
        };
        let timeout = match raw.timeout_seconds {
            0 => DEFAULT_TIMEOUT,
            secs => Duration::from_secs(secs).min(MAX_TIMEOUT),
        };
        Ok(Self {
            access_key_id: raw.access_key_id,
            region,
            instance_id: raw.instance_id,
            trend_mode: raw.trend_mode,
            timeout,
            secrets: SecretSettings { access_key_secret },
        })
    }
}
