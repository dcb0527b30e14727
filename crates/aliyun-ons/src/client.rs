use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use reqwest::StatusCode;
use tracing::{debug, instrument};

use crate::{
    credential::AccessKeyCredential,
    request::OnsRequest,
    response::ErrorBody,
    signature::{self, SIGNATURE_METHOD, SIGNATURE_VERSION},
    Error,
};

/// The ONS API version implemented by this crate.
pub const API_VERSION: &str = "2019-02-14";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for a [`Client`].
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// The region ID (e.g. `cn-shanghai`), or a full endpoint host name.
    pub region: String,
    /// The credential used to sign requests.
    pub credential: AccessKeyCredential,
    /// The timeout applied to every request by the HTTP transport.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration with the default timeout.
    pub fn new(region: impl Into<String>, credential: AccessKeyCredential) -> Self {
        Self {
            region: region.into(),
            credential,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the transport timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// An ONS API client.
///
/// The client holds a connection pool, so it should be created once and reused.
/// Cloning is cheap and shares the pool.
#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
    endpoint: String,
    region_id: Option<String>,
    credential: AccessKeyCredential,
}

impl Client {
    /// Create a new client.
    ///
    /// Returns [`Error::InvalidConfig`] if the region is empty or the HTTP
    /// transport cannot be initialised.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let region = config.region.trim();
        if region.is_empty() {
            return Err(Error::InvalidConfig("region must not be empty".to_string()));
        }
        let (endpoint, region_id) = if region.contains('.') {
            (region.to_string(), None)
        } else {
            (
                format!("ons.{region}.aliyuncs.com"),
                Some(region.to_string()),
            )
        };
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("could not build HTTP client: {e}")))?;
        Ok(Self {
            http,
            endpoint,
            region_id,
            credential: config.credential,
        })
    }

    /// The host name requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// All parameters of a request, including the common ones but excluding the signature.
    fn params<R: OnsRequest>(&self, request: &R) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("Format", "JSON".to_string()),
            ("Version", API_VERSION.to_string()),
            (
                "AccessKeyId",
                self.credential.access_key_id().to_string(),
            ),
            ("SignatureMethod", SIGNATURE_METHOD.to_string()),
            ("SignatureVersion", SIGNATURE_VERSION.to_string()),
            ("SignatureNonce", uuid::Uuid::new_v4().to_string()),
            (
                "Timestamp",
                Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            ("Action", R::ACTION.to_string()),
        ];
        if let Some(region_id) = &self.region_id {
            params.push(("RegionId", region_id.clone()));
        }
        params.extend(request.params());
        params
    }

    /// The full, signed URL for a request.
    fn url<R: OnsRequest>(&self, request: &R) -> String {
        let query = signature::signed_query(
            &self.params(request),
            self.credential.access_key_secret(),
        );
        format!("https://{}/?{}", self.endpoint, query)
    }

    /// Call an ONS operation.
    #[instrument(skip_all, fields(action = R::ACTION, endpoint = %self.endpoint), err)]
    pub async fn call<R: OnsRequest>(&self, request: &R) -> Result<R::Response, Error> {
        let response = self.http.get(self.url(request)).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(%status, bytes = body.len(), "Received ONS response");
        decode::<R>(status, &body)
    }
}

/// Turn a response into the operation's result.
///
/// Non-2xx responses become [`Error::Api`], carrying whatever of the ONS error body
/// could be decoded.
fn decode<R: OnsRequest>(status: StatusCode, body: &[u8]) -> Result<R::Response, Error> {
    if !status.is_success() {
        let error: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
        return Err(Error::Api {
            status: status.as_u16(),
            code: error.code,
            message: error.message,
            request_id: error.request_id,
        });
    }
    serde_json::from_slice(body).map_err(|source| Error::Decode {
        action: R::ACTION,
        source,
    })
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{ConsumerAccumulateRequest, InstanceBaseInfoRequest};

    fn client(region: &str) -> Result<Client, Error> {
        Client::new(ClientConfig::new(
            region,
            AccessKeyCredential::new("key-id", "key-secret"),
        ))
    }

    #[test]
    fn empty_region_is_a_config_error() {
        assert!(matches!(client("  "), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn region_endpoint() {
        let client = client("cn-shanghai").unwrap();
        assert_eq!(client.endpoint(), "ons.cn-shanghai.aliyuncs.com");
        let params: HashMap<_, _> = client
            .params(&InstanceBaseInfoRequest::new("MQ_INST_1"))
            .into_iter()
            .collect();
        assert_eq!(params["RegionId"], "cn-shanghai");
        assert_eq!(params["Action"], "OnsInstanceBaseInfo");
        assert_eq!(params["Version"], API_VERSION);
        assert_eq!(params["InstanceId"], "MQ_INST_1");
        assert_eq!(params["AccessKeyId"], "key-id");
    }

    #[test]
    fn custom_endpoint() {
        let client = client("ons.internal.example.com").unwrap();
        assert_eq!(client.endpoint(), "ons.internal.example.com");
        let params = client.params(&InstanceBaseInfoRequest::new("MQ_INST_1"));
        assert!(params.iter().all(|(k, _)| *k != "RegionId"));
    }

    #[test]
    fn timestamp_format() {
        let client = client("cn-shanghai").unwrap();
        let params: HashMap<_, _> = client
            .params(&ConsumerAccumulateRequest::new("i", "g"))
            .into_iter()
            .collect();
        let timestamp = &params["Timestamp"];
        assert_eq!(timestamp.len(), "2016-02-23T12:46:24Z".len());
        assert!(timestamp.ends_with('Z'));
    }

    #[test]
    fn error_status_decodes_error_body() {
        let body = br#"{"RequestId": "req-1", "Code": "InvalidAccessKeyId.NotFound", "Message": "Specified access key is not found.", "HostId": "ons.cn-shanghai.aliyuncs.com"}"#;
        match decode::<InstanceBaseInfoRequest>(StatusCode::NOT_FOUND, body) {
            Err(Error::Api {
                status,
                code,
                message,
                request_id,
            }) => {
                assert_eq!(status, 404);
                assert_eq!(code, "InvalidAccessKeyId.NotFound");
                assert_eq!(message, "Specified access key is not found.");
                assert_eq!(request_id, "req-1");
            }
            other => panic!("expected an API error, got {other:?}"),
        }
    }

    #[test]
    fn error_status_with_unreadable_body() {
        match decode::<InstanceBaseInfoRequest>(StatusCode::BAD_GATEWAY, b"<html>Bad Gateway</html>") {
            Err(Error::Api {
                status,
                code,
                message,
                request_id,
            }) => {
                assert_eq!(status, 502);
                assert_eq!(code, "");
                assert_eq!(message, "");
                assert_eq!(request_id, "");
            }
            other => panic!("expected an API error, got {other:?}"),
        }
    }

    #[test]
    fn success_with_invalid_body() {
        assert!(matches!(
            decode::<ConsumerAccumulateRequest>(StatusCode::OK, b"not json"),
            Err(Error::Decode {
                action: "OnsConsumerAccumulate",
                ..
            })
        ));
    }

    #[test]
    fn success_decodes_response() {
        let body = br#"{"RequestId": "req-2", "InstanceBaseInfo": {"InstanceId": "MQ_INST_1", "InstanceName": "orders"}}"#;
        let response = decode::<InstanceBaseInfoRequest>(StatusCode::OK, body).unwrap();
        assert_eq!(response.request_id, "req-2");
        assert_eq!(response.instance_base_info.instance_id, "MQ_INST_1");
        assert_eq!(response.instance_base_info.instance_name, "orders");
    }

    #[test]
    fn url_is_signed_and_secret_free() {
        let client = client("cn-shanghai").unwrap();
        let url = client.url(&ConsumerAccumulateRequest::new("i", "g"));
        assert!(url.starts_with("https://ons.cn-shanghai.aliyuncs.com/?AccessKeyId=key-id&"));
        assert!(url.contains("&Signature="));
        assert!(url.contains("Detail=true"));
        assert!(!url.contains("key-secret"));
    }
}
