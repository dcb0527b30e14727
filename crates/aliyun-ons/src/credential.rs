use std::fmt;

/// An AccessKey pair used to sign requests.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessKeyCredential {
    access_key_id: String,
    access_key_secret: String,
}

impl AccessKeyCredential {
    /// Create a new credential from an AccessKey ID and secret.
    pub fn new(access_key_id: impl Into<String>, access_key_secret: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            access_key_secret: access_key_secret.into(),
        }
    }

    /// The AccessKey ID, sent in clear text with every request.
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub(crate) fn access_key_secret(&self) -> &str {
        &self.access_key_secret
    }
}

impl fmt::Debug for AccessKeyCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessKeyCredential")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn debug_redacts_secret() {
        let credential = AccessKeyCredential::new("id", "super-secret");
        let debug = format!("{credential:?}");
        assert!(debug.contains("id"));
        assert!(!debug.contains("super-secret"));
    }
}
