use bytes::Bytes;

/// The only path the gateway answers on (RFC 8484 §4.1 example URI template).
pub const DOH_PATH: &str = "/dns-query";

/// Media type of DNS wire-format bodies (RFC 8484 §6).
pub const DNS_MESSAGE_MEDIA_TYPE: &str = "application/dns-message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Other(String),
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Other(method) => method,
        }
    }
}

impl From<&str> for HttpMethod {
    fn from(method: &str) -> Self {
        match method {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            other => HttpMethod::Other(other.to_string()),
        }
    }
}

/// Framework-independent view of an inbound DoH request.
#[derive(Debug, Clone)]
pub struct DohRequest {
    pub method: HttpMethod,
    pub path: String,
    pub accept: Option<String>,
    pub content_type: Option<String>,
    /// Value of the `dns` query parameter, if present.
    pub dns_param: Option<String>,
    /// Why the query string could not be read, if it could not.
    pub query_error: Option<String>,
    pub body: Bytes,
}

impl DohRequest {
    pub fn get(dns_param: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: DOH_PATH.to_string(),
            accept: None,
            content_type: None,
            dns_param: Some(dns_param.into()),
            query_error: None,
            body: Bytes::new(),
        }
    }

    pub fn post(body: impl Into<Bytes>) -> Self {
        Self {
            method: HttpMethod::Post,
            path: DOH_PATH.to_string(),
            accept: None,
            content_type: Some(DNS_MESSAGE_MEDIA_TYPE.to_string()),
            dns_param: None,
            query_error: None,
            body: body.into(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    pub fn with_query_error(mut self, error: impl Into<String>) -> Self {
        self.dns_param = None;
        self.query_error = Some(error.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}
