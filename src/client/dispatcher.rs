//! Authenticated request dispatch.

use crate::auth::{AttachmentMode, AuthStrategy, Credential};
use crate::error::{AuthError, Result};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::multipart::Form;
use reqwest::{Method, Response};

/// Body of an outgoing request.
#[derive(Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// `application/x-www-form-urlencoded` fields
    Form(Vec<(&'static str, String)>),
    /// `multipart/form-data` payload
    Multipart(Form),
}

/// Issues one authenticated HTTP request per call.
pub struct RequestDispatcher {
    http: reqwest::Client,
    auth: Box<dyn AuthStrategy>,
}

impl RequestDispatcher {
    pub fn new(auth: Box<dyn AuthStrategy>) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth,
        }
    }

    /// Use a preconfigured HTTP client (timeouts, proxies, TLS).
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn attachment_mode(&self) -> AttachmentMode {
        self.auth.attachment_mode()
    }

    /// Send a request with the strategy's credential attached.
    ///
    /// Basic credentials go through reqwest's own basic-auth support; bearer
    /// tokens are merged into `extra_headers` as `Authorization`, leaving the
    /// caller's other headers alone. The body is set before `extra_headers`
    /// are applied, so an explicit `Content-Type` wins over the encoder's.
    ///
    /// The status code is not inspected here.
    ///
    /// # Errors
    /// Returns an auth error if no credential can be produced, or a transport
    /// error if the request fails to complete.
    pub async fn dispatch(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        body: RequestBody,
        mut extra_headers: HeaderMap,
    ) -> Result<Response> {
        let credential = self.auth.produce_credential().await?;

        let mut request = self.http.request(method, url);
        if !query.is_empty() {
            request = request.query(query);
        }
        request = match body {
            RequestBody::Empty => request,
            RequestBody::Form(fields) => request.form(&fields),
            RequestBody::Multipart(form) => request.multipart(form),
        };

        request = match &credential {
            Credential::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
            Credential::Bearer(_) => {
                let mut value = HeaderValue::from_str(&credential.auth_header())
                    .map_err(|_| AuthError::InvalidToken)?;
                value.set_sensitive(true);
                extra_headers.insert(AUTHORIZATION, value);
                request
            }
        };

        Ok(request.headers(extra_headers).send().await?)
    }
}
