//! Client for the question answering service (`POST <base>/ask`).

use crate::error::Error;
use ::reqwest::header::CONTENT_TYPE;
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    pub query: String,
    pub conversation_id: String,
    pub is_new_conversation: bool,
}

#[derive(Debug, Deserialize)]
struct AskResponse {
    response: String,
}

#[async_trait(?Send)]
pub trait AnswerService {
    /// Returns the reply text. Any transport failure, non-2xx status or
    /// unexpected body is an error.
    async fn ask(&self, request: &AskRequest) -> Result<String, Error>;
}

pub struct HttpAnswerService {
    client: ::reqwest::Client,
    endpoint: Url,
}

impl HttpAnswerService {
    pub fn new(base_url: &Url) -> Result<Self, Error> {
        Ok(Self {
            client: ::reqwest::Client::new(),
            endpoint: ask_endpoint(base_url)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// `base` with `ask` appended, keeping any path the base already has.
pub fn ask_endpoint(base: &Url) -> Result<Url, Error> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join("ask")?)
}

#[async_trait(?Send)]
impl AnswerService for HttpAnswerService {
    async fn ask(&self, request: &AskRequest) -> Result<String, Error> {
        debug!("Asking {} for {}", self.endpoint, request.conversation_id);
        let res = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await?;
        let res = res.error_for_status()?;
        let body = res.text().await?;
        let answer: AskResponse = serde_json::from_str(&body)
            .map_err(|err| Error::Answer(format!("unexpected body: {err}")))?;
        Ok(answer.response)
    }
}
