//! Network download of the intercepted timeline asset.
//!
//! A fetch is exposed as a stream of [`FetchEvent`]s: one `Progress` per
//! received body chunk, terminated by exactly one `Done`.

use bytes::Bytes;
use futures_util::stream::{self, BoxStream};
use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::config::ViewerConfig;
use crate::error::{FetchError, Result};
use crate::session::Progress;

#[derive(Debug, Clone, PartialEq)]
pub enum FetchEvent {
    Progress(Progress),
    Done(std::result::Result<String, FetchError>),
}

/// Source of timeline payloads. Callers must not start a second fetch for
/// the same session before the first one has produced its `Done` event.
pub trait AssetFetcher {
    fn fetch(&self, url: &Url) -> BoxStream<'static, FetchEvent>;
}

pub(crate) fn http_client(config: &ViewerConfig) -> Result<Client> {
    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::limited(10))
        .user_agent(config.user_agent.as_str())
        .build()?;
    Ok(client)
}

/// Plain HTTP GET fetcher. 200 and 304 count as success.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &ViewerConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl AssetFetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> BoxStream<'static, FetchEvent> {
        let state = FetchState::Connect {
            client: self.client.clone(),
            url: url.clone(),
        };
        stream::unfold(state, next_event).boxed()
    }
}

enum FetchState {
    Connect { client: Client, url: Url },
    Body(BodyState),
    Done,
}

struct BodyState {
    status: StatusCode,
    total: Option<u64>,
    loaded: u64,
    chunks: BoxStream<'static, reqwest::Result<Bytes>>,
    buf: Vec<u8>,
}

impl BodyState {
    fn finish(self) -> std::result::Result<String, FetchError> {
        match self.status {
            StatusCode::OK | StatusCode::NOT_MODIFIED => {
                Ok(String::from_utf8_lossy(&self.buf).into_owned())
            }
            status => Err(FetchError::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            }),
        }
    }
}

async fn next_event(mut state: FetchState) -> Option<(FetchEvent, FetchState)> {
    loop {
        state = match state {
            FetchState::Connect { client, url } => match client.get(url).send().await {
                Ok(response) => FetchState::Body(BodyState {
                    status: response.status(),
                    total: response.content_length(),
                    loaded: 0,
                    chunks: response.bytes_stream().boxed(),
                    buf: Vec::new(),
                }),
                Err(e) => {
                    let err = FetchError::transport(e.to_string());
                    return Some((FetchEvent::Done(Err(err)), FetchState::Done));
                }
            },
            FetchState::Body(mut body) => {
                return match body.chunks.next().await {
                    Some(Ok(chunk)) => {
                        body.loaded += chunk.len() as u64;
                        body.buf.extend_from_slice(&chunk);
                        let progress = Progress::new(body.loaded, body.total);
                        Some((FetchEvent::Progress(progress), FetchState::Body(body)))
                    }
                    Some(Err(e)) => {
                        let err = FetchError::transport(e.to_string());
                        Some((FetchEvent::Done(Err(err)), FetchState::Done))
                    }
                    None => Some((FetchEvent::Done(body.finish()), FetchState::Done)),
                };
            }
            FetchState::Done => return None,
        }
    }
}
