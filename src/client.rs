use async_trait::async_trait;
use log::{debug, trace};
use reqwest::Url;
use thiserror::Error;

use crate::code::{CompilationRequest, CompilationResult};

pub const COMPILE_PATH: &str = "/api/compile";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("invalid server url {0}")]
    InvalidUrl(String),
}

/// What came back from the compile endpoint: whether the HTTP status was a
/// success, and the decoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileReply {
    pub ok: bool,
    pub result: CompilationResult,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Compiler: Send + Sync {
    async fn compile(&self, request: &CompilationRequest) -> Result<CompileReply, ClientError>;
}

pub struct HttpCompiler {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpCompiler {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let endpoint = Url::parse(base_url)
            .and_then(|base| base.join(COMPILE_PATH))
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        Ok(HttpCompiler {
            client: reqwest::Client::new(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Compiler for HttpCompiler {
    async fn compile(&self, request: &CompilationRequest) -> Result<CompileReply, ClientError> {
        debug!("posting compile request to {}", self.endpoint);
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        let ok = response.status().is_success();
        let result: CompilationResult = response.json().await?;
        trace!("compile response: {:?}", result);
        Ok(CompileReply { ok, result })
    }
}
