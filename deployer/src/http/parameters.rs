//! Parameter store client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::clients::{Parameter, ParameterPage, ParameterStore};
use crate::errors::DeployError;
use crate::http::client::HttpClient;

/// Target prefix of the parameter store JSON protocol
pub const SSM_TARGET_PREFIX: &str = "AmazonSSM";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetParametersByPathRequest<'a> {
    path: &'a str,
    recursive: bool,
    with_decryption: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_token: Option<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetParametersByPathResponse {
    #[serde(default)]
    parameters: Vec<StoredParameter>,
    #[serde(default)]
    next_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StoredParameter {
    name: String,
    #[serde(default)]
    value: String,
}

/// Parameter store client over HTTP
#[derive(Debug, Clone)]
pub struct SsmClient {
    http: HttpClient,
}

impl SsmClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ParameterStore for SsmClient {
    async fn get_parameters_by_path(
        &self,
        path: &str,
        next_token: Option<&str>,
    ) -> Result<ParameterPage, DeployError> {
        let request = GetParametersByPathRequest {
            path,
            recursive: true,
            with_decryption: true,
            next_token,
        };
        let response: GetParametersByPathResponse =
            self.http.call("GetParametersByPath", &request).await?;

        Ok(ParameterPage {
            parameters: response
                .parameters
                .into_iter()
                .map(|p| Parameter {
                    name: p.name,
                    value: p.value,
                })
                .collect(),
            next_token: response.next_token.filter(|token| !token.is_empty()),
        })
    }
}
