//! # Helpers to build a reqwest blocking client
use super::config::HttpConfig;
use reqwest::{
    blocking::{Client, ClientBuilder},
    Proxy,
};

#[derive(thiserror::Error, Debug)]
pub enum ReqwestBuildError {
    #[error("could not build the reqwest client: {0}")]
    ClientBuilder(String),
}

/// Builds a reqwest blocking client according to the provided configuration.
pub fn try_build_reqwest_client(config: HttpConfig) -> Result<Client, ReqwestBuildError> {
    let mut builder = reqwest_builder(&config);

    let proxy_config = config.proxy;
    let proxy_url = proxy_config.url_as_string();
    if !proxy_url.is_empty() {
        let mut proxy = Proxy::all(proxy_url)
            .map_err(|err| ReqwestBuildError::ClientBuilder(format!("invalid proxy url: {err}")))?;
        if let Some((username, password)) = proxy_config.basic_auth() {
            proxy = proxy.basic_auth(username, password);
        }
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|err| ReqwestBuildError::ClientBuilder(err.to_string()))
}

/// Returns a reqwest [ClientBuilder] using rustls. Timeouts are the client defaults.
fn reqwest_builder(config: &HttpConfig) -> ClientBuilder {
    Client::builder()
        .use_rustls_tls()
        .danger_accept_invalid_certs(config.accept_invalid_certs)
}
