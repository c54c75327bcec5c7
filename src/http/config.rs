use crate::config::SealightsOptions;

/// Proxy settings applied to the download client. An empty url means no proxy.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProxyConfig {
    url: String,
    username: String,
    password: String,
}

impl ProxyConfig {
    pub fn from_url(url: String) -> Self {
        Self {
            url,
            ..Default::default()
        }
    }

    pub fn with_basic_auth(self, username: String, password: String) -> Self {
        Self {
            username,
            password,
            ..self
        }
    }

    pub fn url_as_string(&self) -> String {
        self.url.clone()
    }

    /// Returns the credentials if a username has been provided.
    pub fn basic_auth(&self) -> Option<(&str, &str)> {
        (!self.username.is_empty()).then_some((self.username.as_str(), self.password.as_str()))
    }
}

#[derive(Debug, Default, Clone)]
pub struct HttpConfig {
    pub(crate) proxy: ProxyConfig,
    pub(crate) accept_invalid_certs: bool,
}

impl HttpConfig {
    /// Client settings for downloading the agent. Timeouts are left to the client defaults.
    pub fn from_options(options: &SealightsOptions) -> Self {
        let proxy = ProxyConfig::from_url(options.proxy.clone()).with_basic_auth(
            options.proxy_username.clone(),
            options.proxy_password.clone(),
        );
        Self {
            proxy,
            accept_invalid_certs: options.ignore_certificate_errors,
        }
    }
}
