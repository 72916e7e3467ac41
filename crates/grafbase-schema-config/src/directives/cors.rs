use std::{fmt, time::Duration};

use duration_str::deserialize_option_duration;

use super::AnyOr;
use crate::{
    env::has_placeholder,
    render::display_utils::{schema_block, SdlValue},
    ConfigError,
};

#[derive(Debug, PartialEq, Eq, Clone, Copy, serde::Deserialize, strum::Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Connect,
    Patch,
    Trace,
}

/// Cross-origin resource sharing. Only the configured settings are rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Cors {
    /// If false (or not defined), credentials are not allowed in requests
    pub allow_credentials: Option<bool>,
    /// Maximum time between OPTIONS and the next request
    #[serde(default, deserialize_with = "deserialize_option_duration")]
    pub max_age: Option<Duration>,
    /// Headers allowed in incoming requests
    pub allowed_headers: Option<AnyOr<String>>,
    /// HTTP methods allowed to the endpoint.
    pub allowed_methods: Option<AnyOr<HttpMethod>>,
    /// Headers exposed from the OPTIONS request
    pub exposed_headers: Option<AnyOr<String>>,
    /// Origins from which we allow requests
    pub allowed_origins: Option<AnyOr<String>>,
    /// If set, allows browsers from private network to connect
    pub allow_private_network: Option<bool>,
}

impl Cors {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidDirective {
            directive: "cors",
            reason,
        };

        if let Some(max_age) = self.max_age {
            if max_age.subsec_nanos() != 0 {
                return Err(invalid("the max age must be a whole number of seconds".to_owned()));
            }
        }

        let origins = self.allowed_origins.as_ref().map(AnyOr::explicit).unwrap_or_default();

        for origin in origins.iter().filter(|origin| !has_placeholder(origin)) {
            url::Url::parse(origin).map_err(|err| invalid(format!("the origin `{origin}` is not a valid URL: {err}")))?;
        }

        let headers = [&self.allowed_headers, &self.exposed_headers]
            .into_iter()
            .flatten()
            .flat_map(AnyOr::explicit);

        for header in headers {
            if header.is_empty() || !header.is_ascii() {
                return Err(invalid(format!("`{header}` is not a valid header name")));
            }
        }

        Ok(())
    }
}

fn strings(values: &AnyOr<String>) -> SdlValue<'_> {
    values.to_sdl(|value| SdlValue::from(value.as_str()))
}

impl fmt::Display for Cors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        schema_block("cors", f)?
            .opt_arg("allowCredentials", self.allow_credentials)?
            .opt_arg("maxAge", self.max_age.map(|max_age| max_age.as_secs()))?
            .opt_arg("allowedHeaders", self.allowed_headers.as_ref().map(strings))?
            .opt_arg(
                "allowedMethods",
                self.allowed_methods
                    .as_ref()
                    .map(|methods| methods.to_sdl(|method| SdlValue::enum_value(method.to_string()))),
            )?
            .opt_arg("exposedHeaders", self.exposed_headers.as_ref().map(strings))?
            .opt_arg("allowedOrigins", self.allowed_origins.as_ref().map(strings))?
            .opt_arg("allowPrivateNetwork", self.allow_private_network)?
            .finish()
    }
}
