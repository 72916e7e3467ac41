use std::sync::OnceLock;

use regex::Regex;

use crate::{render::display_utils::SdlValue, ConfigError};

fn header_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[!#$%&'*+.^_`|~0-9A-Za-z-]+$").expect("must be valid"))
}

/// The value sent upstream for a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    /// A fixed value, which may embed `{{ env.NAME }}` placeholders.
    Static(String),
    /// The value of this header in the incoming request.
    Forward(String),
}

impl HeaderValue {
    pub fn forward(incoming_header: impl Into<String>) -> Self {
        HeaderValue::Forward(incoming_header.into())
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        HeaderValue::Static(value.to_owned())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        HeaderValue::Static(value)
    }
}

/// Headers sent to the upstream of a connector, either on every request or only while
/// introspecting its schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectorHeaders {
    headers: Vec<(String, HeaderValue)>,
    introspection_headers: Vec<(String, String)>,
}

impl ConnectorHeaders {
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<HeaderValue>) -> &mut Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn set_static(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.set(name, HeaderValue::Static(value.into()))
    }

    /// Sent only when the engine introspects the upstream schema.
    pub fn introspection(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.introspection_headers.push((name.into(), value.into()));
        self
    }

    pub(crate) fn validate(&self, connector: &str) -> Result<(), ConfigError> {
        let names = self
            .headers
            .iter()
            .map(|(name, _)| name)
            .chain(self.introspection_headers.iter().map(|(name, _)| name));

        for name in names {
            if !header_name_regex().is_match(name) {
                return Err(ConfigError::InvalidConnector {
                    name: connector.to_owned(),
                    reason: format!("`{name}` is not a valid header name"),
                });
            }
        }

        let forwarded = self.headers.iter().filter_map(|(_, value)| match value {
            HeaderValue::Forward(incoming) => Some(incoming),
            HeaderValue::Static(_) => None,
        });

        for incoming in forwarded {
            if !header_name_regex().is_match(incoming) {
                return Err(ConfigError::InvalidConnector {
                    name: connector.to_owned(),
                    reason: format!("cannot forward `{incoming}`, which is not a valid header name"),
                });
            }
        }

        Ok(())
    }

    pub(crate) fn headers_sdl(&self) -> impl Iterator<Item = SdlValue<'_>> {
        self.headers.iter().map(|(name, value)| {
            let value = match value {
                HeaderValue::Static(value) => ("value", SdlValue::from(value.as_str())),
                HeaderValue::Forward(incoming) => ("forward", SdlValue::from(incoming.as_str())),
            };

            SdlValue::Object(vec![("name", SdlValue::from(name.as_str())), value])
        })
    }

    pub(crate) fn introspection_headers_sdl(&self) -> impl Iterator<Item = SdlValue<'_>> {
        self.introspection_headers.iter().map(|(name, value)| {
            SdlValue::Object(vec![
                ("name", SdlValue::from(name.as_str())),
                ("value", SdlValue::from(value.as_str())),
            ])
        })
    }
}
