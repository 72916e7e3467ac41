//! Authentication providers and access rules, rendered as the schema `@auth` block or as
//! `@auth(rules: [..])` on models and fields.

use std::{borrow::Cow, fmt};

use crate::{
    env::has_placeholder,
    render::display_utils::{schema_block, SdlValue},
    ConfigError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, serde::Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AuthOperation {
    Get,
    List,
    Read,
    Create,
    Update,
    Delete,
    Introspection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Allow {
    Public,
    Private,
    Groups(Vec<String>),
    Owner,
}

/// One access rule. The engine evaluates rules in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRule {
    allow: Allow,
    operations: Vec<AuthOperation>,
}

impl AuthRule {
    fn new(allow: Allow) -> Self {
        AuthRule {
            allow,
            operations: Vec::new(),
        }
    }

    /// Restricts the rule to the given operations. All operations are allowed otherwise.
    pub fn operations(&mut self, operations: impl IntoIterator<Item = AuthOperation>) -> &mut Self {
        self.operations.extend(operations);
        self
    }

    pub fn get(&mut self) -> &mut Self {
        self.operations([AuthOperation::Get])
    }

    pub fn list(&mut self) -> &mut Self {
        self.operations([AuthOperation::List])
    }

    pub fn read(&mut self) -> &mut Self {
        self.operations([AuthOperation::Read])
    }

    pub fn create(&mut self) -> &mut Self {
        self.operations([AuthOperation::Create])
    }

    pub fn update(&mut self) -> &mut Self {
        self.operations([AuthOperation::Update])
    }

    pub fn delete(&mut self) -> &mut Self {
        self.operations([AuthOperation::Delete])
    }

    pub fn introspection(&mut self) -> &mut Self {
        self.operations([AuthOperation::Introspection])
    }

    fn to_sdl(&self) -> SdlValue<'_> {
        let kind = match self.allow {
            Allow::Public => "public",
            Allow::Private => "private",
            Allow::Groups(_) => "groups",
            Allow::Owner => "owner",
        };

        let mut object = vec![("allow", SdlValue::enum_value(kind))];

        if let Allow::Groups(groups) = &self.allow {
            object.push(("groups", SdlValue::strings(groups.iter().map(String::as_str))));
        }

        if !self.operations.is_empty() {
            let operations = self
                .operations
                .iter()
                .map(|operation| SdlValue::enum_value(operation.to_string()))
                .collect();

            object.push(("operations", SdlValue::List(operations)));
        }

        SdlValue::Object(object)
    }
}

/// Rules collected in call order.
///
/// ```
/// use grafbase_schema_config::AuthRules;
///
/// let mut rules = AuthRules::default();
/// rules.private().read();
/// rules.groups(["admin"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthRules(Vec<AuthRule>);

impl AuthRules {
    fn push(&mut self, allow: Allow) -> &mut AuthRule {
        let idx = self.0.len();
        self.0.push(AuthRule::new(allow));
        &mut self.0[idx]
    }

    pub fn public(&mut self) -> &mut AuthRule {
        self.push(Allow::Public)
    }

    pub fn private(&mut self) -> &mut AuthRule {
        self.push(Allow::Private)
    }

    pub fn groups<I, S>(&mut self, groups: I) -> &mut AuthRule
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Allow::Groups(groups.into_iter().map(Into::into).collect()))
    }

    pub fn owner(&mut self) -> &mut AuthRule {
        self.push(Allow::Owner)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any rule needs an authenticated caller.
    pub(crate) fn needs_provider(&self) -> bool {
        self.0.iter().any(|rule| rule.allow != Allow::Public)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for rule in &self.0 {
            if let Allow::Groups(groups) = &rule.allow {
                if groups.is_empty() {
                    return Err(ConfigError::InvalidAuth("a groups rule needs at least one group".to_owned()));
                }

                if groups.iter().any(|group| group.trim().is_empty()) {
                    return Err(ConfigError::InvalidAuth("group names cannot be empty".to_owned()));
                }
            }
        }

        Ok(())
    }

    pub(crate) fn to_sdl(&self) -> SdlValue<'_> {
        SdlValue::List(self.0.iter().map(AuthRule::to_sdl).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OidcProvider {
    pub issuer: String,
    pub client_id: Option<String>,
    pub groups_claim: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwtProvider {
    pub issuer: String,
    pub secret: String,
    pub client_id: Option<String>,
    pub groups_claim: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JwksProvider {
    pub issuer: Option<String>,
    pub jwks_endpoint: Option<String>,
    pub client_id: Option<String>,
    pub groups_claim: Option<String>,
}

/// Delegates authorization to a resolver file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizerProvider {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthProvider {
    Oidc(OidcProvider),
    Jwt(JwtProvider),
    Jwks(JwksProvider),
    Authorizer(AuthorizerProvider),
}

impl AuthProvider {
    pub fn oidc(issuer: impl Into<String>) -> Self {
        AuthProvider::Oidc(OidcProvider {
            issuer: issuer.into(),
            client_id: None,
            groups_claim: None,
        })
    }

    pub fn jwt(issuer: impl Into<String>, secret: impl Into<String>) -> Self {
        AuthProvider::Jwt(JwtProvider {
            issuer: issuer.into(),
            secret: secret.into(),
            client_id: None,
            groups_claim: None,
        })
    }

    pub fn authorizer(name: impl Into<String>) -> Self {
        AuthProvider::Authorizer(AuthorizerProvider { name: name.into() })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        fn issuer(issuer: &str) -> Result<(), ConfigError> {
            if has_placeholder(issuer) {
                return Ok(());
            }

            url::Url::parse(issuer)
                .map(drop)
                .map_err(|err| ConfigError::InvalidAuth(format!("the issuer `{issuer}` is not a valid URL: {err}")))
        }

        match self {
            AuthProvider::Oidc(provider) => issuer(&provider.issuer),
            AuthProvider::Jwt(provider) => {
                issuer(&provider.issuer)?;

                if provider.secret.is_empty() {
                    return Err(ConfigError::InvalidAuth("a JWT provider needs a secret".to_owned()));
                }

                Ok(())
            }
            AuthProvider::Jwks(provider) => match (&provider.issuer, &provider.jwks_endpoint) {
                (None, None) => Err(ConfigError::InvalidAuth(
                    "a JWKS provider needs an issuer or an endpoint".to_owned(),
                )),
                (issuer_url, endpoint) => {
                    if let Some(url) = issuer_url {
                        issuer(url)?;
                    }

                    if let Some(url) = endpoint {
                        issuer(url)?;
                    }

                    Ok(())
                }
            },
            AuthProvider::Authorizer(provider) if provider.name.trim().is_empty() => Err(ConfigError::InvalidAuth(
                "an authorizer needs a resolver name".to_owned(),
            )),
            AuthProvider::Authorizer(_) => Ok(()),
        }
    }

    fn to_sdl(&self) -> SdlValue<'_> {
        fn common<'a>(
            object: &mut Vec<(&'a str, SdlValue<'a>)>,
            client_id: &'a Option<String>,
            groups_claim: &'a Option<String>,
        ) {
            if let Some(client_id) = client_id {
                object.push(("clientId", SdlValue::from(client_id.as_str())));
            }

            if let Some(groups_claim) = groups_claim {
                object.push(("groupsClaim", SdlValue::from(groups_claim.as_str())));
            }
        }

        let mut object = Vec::new();

        match self {
            AuthProvider::Oidc(provider) => {
                object.push(("type", SdlValue::enum_value("oidc")));
                object.push(("issuer", SdlValue::from(provider.issuer.as_str())));
                common(&mut object, &provider.client_id, &provider.groups_claim);
            }
            AuthProvider::Jwt(provider) => {
                object.push(("type", SdlValue::enum_value("jwt")));
                object.push(("issuer", SdlValue::from(provider.issuer.as_str())));
                object.push(("secret", SdlValue::from(provider.secret.as_str())));
                common(&mut object, &provider.client_id, &provider.groups_claim);
            }
            AuthProvider::Jwks(provider) => {
                object.push(("type", SdlValue::enum_value("jwks")));

                if let Some(issuer) = &provider.issuer {
                    object.push(("issuer", SdlValue::from(issuer.as_str())));
                }

                if let Some(endpoint) = &provider.jwks_endpoint {
                    object.push(("jwksEndpoint", SdlValue::from(endpoint.as_str())));
                }

                common(&mut object, &provider.client_id, &provider.groups_claim);
            }
            AuthProvider::Authorizer(provider) => {
                object.push(("type", SdlValue::enum_value("authorizer")));
                object.push(("name", SdlValue::String(Cow::Borrowed(&provider.name))));
            }
        }

        SdlValue::Object(object)
    }
}

impl From<OidcProvider> for AuthProvider {
    fn from(provider: OidcProvider) -> Self {
        AuthProvider::Oidc(provider)
    }
}

impl From<JwtProvider> for AuthProvider {
    fn from(provider: JwtProvider) -> Self {
        AuthProvider::Jwt(provider)
    }
}

impl From<JwksProvider> for AuthProvider {
    fn from(provider: JwksProvider) -> Self {
        AuthProvider::Jwks(provider)
    }
}

impl From<AuthorizerProvider> for AuthProvider {
    fn from(provider: AuthorizerProvider) -> Self {
        AuthProvider::Authorizer(provider)
    }
}

/// The schema-wide authentication configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Auth {
    providers: Vec<AuthProvider>,
    rules: AuthRules,
}

impl Auth {
    pub fn new<I, P>(providers: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<AuthProvider>,
    {
        Auth {
            providers: providers.into_iter().map(Into::into).collect(),
            rules: AuthRules::default(),
        }
    }

    #[must_use]
    pub fn rules(mut self, rules: impl FnOnce(&mut AuthRules)) -> Self {
        rules(&mut self.rules);
        self
    }

    pub(crate) fn has_providers(&self) -> bool {
        !self.providers.is_empty()
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for provider in &self.providers {
            provider.validate()?;
        }

        self.rules.validate()?;

        if self.providers.is_empty() && self.rules.needs_provider() {
            return Err(ConfigError::InvalidAuth(
                "rules other than `public` need at least one provider".to_owned(),
            ));
        }

        Ok(())
    }
}

impl fmt::Display for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        schema_block("auth", f)?
            .list("providers", self.providers.iter().map(AuthProvider::to_sdl))?
            .list("rules", self.rules.0.iter().map(AuthRule::to_sdl))?
            .finish()
    }
}
