use std::{collections::HashSet, fmt, time::Duration};

use duration_str::deserialize_duration;

use super::AnyOr;
use crate::{
    render::display_utils::{schema_block, SdlValue},
    ConfigError,
};

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderCondition {
    pub name: String,
    pub value: AnyOr<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClaimCondition {
    pub name: String,
    pub value: AnyOr<String>,
}

/// What a rule counts requests by, as written in settings: exactly one key must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitingConditionInput {
    pub headers: Option<Vec<HeaderCondition>>,
    pub jwt_claims: Option<Vec<ClaimCondition>>,
    pub ips: Option<AnyOr<String>>,
    pub operations: Option<AnyOr<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitingCondition {
    Headers(Vec<HeaderCondition>),
    JwtClaims(Vec<ClaimCondition>),
    Ips(AnyOr<String>),
    Operations(AnyOr<String>),
}

impl RateLimitingCondition {
    fn from_input(input: RateLimitingConditionInput) -> Result<Self, String> {
        let RateLimitingConditionInput {
            headers,
            jwt_claims,
            ips,
            operations,
        } = input;

        let set = [
            headers.is_some().then_some("headers"),
            jwt_claims.is_some().then_some("jwt_claims"),
            ips.is_some().then_some("ips"),
            operations.is_some().then_some("operations"),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();

        let condition = match (headers, jwt_claims, ips, operations) {
            (Some(headers), None, None, None) => RateLimitingCondition::Headers(headers),
            (None, Some(claims), None, None) => RateLimitingCondition::JwtClaims(claims),
            (None, None, Some(ips), None) => RateLimitingCondition::Ips(ips),
            (None, None, None, Some(operations)) => RateLimitingCondition::Operations(operations),
            (None, None, None, None) => {
                return Err("the condition needs one of `headers`, `jwt_claims`, `ips` or `operations`".to_owned())
            }
            _ => {
                return Err(format!(
                    "the condition sets several kinds ({}), but exactly one is allowed",
                    set.join(", ")
                ))
            }
        };

        Ok(condition)
    }

    fn validate(&self) -> Result<(), String> {
        let names: Vec<&str> = match self {
            RateLimitingCondition::Headers(headers) => headers.iter().map(|h| h.name.as_str()).collect(),
            RateLimitingCondition::JwtClaims(claims) => claims.iter().map(|c| c.name.as_str()).collect(),
            RateLimitingCondition::Ips(_) | RateLimitingCondition::Operations(_) => Vec::new(),
        };

        match self {
            RateLimitingCondition::Headers(headers) if headers.is_empty() => {
                Err("the header condition needs at least one header".to_owned())
            }
            RateLimitingCondition::JwtClaims(claims) if claims.is_empty() => {
                Err("the JWT claim condition needs at least one claim".to_owned())
            }
            _ if names.iter().any(|name| name.trim().is_empty()) => Err("condition names cannot be empty".to_owned()),
            _ => Ok(()),
        }
    }

    fn to_sdl(&self) -> SdlValue<'_> {
        fn named<'a>(name: &'a str, value: &'a AnyOr<String>) -> SdlValue<'a> {
            SdlValue::Object(vec![
                ("name", SdlValue::from(name)),
                ("value", value.to_sdl(|value| SdlValue::from(value.as_str()))),
            ])
        }

        let (key, value) = match self {
            RateLimitingCondition::Headers(headers) => (
                "headers",
                SdlValue::List(headers.iter().map(|h| named(&h.name, &h.value)).collect()),
            ),
            RateLimitingCondition::JwtClaims(claims) => (
                "jwtClaims",
                SdlValue::List(claims.iter().map(|c| named(&c.name, &c.value)).collect()),
            ),
            RateLimitingCondition::Ips(ips) => ("ips", ips.to_sdl(|ip| SdlValue::from(ip.as_str()))),
            RateLimitingCondition::Operations(operations) => (
                "operations",
                operations.to_sdl(|operation| SdlValue::from(operation.as_str())),
            ),
        };

        SdlValue::Object(vec![(key, value)])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitingRuleInput {
    pub name: String,
    pub condition: RateLimitingConditionInput,
    pub limit: u32,
    #[serde(deserialize_with = "deserialize_duration")]
    pub duration: Duration,
}

/// Allows `limit` requests matching the condition per `duration` window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitingRule {
    name: String,
    condition: RateLimitingCondition,
    limit: u32,
    duration: Duration,
}

impl RateLimitingRule {
    pub fn new(
        name: impl Into<String>,
        condition: RateLimitingCondition,
        limit: u32,
        duration: Duration,
    ) -> Result<Self, ConfigError> {
        let name = name.into();

        let invalid = |reason: String| ConfigError::InvalidRateLimitRule {
            rule: name.clone(),
            reason,
        };

        if name.trim().is_empty() {
            return Err(invalid("a rule needs a name".to_owned()));
        }

        if limit == 0 {
            return Err(invalid("the limit must be greater than 0".to_owned()));
        }

        if duration.as_secs() == 0 {
            return Err(invalid("the duration must be at least one second".to_owned()));
        }

        if duration.subsec_nanos() != 0 {
            return Err(invalid("the duration must be a whole number of seconds".to_owned()));
        }

        condition.validate().map_err(invalid)?;

        Ok(RateLimitingRule {
            name,
            condition,
            limit,
            duration,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn to_sdl(&self) -> SdlValue<'_> {
        SdlValue::Object(vec![
            ("name", SdlValue::from(self.name.as_str())),
            ("condition", self.condition.to_sdl()),
            ("limit", SdlValue::from(self.limit)),
            ("duration", SdlValue::from(self.duration.as_secs())),
        ])
    }
}

impl TryFrom<RateLimitingRuleInput> for RateLimitingRule {
    type Error = ConfigError;

    fn try_from(input: RateLimitingRuleInput) -> Result<Self, Self::Error> {
        let condition =
            RateLimitingCondition::from_input(input.condition).map_err(|reason| ConfigError::InvalidRateLimitRule {
                rule: input.name.clone(),
                reason,
            })?;

        RateLimitingRule::new(input.name, condition, input.limit, input.duration)
    }
}

/// The `rate_limiting` settings section.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitingInput {
    #[serde(default)]
    pub rules: Vec<RateLimitingRuleInput>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimiting {
    rules: Vec<RateLimitingRule>,
}

impl RateLimiting {
    pub fn new(rules: impl IntoIterator<Item = RateLimitingRule>) -> Self {
        RateLimiting {
            rules: rules.into_iter().collect(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.rules.is_empty() {
            return Err(ConfigError::InvalidDirective {
                directive: "rateLimiting",
                reason: "at least one rule is required".to_owned(),
            });
        }

        let mut seen = HashSet::new();

        for rule in &self.rules {
            if !seen.insert(rule.name.as_str()) {
                return Err(ConfigError::InvalidRateLimitRule {
                    rule: rule.name.clone(),
                    reason: "the rule name is used more than once".to_owned(),
                });
            }
        }

        Ok(())
    }
}

impl TryFrom<RateLimitingInput> for RateLimiting {
    type Error = ConfigError;

    fn try_from(input: RateLimitingInput) -> Result<Self, Self::Error> {
        let rules = input
            .rules
            .into_iter()
            .map(RateLimitingRule::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RateLimiting { rules })
    }
}

impl fmt::Display for RateLimiting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        schema_block("rateLimiting", f)?
            .list("rules", self.rules.iter().map(RateLimitingRule::to_sdl))?
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rstest::rstest;

    use super::*;

    #[test]
    fn renders_one_rule_per_line() {
        let rate_limiting = RateLimiting::new([
            RateLimitingRule::new(
                "per-ip",
                RateLimitingCondition::Ips(AnyOr::Any),
                10,
                Duration::from_secs(10),
            )
            .unwrap(),
            RateLimitingRule::new(
                "api-key",
                RateLimitingCondition::Headers(vec![HeaderCondition {
                    name: "x-api-key".to_owned(),
                    value: AnyOr::Explicit(vec!["a".to_owned(), "b".to_owned()]),
                }]),
                100,
                Duration::from_secs(60),
            )
            .unwrap(),
        ]);

        rate_limiting.validate().unwrap();

        insta::assert_snapshot!(rate_limiting, @r###"
        extend schema
          @rateLimiting(
            rules: [
              { name: "per-ip", condition: { ips: "*" }, limit: 10, duration: 10 }
              { name: "api-key", condition: { headers: [{ name: "x-api-key", value: ["a", "b"] }] }, limit: 100, duration: 60 }
            ]
          )
        "###);
    }

    #[rstest]
    #[case::no_condition(
        indoc! {r#"
            name = "empty"
            limit = 10
            duration = "10s"
            [condition]
        "#},
        "the rate limiting rule `empty` is invalid: the condition needs one of `headers`, `jwt_claims`, `ips` or `operations`"
    )]
    #[case::several_conditions(
        indoc! {r#"
            name = "both"
            limit = 10
            duration = "10s"
            [condition]
            ips = "any"
            headers = [{ name = "x-api-key", value = "any" }]
        "#},
        "the rate limiting rule `both` is invalid: the condition sets several kinds (headers, ips), but exactly one is allowed"
    )]
    #[case::zero_limit(
        indoc! {r#"
            name = "zero"
            limit = 0
            duration = "10s"
            [condition]
            operations = ["GetUser"]
        "#},
        "the rate limiting rule `zero` is invalid: the limit must be greater than 0"
    )]
    #[case::zero_duration(
        indoc! {r#"
            name = "instant"
            limit = 10
            duration = "0s"
            [condition]
            ips = "any"
        "#},
        "the rate limiting rule `instant` is invalid: the duration must be at least one second"
    )]
    fn invalid_rules(#[case] input: &str, #[case] expected: &str) {
        let input: RateLimitingRuleInput = toml::from_str(input).unwrap();
        let error = RateLimitingRule::try_from(input).unwrap_err();

        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn duplicate_rule_names() {
        let rule = RateLimitingRule::new(
            "per-ip",
            RateLimitingCondition::Ips(AnyOr::Any),
            10,
            Duration::from_secs(1),
        )
        .unwrap();

        let error = RateLimiting::new([rule.clone(), rule]).validate().unwrap_err();
        assert!(matches!(error, ConfigError::InvalidRateLimitRule { .. }));
    }
}
