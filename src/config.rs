//! Building an `Acl` from configuration.
//!
//! The configuration carries an enable flag, a priority and three independent sections for roles,
//! resources and rules. It derives `serde` traits, so any serde format can be used to load it.
//! Assertions cannot be expressed as data; rules refer to them by name and the names are resolved
//! through an [`AssertionRegistry`] the application builds at startup.

use crate::acl::Acl;
use crate::error::{Error, Result};
use crate::rule::{Operation, RuleType, SharedAssertion};
use log::{info, trace};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;


// Configuration //////////////////////////////////////////////////////////////////////////////////


#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AclConfig {
    /// A disabled `Acl` is left empty by [`Acl::init`].
    pub enabled:   bool,
    pub priority:  i32,
    /// Roles are added in order, parents have to be listed before their children.
    pub roles:     Vec<RoleConfig>,
    /// Resources are added in order, parents have to be listed before their children.
    pub resources: Vec<ResourceConfig>,
    pub rules:     Vec<RuleConfig>,
} // struct AclConfig

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleConfig {
    pub id:      String,
    #[serde(default)]
    pub parents: Vec<String>,
} // struct RoleConfig

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub id:     String,
    #[serde(default)]
    pub parent: Option<String>,
} // struct ResourceConfig

/// One call to [`Acl::set_rule`]. `type` and `operation` are parsed case-insensitively, a missing
/// role or resource and an empty privilege list are wildcards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    #[serde(default = "RuleConfig::default_operation")]
    pub operation:  String,
    #[serde(rename = "type")]
    pub rule_type:  String,
    #[serde(default)]
    pub role:       Option<String>,
    #[serde(default)]
    pub resource:   Option<String>,
    #[serde(default)]
    pub privileges: Vec<String>,
    /// Name of an assertion in the `AssertionRegistry`.
    #[serde(default)]
    pub assertion:  Option<String>,
} // struct RuleConfig

impl RuleConfig {

    fn default_operation() -> String {
        Operation::Add.to_string()
    } // default_operation

} // impl RuleConfig


// AssertionRegistry //////////////////////////////////////////////////////////////////////////////


/// Named assertions available to configured rules.
#[derive(Clone, Default)]
pub struct AssertionRegistry {
    assertions: HashMap<String, SharedAssertion>,
} // struct AssertionRegistry

impl AssertionRegistry {

    pub fn new() -> Self {
        AssertionRegistry{assertions: HashMap::new()}
    } // new

    /// Registers an assertion, replacing any previous one with the same name.
    pub fn register(&mut self, name: impl Into<String>, assertion: SharedAssertion) -> &mut Self {
        self.assertions.insert(name.into(), assertion);
        self
    } // register

    pub fn get(&self, name: &str) -> Result<SharedAssertion> {
        self.assertions.get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownAssertion(name.to_string()))
    } // get

} // impl AssertionRegistry

impl fmt::Debug for AssertionRegistry {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.assertions.keys()).finish()
    } // fmt

} // impl fmt::Debug for AssertionRegistry


// Initialization /////////////////////////////////////////////////////////////////////////////////


impl Acl {

    /// Replaces the `Acl` with one holding the configured roles, resources and rules, installed in
    /// this order. Returns `Ok(false)` and installs nothing if the configuration disables the `Acl`.
    /// The first invalid entry aborts the initialization and leaves the `Acl` unchanged.
    pub fn init(&mut self, config: &AclConfig, assertions: &AssertionRegistry) -> Result<bool> {
        trace!("initializing acl from {:?}", config);
        let acl = Acl::build(config, assertions)?;

        *self = acl;
        if !self.enabled {
            info!("acl is disabled");
            return Ok(false);
        } // if

        info!("acl initialized with {} roles, {} resources and {} rules",
            config.roles.len(), config.resources.len(), config.rules.len());
        Ok(true)
    } // init

    /// Creates an `Acl` from configuration, see [`Acl::init`].
    pub fn from_config(config: &AclConfig, assertions: &AssertionRegistry) -> Result<Self> {
        let mut acl = Acl::new();

        acl.init(config, assertions)?;
        Ok(acl)
    } // from_config

    fn build(config: &AclConfig, assertions: &AssertionRegistry) -> Result<Self> {
        let mut acl = Acl::new();

        acl.enabled  = config.enabled;
        acl.priority = config.priority;
        if !config.enabled {
            return Ok(acl);
        } // if

        for role in &config.roles {
            let parents: Vec<&str> = role.parents.iter().map(String::as_str).collect();

            acl.add_role(role.id.as_str(), &parents)?;
        } // for
        for resource in &config.resources {
            acl.add_resource(resource.id.as_str(), resource.parent.as_deref())?;
        } // for
        for rule in &config.rules {
            let operation  = rule.operation.parse::<Operation>()?;
            let rule_type  = rule.rule_type.parse::<RuleType>()?;
            let privileges: Vec<&str> = rule.privileges.iter().map(String::as_str).collect();
            let assertion  = match &rule.assertion {
                Some(name) => Some(assertions.get(name)?),
                None       => None,
            }; // match

            acl.set_rule(operation, rule_type, rule.role.as_deref(), rule.resource.as_deref(), &privileges, assertion)?;
        } // for
        Ok(acl)
    } // build

} // impl Acl


// Tests //////////////////////////////////////////////////////////////////////////////////////////


#[cfg(test)]
mod tests {

    use super::*;
    use crate::rule::assertion;
    use test_env_log::test;

    const CMS: &str = r#"{
        "enabled": true,
        "priority": 10,
        "roles": [
            {"id": "guest"},
            {"id": "staff", "parents": ["guest"]},
            {"id": "editor", "parents": ["staff"]},
            {"id": "admin"}
        ],
        "resources": [
            {"id": "news"},
            {"id": "latest", "parent": "news"}
        ],
        "rules": [
            {"type": "allow", "role": "guest", "privileges": ["view"]},
            {"type": "allow", "role": "staff", "privileges": ["edit", "submit", "revise"]},
            {"type": "Deny", "role": "staff", "resource": "latest", "privileges": ["revise"]},
            {"type": "allow", "role": "admin"},
            {"type": "allow", "role": "editor", "privileges": ["publish"], "assertion": "office-hours"},
            {"operation": "remove", "type": "allow", "role": "staff", "privileges": ["submit"]}
        ]
    }"#;

    fn assertions(open: bool) -> AssertionRegistry {
        let mut registry = AssertionRegistry::new();

        registry.register("office-hours", assertion(move |_, _, _| open));
        registry
    } // assertions

    #[test]
    fn parse() {
        let config: AclConfig = serde_json::from_str(CMS).unwrap();

        assert!(config.enabled);
        assert_eq!(config.priority, 10);
        assert_eq!(config.roles[1], RoleConfig{id: String::from("staff"), parents: vec![String::from("guest")]});
        assert_eq!(config.resources[0].parent, None);
        assert_eq!(config.rules[0].operation, "add");
        assert_eq!(config.rules[0].resource, None);
        assert_eq!(config.rules[3].privileges, Vec::<String>::new());

        let empty: AclConfig = serde_json::from_str("{}").unwrap();

        assert_eq!(empty, AclConfig::default());
        assert!(!empty.enabled);
    } // parse

    #[test]
    fn init() {
        let config: AclConfig = serde_json::from_str(CMS).unwrap();
        let acl = Acl::from_config(&config, &assertions(true)).unwrap();

        assert!(acl.enabled());
        assert_eq!(acl.priority(), 10);
        assert_eq!(acl.roles(), vec!["admin", "editor", "guest", "staff"]);
        assert_eq!(acl.resources(), vec!["latest", "news"]);

        assert!( acl.is_allowed(Some("editor"), Some("news"), Some("view")));
        assert!( acl.is_allowed(Some("editor"), Some("news"), Some("revise")));
        assert!(!acl.is_allowed(Some("editor"), Some("latest"), Some("revise")));
        assert!(!acl.is_allowed(Some("staff"), None, Some("submit")));
        assert!( acl.is_allowed(Some("admin"), Some("latest"), None));
        assert!( acl.is_allowed(Some("editor"), None, Some("publish")));

        let acl = Acl::from_config(&config, &assertions(false)).unwrap();

        assert!(!acl.is_allowed(Some("editor"), None, Some("publish")));
    } // init

    #[test]
    fn disabled() {
        let mut config: AclConfig = serde_json::from_str(CMS).unwrap();
        let mut acl = Acl::new();

        assert!(acl.add_role("leftover", &[]).is_ok());
        config.enabled = false;
        assert_eq!(acl.init(&config, &assertions(true)), Ok(false));
        assert!(!acl.enabled());
        assert!(acl.roles().is_empty());
        assert!(!acl.is_allowed(Some("guest"), None, Some("view")));
    } // disabled

    #[test]
    fn invalid() {
        let config: AclConfig = serde_json::from_str(CMS).unwrap();

        assert_eq!(
            Acl::from_config(&config, &AssertionRegistry::new()).unwrap_err(),
            Error::UnknownAssertion(String::from("office-hours"))
        );

        let mut broken = config.clone();

        broken.rules[0].rule_type = String::from("grant");
        assert_eq!(
            Acl::from_config(&broken, &assertions(true)).unwrap_err(),
            Error::InvalidRuleType(String::from("grant"))
        );

        let mut broken = config.clone();

        broken.rules[0].operation = String::from("replace");
        assert_eq!(
            Acl::from_config(&broken, &assertions(true)).unwrap_err(),
            Error::InvalidOperation(String::from("replace"))
        );

        let mut broken = config.clone();

        broken.roles.swap(0, 1);
        assert_eq!(
            Acl::from_config(&broken, &assertions(true)).unwrap_err(),
            Error::UnknownParent(String::from("guest"))
        );

        let mut broken = config;

        broken.rules[0].resource = Some(String::from("archive"));
        assert_eq!(
            Acl::from_config(&broken, &assertions(true)).unwrap_err(),
            Error::UnknownResource(String::from("archive"))
        );
    } // invalid

    #[test]
    fn failed_init_keeps_previous_state() {
        let config: AclConfig = serde_json::from_str(CMS).unwrap();
        let mut acl = Acl::from_config(&config, &assertions(true)).unwrap();
        let broken: AclConfig = serde_json::from_str(r#"{
            "enabled": true,
            "resources": [{"id": "vault"}],
            "rules": [
                {"type": "allow"},
                {"type": "deny", "resource": "vault", "assertion": "missing"}
            ]
        }"#).unwrap();

        assert_eq!(acl.init(&broken, &assertions(true)), Err(Error::UnknownAssertion(String::from("missing"))));
        assert!(acl.enabled());
        assert_eq!(acl.priority(), 10);
        assert_eq!(acl.resources(), vec!["latest", "news"]);
        assert!(!acl.is_allowed(Some("guest"), Some("vault"), Some("open")));
        assert!(!acl.is_allowed(None, None, None));
        assert!( acl.is_allowed(Some("editor"), Some("news"), Some("view")));

        let mut fresh = Acl::new();

        assert!(fresh.init(&broken, &assertions(true)).is_err());
        assert!(!fresh.is_allowed(Some("guest"), Some("vault"), Some("open")));
        assert!(fresh.resources().is_empty());
    } // failed_init_keeps_previous_state

} // mod tests
