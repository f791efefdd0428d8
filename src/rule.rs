//! Rules and the matrix they are stored in.
//!
//! The matrix is nested by resource, then role, then privilege. On every level a wildcard entry
//! (`None`) stands for all resources, all roles or all privileges respectively. The entry for all
//! resources, all roles and all privileges always exists and denies access unless changed.

use crate::error::Error;
use crate::resource::Resource;
use crate::role::Role;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;


// Helper types ///////////////////////////////////////////////////////////////////////////////////


/// Allow or deny access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RuleType {
    Allow,
    Deny
} // enum RuleType

impl RuleType {

    /// The type with the opposite effect.
    pub fn inverse(self) -> Self {
        match self {
            RuleType::Allow => RuleType::Deny,
            RuleType::Deny  => RuleType::Allow,
        } // match
    } // inverse

} // impl RuleType

impl FromStr for RuleType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(RuleType::Allow),
            "deny"  => Ok(RuleType::Deny),
            _       => Err(Error::InvalidRuleType(s.to_string())),
        } // match
    } // from_str

} // impl FromStr for RuleType

impl fmt::Display for RuleType {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleType::Allow => f.write_str("allow"),
            RuleType::Deny  => f.write_str("deny"),
        } // match
    } // fmt

} // impl fmt::Display for RuleType

/// Whether `Acl::set_rule` installs or removes rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Remove
} // enum Operation

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add"    => Ok(Operation::Add),
            "remove" => Ok(Operation::Remove),
            _        => Err(Error::InvalidOperation(s.to_string())),
        } // match
    } // from_str

} // impl FromStr for Operation

impl fmt::Display for Operation {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Add    => f.write_str("add"),
            Operation::Remove => f.write_str("remove"),
        } // match
    } // fmt

} // impl fmt::Display for Operation


// Assertion //////////////////////////////////////////////////////////////////////////////////////


/// A condition attached to a rule. The rule only applies while the assertion holds for the queried
/// role, resource and privilege. `None` arguments stand for the respective wildcard.
pub trait Assertion: Send + Sync {

    fn assert(&self, role: Option<&Role>, resource: Option<&Resource>, privilege: Option<&str>) -> bool;

} // trait Assertion

impl<F> Assertion for F
where
    F: Fn(Option<&Role>, Option<&Resource>, Option<&str>) -> bool + Send + Sync
{

    fn assert(&self, role: Option<&Role>, resource: Option<&Resource>, privilege: Option<&str>) -> bool {
        self(role, resource, privilege)
    } // assert

} // impl Assertion for Fn

/// Assertions are shared between every rule they were installed with.
pub type SharedAssertion = Arc<dyn Assertion>;

/// Wraps a closure into a `SharedAssertion`.
pub fn assertion<F>(f: F) -> SharedAssertion
where
    F: Fn(Option<&Role>, Option<&Resource>, Option<&str>) -> bool + Send + Sync + 'static
{
    Arc::new(f)
} // assertion


// Rule ///////////////////////////////////////////////////////////////////////////////////////////


/// Defines if a privilege is allowed or denied for a role on a resource, optionally bound to an
/// assertion.
#[derive(Clone)]
pub struct Rule {
    rule_type: RuleType,
    assertion: Option<SharedAssertion>,
} // struct Rule

impl Rule {

    pub fn new(rule_type: RuleType, assertion: Option<SharedAssertion>) -> Self {
        Rule{rule_type, assertion}
    } // new

    #[inline]
    pub fn rule_type(&self) -> RuleType {
        self.rule_type
    } // rule_type

    #[inline]
    pub fn has_assertion(&self) -> bool {
        self.assertion.is_some()
    } // has_assertion

    /// True if the rule has no assertion or its assertion holds.
    pub fn holds(&self, role: Option<&Role>, resource: Option<&Resource>, privilege: Option<&str>) -> bool {
        match &self.assertion {
            Some(assertion) => assertion.assert(role, resource, privilege),
            None            => true,
        } // match
    } // holds

} // impl Rule

impl fmt::Debug for Rule {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("rule_type", &self.rule_type)
            .field("assertion", &self.assertion.is_some())
            .finish()
    } // fmt

} // impl fmt::Debug for Rule


// RuleMatrix /////////////////////////////////////////////////////////////////////////////////////


/// The rules of one (resource, role) scope.
#[derive(Clone, Debug, Default)]
pub(crate) struct PrivilegeRules {
    all_privileges: Option<Rule>,
    by_privilege:   HashMap<String, Rule>,
} // struct PrivilegeRules

impl PrivilegeRules {

    /// `None` selects the rule for all privileges.
    pub(crate) fn get(&self, privilege: Option<&str>) -> Option<&Rule> {
        match privilege {
            Some(name) => self.by_privilege.get(name),
            None       => self.all_privileges.as_ref(),
        } // match
    } // get

    /// Names of all privileges with a dedicated rule.
    pub(crate) fn privileges(&self) -> impl Iterator<Item = &str> + '_ {
        self.by_privilege.keys().map(String::as_str)
    } // privileges

    fn set(&mut self, privilege: Option<&str>, rule: Rule) {
        match privilege {
            Some(name) => { self.by_privilege.insert(name.to_string(), rule); },
            None       => self.all_privileges = Some(rule),
        } // match
    } // set

    // removes only if the stored rule is of the given type
    fn remove(&mut self, privilege: Option<&str>, rule_type: RuleType) -> bool {
        let matches = self.get(privilege).map_or(false, |rule| rule.rule_type == rule_type);

        if matches {
            match privilege {
                Some(name) => { self.by_privilege.remove(name); },
                None       => self.all_privileges = None,
            } // match
        } // if
        matches
    } // remove

} // impl PrivilegeRules

/// The rules of one resource scope, split by role.
#[derive(Clone, Debug, Default)]
struct RoleRules {
    all_roles: Option<PrivilegeRules>,
    by_role:   HashMap<String, PrivilegeRules>,
} // struct RoleRules

impl RoleRules {

    fn get(&self, role: Option<&str>) -> Option<&PrivilegeRules> {
        match role {
            Some(name) => self.by_role.get(name),
            None       => self.all_roles.as_ref(),
        } // match
    } // get

    fn get_mut(&mut self, role: Option<&str>) -> Option<&mut PrivilegeRules> {
        match role {
            Some(name) => self.by_role.get_mut(name),
            None       => self.all_roles.as_mut(),
        } // match
    } // get_mut

    fn get_or_create(&mut self, role: Option<&str>) -> &mut PrivilegeRules {
        match role {
            Some(name) => self.by_role.entry(name.to_string()).or_default(),
            None       => self.all_roles.get_or_insert_with(PrivilegeRules::default),
        } // match
    } // get_or_create

} // impl RoleRules

/// All rules of an `Acl`. Containers are created lazily when the first rule for a (resource, role)
/// pair is added.
#[derive(Clone, Debug)]
pub(crate) struct RuleMatrix {
    all_resources: RoleRules,
    by_resource:   HashMap<String, RoleRules>,
} // struct RuleMatrix

impl RuleMatrix {

    pub(crate) fn new() -> Self {
        let mut matrix = RuleMatrix{
            all_resources: RoleRules::default(),
            by_resource:   HashMap::new(),
        }; // RuleMatrix

        matrix.get_or_create(None, None).set(None, Self::catch_all());
        matrix
    } // new

    /// The built-in catch-all rule: deny everything to everyone.
    fn catch_all() -> Rule {
        Rule::new(RuleType::Deny, None)
    } // catch_all

    pub(crate) fn get(&self, resource: Option<&str>, role: Option<&str>) -> Option<&PrivilegeRules> {
        match resource {
            Some(name) => self.by_resource.get(name)?.get(role),
            None       => self.all_resources.get(role),
        } // match
    } // get

    fn get_mut(&mut self, resource: Option<&str>, role: Option<&str>) -> Option<&mut PrivilegeRules> {
        match resource {
            Some(name) => self.by_resource.get_mut(name)?.get_mut(role),
            None       => self.all_resources.get_mut(role),
        } // match
    } // get_mut

    fn get_or_create(&mut self, resource: Option<&str>, role: Option<&str>) -> &mut PrivilegeRules {
        let scope = match resource {
            Some(name) => self.by_resource.entry(name.to_string()).or_default(),
            None       => &mut self.all_resources,
        }; // match

        scope.get_or_create(role)
    } // get_or_create

    /// Sets `rule` for every privilege in `privileges`, or for all privileges if it is empty.
    pub(crate) fn add(&mut self, resource: Option<&str>, role: Option<&str>, privileges: &[&str], rule: Rule) {
        let rules = self.get_or_create(resource, role);

        if privileges.is_empty() {
            rules.set(None, rule);
        } else {
            for &privilege in privileges {
                rules.set(Some(privilege), rule.clone());
            } // for
        } // else
    } // add

    /// Removes the rules of type `rule_type` for every privilege in `privileges`, or the rule for
    /// all privileges if it is empty. Rules of the other type are kept. Removing the catch-all rule
    /// restores the default.
    pub(crate) fn remove(&mut self, resource: Option<&str>, role: Option<&str>, privileges: &[&str], rule_type: RuleType) {
        let is_default = resource.is_none() && role.is_none() && privileges.is_empty();
        let rules      = match self.get_mut(resource, role) {
            Some(rules) => rules,
            None        => return,
        }; // match

        if privileges.is_empty() {
            if rules.remove(None, rule_type) && is_default {
                rules.set(None, Self::catch_all());
            } // if
        } else {
            for &privilege in privileges {
                rules.remove(Some(privilege), rule_type);
            } // for
        } // else
    } // remove

    /// Drops every rule scoped to the resource.
    pub(crate) fn purge_resource(&mut self, resource: &str) {
        self.by_resource.remove(resource);
    } // purge_resource

    /// Drops every rule scoped to a specific resource, keeping the rules for all resources.
    pub(crate) fn purge_resources(&mut self) {
        self.by_resource.clear();
    } // purge_resources

    /// Drops every rule scoped to the role on any resource.
    pub(crate) fn purge_role(&mut self, role: &str) {
        self.all_resources.by_role.remove(role);
        for scope in self.by_resource.values_mut() {
            scope.by_role.remove(role);
        } // for
    } // purge_role

    /// Drops every rule scoped to a specific role, keeping the rules for all roles.
    pub(crate) fn purge_roles(&mut self) {
        self.all_resources.by_role.clear();
        for scope in self.by_resource.values_mut() {
            scope.by_role.clear();
        } // for
    } // purge_roles

} // impl RuleMatrix


// Tests //////////////////////////////////////////////////////////////////////////////////////////


#[cfg(test)]
mod tests {

    use super::*;
    use test_env_log::test;

    fn rule_type(matrix: &RuleMatrix, resource: Option<&str>, role: Option<&str>, privilege: Option<&str>) -> Option<RuleType> {
        matrix.get(resource, role)?.get(privilege).map(Rule::rule_type)
    } // rule_type

    #[test]
    fn parse() {
        assert_eq!("allow".parse::<RuleType>(), Ok(RuleType::Allow));
        assert_eq!(" DENY ".parse::<RuleType>(), Ok(RuleType::Deny));
        assert_eq!("grant".parse::<RuleType>(), Err(Error::InvalidRuleType(String::from("grant"))));
        assert_eq!("Remove".parse::<Operation>(), Ok(Operation::Remove));
        assert_eq!("merge".parse::<Operation>(), Err(Error::InvalidOperation(String::from("merge"))));
        assert_eq!(RuleType::Allow.to_string(), "allow");
        assert_eq!(RuleType::Allow.inverse(), RuleType::Deny);
        assert_eq!(Operation::Add.to_string(), "add");
    } // parse

    #[test]
    fn assertions() {
        let guest_only = Rule::new(RuleType::Allow, Some(assertion(|role, _, _| {
            role.map_or(false, |role| role.id() == "guest")
        })));

        assert!(guest_only.has_assertion());
        assert!( guest_only.holds(Some(&Role::new("guest")), None, Some("view")));
        assert!(!guest_only.holds(Some(&Role::new("staff")), None, Some("view")));
        assert!(!guest_only.holds(None, None, None));
        assert!(Rule::new(RuleType::Deny, None).holds(None, None, None));
        assert_eq!(format!("{:?}", guest_only), "Rule { rule_type: Allow, assertion: true }");
    } // assertions

    #[test]
    fn defaults() {
        let matrix = RuleMatrix::new();

        assert_eq!(rule_type(&matrix, None, None, None), Some(RuleType::Deny));
        assert_eq!(rule_type(&matrix, None, None, Some("view")), None);
        assert_eq!(rule_type(&matrix, Some("news"), None, None), None);
        assert!(matrix.get(None, Some("guest")).is_none());
    } // defaults

    #[test]
    fn add_and_remove() {
        let mut matrix = RuleMatrix::new();

        matrix.add(Some("news"), Some("staff"), &[], Rule::new(RuleType::Allow, None));
        matrix.add(Some("news"), Some("staff"), &["revise", "delete"], Rule::new(RuleType::Deny, None));

        assert_eq!(rule_type(&matrix, Some("news"), Some("staff"), None), Some(RuleType::Allow));
        assert_eq!(rule_type(&matrix, Some("news"), Some("staff"), Some("revise")), Some(RuleType::Deny));

        let mut privileges: Vec<&str> = matrix.get(Some("news"), Some("staff")).unwrap().privileges().collect();

        privileges.sort();
        assert_eq!(privileges, vec!["delete", "revise"]);

        // removing allow rules keeps the deny rules
        matrix.remove(Some("news"), Some("staff"), &["revise"], RuleType::Allow);
        assert_eq!(rule_type(&matrix, Some("news"), Some("staff"), Some("revise")), Some(RuleType::Deny));
        matrix.remove(Some("news"), Some("staff"), &["revise"], RuleType::Deny);
        assert_eq!(rule_type(&matrix, Some("news"), Some("staff"), Some("revise")), None);
        matrix.remove(Some("news"), Some("staff"), &[], RuleType::Deny);
        assert_eq!(rule_type(&matrix, Some("news"), Some("staff"), None), Some(RuleType::Allow));
        matrix.remove(Some("news"), Some("staff"), &[], RuleType::Allow);
        assert_eq!(rule_type(&matrix, Some("news"), Some("staff"), None), None);

        // nothing to remove
        matrix.remove(Some("blog"), None, &[], RuleType::Allow);
        assert!(matrix.get(Some("blog"), None).is_none());
    } // add_and_remove

    #[test]
    fn default_reset() {
        let mut matrix = RuleMatrix::new();

        matrix.add(None, None, &[], Rule::new(RuleType::Allow, None));
        matrix.add(None, None, &["view"], Rule::new(RuleType::Allow, None));
        assert_eq!(rule_type(&matrix, None, None, None), Some(RuleType::Allow));
        matrix.remove(None, None, &[], RuleType::Deny);
        assert_eq!(rule_type(&matrix, None, None, None), Some(RuleType::Allow));
        matrix.remove(None, None, &[], RuleType::Allow);
        assert_eq!(rule_type(&matrix, None, None, None), Some(RuleType::Deny));
        assert_eq!(rule_type(&matrix, None, None, Some("view")), Some(RuleType::Allow));
    } // default_reset

    #[test]
    fn purge() {
        let mut matrix = RuleMatrix::new();

        matrix.add(None, Some("staff"), &["edit"], Rule::new(RuleType::Allow, None));
        matrix.add(Some("news"), Some("staff"), &[], Rule::new(RuleType::Allow, None));
        matrix.add(Some("news"), None, &["view"], Rule::new(RuleType::Allow, None));
        matrix.add(Some("latest"), Some("guest"), &[], Rule::new(RuleType::Deny, None));

        matrix.purge_role("staff");
        assert!(matrix.get(None, Some("staff")).is_none());
        assert!(matrix.get(Some("news"), Some("staff")).is_none());
        assert!(matrix.get(Some("news"), None).is_some());

        matrix.purge_resource("news");
        assert!(matrix.get(Some("news"), None).is_none());
        assert!(matrix.get(Some("latest"), Some("guest")).is_some());

        matrix.purge_roles();
        assert!(matrix.get(Some("latest"), Some("guest")).is_none());

        matrix.add(Some("latest"), None, &[], Rule::new(RuleType::Deny, None));
        matrix.purge_resources();
        assert!(matrix.get(Some("latest"), None).is_none());
        assert_eq!(rule_type(&matrix, None, None, None), Some(RuleType::Deny));
    } // purge

} // mod tests
