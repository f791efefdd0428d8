//! The `Acl` facade: role and resource registration, rule definition and access queries.

use crate::error::{Error, Result};
use crate::resource::{Resource, ResourceRegistry};
use crate::role::{Role, RoleRegistry};
use crate::rule::{Operation, Rule, RuleMatrix, RuleType, SharedAssertion};
use log::{debug, trace, warn};
use std::collections::HashSet;
use std::fmt;


// Query //////////////////////////////////////////////////////////////////////////////////////////


/// The parameters of one `is_allowed` call, resolved against the registries. A None value for a
/// parameter declares a wildcard placeholder. Assertions are evaluated against these values.
#[derive(Debug)]
struct Query<'a> {
    role:      Option<&'a Role>,
    resource:  Option<&'a Resource>,
    privilege: Option<&'a str>,
} // struct Query

// Empty ids are wildcards as well.
#[inline]
fn wildcard(id: Option<&str>) -> Option<&str> {
    id.filter(|id| !id.is_empty())
} // wildcard


// Acl ////////////////////////////////////////////////////////////////////////////////////////////


/// Main structure holding the defined roles, resources and rules. Roles and resources are not
/// automatically defined upon rule definition, but must be declared beforehand. A catch-all rule
/// is predefined and denies access. This is like a drop-policy on firewalls.
///
/// Mutating methods take `&mut self`, queries take `&self`. Wrap the `Acl` into a
/// [`SharedAcl`](crate::SharedAcl) if rules have to change while other threads query it.
#[derive(Clone)]
pub struct Acl {
    pub(crate) enabled:   bool,
    pub(crate) priority:  i32,
    roles:                RoleRegistry,
    resources:            ResourceRegistry,
    rules:                RuleMatrix,
} // struct Acl

impl Acl {

    /// Creates a new, enabled `Acl` without roles, resources or rules. Everything is denied.
    pub fn new() -> Self {
        trace!("creating new acl");
        Acl{
            enabled:   true,
            priority:  0,
            roles:     RoleRegistry::new(),
            resources: ResourceRegistry::new(),
            rules:     RuleMatrix::new(),
        } // Acl
    } // new

    /// False if the `Acl` was initialized from a configuration that disabled it.
    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled
    } // enabled

    /// Ordering hint among other process resources, taken from the configuration.
    #[inline]
    pub fn priority(&self) -> i32 {
        self.priority
    } // priority

    // Roles //////////////////////////////////////////////////////////////////////////////////////

    /// Adds a new role inheriting from `parents`. The last parent listed is the first one searched
    /// for rules. Returns an error if the role is already defined or a parent is unknown.
    pub fn add_role(&mut self, role: impl Into<Role>, parents: &[&str]) -> Result<()> {
        self.roles.add(role.into(), parents)
    } // add_role

    /// Returns true if role is defined.
    #[inline]
    pub fn has_role(&self, id: &str) -> bool {
        self.roles.has(id)
    } // has_role

    pub fn role(&self, id: &str) -> Result<Role> {
        self.roles.get(id).map(Role::clone)
    } // role

    /// Returns the parents of a role in the order they were added.
    pub fn role_parents(&self, id: &str) -> Result<Vec<Role>> {
        trace!("getting role parents for: {}", id);
        Ok(self.roles.parents(id)?.into_iter().cloned().collect())
    } // role_parents

    /// Returns true if role `id` inherits from `ancestor`, directly or, unless `only_parents` is
    /// set, through any of its ancestors.
    #[inline]
    pub fn inherits_role(&self, id: &str, ancestor: &str, only_parents: bool) -> bool {
        self.roles.inherits(id, ancestor, only_parents)
    } // inherits_role

    /// Removes a role and every rule that names it.
    pub fn remove_role(&mut self, id: &str) -> Result<()> {
        self.roles.remove(id)?;
        self.rules.purge_role(id);
        Ok(())
    } // remove_role

    /// Removes all roles and every rule that names a specific role.
    pub fn remove_role_all(&mut self) {
        self.roles.remove_all();
        self.rules.purge_roles();
    } // remove_role_all

    /// Ids of all roles, sorted.
    pub fn roles(&self) -> Vec<String> {
        self.roles.all().map(|role| role.id().to_string()).collect()
    } // roles

    // Resources //////////////////////////////////////////////////////////////////////////////////

    /// Adds a new resource. Returns an error if resource is already defined or parent is unknown.
    pub fn add_resource(&mut self, resource: impl Into<Resource>, parent: Option<&str>) -> Result<()> {
        self.resources.add(resource.into(), parent)
    } // add_resource

    /// Returns true if resource is defined.
    #[inline]
    pub fn has(&self, id: &str) -> bool {
        self.resources.has(id)
    } // has

    pub fn get(&self, id: &str) -> Result<Resource> {
        self.resources.get(id).map(Resource::clone)
    } // get

    /// Returns the parent of resource or None. Returns an error if resource is undefined.
    pub fn resource_parent(&self, id: &str) -> Result<Option<Resource>> {
        Ok(self.resources.parent(id)?.cloned())
    } // resource_parent

    /// Returns the ancestors prefixed with the resource. Returns an empty vector if resource is
    /// undefined.
    pub fn resource_lineage(&self, id: &str) -> Vec<String> {
        self.resources.lineage(id).into_iter().map(String::from).collect()
    } // resource_lineage

    /// Returns true if resource `id` descends from `ancestor`. With `only_parent` only the direct
    /// parent is considered.
    #[inline]
    pub fn inherits(&self, id: &str, ancestor: &str, only_parent: bool) -> bool {
        self.resources.inherits(id, ancestor, only_parent)
    } // inherits

    /// Removes a resource, all of its descendants and every rule scoped to any of them.
    pub fn remove(&mut self, id: &str) -> Result<()> {
        for removed in self.resources.remove(id)? {
            self.rules.purge_resource(&removed);
        } // for
        Ok(())
    } // remove

    /// Removes all resources and every rule scoped to a specific resource.
    pub fn remove_all(&mut self) {
        self.resources.remove_all();
        self.rules.purge_resources();
    } // remove_all

    /// Ids of all resources, sorted.
    pub fn resources(&self) -> Vec<String> {
        self.resources.all().map(|resource| resource.id().to_string()).collect()
    } // resources

    // Rules //////////////////////////////////////////////////////////////////////////////////////

    /// Allows `privileges` for role on resource. `None` role or resource and an empty privilege list
    /// are wildcards. Returns an error if role or resource is undefined.
    #[inline]
    pub fn allow(&mut self, role: Option<&str>, resource: Option<&str>, privileges: &[&str], assertion: Option<SharedAssertion>) -> Result<()> {
        self.set_rule(Operation::Add, RuleType::Allow, role, resource, privileges, assertion)
    } // allow

    /// Denies `privileges` for role on resource. `None` role or resource and an empty privilege list
    /// are wildcards. Returns an error if role or resource is undefined.
    #[inline]
    pub fn deny(&mut self, role: Option<&str>, resource: Option<&str>, privileges: &[&str], assertion: Option<SharedAssertion>) -> Result<()> {
        self.set_rule(Operation::Add, RuleType::Deny, role, resource, privileges, assertion)
    } // deny

    #[inline]
    pub fn remove_allow(&mut self, role: Option<&str>, resource: Option<&str>, privileges: &[&str]) -> Result<()> {
        self.set_rule(Operation::Remove, RuleType::Allow, role, resource, privileges, None)
    } // remove_allow

    #[inline]
    pub fn remove_deny(&mut self, role: Option<&str>, resource: Option<&str>, privileges: &[&str]) -> Result<()> {
        self.set_rule(Operation::Remove, RuleType::Deny, role, resource, privileges, None)
    } // remove_deny

    /// Adds or removes rules. `None` (or empty) role and resource ids are wildcards for all roles
    /// and all resources, an empty privilege list addresses the rule for all privileges.
    ///
    /// Removing only touches rules of the given `rule_type`. Removing for all resources clears the
    /// wildcard scope and the matching rules of every registered resource, whereas adding for all
    /// resources only sets the wildcard scope.
    pub fn set_rule(
        &mut self,
        operation:  Operation,
        rule_type:  RuleType,
        role:       Option<&str>,
        resource:   Option<&str>,
        privileges: &[&str],
        assertion:  Option<SharedAssertion>,
    ) -> Result<()> {
        let role       = wildcard(role);
        let resource   = wildcard(resource);
        let privileges = privileges.iter().copied().filter(|p| !p.is_empty()).collect::<Vec<_>>();

        trace!("{} {} rule for {:?} on {:?} to {:?}", operation, rule_type, role, resource, privileges);

        // ensure that role is defined
        if let Some(name) = role {
            if !self.roles.has(name) {
                warn!("missing role while setting rule: {}", name);
                return Err(Error::UnknownRole(name.to_string()));
            } // if
        } // if

        // ensure that resource is defined
        if let Some(name) = resource {
            if !self.resources.has(name) {
                warn!("missing resource while setting rule: {}", name);
                return Err(Error::UnknownResource(name.to_string()));
            } // if
        } // if

        match operation {
            Operation::Add    => {
                self.rules.add(resource, role, &privileges, Rule::new(rule_type, assertion));
            }, // Add
            Operation::Remove => {
                self.rules.remove(resource, role, &privileges, rule_type);
                if resource.is_none() {
                    for name in self.resources.all().map(Resource::id) {
                        self.rules.remove(Some(name), role, &privileges, rule_type);
                    } // for
                } // if
            }, // Remove
        } // match
        Ok(())
    } // set_rule

    // Queries ////////////////////////////////////////////////////////////////////////////////////

    /// Returns true if privilege is allowed for role on resource. A `None` privilege asks for all
    /// privileges at once. Unknown roles and resources are treated like wildcards.
    ///
    /// # Precedence
    ///
    /// The resource and its ancestors are visited from the specific to the general, finishing with
    /// the rules for all resources. On each of them the role and its ancestors are searched depth
    /// first, last added parent first, followed by the rules for all roles. The first applicable
    /// rule decides. If no rule applies the catch-all rule decides.
    pub fn is_allowed(&self, role: Option<&str>, resource: Option<&str>, privilege: Option<&str>) -> bool {
        let query = Query{
            role:      wildcard(role).and_then(|id| self.roles.get(id).ok()),
            resource:  wildcard(resource).and_then(|id| self.resources.get(id).ok()),
            privilege: wildcard(privilege),
        }; // Query

        trace!("querying {:?}", query);

        let allowed = self.resolve(&query);

        debug!("{} {:?} on {:?} to {:?}", if allowed { "allowing" } else { "denying" }, role, resource, privilege);
        allowed
    } // is_allowed

    /// Returns true if privilege is denied for role on resource.
    #[inline]
    pub fn is_denied(&self, role: Option<&str>, resource: Option<&str>, privilege: Option<&str>) -> bool {
        !self.is_allowed(role, resource, privilege)
    } // is_denied

    fn resolve(&self, query: &Query<'_>) -> bool {
        let mut scopes: Vec<Option<&str>> = match query.resource {
            Some(resource) => self.resources.lineage(resource.id()).into_iter().map(Some).collect(),
            None           => vec![],
        }; // match

        // wildcard resource
        scopes.push(None);

        for scope in scopes {
            let decision = match query.privilege {
                Some(privilege) => self.decide_privilege(query, scope, privilege),
                None            => self.decide_all_privileges(query, scope),
            }; // match

            if let Some(allowed) = decision {
                return allowed;
            } // if
        } // for

        // the catch-all rule always decides, this is not reached
        false
    } // resolve

    fn decide_privilege(&self, query: &Query<'_>, resource: Option<&str>, privilege: &str) -> Option<bool> {
        // specific roles in lineage
        if let Some(role) = query.role {
            let found = self.role_dfs(role.id(), |name| self.visit_privilege(query, resource, Some(name), privilege));

            if found.is_some() {
                return found;
            } // if
        } // if
        // wildcard role
        self.visit_privilege(query, resource, None, privilege)
    } // decide_privilege

    fn decide_all_privileges(&self, query: &Query<'_>, resource: Option<&str>) -> Option<bool> {
        // specific roles in lineage
        if let Some(role) = query.role {
            let found = self.role_dfs(role.id(), |name| self.visit_all_privileges(query, resource, Some(name)));

            if found.is_some() {
                return found;
            } // if
        } // if
        // wildcard role
        self.visit_all_privileges(query, resource, None)
    } // decide_all_privileges

    /// Depth first search over the role and its ancestors. Parents are pushed in the order they
    /// were added, so the last added parent and all of its ancestors are visited before the next
    /// one. Roles reachable on several paths are visited once.
    fn role_dfs<'a, F>(&'a self, role: &'a str, mut visit: F) -> Option<bool>
    where
        F: FnMut(&str) -> Option<bool>
    {
        let mut visited = HashSet::new();
        let mut stack   = vec![role];

        while let Some(name) = stack.pop() {
            if !visited.insert(name) {
                continue;
            } // if
            if let Some(allowed) = visit(name) {
                trace!("    matched rule of role {}", name);
                return Some(allowed);
            } // if
            stack.extend(self.roles.parent_ids(name).iter().map(String::as_str));
        } // while
        None
    } // role_dfs

    fn visit_privilege(&self, query: &Query<'_>, resource: Option<&str>, role: Option<&str>, privilege: &str) -> Option<bool> {
        self.rule_type(query, resource, role, Some(privilege))
            .or_else(|| self.rule_type(query, resource, role, None))
            .map(|rule_type| rule_type == RuleType::Allow)
    } // visit_privilege

    // A single denied privilege denies the whole query before the rule for all privileges is
    // considered.
    fn visit_all_privileges(&self, query: &Query<'_>, resource: Option<&str>, role: Option<&str>) -> Option<bool> {
        let rules = self.rules.get(resource, role)?;

        if rules.privileges().any(|p| self.rule_type(query, resource, role, Some(p)) == Some(RuleType::Deny)) {
            return Some(false);
        } // if
        self.rule_type(query, resource, role, None)
            .map(|rule_type| rule_type == RuleType::Allow)
    } // visit_all_privileges

    /// The type of the rule stored for exactly these parameters, if it exists and its assertion
    /// holds. A failing assertion on the catch-all rule inverts its type instead.
    fn rule_type(&self, query: &Query<'_>, resource: Option<&str>, role: Option<&str>, privilege: Option<&str>) -> Option<RuleType> {
        let rule = self.rules.get(resource, role)?.get(privilege)?;

        if rule.holds(query.role, query.resource, query.privilege) {
            return Some(rule.rule_type());
        } // if
        if resource.is_some() || role.is_some() || privilege.is_some() {
            return None;
        } // if
        Some(rule.rule_type().inverse())
    } // rule_type

} // impl Acl

impl Default for Acl {

    fn default() -> Self {
        Acl::new()
    } // default

} // impl Default for Acl

impl fmt::Debug for Acl {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Acl")
            .field("enabled", &self.enabled)
            .field("priority", &self.priority)
            .field("roles", &self.roles)
            .field("resources", &self.resources)
            .field("rules", &self.rules)
            .finish()
    } // fmt

} // impl fmt::Debug for Acl


// Tests //////////////////////////////////////////////////////////////////////////////////////////


// mod tests
