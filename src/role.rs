//! Roles and the registry keeping their multiple inheritance.
//!
//! A role may inherit from any number of previously registered roles. The parents of a role are
//! kept in the order they were given: the last parent listed is the first one searched when the
//! `Acl` resolves a query (LIFO order, see the crate documentation).

use crate::error::{Error, Result};
use log::{trace, warn};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;


// Role ///////////////////////////////////////////////////////////////////////////////////////////


/// An object that may request access to a resource. A role is identified by its id only.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Role {
    id: String,
} // struct Role

impl Role {

    pub fn new(id: impl Into<String>) -> Self {
        Role{id: id.into()}
    } // new

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    } // id

} // impl Role

impl From<&str> for Role {

    fn from(id: &str) -> Self {
        Role::new(id)
    } // from

} // impl From<&str> for Role

impl From<String> for Role {

    fn from(id: String) -> Self {
        Role::new(id)
    } // from

} // impl From<String> for Role

impl fmt::Display for Role {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    } // fmt

} // impl fmt::Display for Role


// RoleRegistry ///////////////////////////////////////////////////////////////////////////////////


#[derive(Clone, Debug)]
struct RoleNode {
    role:     Role,
    // insertion order, the last entry has the highest search priority
    parents:  Vec<String>,
    children: BTreeSet<String>,
} // struct RoleNode

/// Owns all roles and the inheritance edges between them. Links are stored as ids and resolved
/// through the registry, so the registry is the single owner of every node.
#[derive(Clone, Debug, Default)]
pub struct RoleRegistry {
    nodes: BTreeMap<String, RoleNode>,
} // struct RoleRegistry

impl RoleRegistry {

    pub fn new() -> Self {
        RoleRegistry{nodes: BTreeMap::new()}
    } // new

    /// Adds a role inheriting from `parents`. Every parent must already be registered, which keeps
    /// the inheritance graph acyclic. A parent listed twice keeps its first position.
    pub fn add(&mut self, role: Role, parents: &[&str]) -> Result<()> {
        trace!("adding role {} with parents {:?}", role, parents);
        if self.nodes.contains_key(role.id()) {
            warn!("adding duplicate role: {}", role);
            return Err(Error::DuplicateRole(role.id().to_string()));
        } // if

        let mut ordered: Vec<String> = Vec::with_capacity(parents.len());

        for &parent in parents {
            if !self.nodes.contains_key(parent) {
                warn!("missing parent {} for new role: {}", parent, role);
                return Err(Error::UnknownParent(parent.to_string()));
            } // if
            if !ordered.iter().any(|p| p == parent) {
                ordered.push(parent.to_string());
            } // if
        } // for

        for parent in &ordered {
            if let Some(node) = self.nodes.get_mut(parent) {
                node.children.insert(role.id().to_string());
            } // if
        } // for
        self.nodes.insert(role.id().to_string(), RoleNode{role, parents: ordered, children: BTreeSet::new()});
        Ok(())
    } // add

    #[inline]
    pub fn has(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    } // has

    pub fn get(&self, id: &str) -> Result<&Role> {
        self.nodes.get(id)
            .map(|node| &node.role)
            .ok_or_else(|| Error::UnknownRole(id.to_string()))
    } // get

    #[inline]
    pub fn count(&self) -> usize {
        self.nodes.len()
    } // count

    /// All registered roles, ordered by id.
    pub fn all(&self) -> impl Iterator<Item = &Role> + '_ {
        self.nodes.values().map(|node| &node.role)
    } // all

    /// Returns the parents of a role in the order they were added.
    pub fn parents(&self, id: &str) -> Result<Vec<&Role>> {
        let node = self.nodes.get(id).ok_or_else(|| Error::UnknownRole(id.to_string()))?;

        Ok(node.parents.iter()
            .filter_map(|parent| self.nodes.get(parent))
            .map(|parent| &parent.role)
            .collect())
    } // parents

    /// Parent ids of a role in insertion order. Empty if the role is unknown.
    pub(crate) fn parent_ids(&self, id: &str) -> &[String] {
        match self.nodes.get(id) {
            Some(node) => node.parents.as_slice(),
            None       => &[],
        } // match
    } // parent_ids

    /// Returns true if `id` inherits from `ancestor`. With `only_parents` only the direct parents
    /// are considered, otherwise the whole ancestry. Unknown roles never inherit.
    pub fn inherits(&self, id: &str, ancestor: &str, only_parents: bool) -> bool {
        trace!("checking if role {} inherits from {} (only parents: {})", id, ancestor, only_parents);
        let node = match self.nodes.get(id) {
            Some(node) => node,
            None       => return false,
        }; // match

        if node.parents.iter().any(|p| p == ancestor) {
            return true;
        } // if
        if only_parents {
            return false;
        } // if

        let mut seen    = HashSet::new();
        let mut pending = node.parents.iter().map(String::as_str).collect::<Vec<_>>();

        while let Some(parent) = pending.pop() {
            if parent == ancestor {
                return true;
            } // if
            if !seen.insert(parent) {
                continue;
            } // if
            if let Some(next) = self.nodes.get(parent) {
                pending.extend(next.parents.iter().map(String::as_str));
            } // if
        } // while
        false
    } // inherits

    /// Removes a role and unlinks it from its parents and children. The remaining parents of a
    /// child keep their relative order.
    pub fn remove(&mut self, id: &str) -> Result<Role> {
        trace!("removing role {}", id);
        let node = match self.nodes.remove(id) {
            Some(node) => node,
            None       => {
                warn!("missing role while removing: {}", id);
                return Err(Error::UnknownRole(id.to_string()));
            }, // None
        }; // match

        for parent in &node.parents {
            if let Some(parent) = self.nodes.get_mut(parent) {
                parent.children.remove(id);
            } // if
        } // for
        for child in &node.children {
            if let Some(child) = self.nodes.get_mut(child) {
                child.parents.retain(|p| p != id);
            } // if
        } // for
        Ok(node.role)
    } // remove

    pub fn remove_all(&mut self) {
        trace!("removing all roles");
        self.nodes.clear();
    } // remove_all

} // impl RoleRegistry


// Tests //////////////////////////////////////////////////////////////////////////////////////////


// mod tests
