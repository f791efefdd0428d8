//! Resources and the tree they are organized in.

use crate::error::{Error, Result};
use log::{trace, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;


// Resource ///////////////////////////////////////////////////////////////////////////////////////


/// An object to which access is controlled. A resource is identified by its id only.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Resource {
    id: String,
} // struct Resource

impl Resource {

    pub fn new(id: impl Into<String>) -> Self {
        Resource{id: id.into()}
    } // new

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    } // id

} // impl Resource

impl From<&str> for Resource {

    fn from(id: &str) -> Self {
        Resource::new(id)
    } // from

} // impl From<&str> for Resource

impl From<String> for Resource {

    fn from(id: String) -> Self {
        Resource::new(id)
    } // from

} // impl From<String> for Resource

impl fmt::Display for Resource {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    } // fmt

} // impl fmt::Display for Resource


// ResourceRegistry ///////////////////////////////////////////////////////////////////////////////


#[derive(Clone, Debug)]
struct ResourceNode {
    resource: Resource,
    parent:   Option<String>,
    children: BTreeSet<String>,
} // struct ResourceNode

/// Owns all resources. Every resource has at most one parent, assigned when it is added, so the
/// resources form a forest. The `Acl` embeds this registry and purges rules of removed resources.
#[derive(Clone, Debug, Default)]
pub struct ResourceRegistry {
    nodes: BTreeMap<String, ResourceNode>,
} // struct ResourceRegistry

impl ResourceRegistry {

    pub fn new() -> Self {
        ResourceRegistry{nodes: BTreeMap::new()}
    } // new

    /// Adds a new resource. Returns an error if resource is already defined or parent is unknown.
    pub fn add(&mut self, resource: Resource, parent: Option<&str>) -> Result<()> {
        trace!("adding resource {} with parent {:?}", resource, parent);
        if self.nodes.contains_key(resource.id()) {
            warn!("adding duplicate resource: {}", resource);
            return Err(Error::DuplicateResource(resource.id().to_string()));
        } // if
        if let Some(name) = parent {
            match self.nodes.get_mut(name) {
                Some(node) => { node.children.insert(resource.id().to_string()); },
                None       => {
                    warn!("missing parent {} for new resource: {}", name, resource);
                    return Err(Error::UnknownParent(name.to_string()));
                }, // None
            } // match
        } // if

        let id = resource.id().to_string();

        self.nodes.insert(id, ResourceNode{
            resource,
            parent:   parent.map(String::from),
            children: BTreeSet::new(),
        });
        Ok(())
    } // add

    #[inline]
    pub fn has(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    } // has

    pub fn get(&self, id: &str) -> Result<&Resource> {
        self.nodes.get(id)
            .map(|node| &node.resource)
            .ok_or_else(|| Error::UnknownResource(id.to_string()))
    } // get

    #[inline]
    pub fn count(&self) -> usize {
        self.nodes.len()
    } // count

    /// All registered resources, ordered by id.
    pub fn all(&self) -> impl Iterator<Item = &Resource> + '_ {
        self.nodes.values().map(|node| &node.resource)
    } // all

    /// Returns the parent of resource or None. Returns an error if resource is undefined.
    pub fn parent(&self, id: &str) -> Result<Option<&Resource>> {
        trace!("getting resource parent for: {}", id);
        match self.nodes.get(id) {
            Some(node) => Ok(node.parent.as_ref()
                .and_then(|parent| self.nodes.get(parent))
                .map(|parent| &parent.resource)),
            None       => {
                warn!("missing resource while getting parent: {}", id);
                Err(Error::UnknownResource(id.to_string()))
            }, // None
        } // match
    } // parent

    /// Returns the ancestors prefixed with the resource. Returns an empty vector if resource is
    /// undefined.
    pub fn lineage(&self, id: &str) -> Vec<&str> {
        trace!("getting resource lineage for: {}", id);
        let mut lineage = vec![];
        let mut next    = self.nodes.get_key_value(id);

        while let Some((name, node)) = next {
            lineage.push(name.as_str());
            next = node.parent.as_ref().and_then(|parent| self.nodes.get_key_value(parent));
        } // while
        lineage
    } // lineage

    /// Returns true if `ancestor` is the parent of `id` or, unless `only_parent` is set, any
    /// resource further up its chain.
    pub fn inherits(&self, id: &str, ancestor: &str, only_parent: bool) -> bool {
        trace!("checking if resource {} inherits from {} (only parent: {})", id, ancestor, only_parent);
        let lineage = self.lineage(id);
        let ancestors = lineage.iter().skip(1);

        if only_parent {
            ancestors.take(1).any(|&name| name == ancestor)
        } else {
            ancestors.copied().any(|name| name == ancestor)
        } // else
    } // inherits

    /// Removes a resource together with all of its descendants. Returns the ids of every removed
    /// resource, descendants before their parents.
    pub fn remove(&mut self, id: &str) -> Result<Vec<String>> {
        trace!("removing resource {}", id);
        let parent = match self.nodes.get(id) {
            Some(node) => node.parent.clone(),
            None       => {
                warn!("missing resource while removing: {}", id);
                return Err(Error::UnknownResource(id.to_string()));
            }, // None
        }; // match

        if let Some(parent) = parent {
            if let Some(node) = self.nodes.get_mut(&parent) {
                node.children.remove(id);
            } // if
        } // if

        Ok(self.remove_subtree(id))
    } // remove

    // descendants before their parents
    fn remove_subtree(&mut self, id: &str) -> Vec<String> {
        let mut removed = vec![];
        let mut pending = vec![id.to_string()];

        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                pending.extend(node.children);
                removed.push(next);
            } // if
        } // while
        removed.reverse();
        removed
    } // remove_subtree

    pub fn remove_all(&mut self) {
        trace!("removing all resources");
        self.nodes.clear();
    } // remove_all

} // impl ResourceRegistry


// Tests //////////////////////////////////////////////////////////////////////////////////////////


#[cfg(test)]
mod tests {

    use super::*;
    use test_env_log::test;

    fn setup_registry() -> ResourceRegistry {
        let mut reg = ResourceRegistry::new();

        assert!(reg.add(Resource::new("newsletter"), None).is_ok());
        assert!(reg.add(Resource::new("news"), None).is_ok());
        assert!(reg.add(Resource::new("latest"), Some("news")).is_ok());
        assert!(reg.add(Resource::new("anouncement"), Some("news")).is_ok());
        assert!(reg.add(Resource::new("breaking"), Some("latest")).is_ok());
        reg
    } // setup_registry

    #[test]
    fn add() {
        let mut reg = setup_registry();

        assert_eq!(reg.count(), 5);
        assert!(reg.has("latest"));
        assert_eq!(reg.get("latest").map(Resource::id), Ok("latest"));
        assert_eq!(reg.get("blog"), Err(Error::UnknownResource(String::from("blog"))));
        assert_eq!(reg.add(Resource::new("news"), None), Err(Error::DuplicateResource(String::from("news"))));
        assert_eq!(reg.add(Resource::new("blog"), Some("site")), Err(Error::UnknownParent(String::from("site"))));
        assert!(!reg.has("blog"));
    } // add

    #[test]
    fn lineage() {
        let reg = setup_registry();

        assert_eq!(reg.lineage("blog"), Vec::<&str>::new());
        assert_eq!(reg.lineage("news"), vec!["news"]);
        assert_eq!(reg.lineage("breaking"), vec!["breaking", "latest", "news"]);
        assert_eq!(reg.parent("breaking").unwrap().map(Resource::id), Some("latest"));
        assert_eq!(reg.parent("news").unwrap(), None);
        assert!(reg.parent("blog").is_err());
    } // lineage

    #[test]
    fn inherits() {
        let reg = setup_registry();

        assert!( reg.inherits("latest", "news", true));
        assert!(!reg.inherits("breaking", "news", true));
        assert!( reg.inherits("breaking", "news", false));
        assert!(!reg.inherits("news", "latest", false));
        assert!(!reg.inherits("news", "news", false));
        assert!(!reg.inherits("blog", "news", false));
    } // inherits

    #[test]
    fn remove() {
        let mut reg = setup_registry();

        assert_eq!(reg.remove("latest"), Ok(vec![String::from("breaking"), String::from("latest")]));
        assert!(!reg.has("latest"));
        assert!(!reg.has("breaking"));
        assert!(reg.has("anouncement"));
        assert_eq!(reg.remove("latest"), Err(Error::UnknownResource(String::from("latest"))));

        // parent lost the child link, re-adding works
        assert!(reg.add(Resource::new("latest"), Some("news")).is_ok());
        assert_eq!(reg.remove("news").map(|ids| ids.len()), Ok(3));
        assert_eq!(reg.all().map(Resource::id).collect::<Vec<_>>(), vec!["newsletter"]);

        reg.remove_all();
        assert_eq!(reg.count(), 0);
    } // remove

    #[test]
    fn deep_chain() {
        let mut reg = ResourceRegistry::new();

        assert!(reg.add(Resource::new("r0"), None).is_ok());
        for i in 1..100_000 {
            let parent = format!("r{}", i - 1);

            assert!(reg.add(Resource::new(format!("r{}", i)), Some(parent.as_str())).is_ok());
        } // for

        assert!(reg.inherits("r99999", "r0", false));
        assert_eq!(reg.lineage("r99999").len(), 100_000);

        let removed = reg.remove("r0").unwrap();

        assert_eq!(removed.len(), 100_000);
        assert_eq!(removed.first().map(String::as_str), Some("r99999"));
        assert_eq!(removed.last().map(String::as_str), Some("r0"));
        assert_eq!(reg.count(), 0);
    } // deep_chain

} // mod tests
