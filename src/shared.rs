//! Thread-safe access to an `Acl` whose rules may change while it is queried.

use crate::acl::Acl;
use crate::error::Result;
use crate::rule::SharedAssertion;
use log::trace;
use once_cell::sync::Lazy;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// A cloneable handle to an `Acl` behind a read/write lock. Queries share the read lock, rule and
/// registry changes take the write lock. Hand it to every component that needs authorization
/// decisions.
#[derive(Clone, Debug, Default)]
pub struct SharedAcl {
    inner: Arc<RwLock<Acl>>,
} // struct SharedAcl

impl SharedAcl {

    pub fn new(acl: Acl) -> Self {
        SharedAcl{inner: Arc::new(RwLock::new(acl))}
    } // new

    /// Locks the `Acl` for reading. Use this for several queries that must see the same rules.
    pub fn read(&self) -> RwLockReadGuard<'_, Acl> {
        self.inner.read()
    } // read

    /// Locks the `Acl` for a batch of changes.
    pub fn write(&self) -> RwLockWriteGuard<'_, Acl> {
        self.inner.write()
    } // write

    /// Queries the `Acl` under the read lock, see [`Acl::is_allowed`].
    ///
    /// Assertions run while the read lock is held. An assertion must not query this `SharedAcl`
    /// (or the published [`instance`]) again: read locks are not reentrant once a writer waits,
    /// so such a callback deadlocks.
    #[inline]
    pub fn is_allowed(&self, role: Option<&str>, resource: Option<&str>, privilege: Option<&str>) -> bool {
        self.inner.read().is_allowed(role, resource, privilege)
    } // is_allowed

    #[inline]
    pub fn allow(&self, role: Option<&str>, resource: Option<&str>, privileges: &[&str], assertion: Option<SharedAssertion>) -> Result<()> {
        self.inner.write().allow(role, resource, privileges, assertion)
    } // allow

    #[inline]
    pub fn deny(&self, role: Option<&str>, resource: Option<&str>, privileges: &[&str], assertion: Option<SharedAssertion>) -> Result<()> {
        self.inner.write().deny(role, resource, privileges, assertion)
    } // deny

    #[inline]
    pub fn remove_allow(&self, role: Option<&str>, resource: Option<&str>, privileges: &[&str]) -> Result<()> {
        self.inner.write().remove_allow(role, resource, privileges)
    } // remove_allow

    #[inline]
    pub fn remove_deny(&self, role: Option<&str>, resource: Option<&str>, privileges: &[&str]) -> Result<()> {
        self.inner.write().remove_deny(role, resource, privileges)
    } // remove_deny

} // impl SharedAcl

impl From<Acl> for SharedAcl {

    fn from(acl: Acl) -> Self {
        SharedAcl::new(acl)
    } // from

} // impl From<Acl> for SharedAcl


// Instance ///////////////////////////////////////////////////////////////////////////////////////


static INSTANCE: Lazy<RwLock<Option<SharedAcl>>> = Lazy::new(|| RwLock::new(None));

/// Publishes `acl` as the process-wide instance, replacing a previous one. Prefer passing the
/// `SharedAcl` to its users directly; this is meant for the outermost layer of an application.
pub fn set_instance(acl: SharedAcl) {
    trace!("publishing acl instance");
    *INSTANCE.write() = Some(acl);
} // set_instance

/// The process-wide instance, if one was published.
pub fn instance() -> Option<SharedAcl> {
    INSTANCE.read().clone()
} // instance


// Tests //////////////////////////////////////////////////////////////////////////////////////////


#[cfg(test)]
mod tests {

    use super::*;
    use std::thread;
    use test_env_log::test;

    fn setup_shared() -> SharedAcl {
        let mut acl = Acl::new();

        assert!(acl.add_role("guest", &[]).is_ok());
        assert!(acl.add_role("staff", &["guest"]).is_ok());
        assert!(acl.add_resource("news", None).is_ok());
        assert!(acl.allow(Some("guest"), Some("news"), &["view"], None).is_ok());
        SharedAcl::from(acl)
    } // setup_shared

    #[test]
    fn concurrent_queries() {
        let shared  = setup_shared();
        let workers = (0..8).map(|_| {
            let shared = shared.clone();

            thread::spawn(move || {
                (0..100).all(|_| shared.is_allowed(Some("staff"), Some("news"), Some("view")))
            })
        }).collect::<Vec<_>>();

        for worker in workers {
            assert!(worker.join().unwrap());
        } // for
    } // concurrent_queries

    #[test]
    fn live_updates() {
        let shared = setup_shared();
        let reader = shared.clone();

        assert!(!reader.is_allowed(Some("staff"), Some("news"), Some("edit")));
        assert!(shared.allow(Some("staff"), Some("news"), &["edit"], None).is_ok());
        assert!( reader.is_allowed(Some("staff"), Some("news"), Some("edit")));
        assert!(shared.deny(Some("staff"), Some("news"), &["view"], None).is_ok());
        assert!(!reader.is_allowed(Some("staff"), Some("news"), Some("view")));
        assert!(shared.remove_deny(Some("staff"), Some("news"), &["view"]).is_ok());
        assert!(shared.remove_allow(Some("staff"), Some("news"), &["edit"]).is_ok());
        assert!( reader.is_allowed(Some("staff"), Some("news"), Some("view")));
        assert!(!reader.is_allowed(Some("staff"), Some("news"), Some("edit")));

        {
            let mut acl = shared.write();

            assert!(acl.add_resource("latest", Some("news")).is_ok());
            assert!(acl.deny(Some("guest"), Some("latest"), &[], None).is_ok());
        }
        assert!(!reader.is_allowed(Some("staff"), Some("latest"), Some("view")));
        assert_eq!(reader.read().resources(), vec!["latest", "news"]);
    } // live_updates

    #[test]
    fn published_instance() {
        let shared = setup_shared();

        set_instance(shared.clone());

        let published = instance().unwrap();

        assert!(published.is_allowed(Some("guest"), Some("news"), Some("view")));
        assert!(shared.deny(Some("guest"), Some("news"), &["view"], None).is_ok());
        assert!(!published.is_allowed(Some("guest"), Some("news"), Some("view")));
    } // published_instance

} // mod tests
