//! Role/resource access control list (ACL) with multiple role inheritance, a resource tree and
//! assertion-gated rules.
//!
//! This follows the model of [laminas-permissions-acl](https://docs.laminas.dev/laminas-permissions-acl/usage/).
//! Parts of the following documentation are an adoption of the original documentation of
//! *"Laminas\Permissions\Acl\Acl"*.
//!
//! # Introduction
//!
//! In general an application can utilize ACLs to allow or deny access to resources by requesting
//! objects.
//!
//! In the sense of this implementation:
//! * a *resource* is an object to which access is controlled.
//! * a *role* is an object that may request access to a resource.
//! * a *privilege* is an action which may be granted on a resource to a role.
//!
//! ## Resources
//!
//! Resources are organized in a tree structure and must be named uniquely. Since resources are
//! stored in such a tree structure, they can be organized from the general (tree root) to the
//! specific (tree leafs). Queries on a specific resource will automatically search the resource's
//! hierarchy for rules assigned to ancestor resources, allowing for simple inheritance of rules.
//! A resource may inherit from only one parent resource, though this parent resource can have its
//! own parent resource, etc.
//!
//! ## Roles
//!
//! A role may inherit from one or more roles. When several parents carry conflicting rules the
//! first applicable rule found decides:
//!
//! ```rust
//! # use layered_acl::Acl;
//! let mut acl = Acl::new();
//!
//! acl.add_role("guest", &[])?;
//! acl.add_role("member", &[])?;
//! acl.add_role("admin", &[])?;
//! acl.add_role("someUser", &["guest", "member", "admin"])?;
//! acl.add_resource("someResource", None)?;
//!
//! acl.deny(Some("guest"), Some("someResource"), &[], None)?;
//! acl.allow(Some("member"), Some("someResource"), &[], None)?;
//!
//! assert!(acl.is_allowed(Some("someUser"), Some("someResource"), None));
//! # Ok::<(), layered_acl::Error>(())
//! ```
//!
//! There is no rule for "someUser" itself, so its parents are searched. "admin" is visited first
//! and has no rule. Next, "member" is visited and allows access, which completes the query. The
//! rule denying "guest" is never reached.
//!
//! > *LIFO Order for Role Queries*:
//! > When specifying multiple parents for a role, keep in mind that the last parent listed is the first
//! > one searched for rules applicable to an authorization query. Each parent is searched together
//! > with all of its own ancestors before the next parent is considered.
//!
//! # Defining Access Controls
//!
//! Until a developer specifies an "allow" rule, the `Acl` denies access to every privilege upon every
//! resource by every role. `None` as role or resource and an empty privilege list are wildcards:
//!
//! ```rust
//! # use layered_acl::Acl;
//! let mut acl = Acl::new();
//!
//! acl.add_role("guest", &[])?;
//! acl.add_role("staff", &["guest"])?;
//! acl.add_role("editor", &["staff"])?;
//! acl.add_role("admin", &[])?;
//!
//! // guest may only view content
//! acl.allow(Some("guest"), None, &["view"], None)?;
//! // staff inherits view privilege from guest, but also needs additional privileges
//! acl.allow(Some("staff"), None, &["edit", "submit", "revise"], None)?;
//! // editor inherits from staff and may also publish, archive and delete
//! acl.allow(Some("editor"), None, &["publish", "archive", "delete"], None)?;
//! // admin inherits nothing, but is allowed all privileges
//! acl.allow(Some("admin"), None, &[], None)?;
//!
//! assert!( acl.is_allowed(Some("editor"), None, Some("view")));
//! assert!(!acl.is_allowed(Some("staff"), None, Some("publish")));
//! assert!( acl.is_allowed(Some("admin"), None, None));
//! # Ok::<(), layered_acl::Error>(())
//! ```
//!
//! > *Specificity*:
//! > In general, the `Acl` obeys a given rule if and only if a more specific rule does not apply.
//! > A rule denying a single privilege also denies a query for all privileges on the same scope.
//!
//! # Precise Access Controls
//!
//! Rules may target specific resources and are inherited down the resource tree:
//!
//! ```rust
//! # use layered_acl::Acl;
//! # let mut acl = Acl::new();
//! # acl.add_role("guest", &[])?;
//! # acl.add_role("staff", &["guest"])?;
//! # acl.add_role("admin", &[])?;
//! # acl.allow(Some("staff"), None, &["edit", "submit", "revise"], None)?;
//! # acl.allow(Some("admin"), None, &[], None)?;
//! acl.add_role("marketing", &["staff"])?;
//! acl.add_resource("news", None)?;
//! acl.add_resource("latest", Some("news"))?;
//! acl.add_resource("anouncement", Some("news"))?;
//!
//! // marketing must be able to publish and archive the latest news
//! acl.allow(Some("marketing"), Some("latest"), &["publish", "archive"], None)?;
//! // staff (and marketing, by inheritance), are denied permission to revise the latest news
//! acl.deny(Some("staff"), Some("latest"), &["revise"], None)?;
//! // everyone (including admins) are denied permission to archive news announcements
//! acl.deny(None, Some("anouncement"), &["archive"], None)?;
//!
//! assert!( acl.is_allowed(Some("marketing"), Some("latest"), Some("publish")));
//! assert!(!acl.is_allowed(Some("marketing"), Some("latest"), Some("revise")));
//! assert!(!acl.is_allowed(Some("admin"), Some("anouncement"), Some("archive")));
//!
//! // revoking takes away rules of the given type only
//! acl.remove_deny(None, Some("anouncement"), &["archive"])?;
//! assert!( acl.is_allowed(Some("admin"), Some("anouncement"), Some("archive")));
//! # Ok::<(), layered_acl::Error>(())
//! ```
//!
//! # Assertions
//!
//! A rule may be bound to an [`Assertion`]. It only applies while the assertion holds for the
//! queried role, resource and privilege:
//!
//! ```rust
//! # use layered_acl::{assertion, Acl};
//! let mut acl = Acl::new();
//!
//! acl.add_role("staff", &[])?;
//! acl.add_resource("report", None)?;
//! acl.allow(Some("staff"), Some("report"), &["read"], Some(assertion(|_, _, _| false)))?;
//!
//! assert!(!acl.is_allowed(Some("staff"), Some("report"), Some("read")));
//! # Ok::<(), layered_acl::Error>(())
//! ```
//!
//! # Sharing
//!
//! An [`Acl`] is built with `&mut` access and queried with shared access. If rules change while
//! other threads query, use a [`SharedAcl`]. An `Acl` can also be built from an [`AclConfig`], see
//! [`Acl::init`].

mod acl;
mod config;
mod error;
mod resource;
mod role;
mod rule;
mod shared;

pub use crate::acl::Acl;
pub use crate::config::{AclConfig, AssertionRegistry, ResourceConfig, RoleConfig, RuleConfig};
pub use crate::error::{Error, Result};
pub use crate::resource::{Resource, ResourceRegistry};
pub use crate::role::{Role, RoleRegistry};
pub use crate::rule::{assertion, Assertion, Operation, Rule, RuleType, SharedAssertion};
pub use crate::shared::{instance, set_instance, SharedAcl};
