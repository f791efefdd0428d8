use layered_acl::*;
use log::info;

fn main() -> Result<()> {
    env_logger::init();

    let mut acl = Acl::new();

    acl.add_role("guest", &[])?;
    acl.add_role("staff", &["guest"])?;
    acl.add_role("editor", &["staff"])?;
    acl.add_role("admin", &[])?;

    // guest may only view content
    acl.allow(Some("guest"), None, &["view"], None)?;

    // staff inherits view privilege from guest, but also needs additional privileges
    acl.allow(Some("staff"), None, &["edit", "submit", "revise"], None)?;

    // editor inherits view, edit, submit, and revise privileges from staff, but also needs
    // additional privileges
    acl.allow(Some("editor"), None, &["publish", "archive", "delete"], None)?;

    // admin inherits nothing, but is allowed all privileges
    acl.allow(Some("admin"), None, &[], None)?;

    // marketing inherits from staff
    acl.add_role("marketing", &["staff"])?;

    acl.add_resource("newsletter", None)?;
    acl.add_resource("news", None)?;
    acl.add_resource("latest", Some("news"))?;
    acl.add_resource("anouncement", Some("news"))?;

    // marketing must be able to publish and archive newsletters and the latest news
    acl.allow(Some("marketing"), Some("newsletter"), &["publish", "archive"], None)?;
    acl.allow(Some("marketing"), Some("latest"), &["publish", "archive"], None)?;

    // staff (and marketing, by inheritance), are denied permission to revise the latest news
    acl.deny(Some("staff"), Some("latest"), &["revise"], None)?;

    // everyone (including admins) are denied permission to archive news announcements
    acl.deny(None, Some("anouncement"), &["archive"], None)?;

    // publish the acl for live updates and queries from other threads
    let shared = SharedAcl::from(acl);

    for (role, resource, privilege) in &[
        ("staff",     "newsletter",  "publish"),
        ("marketing", "newsletter",  "publish"),
        ("marketing", "latest",      "revise"),
        ("editor",    "latest",      "view"),
        ("admin",     "anouncement", "archive"),
    ] {
        let allowed = shared.is_allowed(Some(*role), Some(*resource), Some(*privilege));

        info!("{} {} {}: {}", role, privilege, resource, if allowed { "allowed" } else { "denied" });
    } // for

    Ok(())
} // main
