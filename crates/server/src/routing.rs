//! Role Router
//!
//! Maps a session to the dashboard it lands on after sign-in, and decides
//! which links the navigation bar offers.

use crate::core::models::{Role, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dashboard {
    Home,
    Participant,
    Volunteer,
    Admin,
}

impl Dashboard {
    pub fn path(&self) -> &'static str {
        match self {
            Dashboard::Home => "/",
            Dashboard::Participant => "/participant/dashboard",
            Dashboard::Volunteer => "/volunteer/dashboard",
            Dashboard::Admin => "/admin/dashboard",
        }
    }
}

/// Dashboard for a profile's role tag.
///
/// `Both` and unknown tags land on the participant dashboard.
pub fn dashboard_for(role: Option<Role>) -> Dashboard {
    match role {
        Some(Role::Volunteer) => Dashboard::Volunteer,
        Some(Role::Participant) | Some(Role::Both) | None => Dashboard::Participant,
    }
}

/// Where a freshly signed-in session is sent. Admin accounts go to the admin panel.
pub fn landing_for(session: &Session) -> Dashboard {
    if session.is_admin {
        Dashboard::Admin
    } else {
        dashboard_for(session.role)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKind {
    Link,
    CallToAction,
    SignOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub href: &'static str,
    pub kind: NavKind,
}

impl NavLink {
    const fn link(label: &'static str, href: &'static str) -> Self {
        Self {
            label,
            href,
            kind: NavKind::Link,
        }
    }
}

pub fn nav_links(session: Option<&Session>) -> Vec<NavLink> {
    let mut links = vec![
        NavLink::link("Home", "/"),
        NavLink::link("Schedule", "/schedule"),
    ];

    let Some(session) = session else {
        links.push(NavLink::link("Login", "/login"));
        links.push(NavLink {
            label: "Register Now",
            href: "/register",
            kind: NavKind::CallToAction,
        });
        return links;
    };

    if let Some(role) = session.role {
        if role.is_participant() {
            links.push(NavLink::link(
                "Participant Dashboard",
                Dashboard::Participant.path(),
            ));
        }
        if role.is_volunteer() {
            links.push(NavLink::link("Volunteer Dashboard", Dashboard::Volunteer.path()));
        }
    }
    if session.is_admin {
        links.push(NavLink::link("Admin Dashboard", Dashboard::Admin.path()));
    }

    links.push(NavLink {
        label: "Sign Out",
        href: "/logout",
        kind: NavKind::SignOut,
    });
    links
}
