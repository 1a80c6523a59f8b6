//! Capability-gated navigation: a static table maps each capability to the
//! menu item and route it unlocks.

use std::fmt;
use std::str::FromStr;

use affiliate_core::EntityKind;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Permission constant carried in the session claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Capability {
    ViewDashboard,
    ViewCampaigns,
    ViewPublishers,
    ViewAdvertisers,
    ManageUsers,
    ViewReports,
    ManageSettings,
}

impl Capability {
    pub fn all() -> Vec<Capability> {
        vec![
            Capability::ViewDashboard,
            Capability::ViewCampaigns,
            Capability::ViewPublishers,
            Capability::ViewAdvertisers,
            Capability::ManageUsers,
            Capability::ViewReports,
            Capability::ManageSettings,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ViewDashboard => "VIEW_DASHBOARD",
            Capability::ViewCampaigns => "VIEW_CAMPAIGNS",
            Capability::ViewPublishers => "VIEW_PUBLISHERS",
            Capability::ViewAdvertisers => "VIEW_ADVERTISERS",
            Capability::ManageUsers => "MANAGE_USERS",
            Capability::ViewReports => "VIEW_REPORTS",
            Capability::ManageSettings => "MANAGE_SETTINGS",
        }
    }

    /// Parse raw permission strings, skipping any the console does not know.
    pub fn parse_all<S: AsRef<str>>(raw: &[S]) -> Vec<Capability> {
        let mut caps = Vec::new();
        for value in raw {
            match value.as_ref().parse::<Capability>() {
                Ok(cap) if !caps.contains(&cap) => caps.push(cap),
                Ok(_) => {}
                Err(_) => debug!(permission = value.as_ref(), "Ignoring unknown permission"),
            }
        }
        caps
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::all()
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| format!("unknown permission `{s}`"))
    }
}

/// Navigable screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Campaigns,
    Publishers,
    Advertisers,
    Users,
    Reports,
    Settings,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
            Route::Campaigns => "/campaigns",
            Route::Publishers => "/publishers",
            Route::Advertisers => "/advertisers",
            Route::Users => "/users",
            Route::Reports => "/reports",
            Route::Settings => "/settings",
        }
    }

    pub fn for_entity(kind: EntityKind) -> Route {
        match kind {
            EntityKind::Campaign => Route::Campaigns,
            EntityKind::Publisher => Route::Publishers,
            EntityKind::Advertiser => Route::Advertisers,
            EntityKind::User => Route::Users,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub key: &'static str,
    pub label: &'static str,
    pub route: Route,
}

/// Side menu in display order.
pub const MENU: &[(Capability, MenuItem)] = &[
    (
        Capability::ViewDashboard,
        MenuItem { key: "dashboard", label: "Dashboard", route: Route::Dashboard },
    ),
    (
        Capability::ViewCampaigns,
        MenuItem { key: "campaigns", label: "Campaigns", route: Route::Campaigns },
    ),
    (
        Capability::ViewPublishers,
        MenuItem { key: "publishers", label: "Publishers", route: Route::Publishers },
    ),
    (
        Capability::ViewAdvertisers,
        MenuItem { key: "advertisers", label: "Advertisers", route: Route::Advertisers },
    ),
    (
        Capability::ManageUsers,
        MenuItem { key: "users", label: "Users", route: Route::Users },
    ),
    (
        Capability::ViewReports,
        MenuItem { key: "reports", label: "Reports", route: Route::Reports },
    ),
    (
        Capability::ManageSettings,
        MenuItem { key: "settings", label: "Settings", route: Route::Settings },
    ),
];

pub fn visible_menu(held: &[Capability]) -> Vec<MenuItem> {
    MENU.iter()
        .filter(|(cap, _)| held.contains(cap))
        .map(|(_, item)| *item)
        .collect()
}

/// Dashboard and login are always reachable; everything else needs the
/// capability its menu entry requires.
pub fn can_access(held: &[Capability], route: Route) -> bool {
    match route {
        Route::Login | Route::Dashboard => true,
        _ => MENU
            .iter()
            .any(|(cap, item)| item.route == route && held.contains(cap)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_item_shown_iff_capability_held() {
        let held = vec![Capability::ViewCampaigns, Capability::ManageUsers];
        let keys: Vec<_> = visible_menu(&held).iter().map(|m| m.key).collect();
        assert_eq!(keys, vec!["campaigns", "users"]);

        for (cap, item) in MENU {
            let shown = visible_menu(&[*cap]);
            assert_eq!(shown, vec![*item]);
        }
        assert!(visible_menu(&[]).is_empty());
    }

    #[test]
    fn test_menu_preserves_table_order() {
        let keys: Vec<_> = visible_menu(&Capability::all()).iter().map(|m| m.key).collect();
        assert_eq!(
            keys,
            vec!["dashboard", "campaigns", "publishers", "advertisers", "users", "reports", "settings"]
        );
    }

    #[test]
    fn test_unknown_permissions_are_ignored() {
        let caps = Capability::parse_all(&["VIEW_CAMPAIGNS", "LAUNCH_ROCKETS", "VIEW_CAMPAIGNS"]);
        assert_eq!(caps, vec![Capability::ViewCampaigns]);
    }

    #[test]
    fn test_route_gating() {
        let held = vec![Capability::ViewPublishers];
        assert!(can_access(&held, Route::Dashboard));
        assert!(can_access(&[], Route::Login));
        assert!(can_access(&held, Route::Publishers));
        assert!(!can_access(&held, Route::Campaigns));
        assert!(!can_access(&held, Route::Settings));
    }

    #[test]
    fn test_serde_uses_wire_constants() {
        let json = serde_json::to_string(&Capability::ManageUsers).unwrap();
        assert_eq!(json, "\"MANAGE_USERS\"");
        assert_eq!("VIEW_REPORTS".parse::<Capability>().unwrap(), Capability::ViewReports);
    }
}
