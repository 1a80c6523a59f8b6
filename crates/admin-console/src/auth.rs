//! Auth slice: who is logged in and with which capabilities.

use affiliate_api::Claims;
use affiliate_core::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::permissions::{can_access, visible_menu, Capability, MenuItem, Route};

/// Identity decoded from the session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub role: String,
    pub capabilities: Vec<Capability>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Identity {
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            id: claims.id.clone(),
            name: claims.name.clone(),
            email: claims.email.clone(),
            role: claims.role.clone(),
            capabilities: Capability::parse_all(&claims.permissions),
            expires_at: claims.expires_at(),
        }
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

#[derive(Debug, Clone)]
pub enum AuthAction {
    LoggedIn { token: String, identity: Identity },
    LoggedOut,
}

#[derive(Debug, Clone, Default)]
pub struct AuthState {
    token: Option<String>,
    identity: Option<Identity>,
}

impl AuthState {
    pub fn reduce(&mut self, action: AuthAction) {
        match action {
            AuthAction::LoggedIn { token, identity } => {
                self.token = Some(token);
                self.identity = Some(identity);
            }
            AuthAction::LoggedOut => {
                self.token = None;
                self.identity = None;
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn capabilities(&self) -> &[Capability] {
        self.identity
            .as_ref()
            .map(|i| i.capabilities.as_slice())
            .unwrap_or(&[])
    }

    pub fn menu(&self) -> Vec<MenuItem> {
        visible_menu(self.capabilities())
    }

    /// Anonymous users only reach the login screen.
    pub fn can_access(&self, route: Route) -> bool {
        if !self.is_authenticated() {
            return route == Route::Login;
        }
        can_access(self.capabilities(), route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> Claims {
        Claims {
            id: EntityId::from(3),
            name: "Dana".into(),
            email: "dana@example.com".into(),
            role: "manager".into(),
            permissions: vec!["VIEW_CAMPAIGNS".into(), "SOMETHING_NEW".into()],
            exp: 4_102_444_800,
        }
    }

    #[test]
    fn test_identity_from_claims() {
        let identity = Identity::from_claims(&claims());
        assert_eq!(identity.capabilities, vec![Capability::ViewCampaigns]);
        assert!(identity.has(Capability::ViewCampaigns));
        assert!(!identity.has(Capability::ManageUsers));
        assert!(identity.expires_at.is_some());
    }

    #[test]
    fn test_login_then_logout() {
        let mut state = AuthState::default();
        assert!(state.can_access(Route::Login));
        assert!(!state.can_access(Route::Dashboard));

        state.reduce(AuthAction::LoggedIn {
            token: "t".into(),
            identity: Identity::from_claims(&claims()),
        });
        assert!(state.is_authenticated());
        assert!(state.can_access(Route::Dashboard));
        assert!(state.can_access(Route::Campaigns));
        assert!(!state.can_access(Route::Users));
        assert_eq!(state.menu().len(), 1);

        state.reduce(AuthAction::LoggedOut);
        assert!(!state.is_authenticated());
        assert!(state.identity().is_none());
        assert!(state.menu().is_empty());
    }
}
