//! Application store: the auth slice plus one slice per entity.
//!
//! `dispatch` is the only mutation path. The store is shared behind a
//! `parking_lot::RwLock`; guards are dropped before any `.await`.

use std::sync::Arc;

use affiliate_core::types::{Advertiser, Campaign, Publisher, User};
use parking_lot::RwLock;

use crate::auth::{AuthAction, AuthState};
use crate::columns::Tabular;
use crate::slice::{EntitySlice, SliceAction};

#[derive(Debug, Clone)]
pub enum AppAction {
    Auth(AuthAction),
    Campaigns(SliceAction<Campaign>),
    Publishers(SliceAction<Publisher>),
    Advertisers(SliceAction<Advertiser>),
    Users(SliceAction<User>),
}

#[derive(Debug, Default)]
pub struct AppStore {
    pub auth: AuthState,
    pub campaigns: EntitySlice<Campaign>,
    pub publishers: EntitySlice<Publisher>,
    pub advertisers: EntitySlice<Advertiser>,
    pub users: EntitySlice<User>,
}

pub type SharedStore = Arc<RwLock<AppStore>>;

impl AppStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedStore {
        Arc::new(RwLock::new(Self::new()))
    }

    pub fn dispatch(&mut self, action: AppAction) {
        match action {
            AppAction::Auth(a) => self.auth.reduce(a),
            AppAction::Campaigns(a) => self.campaigns.reduce(a),
            AppAction::Publishers(a) => self.publishers.reduce(a),
            AppAction::Advertisers(a) => self.advertisers.reduce(a),
            AppAction::Users(a) => self.users.reduce(a),
        }
    }
}

/// Entities that own a slice in the store.
pub trait StoreEntity: Tabular {
    fn slice(store: &AppStore) -> &EntitySlice<Self>;
    fn action(action: SliceAction<Self>) -> AppAction;
}

impl StoreEntity for Campaign {
    fn slice(store: &AppStore) -> &EntitySlice<Self> {
        &store.campaigns
    }
    fn action(action: SliceAction<Self>) -> AppAction {
        AppAction::Campaigns(action)
    }
}

impl StoreEntity for Publisher {
    fn slice(store: &AppStore) -> &EntitySlice<Self> {
        &store.publishers
    }
    fn action(action: SliceAction<Self>) -> AppAction {
        AppAction::Publishers(action)
    }
}

impl StoreEntity for Advertiser {
    fn slice(store: &AppStore) -> &EntitySlice<Self> {
        &store.advertisers
    }
    fn action(action: SliceAction<Self>) -> AppAction {
        AppAction::Advertisers(action)
    }
}

impl StoreEntity for User {
    fn slice(store: &AppStore) -> &EntitySlice<Self> {
        &store.users
    }
    fn action(action: SliceAction<Self>) -> AppAction {
        AppAction::Users(action)
    }
}
