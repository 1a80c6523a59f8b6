//! Backend route table, one row per entity kind.

use affiliate_core::{EntityId, EntityKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
        }
    }
}

pub const LOGIN: &str = "/common/auth/login";
pub const DASHBOARD: &str = "/dashboard";
pub const USER_PREFERENCE: &str = "/common/user-preference";

/// Routes for one entity's list/CRUD/status calls.
#[derive(Debug, Clone, Copy)]
pub struct EntityEndpoints {
    pub list_verb: Verb,
    pub list: &'static str,
    pub create: &'static str,
    pub item_base: &'static str,
    pub status_verb: Verb,
}

/// A route as a fixed prefix plus trailing segments that are percent-encoded
/// one by one, so a record id can never add or climb path levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePath {
    pub prefix: &'static str,
    pub segments: Vec<String>,
}

impl RoutePath {
    pub fn fixed(prefix: &'static str) -> Self {
        Self {
            prefix,
            segments: Vec::new(),
        }
    }
}

impl EntityEndpoints {
    pub fn item(&self, id: &EntityId) -> RoutePath {
        RoutePath {
            prefix: self.item_base,
            segments: vec![id.to_string()],
        }
    }

    pub fn status(&self, id: &EntityId) -> RoutePath {
        RoutePath {
            prefix: self.item_base,
            segments: vec![id.to_string(), "status".to_string()],
        }
    }
}

pub fn endpoints(kind: EntityKind) -> EntityEndpoints {
    match kind {
        EntityKind::Advertiser => EntityEndpoints {
            list_verb: Verb::Post,
            list: "/common/advertiser/list",
            create: "/common/advertiser",
            item_base: "/common/advertiser",
            status_verb: Verb::Patch,
        },
        EntityKind::Campaign => EntityEndpoints {
            list_verb: Verb::Post,
            list: "/admin/campaign/list",
            create: "/admin/campaign",
            item_base: "/admin/campaign",
            status_verb: Verb::Patch,
        },
        EntityKind::Publisher => EntityEndpoints {
            list_verb: Verb::Post,
            list: "/common/publisher/list",
            create: "/common/publisher",
            item_base: "/common/publisher",
            status_verb: Verb::Put,
        },
        EntityKind::User => EntityEndpoints {
            list_verb: Verb::Get,
            list: "/admin/user/company-users",
            create: "/admin/user/createEmployee",
            item_base: "/admin/user",
            status_verb: Verb::Put,
        },
    }
}

pub fn preference(form_name: &str) -> RoutePath {
    RoutePath {
        prefix: USER_PREFERENCE,
        segments: vec![form_name.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_routes() {
        let ads = endpoints(EntityKind::Advertiser);
        let status = ads.status(&EntityId::from(7));
        assert_eq!(status.prefix, "/common/advertiser");
        assert_eq!(status.segments, vec!["7", "status"]);
        assert_eq!(ads.status_verb, Verb::Patch);

        let pubs = endpoints(EntityKind::Publisher);
        assert_eq!(pubs.status_verb, Verb::Put);
    }

    #[test]
    fn test_user_routes_are_irregular() {
        let users = endpoints(EntityKind::User);
        assert_eq!(users.list_verb, Verb::Get);
        assert_eq!(users.list, "/admin/user/company-users");
        assert_eq!(users.create, "/admin/user/createEmployee");
        let item = users.item(&EntityId::from("u-9"));
        assert_eq!(item.prefix, "/admin/user");
        assert_eq!(item.segments, vec!["u-9"]);
    }

    #[test]
    fn test_preference_route() {
        assert_eq!(
            preference("campaignList"),
            RoutePath {
                prefix: "/common/user-preference",
                segments: vec!["campaignList".to_string()],
            }
        );
    }
}
