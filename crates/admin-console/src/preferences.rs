//! Server-side column preferences, one record per list form.

use affiliate_api::ColumnPreference;
use affiliate_core::EntityKind;

use crate::columns::ColumnVisibility;

/// Snapshot the visible keys of `kind`'s list form.
pub fn snapshot(kind: EntityKind, visibility: &ColumnVisibility) -> ColumnPreference {
    ColumnPreference {
        form_name: kind.form_name().to_string(),
        columns: visibility
            .visible_keys()
            .into_iter()
            .map(str::to_string)
            .collect(),
    }
}

/// Saved keys become visible; every other column is hidden.
pub fn apply(visibility: &mut ColumnVisibility, preference: &ColumnPreference) {
    visibility.apply_selection(&preference.columns);
}
