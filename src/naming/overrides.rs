//! Explicit field-name overrides per table
//!
//! Encode tables map external names to columns and are keyed by context.
//! Decode tables map columns back to external names. The two directions are
//! maintained by hand and are not guaranteed to be inverses.

use crate::schema::Table;

pub(crate) type Pairs = &'static [(&'static str, &'static str)];

/// Overrides for a single table
#[derive(Debug)]
pub(crate) struct OverrideSet {
    pub filter: Pairs,
    pub insert: Pairs,
    pub update: Pairs,
    pub decode: Pairs,
}

static USERS: OverrideSet = OverrideSet {
    filter: &[("password_hash", "password")],
    insert: &[("password_hash", "password")],
    update: &[("password_hash", "password"), ("city", "location")],
    decode: &[("password", "password_hash"), ("location", "city")],
};

static POSTS: OverrideSet = OverrideSet {
    filter: &[("images", "media_urls"), ("authorId", "user_id")],
    insert: &[("images", "media_urls")],
    update: &[("images", "media_urls")],
    decode: &[("media_urls", "images")],
};

static STORIES: OverrideSet = OverrideSet {
    filter: &[("viewedBy", "viewers")],
    insert: &[("viewedBy", "viewers")],
    update: &[("viewedBy", "viewers")],
    decode: &[("viewers", "viewedBy")],
};

static NOTIFICATIONS: OverrideSet = OverrideSet {
    filter: &[("read", "is_read")],
    insert: &[],
    update: &[("read", "is_read")],
    decode: &[("is_read", "read")],
};

pub(crate) fn for_table(table: Table) -> &'static OverrideSet {
    match table {
        Table::Users => &USERS,
        Table::Posts => &POSTS,
        Table::Stories => &STORIES,
        Table::Notifications => &NOTIFICATIONS,
    }
}

pub(crate) fn lookup(pairs: Pairs, key: &str) -> Option<&'static str> {
    pairs.iter().find(|(from, _)| *from == key).map(|(_, to)| *to)
}
