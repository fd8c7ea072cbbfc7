//! Fixed relational tables backing the document collections
//!
//! The DDL lives elsewhere; this module records what the write path is
//! allowed to touch and the SQL type of each column.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CompatError, CompatResult};

/// Columns subject to string -> integer coercion
pub const IDENTIFIER_COLUMNS: &[&str] = &["id", "user_id"];

const USERS_COLUMNS: &[&str] = &[
    "id",
    "username",
    "email",
    "password",
    "full_name",
    "bio",
    "avatar_url",
    "location",
    "date_of_birth",
    "gender",
    "is_verified",
    "is_private",
    "followers",
    "following",
    "blocked_users",
    "telegram_id",
    "created_at",
    "updated_at",
];

const POSTS_COLUMNS: &[&str] = &[
    "id",
    "user_id",
    "content",
    "media_urls",
    "likes",
    "comments",
    "visibility",
    "is_archived",
    "created_at",
    "updated_at",
];

const STORIES_COLUMNS: &[&str] = &[
    "id",
    "user_id",
    "media_url",
    "media_type",
    "caption",
    "viewers",
    "expires_at",
    "created_at",
];

const NOTIFICATIONS_COLUMNS: &[&str] = &[
    "id",
    "user_id",
    "from_user_id",
    "type",
    "message",
    "post_id",
    "is_read",
    "created_at",
];

const USERS_COLUMN_TYPES: &[(&str, ColumnType)] = &[
    ("id", ColumnType::BigInt),
    ("date_of_birth", ColumnType::Date),
    ("is_verified", ColumnType::Boolean),
    ("is_private", ColumnType::Boolean),
    ("followers", ColumnType::JsonText),
    ("following", ColumnType::JsonText),
    ("blocked_users", ColumnType::JsonText),
    ("telegram_id", ColumnType::BigInt),
    ("created_at", ColumnType::TimestampTz),
    ("updated_at", ColumnType::TimestampTz),
];

const POSTS_COLUMN_TYPES: &[(&str, ColumnType)] = &[
    ("id", ColumnType::BigInt),
    ("user_id", ColumnType::BigInt),
    ("media_urls", ColumnType::JsonText),
    ("likes", ColumnType::JsonText),
    ("comments", ColumnType::JsonText),
    ("is_archived", ColumnType::Boolean),
    ("created_at", ColumnType::TimestampTz),
    ("updated_at", ColumnType::TimestampTz),
];

const STORIES_COLUMN_TYPES: &[(&str, ColumnType)] = &[
    ("id", ColumnType::BigInt),
    ("user_id", ColumnType::BigInt),
    ("viewers", ColumnType::JsonText),
    ("expires_at", ColumnType::TimestampTz),
    ("created_at", ColumnType::TimestampTz),
];

const NOTIFICATIONS_COLUMN_TYPES: &[(&str, ColumnType)] = &[
    ("id", ColumnType::BigInt),
    ("user_id", ColumnType::BigInt),
    ("from_user_id", ColumnType::BigInt),
    ("post_id", ColumnType::BigInt),
    ("is_read", ColumnType::Boolean),
    ("created_at", ColumnType::TimestampTz),
];

const USERS_JSON_COLUMNS: &[&str] = &["followers", "following", "blocked_users"];
const POSTS_JSON_COLUMNS: &[&str] = &["media_urls", "likes", "comments"];
const STORIES_JSON_COLUMNS: &[&str] = &["viewers"];
const NOTIFICATIONS_JSON_COLUMNS: &[&str] = &[];

/// SQL type of a column
///
/// Columns not listed in a table's type map are plain text. Integer columns
/// of any width are treated as `bigint`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Text,
    /// List or map stored as JSON text
    JsonText,
    BigInt,
    Boolean,
    Date,
    TimestampTz,
}

impl ColumnType {
    /// Type name usable in a `::` cast
    pub fn sql_name(&self) -> &'static str {
        match self {
            ColumnType::Text | ColumnType::JsonText => "text",
            ColumnType::BigInt => "bigint",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::TimestampTz => "timestamptz",
        }
    }

    /// Whether text parameters compare and assign without a cast
    pub fn is_textual(&self) -> bool {
        matches!(self, ColumnType::Text | ColumnType::JsonText)
    }
}

/// A table exposed as a document collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    Users,
    Posts,
    Stories,
    Notifications,
}

impl Table {
    /// All tables, in declaration order
    pub const ALL: [Table; 4] = [
        Table::Users,
        Table::Posts,
        Table::Stories,
        Table::Notifications,
    ];

    /// Resolve a collection name to its table
    pub fn from_name(name: &str) -> CompatResult<Self> {
        match name {
            "users" => Ok(Table::Users),
            "posts" => Ok(Table::Posts),
            "stories" => Ok(Table::Stories),
            "notifications" => Ok(Table::Notifications),
            other => Err(CompatError::UnknownCollection(other.to_string())),
        }
    }

    /// SQL table name
    pub fn name(&self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Posts => "posts",
            Table::Stories => "stories",
            Table::Notifications => "notifications",
        }
    }

    /// Column allow-list
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Table::Users => USERS_COLUMNS,
            Table::Posts => POSTS_COLUMNS,
            Table::Stories => STORIES_COLUMNS,
            Table::Notifications => NOTIFICATIONS_COLUMNS,
        }
    }

    /// List- or map-valued columns stored as JSON text
    pub fn json_columns(&self) -> &'static [&'static str] {
        match self {
            Table::Users => USERS_JSON_COLUMNS,
            Table::Posts => POSTS_JSON_COLUMNS,
            Table::Stories => STORIES_JSON_COLUMNS,
            Table::Notifications => NOTIFICATIONS_JSON_COLUMNS,
        }
    }

    fn column_types(&self) -> &'static [(&'static str, ColumnType)] {
        match self {
            Table::Users => USERS_COLUMN_TYPES,
            Table::Posts => POSTS_COLUMN_TYPES,
            Table::Stories => STORIES_COLUMN_TYPES,
            Table::Notifications => NOTIFICATIONS_COLUMN_TYPES,
        }
    }

    /// SQL type of `column`; unknown columns are treated as text
    pub fn column_type(&self, column: &str) -> ColumnType {
        self.column_types()
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, ty)| *ty)
            .unwrap_or(ColumnType::Text)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns().contains(&column)
    }

    pub fn is_json_column(&self, column: &str) -> bool {
        self.json_columns().contains(&column)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Returns true if the column takes implicit string -> integer coercion
pub fn is_identifier_column(column: &str) -> bool {
    IDENTIFIER_COLUMNS.contains(&column)
}
