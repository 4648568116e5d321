use redb::TableDefinition;

/// Table backing the key-value medium.
/// Key: storage key (e.g. "iconFavorites")
/// Value: raw string value, JSON for the favorites keys
pub const STORAGE_TABLE: TableDefinition<&str, &str> = TableDefinition::new("storage");
