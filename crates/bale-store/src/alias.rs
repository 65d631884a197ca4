//! Alias resolver: case-sensitive short names for UUIDs (or any other
//! value string). A convenience layer only — nothing in the staging
//! lifecycle depends on it.

use rusqlite::{params, OptionalExtension};

use crate::error::StoreResult;
use crate::store::StagingStore;

/// One alias→value mapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AliasEntry {
    pub alias: String,
    pub value: String,
}

impl StagingStore {
    /// Define (or redefine) `alias` to map to `value`. The alias is the
    /// uniqueness key; redefinition overwrites the value but keeps the
    /// alias's original creation time.
    pub fn define_alias(&self, alias: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO aliases (alias, value) VALUES (?1, ?2)
             ON CONFLICT(alias) DO UPDATE SET value = excluded.value",
            params![alias, value],
        )?;
        Ok(())
    }

    /// The value mapped by `alias`, if defined.
    pub fn resolve_alias(&self, alias: &str) -> StoreResult<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT value FROM aliases WHERE alias = ?1",
                params![alias],
                |row| row.get(0),
            )
            .optional()?)
    }

    /// The alias mapped to `value`. When several aliases share a value,
    /// the earliest-defined one wins (row id breaks same-second ties).
    pub fn alias_for(&self, value: &str) -> StoreResult<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT alias FROM aliases WHERE value = ?1
                 ORDER BY inserted_at ASC, id ASC LIMIT 1",
                params![value],
                |row| row.get(0),
            )
            .optional()?)
    }

    /// Every defined alias, sorted by name for display.
    pub fn aliases(&self) -> StoreResult<Vec<AliasEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT alias, value FROM aliases ORDER BY alias ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok(AliasEntry {
                alias: row.get(0)?,
                value: row.get(1)?,
            })
        })?;
        let mut out = Vec::new();
        for entry in rows {
            out.push(entry?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use crate::store::StagingStore;

    fn make_store() -> StagingStore {
        StagingStore::open_in_memory().unwrap()
    }

    #[test]
    fn define_then_resolve() {
        let store = make_store();
        store.define_alias("fw", "uuid-one").unwrap();
        assert_eq!(store.resolve_alias("fw").unwrap().as_deref(), Some("uuid-one"));
    }

    #[test]
    fn unknown_alias_resolves_to_none() {
        let store = make_store();
        assert_eq!(store.resolve_alias("nope").unwrap(), None);
    }

    #[test]
    fn redefining_an_alias_overwrites_the_value() {
        let store = make_store();
        store.define_alias("fw", "old").unwrap();
        store.define_alias("fw", "new").unwrap();
        assert_eq!(store.resolve_alias("fw").unwrap().as_deref(), Some("new"));
        assert_eq!(store.aliases().unwrap().len(), 1);
    }

    #[test]
    fn reverse_resolution_prefers_earliest_definition() {
        let store = make_store();
        // "zz" defined before "aa": creation order wins, not name order.
        store.define_alias("zz", "shared-uuid").unwrap();
        store.define_alias("aa", "shared-uuid").unwrap();
        assert_eq!(
            store.alias_for("shared-uuid").unwrap().as_deref(),
            Some("zz")
        );
    }

    #[test]
    fn reverse_resolution_of_unmapped_value_is_none() {
        let store = make_store();
        assert_eq!(store.alias_for("unmapped").unwrap(), None);
    }

    #[test]
    fn aliases_are_case_sensitive() {
        let store = make_store();
        store.define_alias("FW", "upper").unwrap();
        store.define_alias("fw", "lower").unwrap();
        assert_eq!(store.resolve_alias("FW").unwrap().as_deref(), Some("upper"));
        assert_eq!(store.resolve_alias("fw").unwrap().as_deref(), Some("lower"));
        assert_eq!(store.aliases().unwrap().len(), 2);
    }

    #[test]
    fn listing_is_name_sorted() {
        let store = make_store();
        store.define_alias("beta", "2").unwrap();
        store.define_alias("alpha", "1").unwrap();
        let names: Vec<_> = store
            .aliases()
            .unwrap()
            .into_iter()
            .map(|e| e.alias)
            .collect();
        assert_eq!(names, vec!["alpha", "beta"]);
    }
}
