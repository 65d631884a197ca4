use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use bale_types::{
    boolstr, ArtifactId, ArtifactRecord, Checksum, ContentType, LifecycleState, StagedArtifact,
};

use crate::error::{StoreError, StoreResult};

/// Schema bootstrap, run on every open. `IF NOT EXISTS` keeps it
/// idempotent; an existing database is left untouched.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS artifacts (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    uuid           TEXT NOT NULL UNIQUE,
    name           TEXT NOT NULL,
    alias          TEXT NOT NULL,
    label          TEXT NOT NULL,
    checksum       TEXT NOT NULL,
    content_type   TEXT NOT NULL,
    openchain      TEXT NOT NULL,
    content_path   TEXT NOT NULL,
    envelope_path  TEXT NOT NULL,
    envelope_uuid  TEXT NOT NULL,
    on_ledger      TEXT NOT NULL,
    artifact_list  TEXT NOT NULL,
    uri_list       TEXT NOT NULL,
    inserted_at    DATETIME DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE IF NOT EXISTS aliases (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    alias        TEXT NOT NULL UNIQUE,
    value        TEXT NOT NULL,
    inserted_at  DATETIME DEFAULT CURRENT_TIMESTAMP
);
";

const SELECT_COLS: &str = "id, uuid, name, alias, label, checksum, content_type, openchain, \
                           content_path, envelope_path, envelope_uuid, on_ledger, \
                           artifact_list, uri_list";

/// Which staged records a scan should yield.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Filter {
    All,
    /// Envelope records only.
    Envelopes,
    /// Leaf artifacts only (everything that is not an envelope).
    Leaves,
    /// Records whose parent-envelope reference equals the given value;
    /// `None` matches records not attached to any envelope.
    WithEnvelope(Option<ArtifactId>),
}

impl Filter {
    fn matches(&self, staged: &StagedArtifact) -> bool {
        match self {
            Filter::All => true,
            Filter::Envelopes => staged.record.is_envelope(),
            Filter::Leaves => !staged.record.is_envelope(),
            Filter::WithEnvelope(target) => staged.envelope == *target,
        }
    }
}

/// One row of the staging table, keyed by the internal numeric id that
/// `status` displays and `remove` accepts.
#[derive(Clone, Debug, PartialEq)]
pub struct StagingEntry {
    pub id: i64,
    pub staged: StagedArtifact,
}

impl StagingEntry {
    pub fn record(&self) -> &ArtifactRecord {
        &self.staged.record
    }

    pub fn state(&self) -> LifecycleState {
        self.staged.state()
    }
}

/// Handle on the staging database.
///
/// Constructed once per command invocation and dropped when the command
/// finishes, which closes the connection. A single table holds artifact
/// and envelope records alike; scans are full-table with in-process
/// filtering, which is fine at staging-area sizes.
#[derive(Debug)]
pub struct StagingStore {
    pub(crate) conn: Connection,
}

impl StagingStore {
    /// Open the staging database at `path`, creating the file and the
    /// schema on first use. Failure here means the tool has no usable
    /// state; callers exit with a dedicated code.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .and_then(|conn| conn.execute_batch(SCHEMA).map(|_| conn))
            .map_err(|source| StoreError::Open {
                path: path.display().to_string(),
                source,
            })?;
        debug!(path = %path.display(), "staging store opened");
        Ok(Self { conn })
    }

    /// In-memory store with the same schema, for tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()
            .and_then(|conn| conn.execute_batch(SCHEMA).map(|_| conn))
            .map_err(|source| StoreError::Open {
                path: ":memory:".to_string(),
                source,
            })?;
        Ok(Self { conn })
    }

    /// Insert or replace a record, keyed by its UUID, and return the
    /// row id. Re-putting an existing UUID updates the row in place,
    /// keeping its id and insertion time.
    pub fn put(&self, staged: &StagedArtifact) -> StoreResult<i64> {
        let record = &staged.record;
        let artifact_list = serde_json::to_string(&record.artifact_list)?;
        let uri_list = serde_json::to_string(&record.uri_list)?;
        self.conn.execute(
            "INSERT INTO artifacts (uuid, name, alias, label, checksum, content_type, openchain,
                                    content_path, envelope_path, envelope_uuid, on_ledger,
                                    artifact_list, uri_list)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
             ON CONFLICT(uuid) DO UPDATE SET
                 name = excluded.name,
                 alias = excluded.alias,
                 label = excluded.label,
                 checksum = excluded.checksum,
                 content_type = excluded.content_type,
                 openchain = excluded.openchain,
                 content_path = excluded.content_path,
                 envelope_path = excluded.envelope_path,
                 envelope_uuid = excluded.envelope_uuid,
                 on_ledger = excluded.on_ledger,
                 artifact_list = excluded.artifact_list,
                 uri_list = excluded.uri_list",
            params![
                record.uuid.to_string(),
                record.name,
                record.alias,
                record.label,
                record.checksum.as_str(),
                record.content_type.as_str(),
                boolstr::encode(record.openchain),
                staged.content_path,
                staged.envelope_path,
                ArtifactId::encode_opt(staged.envelope),
                boolstr::encode(staged.on_ledger),
                artifact_list,
                uri_list,
            ],
        )?;
        let id = self.conn.query_row(
            "SELECT id FROM artifacts WHERE uuid = ?1",
            params![record.uuid.to_string()],
            |row| row.get(0),
        )?;
        debug!(id, uuid = %record.uuid, name = %record.name, "record staged");
        Ok(id)
    }

    /// Fetch one row by its internal id.
    pub fn get(&self, id: i64) -> StoreResult<StagingEntry> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {SELECT_COLS} FROM artifacts WHERE id = ?1"),
                params![id],
                read_row,
            )
            .optional()?
            .ok_or(StoreError::NotFound(id))?;
        hydrate(raw)
    }

    /// Fetch one row by record UUID.
    pub fn get_by_uuid(&self, uuid: ArtifactId) -> StoreResult<StagingEntry> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {SELECT_COLS} FROM artifacts WHERE uuid = ?1"),
                params![uuid.to_string()],
                read_row,
            )
            .optional()?
            .ok_or(StoreError::UnknownUuid(uuid))?;
        hydrate(raw)
    }

    /// All records matching `filter`, in insertion (row id) order.
    pub fn artifacts(&self, filter: Filter) -> StoreResult<Vec<StagingEntry>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {SELECT_COLS} FROM artifacts ORDER BY id ASC"))?;
        let rows = stmt.query_map([], read_row)?;
        let mut out = Vec::new();
        for raw in rows {
            let entry = hydrate(raw?)?;
            if filter.matches(&entry.staged) {
                out.push(entry);
            }
        }
        Ok(out)
    }

    /// Hard-delete one row. Returns whether a row was actually there.
    pub fn remove(&self, id: i64) -> StoreResult<bool> {
        let n = self
            .conn
            .execute("DELETE FROM artifacts WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    /// Clear the staging table. Returns the number of rows deleted.
    pub fn remove_all(&self) -> StoreResult<usize> {
        let n = self.conn.execute("DELETE FROM artifacts", [])?;
        Ok(n)
    }

    /// Record the ledger's acknowledgment state for one row. Only ever
    /// called after a positive push acknowledgment.
    pub fn set_on_ledger(&self, id: i64, on_ledger: bool) -> StoreResult<()> {
        let n = self.conn.execute(
            "UPDATE artifacts SET on_ledger = ?1 WHERE id = ?2",
            params![boolstr::encode(on_ledger), id],
        )?;
        if n == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    /// Attach the row to a parent envelope, or detach it with `None`.
    pub fn set_envelope(&self, id: i64, envelope: Option<ArtifactId>) -> StoreResult<()> {
        let n = self.conn.execute(
            "UPDATE artifacts SET envelope_uuid = ?1 WHERE id = ?2",
            params![ArtifactId::encode_opt(envelope), id],
        )?;
        if n == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

/// Raw column values for one row; domain parsing happens in `hydrate`
/// so that a bad cell reports a `CorruptRow` instead of a driver error.
struct RawRow {
    id: i64,
    uuid: String,
    name: String,
    alias: String,
    label: String,
    checksum: String,
    content_type: String,
    openchain: String,
    content_path: String,
    envelope_path: String,
    envelope_uuid: String,
    on_ledger: String,
    artifact_list: String,
    uri_list: String,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        id: row.get(0)?,
        uuid: row.get(1)?,
        name: row.get(2)?,
        alias: row.get(3)?,
        label: row.get(4)?,
        checksum: row.get(5)?,
        content_type: row.get(6)?,
        openchain: row.get(7)?,
        content_path: row.get(8)?,
        envelope_path: row.get(9)?,
        envelope_uuid: row.get(10)?,
        on_ledger: row.get(11)?,
        artifact_list: row.get(12)?,
        uri_list: row.get(13)?,
    })
}

fn hydrate(raw: RawRow) -> StoreResult<StagingEntry> {
    let id = raw.id;
    let corrupt = |reason: String| StoreError::CorruptRow { id, reason };

    let uuid = ArtifactId::parse(&raw.uuid).map_err(|e| corrupt(e.to_string()))?;
    let checksum = Checksum::parse(&raw.checksum).map_err(|e| corrupt(e.to_string()))?;
    let content_type: ContentType = raw
        .content_type
        .parse()
        .map_err(|e: bale_types::TypeError| corrupt(e.to_string()))?;
    let openchain = boolstr::decode(&raw.openchain).map_err(|e| corrupt(e.to_string()))?;
    let envelope = ArtifactId::decode_opt(&raw.envelope_uuid).map_err(|e| corrupt(e.to_string()))?;
    let on_ledger = boolstr::decode(&raw.on_ledger).map_err(|e| corrupt(e.to_string()))?;
    let artifact_list = serde_json::from_str(&raw.artifact_list).map_err(|e| corrupt(e.to_string()))?;
    let uri_list = serde_json::from_str(&raw.uri_list).map_err(|e| corrupt(e.to_string()))?;

    Ok(StagingEntry {
        id,
        staged: StagedArtifact {
            record: ArtifactRecord {
                uuid,
                name: raw.name,
                alias: raw.alias,
                label: raw.label,
                checksum,
                content_type,
                openchain,
                timestamp: None,
                artifact_list,
                uri_list,
            },
            content_path: raw.content_path,
            envelope_path: raw.envelope_path,
            envelope,
            on_ledger,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_store() -> StagingStore {
        StagingStore::open_in_memory().unwrap()
    }

    fn make_staged(name: &str) -> StagedArtifact {
        let record = ArtifactRecord {
            uuid: ArtifactId::generate(),
            name: name.to_string(),
            alias: name.to_string(),
            label: name.to_string(),
            checksum: Checksum::of_str(name),
            content_type: ContentType::classify(name),
            openchain: false,
            timestamp: None,
            artifact_list: Vec::new(),
            uri_list: Vec::new(),
        };
        StagedArtifact::new(record, name.to_string(), "/".to_string())
    }

    fn make_envelope(name: &str) -> StagedArtifact {
        let mut staged = make_staged(name);
        staged.record.content_type = ContentType::Envelope;
        staged
    }

    #[test]
    fn put_then_get_roundtrips() {
        let store = make_store();
        let staged = make_staged("lib.c");
        let id = store.put(&staged).unwrap();
        let entry = store.get(id).unwrap();
        assert_eq!(entry.id, id);
        assert_eq!(entry.staged, staged);
    }

    #[test]
    fn put_same_uuid_updates_in_place() {
        let store = make_store();
        let mut staged = make_staged("lib.c");
        let first_id = store.put(&staged).unwrap();

        staged.record.label = "relabeled".to_string();
        let second_id = store.put(&staged).unwrap();

        assert_eq!(first_id, second_id);
        let all = store.artifacts(Filter::All).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].record().label, "relabeled");
    }

    #[test]
    fn get_unknown_id_is_not_found() {
        let store = make_store();
        let err = store.get(42).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(42)));
    }

    #[test]
    fn get_by_uuid_finds_record() {
        let store = make_store();
        let staged = make_staged("a.c");
        store.put(&staged).unwrap();
        let entry = store.get_by_uuid(staged.record.uuid).unwrap();
        assert_eq!(entry.record().name, "a.c");

        let missing = ArtifactId::generate();
        let err = store.get_by_uuid(missing).unwrap_err();
        assert!(matches!(err, StoreError::UnknownUuid(u) if u == missing));
    }

    #[test]
    fn listing_is_insertion_ordered() {
        let store = make_store();
        for name in ["one.c", "two.c", "three.c"] {
            store.put(&make_staged(name)).unwrap();
        }
        let names: Vec<_> = store
            .artifacts(Filter::All)
            .unwrap()
            .into_iter()
            .map(|e| e.staged.record.name)
            .collect();
        assert_eq!(names, vec!["one.c", "two.c", "three.c"]);
    }

    #[test]
    fn filters_split_envelopes_from_leaves() {
        let store = make_store();
        store.put(&make_envelope("fw.env")).unwrap();
        store.put(&make_staged("a.c")).unwrap();
        store.put(&make_staged("b.c")).unwrap();

        assert_eq!(store.artifacts(Filter::Envelopes).unwrap().len(), 1);
        assert_eq!(store.artifacts(Filter::Leaves).unwrap().len(), 2);
        assert_eq!(store.artifacts(Filter::All).unwrap().len(), 3);
    }

    #[test]
    fn filter_by_envelope_reference() {
        let store = make_store();
        let envelope = make_envelope("fw.env");
        let parent = envelope.record.uuid;
        store.put(&envelope).unwrap();
        let a = store.put(&make_staged("a.c")).unwrap();
        store.put(&make_staged("b.c")).unwrap();

        store.set_envelope(a, Some(parent)).unwrap();

        let attached = store.artifacts(Filter::WithEnvelope(Some(parent))).unwrap();
        assert_eq!(attached.len(), 1);
        assert_eq!(attached[0].record().name, "a.c");

        // None matches the unattached leaf and the envelope itself.
        let loose = store.artifacts(Filter::WithEnvelope(None)).unwrap();
        assert_eq!(loose.len(), 2);
    }

    #[test]
    fn remove_reports_whether_row_existed() {
        let store = make_store();
        let id = store.put(&make_staged("a.c")).unwrap();
        assert!(store.remove(id).unwrap());
        assert!(!store.remove(id).unwrap());
    }

    #[test]
    fn remove_all_clears_the_table() {
        let store = make_store();
        store.put(&make_staged("a.c")).unwrap();
        store.put(&make_staged("b.c")).unwrap();
        assert_eq!(store.remove_all().unwrap(), 2);
        assert!(store.artifacts(Filter::All).unwrap().is_empty());
    }

    #[test]
    fn lifecycle_setters_move_state_forward() {
        let store = make_store();
        let parent = ArtifactId::generate();
        let id = store.put(&make_staged("a.c")).unwrap();
        assert_eq!(store.get(id).unwrap().state(), LifecycleState::Staged);

        store.set_envelope(id, Some(parent)).unwrap();
        assert_eq!(store.get(id).unwrap().state(), LifecycleState::Assigned);

        store.set_on_ledger(id, true).unwrap();
        let entry = store.get(id).unwrap();
        assert_eq!(entry.state(), LifecycleState::Confirmed);
        assert_eq!(entry.staged.envelope, Some(parent));
    }

    #[test]
    fn setters_on_missing_rows_are_not_found() {
        let store = make_store();
        assert!(matches!(
            store.set_on_ledger(9, true).unwrap_err(),
            StoreError::NotFound(9)
        ));
        assert!(matches!(
            store.set_envelope(9, None).unwrap_err(),
            StoreError::NotFound(9)
        ));
    }

    #[test]
    fn open_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("staging.db");
        {
            let store = StagingStore::open(&path).unwrap();
            store.put(&make_staged("a.c")).unwrap();
        }
        let store = StagingStore::open(&path).unwrap();
        assert_eq!(store.artifacts(Filter::All).unwrap().len(), 1);
    }

    #[test]
    fn open_on_a_directory_fails_with_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = StagingStore::open(dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::Open { .. }));
    }
}
