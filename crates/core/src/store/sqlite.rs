//! SQLite-backed release record store.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use crate::record::{EnrichedRecord, MetadataSource};

use super::{RecordStore, StoreError, StoreStats, StoredRecord};

/// SQLite-backed record store. One row per catalog code; list fields are
/// stored as JSON text.
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
}

impl SqliteRecordStore {
    /// Open (and if needed create) the database at the given path.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            -- One row per catalog code; JSON arrays in TEXT columns.
            CREATE TABLE IF NOT EXISTS release_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                code TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL DEFAULT '',
                title_cn TEXT,
                size_label TEXT,
                is_uncensored INTEGER NOT NULL DEFAULT 0,
                images TEXT NOT NULL DEFAULT '[]',
                magnets TEXT NOT NULL DEFAULT '[]',
                source_url TEXT NOT NULL DEFAULT '',
                studio TEXT,
                studio_cn TEXT,
                actresses TEXT NOT NULL DEFAULT '[]',
                actresses_cn TEXT NOT NULL DEFAULT '[]',
                tags TEXT NOT NULL DEFAULT '[]',
                tags_cn TEXT NOT NULL DEFAULT '[]',
                release_date TEXT,
                cover_url TEXT,
                source TEXT NOT NULL DEFAULT 'none',
                raw_text TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_release_records_title ON release_records(title);
            CREATE INDEX IF NOT EXISTS idx_release_records_updated ON release_records(updated_at);
            "#,
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn write_row(
        conn: &Connection,
        record: &EnrichedRecord,
        existing_id: Option<i64>,
        now: &str,
    ) -> Result<(), StoreError> {
        let images = to_json(&record.images)?;
        let magnets = to_json(&record.magnets)?;
        let actresses = to_json(&record.actresses)?;
        let actresses_cn = to_json(&record.actresses_cn)?;
        let tags = to_json(&record.tags)?;
        let tags_cn = to_json(&record.tags_cn)?;
        let source = record.source.to_string();

        match existing_id {
            Some(id) => {
                conn.execute(
                    r#"UPDATE release_records SET
                        title = ?1, title_cn = ?2, size_label = ?3, is_uncensored = ?4,
                        images = ?5, magnets = ?6, source_url = ?7, studio = ?8,
                        studio_cn = ?9, actresses = ?10, actresses_cn = ?11, tags = ?12,
                        tags_cn = ?13, release_date = ?14, cover_url = ?15, source = ?16,
                        raw_text = ?17, updated_at = ?18
                       WHERE id = ?19"#,
                    params![
                        record.title,
                        record.title_cn,
                        record.size_label,
                        record.is_uncensored,
                        images,
                        magnets,
                        record.source_url,
                        record.studio,
                        record.studio_cn,
                        actresses,
                        actresses_cn,
                        tags,
                        tags_cn,
                        record.release_date,
                        record.cover_url,
                        source,
                        record.raw_text,
                        now,
                        id,
                    ],
                )
                .map_err(|e| StoreError::Database(e.to_string()))?;
            }
            None => {
                conn.execute(
                    r#"INSERT INTO release_records (
                        code, title, title_cn, size_label, is_uncensored, images, magnets,
                        source_url, studio, studio_cn, actresses, actresses_cn, tags, tags_cn,
                        release_date, cover_url, source, raw_text, created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                              ?15, ?16, ?17, ?18, ?19, ?20)"#,
                    params![
                        record.code,
                        record.title,
                        record.title_cn,
                        record.size_label,
                        record.is_uncensored,
                        images,
                        magnets,
                        record.source_url,
                        record.studio,
                        record.studio_cn,
                        actresses,
                        actresses_cn,
                        tags,
                        tags_cn,
                        record.release_date,
                        record.cover_url,
                        source,
                        record.raw_text,
                        now,
                        now,
                    ],
                )
                .map_err(|e| StoreError::Database(e.to_string()))?;
            }
        }

        Ok(())
    }

    fn load_by_code(
        conn: &Connection,
        code: &str,
    ) -> Result<Option<StoredRecord>, StoreError> {
        let mut stmt = conn
            .prepare(&format!("SELECT {} FROM release_records WHERE code = ?", COLUMNS))
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut rows = stmt
            .query_map(params![code], row_to_stored)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        match rows.next() {
            Some(row) => Ok(Some(row.map_err(|e| StoreError::Database(e.to_string()))?)),
            None => Ok(None),
        }
    }
}

const COLUMNS: &str = "id, code, title, title_cn, size_label, is_uncensored, images, magnets, \
     source_url, studio, studio_cn, actresses, actresses_cn, tags, tags_cn, release_date, \
     cover_url, source, raw_text, created_at, updated_at";

impl RecordStore for SqliteRecordStore {
    fn upsert(&self, record: &EnrichedRecord) -> Result<StoredRecord, StoreError> {
        record.validate_for_storage()?;
        let code = record.code.as_deref().unwrap_or_default().to_string();

        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::Database("store lock poisoned".to_string()))?;

        let now = Utc::now().to_rfc3339();
        let existing = Self::load_by_code(&conn, &code)?;

        match existing {
            Some(stored) => {
                let merged = merge_records(stored.record, record);
                Self::write_row(&conn, &merged, Some(stored.id), &now)?;
            }
            None => {
                Self::write_row(&conn, record, None, &now)?;
            }
        }

        Self::load_by_code(&conn, &code)?
            .ok_or_else(|| StoreError::Database("record vanished after upsert".to_string()))
    }

    fn get_by_code(&self, code: &str) -> Result<Option<StoredRecord>, StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::Database("store lock poisoned".to_string()))?;
        Self::load_by_code(&conn, code)
    }

    fn search(&self, keyword: &str, limit: u32) -> Result<Vec<StoredRecord>, StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::Database("store lock poisoned".to_string()))?;

        let pattern = format!("%{}%", keyword);
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM release_records
                 WHERE code LIKE ?1 OR title LIKE ?1 OR title_cn LIKE ?1 OR actresses_cn LIKE ?1
                 ORDER BY updated_at DESC LIMIT ?2",
                COLUMNS
            ))
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![pattern, limit], row_to_stored)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        collect_rows(rows)
    }

    fn recent(&self, limit: u32) -> Result<Vec<StoredRecord>, StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::Database("store lock poisoned".to_string()))?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM release_records ORDER BY updated_at DESC, id DESC LIMIT ?",
                COLUMNS
            ))
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![limit], row_to_stored)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        collect_rows(rows)
    }

    fn stats(&self) -> Result<StoreStats, StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::Database("store lock poisoned".to_string()))?;

        let total: u64 = conn
            .query_row("SELECT COUNT(*) FROM release_records", [], |r| r.get(0))
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let uncensored: u64 = conn
            .query_row(
                "SELECT COUNT(*) FROM release_records WHERE is_uncensored = 1",
                [],
                |r| r.get(0),
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(StoreStats {
            total,
            uncensored,
            censored: total - uncensored,
        })
    }
}

/// Merge an incoming record into the stored one: non-empty scalars win,
/// non-empty lists replace wholesale, everything else keeps the stored value.
fn merge_records(mut stored: EnrichedRecord, incoming: &EnrichedRecord) -> EnrichedRecord {
    merge_string(&mut stored.title, &incoming.title);
    merge_opt(&mut stored.title_cn, &incoming.title_cn);
    merge_opt(&mut stored.size_label, &incoming.size_label);
    stored.is_uncensored = incoming.is_uncensored;
    merge_string(&mut stored.source_url, &incoming.source_url);
    merge_opt(&mut stored.studio, &incoming.studio);
    merge_opt(&mut stored.studio_cn, &incoming.studio_cn);
    merge_list(&mut stored.images, &incoming.images);
    merge_list(&mut stored.magnets, &incoming.magnets);
    merge_list(&mut stored.actresses, &incoming.actresses);
    merge_list(&mut stored.actresses_cn, &incoming.actresses_cn);
    merge_list(&mut stored.tags, &incoming.tags);
    merge_list(&mut stored.tags_cn, &incoming.tags_cn);
    merge_opt(&mut stored.release_date, &incoming.release_date);
    merge_opt(&mut stored.cover_url, &incoming.cover_url);
    merge_string(&mut stored.raw_text, &incoming.raw_text);
    if incoming.source != MetadataSource::None {
        stored.source = incoming.source;
    }
    stored
}

fn merge_string(target: &mut String, incoming: &str) {
    if !incoming.is_empty() {
        *target = incoming.to_string();
    }
}

fn merge_opt(target: &mut Option<String>, incoming: &Option<String>) {
    if let Some(value) = incoming {
        if !value.is_empty() {
            *target = Some(value.clone());
        }
    }
}

fn merge_list(target: &mut Vec<String>, incoming: &[String]) {
    if !incoming.is_empty() {
        *target = incoming.to_vec();
    }
}

fn to_json(list: &[String]) -> Result<String, StoreError> {
    serde_json::to_string(list).map_err(|e| StoreError::Database(e.to_string()))
}

fn from_json(text: String) -> Vec<String> {
    serde_json::from_str(&text).unwrap_or_default()
}

fn parse_source(text: &str) -> MetadataSource {
    match text {
        "metatube" => MetadataSource::Metatube,
        "translated" => MetadataSource::Translated,
        _ => MetadataSource::None,
    }
}

fn parse_timestamp(text: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn row_to_stored(row: &Row<'_>) -> rusqlite::Result<StoredRecord> {
    let source: String = row.get(17)?;
    Ok(StoredRecord {
        id: row.get(0)?,
        record: EnrichedRecord {
            code: row.get(1)?,
            title: row.get(2)?,
            title_cn: row.get(3)?,
            size_label: row.get(4)?,
            is_uncensored: row.get(5)?,
            images: from_json(row.get(6)?),
            magnets: from_json(row.get(7)?),
            source_url: row.get(8)?,
            studio: row.get(9)?,
            studio_cn: row.get(10)?,
            actresses: from_json(row.get(11)?),
            actresses_cn: from_json(row.get(12)?),
            tags: from_json(row.get(13)?),
            tags_cn: from_json(row.get(14)?),
            release_date: row.get(15)?,
            cover_url: row.get(16)?,
            source: parse_source(&source),
            raw_text: row.get(18)?,
        },
        created_at: parse_timestamp(row.get(19)?),
        updated_at: parse_timestamp(row.get(20)?),
    })
}

fn collect_rows(
    rows: impl Iterator<Item = rusqlite::Result<StoredRecord>>,
) -> Result<Vec<StoredRecord>, StoreError> {
    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(|e| StoreError::Database(e.to_string()))?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DraftRecord, InvalidRecord};

    const MAGNET: &str = "magnet:?xt=urn:btih:1234567890abcdef1234567890abcdef12345678";

    fn record(code: &str) -> EnrichedRecord {
        let draft = DraftRecord {
            code: Some(code.to_string()),
            title: "STARS-123 Title".to_string(),
            raw_text: "body".to_string(),
            size_label: Some("3.5GB".to_string()),
            is_uncensored: true,
            images: vec!["https://img/a.jpg".to_string()],
            magnets: vec![MAGNET.to_string()],
            source_url: "https://example.com/thread-1-1-1.html".to_string(),
        };
        let mut rec = EnrichedRecord::from_draft(draft);
        rec.title_cn = Some("中文标题".to_string());
        rec.tags_cn = vec!["中文字幕".to_string()];
        rec.source = MetadataSource::Metatube;
        rec
    }

    #[test]
    fn test_insert_and_get() {
        let store = SqliteRecordStore::in_memory().unwrap();
        let stored = store.upsert(&record("STARS-123")).unwrap();

        assert_eq!(stored.record.code.as_deref(), Some("STARS-123"));
        assert_eq!(stored.record.title_cn.as_deref(), Some("中文标题"));
        assert_eq!(stored.record.tags_cn, vec!["中文字幕"]);
        assert_eq!(stored.record.source, MetadataSource::Metatube);

        let fetched = store.get_by_code("STARS-123").unwrap().unwrap();
        assert_eq!(fetched.id, stored.id);
    }

    #[test]
    fn test_upsert_rejects_invalid_records() {
        let store = SqliteRecordStore::in_memory().unwrap();

        let mut no_code = record("STARS-123");
        no_code.code = None;
        assert!(matches!(
            store.upsert(&no_code),
            Err(StoreError::Invalid(InvalidRecord::MissingCode))
        ));

        let mut no_magnets = record("STARS-123");
        no_magnets.magnets.clear();
        assert!(matches!(
            store.upsert(&no_magnets),
            Err(StoreError::Invalid(InvalidRecord::NoMagnets))
        ));

        assert_eq!(store.stats().unwrap().total, 0);
    }

    #[test]
    fn test_merge_empty_fields_do_not_overwrite() {
        let store = SqliteRecordStore::in_memory().unwrap();
        store.upsert(&record("STARS-123")).unwrap();

        let mut second = record("STARS-123");
        second.title_cn = None;
        second.tags_cn = Vec::new();
        second.studio = Some("SOD".to_string());
        second.source = MetadataSource::None;
        let merged = store.upsert(&second).unwrap();

        // Existing non-empty values survive the merge
        assert_eq!(merged.record.title_cn.as_deref(), Some("中文标题"));
        assert_eq!(merged.record.tags_cn, vec!["中文字幕"]);
        assert_eq!(merged.record.source, MetadataSource::Metatube);
        // New non-empty values land
        assert_eq!(merged.record.studio.as_deref(), Some("SOD"));
    }

    #[test]
    fn test_merge_lists_replaced_wholesale() {
        let store = SqliteRecordStore::in_memory().unwrap();
        store.upsert(&record("STARS-123")).unwrap();

        let other_magnet =
            "magnet:?xt=urn:btih:abcdefabcdefabcdefabcdefabcdefabcdefabcd".to_string();
        let mut second = record("STARS-123");
        second.magnets = vec![other_magnet.clone()];
        let merged = store.upsert(&second).unwrap();

        assert_eq!(merged.record.magnets, vec![other_magnet]);
    }

    #[test]
    fn test_upsert_same_code_keeps_one_row() {
        let store = SqliteRecordStore::in_memory().unwrap();
        store.upsert(&record("STARS-123")).unwrap();
        store.upsert(&record("STARS-123")).unwrap();
        assert_eq!(store.stats().unwrap().total, 1);
    }

    #[test]
    fn test_stats() {
        let store = SqliteRecordStore::in_memory().unwrap();
        store.upsert(&record("STARS-123")).unwrap();
        let mut censored = record("ABP-456");
        censored.is_uncensored = false;
        store.upsert(&censored).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.uncensored, 1);
        assert_eq!(stats.censored, 1);
    }

    #[test]
    fn test_search_matches_localized_fields() {
        let store = SqliteRecordStore::in_memory().unwrap();
        store.upsert(&record("STARS-123")).unwrap();

        let hits = store.search("中文", 10).unwrap();
        assert_eq!(hits.len(), 1);
        let hits = store.search("STARS", 10).unwrap();
        assert_eq!(hits.len(), 1);
        let hits = store.search("nomatch", 10).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_unicode_lists_round_trip_through_json_columns() {
        let store = SqliteRecordStore::in_memory().unwrap();
        let mut rec = record("STARS-123");
        rec.actresses_cn = vec!["三上悠亚".to_string(), "另一位".to_string()];
        store.upsert(&rec).unwrap();

        let fetched = store.get_by_code("STARS-123").unwrap().unwrap();
        assert_eq!(fetched.record.actresses_cn, vec!["三上悠亚", "另一位"]);
    }

    #[test]
    fn test_on_disk_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.db");

        {
            let store = SqliteRecordStore::new(&path).unwrap();
            store.upsert(&record("STARS-123")).unwrap();
        }

        let store = SqliteRecordStore::new(&path).unwrap();
        assert!(store.get_by_code("STARS-123").unwrap().is_some());
    }
}
