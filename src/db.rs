use crate::entities::{Location, LocationCategory, Sale};
use crate::error::StoreError;
use crate::store::LocationStore;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Event for audit trail ("Every change is an event")
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub data: serde_json::Value,
    pub actor: String,
}

impl Event {
    pub fn new(
        event_type: &str,
        entity_type: &str,
        entity_id: &str,
        data: serde_json::Value,
        actor: &str,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            data,
            actor: actor.to_string(),
        }
    }
}

pub fn setup_database(conn: &Connection) -> rusqlite::Result<()> {
    // Enable WAL mode for crash recovery (in-memory databases report "memory")
    conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;

    // ==========================================================================
    // Locations Table
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS locations (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT UNIQUE NOT NULL,
            name TEXT NOT NULL,
            category TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Sales Table (location is a weak reference by name, no foreign key)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS sales (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT UNIQUE NOT NULL,
            idempotency_hash TEXT NOT NULL,
            date TEXT NOT NULL,
            location TEXT NOT NULL,
            amount REAL NOT NULL,
            reference TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // ==========================================================================
    // Events Table (audit trail)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT UNIQUE NOT NULL,
            timestamp TEXT NOT NULL,
            event_type TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            data TEXT NOT NULL,
            actor TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_sales_location ON sales(location)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_sales_hash ON sales(idempotency_hash)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_entity ON events(entity_type, entity_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events(timestamp)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// CSV IMPORT
// ============================================================================

#[derive(Debug, Deserialize)]
struct LocationRecord {
    name: String,
    category: String,
    #[serde(default)]
    id: Option<String>,
}

/// Load locations from CSV (`name,category[,id]`)
pub fn load_locations_csv(csv_path: &Path) -> Result<Vec<Location>> {
    let mut rdr = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open CSV file {}", csv_path.display()))?;

    let mut locations = Vec::new();

    for (line, result) in rdr.deserialize().enumerate() {
        let record: LocationRecord = result.context("Failed to deserialize location")?;
        let category: LocationCategory = record
            .category
            .parse()
            .with_context(|| format!("Invalid category on data row {}", line + 1))?;

        let location = match record.id.filter(|id| !id.trim().is_empty()) {
            Some(id) => Location::with_id(id.trim(), record.name.trim(), category),
            None => Location::new(record.name.trim(), category),
        };
        locations.push(location);
    }

    Ok(locations)
}

#[derive(Debug, Deserialize)]
struct SaleRecord {
    date: String,
    location: String,
    amount: f64,
    #[serde(default)]
    reference: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

/// Load sales from CSV (`date,location,amount[,reference][,id]`)
///
/// Rows without an id get `Sale::import_id`, numbered per distinct content,
/// so identical rows are separate sales and a re-import of the same file
/// produces the same ids.
pub fn load_sales_csv(csv_path: &Path) -> Result<Vec<Sale>> {
    let mut rdr = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open CSV file {}", csv_path.display()))?;

    let mut sales = Vec::new();
    let mut occurrences: HashMap<String, usize> = HashMap::new();

    for result in rdr.deserialize() {
        let record: SaleRecord = result.context("Failed to deserialize sale")?;

        let mut sale = Sale::new(record.date, record.location, record.amount);
        if let Some(reference) = record.reference.filter(|r| !r.trim().is_empty()) {
            sale = sale.with_reference(reference);
        }

        sale.id = match record.id.filter(|id| !id.trim().is_empty()) {
            Some(id) => id.trim().to_string(),
            None => {
                let seen = occurrences.entry(sale.compute_idempotency_hash()).or_insert(0);
                let id = sale.import_id(*seen);
                *seen += 1;
                id
            }
        };

        sales.push(sale);
    }

    Ok(sales)
}

// ============================================================================
// WRITES
// ============================================================================

/// Insert locations, skipping ids that already exist
pub fn insert_locations(conn: &Connection, locations: &[Location]) -> Result<usize> {
    let mut inserted = 0;

    for location in locations {
        let changed = conn.execute(
            "INSERT OR IGNORE INTO locations (id, name, category, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                location.id,
                location.name,
                location.category.as_str(),
                location.created_at.to_rfc3339(),
            ],
        )?;

        if changed > 0 {
            inserted += 1;
            log_event(conn, "location_created", location, "csv_importer");
        }
    }

    tracing::info!(inserted, skipped = locations.len() - inserted, "imported locations");
    Ok(inserted)
}

/// Insert sales, skipping ids that are already stored
pub fn insert_sales(conn: &Connection, sales: &[Sale]) -> Result<usize> {
    let mut inserted = 0;
    let mut duplicates = 0;

    for sale in sales {
        let hash = sale.compute_idempotency_hash();

        let result = conn.execute(
            "INSERT INTO sales (id, idempotency_hash, date, location, amount, reference)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                sale.id,
                hash,
                sale.date,
                sale.location,
                sale.amount,
                sale.reference,
            ],
        );

        match result {
            Ok(_) => {
                inserted += 1;

                let event = Event::new(
                    "sale_added",
                    "sale",
                    &sale.id,
                    serde_json::json!({
                        "location": sale.location,
                        "amount": sale.amount,
                        "date": sale.date,
                    }),
                    "csv_importer",
                );
                if let Err(err) = insert_event(conn, &event) {
                    tracing::warn!(error = %err, sale_id = %sale.id, "failed to record sale event");
                }
            }
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                duplicates += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!(inserted, duplicates, "imported sales");
    Ok(inserted)
}

/// Insert event into audit trail
pub fn insert_event(conn: &Connection, event: &Event) -> Result<(), StoreError> {
    let data_json = serde_json::to_string(&event.data)?;

    conn.execute(
        "INSERT INTO events (
            event_id, timestamp, event_type, entity_type, entity_id, data, actor
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.event_id,
            event.timestamp.to_rfc3339(),
            event.event_type,
            event.entity_type,
            event.entity_id,
            data_json,
            event.actor,
        ],
    )?;

    Ok(())
}

fn log_event(conn: &Connection, event_type: &str, location: &Location, actor: &str) {
    let event = Event::new(
        event_type,
        "location",
        &location.id,
        serde_json::json!({
            "name": location.name,
            "category": location.category.as_str(),
        }),
        actor,
    );

    // The audit trail is best-effort; the mutation itself already happened
    if let Err(err) = insert_event(conn, &event) {
        tracing::warn!(error = %err, event_type, location_id = %location.id, "failed to record event");
    }
}

// ============================================================================
// READS
// ============================================================================

/// Get events for a specific entity, newest first
pub fn get_events_for_entity(
    conn: &Connection,
    entity_type: &str,
    entity_id: &str,
) -> Result<Vec<Event>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT event_id, timestamp, event_type, entity_type, entity_id, data, actor
         FROM events
         WHERE entity_type = ?1 AND entity_id = ?2
         ORDER BY timestamp DESC, id DESC",
    )?;

    let events = stmt
        .query_map(params![entity_type, entity_id], |row| {
            let data_json: String = row.get(5)?;

            Ok(Event {
                event_id: row.get(0)?,
                timestamp: parse_timestamp(row, 1)?,
                event_type: row.get(2)?,
                entity_type: row.get(3)?,
                entity_id: row.get(4)?,
                data: serde_json::from_str(&data_json).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e))
                })?,
                actor: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(events)
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn location_from_row(row: &Row<'_>) -> rusqlite::Result<Location> {
    let category_code: String = row.get(2)?;
    let category = category_code
        .parse::<LocationCategory>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;

    Ok(Location {
        id: row.get(0)?,
        name: row.get(1)?,
        category,
        created_at: parse_timestamp(row, 3)?,
    })
}

fn sale_from_row(row: &Row<'_>) -> rusqlite::Result<Sale> {
    Ok(Sale {
        id: row.get(0)?,
        date: row.get(1)?,
        location: row.get(2)?,
        amount: row.get(3)?,
        reference: row.get(4)?,
    })
}

pub fn get_all_locations(conn: &Connection) -> Result<Vec<Location>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, category, created_at
         FROM locations
         ORDER BY seq ASC",
    )?;

    let locations = stmt
        .query_map([], location_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(locations)
}

pub fn get_location(conn: &Connection, id: &str) -> Result<Option<Location>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, category, created_at
         FROM locations
         WHERE id = ?1",
    )?;

    let mut rows = stmt.query_map([id], location_from_row)?;
    Ok(rows.next().transpose()?)
}

pub fn get_all_sales(conn: &Connection) -> Result<Vec<Sale>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, date, location, amount, reference
         FROM sales
         ORDER BY seq ASC",
    )?;

    let sales = stmt
        .query_map([], sale_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(sales)
}

/// Sales recorded under a location name (dashboard view)
pub fn get_sales_for_location(conn: &Connection, name: &str) -> Result<Vec<Sale>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, date, location, amount, reference
         FROM sales
         WHERE location = ?1
         ORDER BY date DESC, seq DESC",
    )?;

    let sales = stmt
        .query_map([name], sale_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(sales)
}

pub fn count_sales(conn: &Connection) -> Result<i64, StoreError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM sales", [], |row| row.get(0))?;

    Ok(count)
}

// ============================================================================
// SQLITE STORE
// ============================================================================

/// `LocationStore` backed by a single SQLite connection
pub struct SqliteStore {
    conn: Connection,
    revision: AtomicU64,
    /// Last `PRAGMA data_version` seen; moves when another connection commits
    data_version: AtomicU64,
}

impl SqliteStore {
    /// Open (or create) the database file and ensure the schema exists
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        setup_database(&conn).context("Failed to set up database schema")?;
        tracing::debug!(path = %path.display(), "opened location database");

        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        setup_database(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        SqliteStore {
            conn,
            revision: AtomicU64::new(0),
            data_version: AtomicU64::new(0),
        }
    }

    /// Raw connection for import and reporting helpers
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn import_locations(&self, locations: &[Location]) -> Result<usize> {
        let inserted = insert_locations(&self.conn, locations)?;
        if inserted > 0 {
            self.bump();
        }
        Ok(inserted)
    }

    pub fn import_sales(&self, sales: &[Sale]) -> Result<usize> {
        let inserted = insert_sales(&self.conn, sales)?;
        if inserted > 0 {
            self.bump();
        }
        Ok(inserted)
    }

    pub fn location(&self, id: &str) -> Result<Option<Location>, StoreError> {
        get_location(&self.conn, id)
    }

    pub fn sales_for_location(&self, name: &str) -> Result<Vec<Sale>, StoreError> {
        get_sales_for_location(&self.conn, name)
    }

    /// Audit trail of one location, newest first
    pub fn history(&self, location_id: &str) -> Result<Vec<Event>, StoreError> {
        get_events_for_entity(&self.conn, "location", location_id)
    }

    fn bump(&self) {
        self.revision.fetch_add(1, Ordering::SeqCst);
    }
}

impl LocationStore for SqliteStore {
    fn locations(&self) -> Result<Vec<Location>, StoreError> {
        get_all_locations(&self.conn)
    }

    fn sales(&self) -> Result<Vec<Sale>, StoreError> {
        get_all_sales(&self.conn)
    }

    fn create_location(
        &self,
        name: &str,
        category: LocationCategory,
    ) -> Result<Location, StoreError> {
        let location = Location::new(name, category);

        self.conn.execute(
            "INSERT INTO locations (id, name, category, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                location.id,
                location.name,
                location.category.as_str(),
                location.created_at.to_rfc3339(),
            ],
        )?;

        log_event(&self.conn, "location_created", &location, "user");
        self.bump();
        tracing::info!(location_id = %location.id, name = %location.name, "location created");

        Ok(location)
    }

    fn update_location(&self, location: &Location) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE locations SET name = ?1, category = ?2 WHERE id = ?3",
            params![location.name, location.category.as_str(), location.id],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(location.id.clone()));
        }

        log_event(&self.conn, "location_updated", location, "user");
        self.bump();
        tracing::info!(location_id = %location.id, "location updated");

        Ok(())
    }

    fn delete_location(&self, id: &str) -> Result<(), StoreError> {
        let existing = get_location(&self.conn, id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        self.conn
            .execute("DELETE FROM locations WHERE id = ?1", [id])?;

        log_event(&self.conn, "location_deleted", &existing, "user");
        self.bump();
        tracing::info!(location_id = %id, "location deleted");

        Ok(())
    }

    /// Local mutations plus commits made by other connections
    /// (other processes) to the same database file.
    fn revision(&self) -> u64 {
        match self
            .conn
            .query_row("PRAGMA data_version", [], |row| row.get::<_, i64>(0))
        {
            Ok(version) => self.data_version.store(version as u64, Ordering::SeqCst),
            Err(err) => tracing::warn!(error = %err, "failed to read data_version"),
        }

        self.revision
            .load(Ordering::SeqCst)
            .wrapping_add(self.data_version.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    #[test]
    fn test_location_crud_roundtrip() {
        let store = store();

        let park = store
            .create_location("Park", LocationCategory::DailyRotation)
            .unwrap();
        let fair = store
            .create_location("County Fair", LocationCategory::SpecialEvent)
            .unwrap();

        let all = store.locations().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], park);
        assert_eq!(all[1].category, LocationCategory::SpecialEvent);

        store
            .update_location(&fair.edited("Spring Fair", LocationCategory::SpecialEvent))
            .unwrap();
        let updated = store.location(&fair.id).unwrap().unwrap();
        assert_eq!(updated.name, "Spring Fair");
        assert_eq!(updated.created_at, fair.created_at);

        store.delete_location(&park.id).unwrap();
        let remaining = store.locations().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, fair.id);
    }

    #[test]
    fn test_delete_missing_location_is_not_found() {
        let store = store();

        let before = store.revision();

        let err = store.delete_location("does-not-exist").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.revision(), before);
    }

    #[test]
    fn test_update_missing_location_is_not_found() {
        let store = store();
        let ghost = Location::new("Ghost", LocationCategory::DailyRotation);

        assert!(store.update_location(&ghost).unwrap_err().is_not_found());
    }

    #[test]
    fn test_sales_import_twice_skips_duplicates() {
        let store = store();
        let sales = vec![
            Sale::new("2024-06-01", "Park", 12.0),
            Sale::new("2024-06-01", "Park", 8.5),
            Sale::new("2024-06-02", "Mall", 20.0),
        ];

        let inserted1 = store.import_sales(&sales).unwrap();
        let revision1 = store.revision();
        let inserted2 = store.import_sales(&sales).unwrap();

        assert_eq!(inserted1, 3);
        assert_eq!(inserted2, 0, "second import should insert nothing");
        assert_eq!(count_sales(store.connection()).unwrap(), 3);
        assert_eq!(store.revision(), revision1, "no-op import keeps revision");
    }

    #[test]
    fn test_identical_sales_are_all_counted() {
        let store = store();
        store
            .create_location("Park", LocationCategory::DailyRotation)
            .unwrap();
        store
            .create_location("Mall", LocationCategory::DailyRotation)
            .unwrap();

        let inserted = store
            .import_sales(&[
                Sale::new("2024-06-01", "Park", 5.0),
                Sale::new("2024-06-01", "Park", 5.0),
                Sale::new("2024-06-01", "Park", 5.0),
                Sale::new("2024-06-01", "Mall", 2.0),
                Sale::new("2024-06-01", "Mall", 3.0),
            ])
            .unwrap();
        assert_eq!(inserted, 5);

        let snapshot = store.snapshot().unwrap();
        let ranked = crate::performance::aggregate(&snapshot.locations, &snapshot.sales);
        assert_eq!(ranked[0].location.name, "Park");
        assert_eq!(ranked[0].transactions, 3);
        assert_eq!(ranked[0].score, 100.0);
        assert_eq!(ranked[1].transactions, 2);
    }

    #[test]
    fn test_csv_identical_rows_import_once_each() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(
            &path,
            "date,location,amount\n\
             2024-06-01,Park,5.00\n\
             2024-06-01,Park,5.00\n\
             2024-06-01,Park,5.00\n",
        )
        .unwrap();
        let store = store();

        let first = store.import_sales(&load_sales_csv(&path).unwrap()).unwrap();
        let second = store.import_sales(&load_sales_csv(&path).unwrap()).unwrap();

        assert_eq!(first, 3);
        assert_eq!(second, 0, "re-import of the same file adds nothing");
        assert_eq!(store.sales_for_location("Park").unwrap().len(), 3);
    }

    #[test]
    fn test_csv_explicit_ids_keep_same_content_apart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(
            &path,
            "date,location,amount,reference,id\n\
             2024-06-01,Park,5.00,,s-1\n\
             2024-06-01,Park,5.00,,s-2\n",
        )
        .unwrap();

        let sales = load_sales_csv(&path).unwrap();
        assert_eq!(sales[0].id, "s-1");
        assert_eq!(sales[1].id, "s-2");
        assert_eq!(store().import_sales(&sales).unwrap(), 2);
    }

    #[test]
    fn test_revision_sees_other_connection_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locations.db");
        let reader = SqliteStore::open(&path).unwrap();
        let writer = SqliteStore::open(&path).unwrap();

        let before = reader.revision();
        writer
            .create_location("Harbor", LocationCategory::SpecialEvent)
            .unwrap();

        assert_ne!(reader.revision(), before);
        assert_eq!(reader.locations().unwrap().len(), 1);
    }

    #[test]
    fn test_sales_for_location() {
        let store = store();
        store
            .import_sales(&[
                Sale::new("2024-06-01", "Park", 12.0),
                Sale::new("2024-06-03", "Park", 4.0),
                Sale::new("2024-06-02", "Mall", 20.0),
            ])
            .unwrap();

        let park_sales = store.sales_for_location("Park").unwrap();
        assert_eq!(park_sales.len(), 2);
        assert_eq!(park_sales[0].date, "2024-06-03");
    }

    #[test]
    fn test_mutations_write_audit_events() {
        let store = store();

        let park = store
            .create_location("Park", LocationCategory::DailyRotation)
            .unwrap();
        store.delete_location(&park.id).unwrap();

        let events = get_events_for_entity(store.connection(), "location", &park.id).unwrap();
        let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();

        assert_eq!(events.len(), 2);
        assert!(types.contains(&"location_created"));
        assert!(types.contains(&"location_deleted"));
        assert!(events.iter().all(|e| e.data["name"] == "Park"));
        assert_eq!(store.history(&park.id).unwrap().len(), 2);
    }

    #[test]
    fn test_import_locations_is_idempotent_by_id() {
        let store = store();
        let locations = vec![
            Location::with_id("loc-1", "Park", LocationCategory::DailyRotation),
            Location::with_id("loc-2", "Mall", LocationCategory::DailyRotation),
        ];

        assert_eq!(store.import_locations(&locations).unwrap(), 2);
        assert_eq!(store.import_locations(&locations).unwrap(), 0);
        assert_eq!(store.locations().unwrap().len(), 2);
    }

    #[test]
    fn test_load_csv_files() {
        let dir = tempfile::tempdir().unwrap();

        let locations_path = dir.path().join("locations.csv");
        let mut file = std::fs::File::create(&locations_path).unwrap();
        writeln!(file, "name,category,id").unwrap();
        writeln!(file, "Park,DAILY_ROTATION,loc-1").unwrap();
        writeln!(file, "Harvest Fair,Special Event,").unwrap();

        let sales_path = dir.path().join("sales.csv");
        let mut file = std::fs::File::create(&sales_path).unwrap();
        writeln!(file, "date,location,amount,reference").unwrap();
        writeln!(file, "2024-06-01,Park,12.50,R-1").unwrap();
        writeln!(file, "2024-06-01,Harvest Fair,3.00,").unwrap();

        let locations = load_locations_csv(&locations_path).unwrap();
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].id, "loc-1");
        assert_eq!(locations[1].category, LocationCategory::SpecialEvent);
        assert!(!locations[1].id.is_empty());

        let sales = load_sales_csv(&sales_path).unwrap();
        assert_eq!(sales.len(), 2);
        assert_eq!(sales[0].reference.as_deref(), Some("R-1"));
        assert_eq!(sales[1].reference, None);
        assert_eq!(sales[1].amount, 3.0);
    }

    #[test]
    fn test_load_csv_rejects_unknown_category() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locations.csv");
        std::fs::write(&path, "name,category\nDepot,WAREHOUSE\n").unwrap();

        assert!(load_locations_csv(&path).is_err());
    }

    #[test]
    fn test_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locations.db");

        let id = {
            let store = SqliteStore::open(&path).unwrap();
            store
                .create_location("Park", LocationCategory::DailyRotation)
                .unwrap()
                .id
        };

        let reopened = SqliteStore::open(&path).unwrap();
        let locations = reopened.locations().unwrap();
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].id, id);
    }
}
