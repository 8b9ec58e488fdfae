//! SQLite chronicle: the append-only history of monthly report entries.
//!
//! RULE: Only store.rs talks to the database.
//! The engine calls store methods; nothing else executes SQL.

use rusqlite::{params, Connection, Row};
use serde::Deserialize;
use crate::{
    clock::GameDate,
    error::{SimError, SimResult},
    event::{EventType, Impact, MonthlyEvent, Severity},
};

/// Filters for a history search. Every field is optional; an empty
/// query returns the whole chronicle.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HistoryQuery {
    pub kind: Option<EventType>,
    /// Inclusive lower bound.
    pub from: Option<GameDate>,
    /// Inclusive upper bound.
    pub to:   Option<GameDate>,
    /// Case-insensitive match on title or description.
    pub text: Option<String>,
}

impl HistoryQuery {
    pub fn kind(mut self, kind: EventType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn between(mut self, from: GameDate, to: GameDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

pub struct SimStore {
    conn: Connection,
}

const SELECT_COLUMNS: &str =
    "SELECT id, kind, title, description, impacts_json, year, month, severity FROM chronicle";

impl SimStore {
    /// Open an in-memory chronicle. History lives only as long as the session.
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn.execute_batch(include_str!("../../migrations/001_chronicle.sql"))?;
        Ok(())
    }

    pub fn append_event(&self, event: &MonthlyEvent) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO chronicle
                (id, kind, title, description, impacts_json, year, month, ordinal, severity)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                event.id,
                event.kind.as_str(),
                event.title,
                event.description,
                serde_json::to_string(&event.impacts)?,
                event.date.year,
                event.date.month,
                event.date.ordinal(),
                event.severity.as_str(),
            ],
        )?;
        Ok(())
    }

    /// Every entry, oldest first.
    pub fn all_events(&self) -> SimResult<Vec<MonthlyEvent>> {
        let mut stmt = self.conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY seq ASC"))?;
        let rows = stmt.query_map([], read_row)?.collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(decode).collect()
    }

    /// The monthly report: every entry dated `date`, in insertion order.
    pub fn events_for_date(&self, date: GameDate) -> SimResult<Vec<MonthlyEvent>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_COLUMNS} WHERE ordinal = ?1 ORDER BY seq ASC"))?;
        let rows = stmt
            .query_map(params![date.ordinal()], read_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(decode).collect()
    }

    /// Filtered history, newest month first. Entries from the same month
    /// keep their insertion order.
    pub fn search(&self, query: &HistoryQuery) -> SimResult<Vec<MonthlyEvent>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_COLUMNS}
             WHERE (?1 IS NULL OR kind = ?1)
               AND (?2 IS NULL OR ordinal >= ?2)
               AND (?3 IS NULL OR ordinal <= ?3)
             ORDER BY ordinal DESC, seq ASC"
        ))?;
        let rows = stmt
            .query_map(
                params![
                    query.kind.map(|k| k.as_str()),
                    query.from.map(GameDate::ordinal),
                    query.to.map(GameDate::ordinal),
                ],
                read_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        // Text matching stays in Rust: SQLite's LOWER() only folds ASCII.
        let needle = query.text.as_deref().map(str::to_lowercase);
        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            let event = decode(row)?;
            let keep = needle.as_deref().map_or(true, |n| {
                event.title.to_lowercase().contains(n)
                    || event.description.to_lowercase().contains(n)
            });
            if keep {
                events.push(event);
            }
        }
        Ok(events)
    }

    pub fn count(&self) -> SimResult<i64> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM chronicle", [], |row| row.get(0))?;
        Ok(n)
    }
}

/// Raw column values. Decoded outside the rusqlite closure; JSON and enum
/// failures surface as `SimError`.
struct RawRow {
    id:           String,
    kind:         String,
    title:        String,
    description:  String,
    impacts_json: String,
    year:         i32,
    month:        u32,
    severity:     String,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        id:           row.get(0)?,
        kind:         row.get(1)?,
        title:        row.get(2)?,
        description:  row.get(3)?,
        impacts_json: row.get(4)?,
        year:         row.get(5)?,
        month:        row.get(6)?,
        severity:     row.get(7)?,
    })
}

fn decode(raw: RawRow) -> SimResult<MonthlyEvent> {
    let kind = EventType::parse(&raw.kind)
        .ok_or_else(|| SimError::Other(anyhow::anyhow!("unknown event kind '{}'", raw.kind)))?;
    let severity = Severity::parse(&raw.severity)
        .ok_or_else(|| SimError::Other(anyhow::anyhow!("unknown severity '{}'", raw.severity)))?;
    let impacts: Vec<Impact> = serde_json::from_str(&raw.impacts_json)?;
    Ok(MonthlyEvent {
        id: raw.id,
        kind,
        title: raw.title,
        description: raw.description,
        impacts,
        date: GameDate::new(raw.year, raw.month),
        severity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventDraft;

    fn store() -> SimStore {
        let store = SimStore::in_memory().expect("in-memory store");
        store.migrate().expect("migration");
        store
    }

    #[test]
    fn entries_round_trip_through_the_table() {
        let store = store();
        let event = EventDraft::new(EventType::Crisis, "Famine", "Food ran out.")
            .impact(Impact::note("Everyone is hungry"))
            .severity(Severity::Negative)
            .dated(GameDate::new(2157, 3));
        store.append_event(&event).unwrap();

        let all = store.all_events().unwrap();
        assert_eq!(all, vec![event]);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn migration_is_idempotent() {
        let store = store();
        store.migrate().unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }
}
