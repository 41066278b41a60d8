//! JSONL (JSON Lines) table files.
//!
//! Each line is one row of a ledger table.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::{StorageConfig, StorageError};

/// Ledger tables stored as JSONL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerTable {
    Leagues,
    LeagueMembers,
    Users,
    Games,
    GamePlayers,
    CashIns,
}

impl LedgerTable {
    /// Get the filename for this table.
    pub fn filename(&self) -> &'static str {
        match self {
            LedgerTable::Leagues => "leagues.jsonl",
            LedgerTable::LeagueMembers => "league_members.jsonl",
            LedgerTable::Users => "users.jsonl",
            LedgerTable::Games => "games.jsonl",
            LedgerTable::GamePlayers => "game_players.jsonl",
            LedgerTable::CashIns => "cash_ins.jsonl",
        }
    }
}

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    /// Create a new JSONL writer for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Create a writer for a ledger table.
    pub fn for_table(config: &StorageConfig, table: LedgerTable) -> Self {
        Self::new(config.table_path(table))
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Write rows, replacing the entire file.
    pub fn write_all(&self, rows: &[T]) -> Result<usize, StorageError> {
        self.ensure_dir()?;

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);

        for row in rows {
            let json = serde_json::to_string(row)?;
            writeln!(writer, "{}", json)?;
        }

        writer.flush()?;
        info!("Wrote {} rows to {:?}", rows.len(), self.path);

        Ok(rows.len())
    }
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    /// Create a new JSONL reader for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Create a reader for a ledger table.
    pub fn for_table(config: &StorageConfig, table: LedgerTable) -> Self {
        Self::new(config.table_path(table))
    }

    /// Read all rows from the file.
    ///
    /// A missing file is an empty table. Unparseable lines are skipped.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut rows = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;

            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    warn!("Failed to parse line {} in {:?}: {}", idx + 1, self.path, e);
                }
            }
        }

        debug!("Read {} rows from {:?}", rows.len(), self.path);
        Ok(rows)
    }

    /// Read rows matching a predicate.
    pub fn read_where<F>(&self, predicate: F) -> Result<Vec<T>, StorageError>
    where
        F: Fn(&T) -> bool,
    {
        let all = self.read_all()?;
        Ok(all.into_iter().filter(predicate).collect())
    }
}
