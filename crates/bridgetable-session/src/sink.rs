//! Where finished rounds go.
//!
//! A [`HistorySink`] is called once per finished round and once more when
//! a session is torn down with its full round history. Sinks are
//! synchronous; the session actor runs them on the blocking pool and
//! only logs their failures.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use bridgetable_game::RoundHistoryRecord;
use bridgetable_protocol::SessionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::SinkError;

/// End-of-life snapshot of a session's rounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionArchive {
    pub game_id: SessionId,
    pub saved_at: DateTime<Utc>,
    pub total_games: usize,
    pub games: Vec<RoundHistoryRecord>,
}

impl SessionArchive {
    pub fn new(game_id: SessionId, games: Vec<RoundHistoryRecord>) -> Self {
        Self {
            game_id,
            saved_at: Utc::now(),
            total_games: games.len(),
            games,
        }
    }
}

/// Receives round history from session actors.
pub trait HistorySink: Send + Sync + 'static {
    /// Called once for every finished or passed-out round.
    fn record_round(&self, session: &SessionId, record: &RoundHistoryRecord)
    -> Result<(), SinkError>;

    /// Called at teardown for sessions with at least one recorded round.
    fn archive(&self, archive: &SessionArchive) -> Result<(), SinkError>;
}

// ---------------------------------------------------------------------------
// JsonFileSink
// ---------------------------------------------------------------------------

/// Writes JSON files under a directory.
///
/// - `game_<code>.rounds.jsonl`: one line per finished round, appended as
///   rounds finish.
/// - `game_<code>_<YYYYmmdd_HHMMSS>.json`: the pretty-printed archive
///   written at teardown.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn archive_path(&self, archive: &SessionArchive) -> PathBuf {
        self.dir.join(format!(
            "game_{}_{}.json",
            archive.game_id,
            archive.saved_at.format("%Y%m%d_%H%M%S")
        ))
    }

    pub fn journal_path(&self, session: &SessionId) -> PathBuf {
        self.dir.join(format!("game_{session}.rounds.jsonl"))
    }
}

impl HistorySink for JsonFileSink {
    fn record_round(
        &self,
        session: &SessionId,
        record: &RoundHistoryRecord,
    ) -> Result<(), SinkError> {
        fs::create_dir_all(&self.dir)?;
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.journal_path(session))?;
        file.write_all(&line)?;
        Ok(())
    }

    fn archive(&self, archive: &SessionArchive) -> Result<(), SinkError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.archive_path(archive);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, archive)?;
        writer.flush()?;
        tracing::info!(
            session_id = %archive.game_id,
            rounds = archive.total_games,
            path = %path.display(),
            "session history archived"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemorySink / NullSink
// ---------------------------------------------------------------------------

/// Keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    rounds: Mutex<Vec<(SessionId, RoundHistoryRecord)>>,
    archives: Mutex<Vec<SessionArchive>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rounds(&self) -> Vec<(SessionId, RoundHistoryRecord)> {
        self.rounds.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn archives(&self) -> Vec<SessionArchive> {
        self.archives.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

impl HistorySink for MemorySink {
    fn record_round(
        &self,
        session: &SessionId,
        record: &RoundHistoryRecord,
    ) -> Result<(), SinkError> {
        self.rounds
            .lock()
            .map_err(|_| SinkError::Poisoned)?
            .push((session.clone(), record.clone()));
        Ok(())
    }

    fn archive(&self, archive: &SessionArchive) -> Result<(), SinkError> {
        self.archives
            .lock()
            .map_err(|_| SinkError::Poisoned)?
            .push(archive.clone());
        Ok(())
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl HistorySink for NullSink {
    fn record_round(&self, _: &SessionId, _: &RoundHistoryRecord) -> Result<(), SinkError> {
        Ok(())
    }

    fn archive(&self, _: &SessionArchive) -> Result<(), SinkError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridgetable_game::{ScoreReport, Vulnerability};

    fn passed_out_record(game_number: u32) -> RoundHistoryRecord {
        RoundHistoryRecord {
            game_number,
            timestamp: Utc::now(),
            vulnerability: Vulnerability::for_round(game_number),
            bidding_history: Vec::new(),
            contract: None,
            play_history: Vec::new(),
            tricks_won: [0; 4],
            score: ScoreReport::passed_out(),
            declarer: None,
            dummy: None,
            passed_out: true,
        }
    }

    #[test]
    fn test_json_file_sink_writes_pretty_archive() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileSink::new(dir.path().join("history"));
        let archive = SessionArchive::new(
            SessionId::new("abc123"),
            vec![passed_out_record(1), passed_out_record(2)],
        );

        sink.archive(&archive).unwrap();

        let path = sink.archive_path(&archive);
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("game_abc123_"));
        assert!(name.ends_with(".json"));

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains('\n'), "archive should be pretty-printed");
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["game_id"], "abc123");
        assert_eq!(json["total_games"], 2);
        assert_eq!(json["games"][1]["game_number"], 2);
        assert!(json["saved_at"].is_string());
    }

    #[test]
    fn test_json_file_sink_appends_round_journal() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileSink::new(dir.path());
        let session = SessionId::new("xyz789");

        sink.record_round(&session, &passed_out_record(1)).unwrap();
        sink.record_round(&session, &passed_out_record(2)).unwrap();

        let text = fs::read_to_string(sink.journal_path(&session)).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: RoundHistoryRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.game_number, 2);
    }

    #[test]
    fn test_json_file_sink_unwritable_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("occupied");
        fs::write(&blocker, b"not a directory").unwrap();
        let sink = JsonFileSink::new(&blocker);
        let archive = SessionArchive::new(SessionId::new("abc123"), vec![passed_out_record(1)]);
        assert!(matches!(sink.archive(&archive), Err(SinkError::Io(_))));
    }

    #[test]
    fn test_memory_sink_collects() {
        let sink = MemorySink::new();
        let session = SessionId::new("abc123");
        sink.record_round(&session, &passed_out_record(1)).unwrap();
        sink.archive(&SessionArchive::new(session.clone(), vec![passed_out_record(1)]))
            .unwrap();
        assert_eq!(sink.rounds().len(), 1);
        assert_eq!(sink.rounds()[0].0, session);
        assert_eq!(sink.archives()[0].total_games, 1);
    }
}
