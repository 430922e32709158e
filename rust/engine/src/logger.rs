use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::action::ActionType;
use crate::cards::Card;
use crate::events::{EventSink, GameEvent};
use crate::phase::Phase;

/// One applied action, with the chip movement it caused.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub hand_number: u64,
    pub phase: Phase,
    /// 1-based position of the action within its street
    pub street_index: u32,
    pub seat: usize,
    pub action_type: ActionType,
    /// Chips moved from the stack by this action
    pub amount: u32,
    /// Pot plus uncollected street bets, before and after
    pub pot_before: u32,
    pub pot_after: u32,
    pub chips_before: u32,
    pub chips_after: u32,
}

/// Complete history of one hand, written as one JSON line.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandRecord {
    /// `YYYYMMDD-NNNNNN`
    pub hand_id: String,
    pub hand_number: u64,
    pub seed: Option<u64>,
    pub dealer: usize,
    pub actions: Vec<ActionRecord>,
    pub board: Vec<Card>,
    /// Short human-readable outcome
    pub result: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub showdown: Option<ShowdownInfo>,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ShowdownInfo {
    pub winners: Vec<usize>,
    #[serde(default)]
    pub notes: Option<String>,
}

pub fn format_hand_id(yyyymmdd: &str, seq: u32) -> String {
    format!("{}-{:06}", yyyymmdd, seq)
}

/// Writes [`HandRecord`]s as JSON lines and hands out sequential ids.
pub struct HandLogger {
    writer: Option<Box<dyn Write>>,
    date: String,
    seq: u32,
}

impl HandLogger {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let f = File::create(path)?;
        Ok(Self::from_writer(BufWriter::new(f)))
    }

    pub fn from_writer<W: Write + 'static>(writer: W) -> Self {
        Self {
            writer: Some(Box::new(writer)),
            date: Utc::now().format("%Y%m%d").to_string(),
            seq: 0,
        }
    }

    /// Logger that only numbers hands, for a fixed date.
    pub fn with_seq_for_test(date: &str) -> Self {
        Self {
            writer: None,
            date: date.to_string(),
            seq: 0,
        }
    }

    pub fn next_id(&mut self) -> String {
        self.seq += 1;
        format_hand_id(&self.date, self.seq)
    }

    pub fn write(&mut self, record: &HandRecord) -> std::io::Result<()> {
        let mut rec = record.clone();
        if rec.ts.is_none() {
            rec.ts = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        let line = serde_json::to_string(&rec).map_err(std::io::Error::other)?;
        if let Some(w) = &mut self.writer {
            w.write_all(line.as_bytes())?;
            w.write_all(b"\n")?;
            w.flush()?;
        }
        Ok(())
    }
}

/// Event sink that writes each event as one JSON line.
///
/// Write failures are logged and otherwise ignored so that a full disk never
/// interrupts a hand.
pub struct JsonlSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonlSink<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> EventSink for JsonlSink<W> {
    fn publish(&mut self, event: &GameEvent) {
        let res = serde_json::to_writer(&mut self.writer, event)
            .map_err(std::io::Error::other)
            .and_then(|_| self.writer.write_all(b"\n"))
            .and_then(|_| self.writer.flush());
        if let Err(e) = res {
            tracing::warn!(error = %e, event = event.name(), "failed to write event");
        }
    }
}
