use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use notary_types::{LedgerAddress, LedgerEntry, TransactionId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::LedgerError;
use crate::memory::now_secs;
use crate::records::{PendingTx, Receipt, ReceiptStatus, SubmitRequest};
use crate::traits::{LedgerReader, LedgerWriter};

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 8;

/// One committed submission as stored on disk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct FileRecord {
    address: LedgerAddress,
    transaction_id: TransactionId,
    transaction_hash: String,
    entry: LedgerEntry,
}

/// Result of scanning the ledger file.
struct Scan {
    records: Vec<FileRecord>,
    /// Byte offset just past the last complete frame.
    valid_len: u64,
}

/// Append-only ledger backed by a single local file.
///
/// Every accepted submission is appended as one frame:
/// ```text
/// [4 bytes: payload length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized record)]
/// ```
/// Frames are never rewritten. On read, a frame failing its CRC is skipped
/// and a truncated tail ends the scan. Opening the ledger cuts a truncated
/// tail off before anything new is appended, so a torn write loses at most
/// the entry being written.
///
/// File I/O runs on tokio's blocking pool.
#[derive(Clone)]
pub struct FileLedger {
    inner: Arc<FileState>,
}

struct FileState {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
    receipts: Mutex<HashMap<TransactionId, ReceiptStatus>>,
}

impl FileLedger {
    /// Open (or create) a ledger file.
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let scan = scan(path)?;
        let file_len = file.metadata()?.len();
        if scan.valid_len < file_len {
            warn!(
                path = %path.display(),
                valid_len = scan.valid_len,
                file_len,
                "truncating torn ledger tail"
            );
            file.set_len(scan.valid_len)?;
            file.sync_data()?;
        }

        let receipts = scan
            .records
            .iter()
            .map(|record| (record.transaction_id.clone(), ReceiptStatus::Success))
            .collect();
        debug!(path = %path.display(), entries = scan.records.len(), "file ledger opened");

        Ok(Self {
            inner: Arc::new(FileState {
                path: path.to_path_buf(),
                writer: Mutex::new(BufWriter::new(file)),
                receipts: Mutex::new(receipts),
            }),
        })
    }

    /// Path to the ledger file.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }
}

impl FileState {
    fn append(&self, record: &FileRecord) -> Result<(), LedgerError> {
        let payload =
            bincode::serialize(record).map_err(|e| LedgerError::Serialization(e.to_string()))?;
        let length = u32::try_from(payload.len())
            .map_err(|_| LedgerError::Serialization("record too large".into()))?;
        let crc = crc32fast::hash(&payload);

        let mut w = lock(&self.writer)?;
        w.write_all(&length.to_le_bytes())?;
        w.write_all(&crc.to_le_bytes())?;
        w.write_all(&payload)?;
        w.flush()?;
        w.get_ref().sync_data()?;
        Ok(())
    }

    /// Check, append and record the receipt under one receipts lock, so two
    /// submissions with the same id cannot both land.
    fn submit(&self, request: &SubmitRequest) -> Result<PendingTx, LedgerError> {
        let mut receipts = lock(&self.receipts)?;
        if receipts.contains_key(&request.transaction_id) {
            return Err(LedgerError::Submission(format!(
                "duplicate transaction id {}",
                request.transaction_id
            )));
        }

        let record = FileRecord {
            address: request.address.clone(),
            transaction_id: request.transaction_id.clone(),
            transaction_hash: request.transaction_hash(),
            entry: request.to_entry(now_secs()),
        };
        self.append(&record)?;
        receipts.insert(record.transaction_id.clone(), ReceiptStatus::Success);

        debug!(
            address = %record.address,
            transaction_id = %record.transaction_id,
            "file ledger append"
        );

        Ok(PendingTx {
            transaction_id: record.transaction_id,
            transaction_hash: record.transaction_hash,
        })
    }
}

/// Read every intact record front-to-back.
fn scan(path: &Path) -> Result<Scan, LedgerError> {
    let bytes = fs::read(path)?;
    let mut records = Vec::new();
    let mut offset = 0usize;

    while offset + HEADER_SIZE <= bytes.len() {
        let header = &bytes[offset..offset + HEADER_SIZE];
        let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
        let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

        let start = offset + HEADER_SIZE;
        let end = start + length;
        if length == 0 || end > bytes.len() {
            warn!(offset, length, "truncated ledger frame; stopping scan");
            break;
        }

        let payload = &bytes[start..end];
        let actual_crc = crc32fast::hash(payload);
        if actual_crc != expected_crc {
            warn!(offset, expected = expected_crc, actual = actual_crc, "CRC mismatch; skipping frame");
            offset = end;
            continue;
        }

        match bincode::deserialize::<FileRecord>(payload) {
            Ok(record) => records.push(record),
            Err(e) => warn!(offset, error = %e, "undecodable ledger frame; skipping"),
        }
        offset = end;
    }

    Ok(Scan {
        records,
        valid_len: offset as u64,
    })
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, LedgerError> {
    mutex.lock().map_err(|_| LedgerError::LockPoisoned)
}

async fn blocking<T, F>(task: F) -> Result<T, LedgerError>
where
    F: FnOnce() -> Result<T, LedgerError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| LedgerError::Io(format!("blocking task failed: {e}")))?
}

#[async_trait]
impl LedgerWriter for FileLedger {
    async fn execute(&self, request: &SubmitRequest) -> Result<PendingTx, LedgerError> {
        let inner = Arc::clone(&self.inner);
        let request = request.clone();
        blocking(move || inner.submit(&request)).await
    }

    async fn await_receipt(&self, pending: &PendingTx) -> Result<Receipt, LedgerError> {
        let status = lock(&self.inner.receipts)?
            .get(&pending.transaction_id)
            .cloned()
            .ok_or_else(|| LedgerError::UnknownTransaction(pending.transaction_id.clone()))?;
        Ok(Receipt {
            transaction_id: pending.transaction_id.clone(),
            status,
        })
    }
}

#[async_trait]
impl LedgerReader for FileLedger {
    async fn fetch_all(&self, address: &LedgerAddress) -> Result<Vec<LedgerEntry>, LedgerError> {
        let path = self.inner.path.clone();
        let address = address.clone();
        blocking(move || {
            let entries = scan(&path)
                .map_err(|e| LedgerError::Query(e.to_string()))?
                .records
                .into_iter()
                .filter(|record| record.address == address)
                .map(|record| record.entry)
                .collect();
            Ok(entries)
        })
        .await
    }
}
