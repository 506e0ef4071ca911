//! Durable sidecar store for vector records.
//!
//! File format: vectors.log
//!
//! Header (37 bytes):
//! - version: u8 (2)
//! - model_id: [u8; 32] (SHA256 of the embedding provider identity)
//! - checksum: u32 (CRC32 of header fields before checksum)
//!
//! Frames (repeated, append-only):
//! - magic: [u8; 4] (`VREC`)
//! - payload_len: u32 (little-endian)
//! - crc: u32 (CRC32 of payload_len bytes followed by payload)
//! - payload
//!
//! A frame that fails its checks is skipped by scanning forward for the next
//! magic whose frame verifies. Only bytes after the last valid frame are cut
//! off as a torn tail.
//!
//! Put payload:
//! - kind: u8 (1)
//! - post_id: u16 length + UTF-8
//! - language: u8 length + UTF-8
//! - timestamp: i64 (epoch seconds, little-endian)
//! - dimensions: u16 (little-endian)
//! - vector: [f32; dimensions] (little-endian)
//!
//! Delete payload:
//! - kind: u8 (2)
//! - post_id: u16 length + UTF-8
//!
//! The latest frame for a post id wins. Superseded frames stay in the file
//! until `prune` compacts it.

use std::collections::{HashMap, HashSet};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::semantic::language::LanguageTag;
use crate::semantic::types::VectorRecord;

/// Current file format version
const FORMAT_VERSION: u8 = 2;

/// Header size in bytes: version(1) + model_id(32) + checksum(4)
const HEADER_SIZE: usize = 37;

/// Frame header size: magic(4) + payload_len(4) + crc(4)
const FRAME_HEADER_SIZE: usize = 12;

const FRAME_MAGIC: [u8; 4] = *b"VREC";

/// Frames claiming more than this are treated as garbled.
const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

const KIND_PUT: u8 = 1;
const KIND_DELETE: u8 = 2;

/// Default number of records kept by pruning.
pub const DEFAULT_STORE_CAPACITY: usize = 50_000;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt record at offset {offset}: {reason}")]
    CorruptRecord { offset: u64, reason: String },

    #[error("Record cannot be stored: {0}")]
    InvalidRecord(String),

    #[error("Version mismatch: file version {0}, supported version {1}")]
    VersionMismatch(u8, u8),

    #[error("Checksum mismatch: file may be corrupted")]
    ChecksumMismatch,
}

/// Location and metadata of the live frame for one post id.
#[derive(Debug, Clone)]
struct Slot {
    offset: u64,
    len: u32,
    language: LanguageTag,
    computed_at: DateTime<Utc>,
}

struct LogState {
    index: HashMap<String, Slot>,
    reader: Mutex<File>,
    writer: File,
    /// Offset where the next frame is appended.
    end: u64,
    /// Bytes held by superseded frames and tombstones.
    dead_bytes: u64,
}

impl LogState {
    fn live_bytes(&self) -> u64 {
        self.index.values().map(|slot| slot.len as u64).sum()
    }

    fn read_frame(&self, slot: &Slot) -> Result<Vec<u8>, StoreError> {
        let mut reader = self.reader.lock().unwrap_or_else(|e| e.into_inner());
        reader.seek(SeekFrom::Start(slot.offset))?;
        let mut frame = vec![0u8; slot.len as usize];
        reader.read_exact(&mut frame)?;
        Ok(frame)
    }

    fn read_record(&self, slot: &Slot) -> Result<VectorRecord, StoreError> {
        let frame = self.read_frame(slot)?;
        let payload = check_frame(&frame, slot.offset)?;
        match decode_payload(payload, slot.offset)? {
            Entry::Put(record) => Ok(record),
            Entry::Delete(_) => Err(StoreError::CorruptRecord {
                offset: slot.offset,
                reason: "index points at a tombstone".to_string(),
            }),
        }
    }

    /// Append a frame, rolling back a partial write on failure.
    fn append(&mut self, frame: &[u8]) -> Result<u64, StoreError> {
        let offset = self.end;
        if let Err(e) = self.writer.write_all(frame) {
            let _ = self.writer.set_len(offset);
            return Err(e.into());
        }
        self.end += frame.len() as u64;
        Ok(offset)
    }
}

/// Persistent post-id → vector record store.
///
/// Readers share a read lock; writes, deletes and pruning take the write
/// lock, so a reader sees a record either entirely before or entirely after
/// any mutation.
pub struct PersistentVectorStore {
    path: PathBuf,
    model_id: [u8; 32],
    state: RwLock<LogState>,
}

impl PersistentVectorStore {
    /// Open (or create) the store at `path` for vectors produced by the
    /// provider named `identity`.
    ///
    /// A file written for another provider, with an unknown version, or
    /// with a damaged header is discarded: its vectors are not comparable.
    pub fn open(path: PathBuf, identity: &str) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let model_id = identity_hash(identity);

        let reusable = match Self::read_header(&path) {
            Ok(Some(header)) if header.model_id == model_id => true,
            Ok(Some(_)) => {
                log::warn!("vector store model changed, starting fresh");
                false
            }
            Ok(None) => false,
            Err(e) => {
                log::warn!("vector store header unreadable ({e}), starting fresh");
                false
            }
        };

        if !reusable {
            Self::write_fresh(&path, &model_id)?;
        }

        let (index, end, dead_bytes) = Self::scan(&path)?;

        let writer = OpenOptions::new().append(true).open(&path)?;
        let reader = File::open(&path)?;

        log::info!("loaded {} vector records from {}", index.len(), path.display());

        Ok(Self {
            path,
            model_id,
            state: RwLock::new(LogState {
                index,
                reader: Mutex::new(reader),
                writer,
                end,
                dead_bytes,
            }),
        })
    }

    /// Get the storage file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_state(&self) -> RwLockReadGuard<'_, LogState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, LogState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert or replace the record for `record.post_id`.
    pub fn save(&self, record: &VectorRecord) -> Result<(), StoreError> {
        let frame = encode_frame(&encode_put(record)?);

        let mut state = self.write_state();
        let offset = state.append(&frame)?;
        let slot = Slot {
            offset,
            len: frame.len() as u32,
            language: record.language.clone(),
            computed_at: record.computed_at,
        };
        if let Some(old) = state.index.insert(record.post_id.clone(), slot) {
            state.dead_bytes += old.len as u64;
        }
        Ok(())
    }

    /// Load the record for `post_id`, if stored.
    pub fn load(&self, post_id: &str) -> Result<Option<VectorRecord>, StoreError> {
        let state = self.read_state();
        match state.index.get(post_id) {
            Some(slot) => state.read_record(slot).map(Some),
            None => Ok(None),
        }
    }

    /// Load every record in `language`. Unreadable records are skipped.
    pub fn load_all(&self, language: &LanguageTag) -> Result<Vec<VectorRecord>, StoreError> {
        let state = self.read_state();
        let mut records = Vec::new();

        for slot in state.index.values().filter(|slot| &slot.language == language) {
            match state.read_record(slot) {
                Ok(record) => records.push(record),
                Err(StoreError::CorruptRecord { offset, reason }) => {
                    log::warn!("skipping corrupt vector record at {offset}: {reason}");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(records)
    }

    pub fn contains(&self, post_id: &str) -> bool {
        self.read_state().index.contains_key(post_id)
    }

    pub fn len(&self) -> usize {
        self.read_state().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delete records for `post_ids`. Returns how many existed.
    pub fn delete(&self, post_ids: &[String]) -> Result<usize, StoreError> {
        let mut state = self.write_state();
        let mut removed = 0;

        for post_id in post_ids {
            if !state.index.contains_key(post_id) {
                continue;
            }
            let frame = encode_frame(&encode_delete(post_id)?);
            state.append(&frame)?;
            if let Some(old) = state.index.remove(post_id) {
                state.dead_bytes += old.len as u64 + frame.len() as u64;
                removed += 1;
            }
        }

        Ok(removed)
    }

    /// Drop records older than `ttl`, then the oldest records until at most
    /// `capacity` remain. Returns the removed ids with their timestamps.
    ///
    /// Compacts the file when anything was removed or when superseded frames
    /// outweigh live ones.
    pub fn prune(
        &self,
        capacity: usize,
        ttl: chrono::Duration,
        now: DateTime<Utc>,
    ) -> Result<Vec<(String, DateTime<Utc>)>, StoreError> {
        let mut state = self.write_state();

        let cutoff = now - ttl;
        let mut doomed: Vec<(String, DateTime<Utc>)> = Vec::new();
        let mut survivors: Vec<(&String, &Slot)> = Vec::with_capacity(state.index.len());

        for (post_id, slot) in state.index.iter() {
            if slot.computed_at < cutoff {
                doomed.push((post_id.clone(), slot.computed_at));
            } else {
                survivors.push((post_id, slot));
            }
        }

        if survivors.len() > capacity {
            survivors.sort_by(|a, b| a.1.computed_at.cmp(&b.1.computed_at).then_with(|| a.0.cmp(b.0)));
            let excess = survivors.len() - capacity;
            doomed.extend(
                survivors
                    .drain(..excess)
                    .map(|(post_id, slot)| (post_id.clone(), slot.computed_at)),
            );
        }
        drop(survivors);

        let needs_compaction = state.dead_bytes > state.live_bytes();
        if doomed.is_empty() && !needs_compaction {
            return Ok(doomed);
        }

        let doomed_ids: HashSet<&str> = doomed.iter().map(|(post_id, _)| post_id.as_str()).collect();
        if let Err(e) = self.compact(&mut state, &doomed_ids) {
            log::warn!("vector store compaction failed: {e}; writing tombstones instead");
            // Tombstone first: a record leaves the index only once its
            // removal is durable.
            for (post_id, _) in &doomed {
                let frame = encode_frame(&encode_delete(post_id)?);
                state.append(&frame)?;
                if let Some(old) = state.index.remove(post_id) {
                    state.dead_bytes += old.len as u64 + frame.len() as u64;
                }
            }
        }

        if !doomed.is_empty() {
            log::info!("pruned {} vector records", doomed.len());
        }
        Ok(doomed)
    }

    /// Rewrite the live frames, minus `dropped`, into a fresh file.
    ///
    /// Uses atomic write: temp file -> fsync -> rename. The new handles are
    /// opened on the temp file before the rename, so `state` is only touched
    /// once the new file is in place and nothing after the rename can fail.
    fn compact(&self, state: &mut LogState, dropped: &HashSet<&str>) -> Result<(), StoreError> {
        let temp_path = self.path.with_extension("tmp");

        let result = self.write_compacted(&temp_path, state, dropped).and_then(|(index, end)| {
            let writer = OpenOptions::new().append(true).open(&temp_path)?;
            let reader = File::open(&temp_path)?;
            std::fs::rename(&temp_path, &self.path)?;
            Ok((index, end, writer, reader))
        });
        let (new_index, end, writer, reader) = match result {
            Ok(parts) => parts,
            Err(e) => {
                let _ = std::fs::remove_file(&temp_path);
                return Err(e);
            }
        };

        state.writer = writer;
        state.reader = Mutex::new(reader);
        state.index = new_index;
        state.end = end;
        state.dead_bytes = 0;

        log::debug!("compacted vector store to {} bytes", end);
        Ok(())
    }

    fn write_compacted(
        &self,
        path: &Path,
        state: &LogState,
        dropped: &HashSet<&str>,
    ) -> Result<(HashMap<String, Slot>, u64), StoreError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&encode_header(&self.model_id))?;

        let mut offset = HEADER_SIZE as u64;
        let mut index = HashMap::with_capacity(state.index.len());

        let mut slots: Vec<(&String, &Slot)> = state
            .index
            .iter()
            .filter(|(post_id, _)| !dropped.contains(post_id.as_str()))
            .collect();
        slots.sort_by_key(|(_, slot)| slot.offset);

        for (post_id, slot) in slots {
            let frame = state.read_frame(slot)?;
            if let Err(e) = check_frame(&frame, slot.offset) {
                log::warn!("dropping corrupt vector record for {post_id}: {e}");
                continue;
            }
            writer.write_all(&frame)?;
            index.insert(
                post_id.clone(),
                Slot {
                    offset,
                    ..slot.clone()
                },
            );
            offset += frame.len() as u64;
        }

        writer.flush()?;
        let file = writer
            .into_inner()
            .map_err(|e| e.into_error())?;
        file.sync_all()?;

        Ok((index, offset))
    }

    /// Read the header, `Ok(None)` if the file is missing or empty.
    fn read_header(path: &Path) -> Result<Option<Header>, StoreError> {
        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if file.metadata()?.len() == 0 {
            return Ok(None);
        }

        let mut header_bytes = [0u8; HEADER_SIZE];
        file.read_exact(&mut header_bytes)?;

        let version = header_bytes[0];
        if version != FORMAT_VERSION {
            return Err(StoreError::VersionMismatch(version, FORMAT_VERSION));
        }

        let stored_checksum = u32::from_le_bytes([
            header_bytes[33],
            header_bytes[34],
            header_bytes[35],
            header_bytes[36],
        ]);
        if stored_checksum != crc32fast::hash(&header_bytes[0..33]) {
            return Err(StoreError::ChecksumMismatch);
        }

        let mut model_id = [0u8; 32];
        model_id.copy_from_slice(&header_bytes[1..33]);

        Ok(Some(Header { model_id }))
    }

    fn write_fresh(path: &Path, model_id: &[u8; 32]) -> Result<(), StoreError> {
        let mut file = File::create(path)?;
        file.write_all(&encode_header(model_id))?;
        file.sync_all()?;
        Ok(())
    }

    /// Rebuild the index from the log.
    ///
    /// Corrupt frames are skipped and loading resumes at the next frame that
    /// verifies. Bytes past the last valid frame are a torn tail and are cut
    /// off so later appends start on a frame boundary.
    fn scan(path: &Path) -> Result<(HashMap<String, Slot>, u64, u64), StoreError> {
        let bytes = std::fs::read(path)?;

        let mut index: HashMap<String, Slot> = HashMap::new();
        let mut offset = HEADER_SIZE;
        let mut end = HEADER_SIZE;
        let mut dead_bytes = 0u64;
        let mut corrupt = 0usize;

        while offset < bytes.len() {
            let frame_len = match frame_len_at(&bytes, offset) {
                Some(frame_len) => frame_len,
                None => match next_frame(&bytes, offset + 1) {
                    Some(next) => {
                        log::warn!(
                            "skipping {} garbled bytes at offset {offset} in vector store",
                            next - offset
                        );
                        dead_bytes += (next - offset) as u64;
                        corrupt += 1;
                        offset = next;
                        continue;
                    }
                    None => break,
                },
            };

            let at = offset as u64;
            let frame = &bytes[offset..offset + frame_len];
            let decoded = check_frame(frame, at).and_then(|payload| decode_payload(payload, at));

            match decoded {
                Ok(Entry::Put(record)) => {
                    let slot = Slot {
                        offset: at,
                        len: frame_len as u32,
                        language: record.language,
                        computed_at: record.computed_at,
                    };
                    if let Some(old) = index.insert(record.post_id, slot) {
                        dead_bytes += old.len as u64;
                    }
                }
                Ok(Entry::Delete(post_id)) => {
                    dead_bytes += frame_len as u64;
                    if let Some(old) = index.remove(&post_id) {
                        dead_bytes += old.len as u64;
                    }
                }
                Err(e) => {
                    log::warn!("skipping vector record: {e}");
                    dead_bytes += frame_len as u64;
                    corrupt += 1;
                }
            }

            offset += frame_len;
            end = offset;
        }

        if end < bytes.len() {
            log::warn!(
                "truncating torn vector store tail ({} bytes)",
                bytes.len() - end
            );
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(end as u64)?;
            file.sync_all()?;
        }

        if corrupt > 0 {
            log::warn!("skipped {corrupt} corrupt vector records");
        }

        Ok((index, end as u64, dead_bytes))
    }
}

/// Length of the verified frame starting at `offset`, if there is one.
fn frame_len_at(bytes: &[u8], offset: usize) -> Option<usize> {
    let header = bytes.get(offset..offset + FRAME_HEADER_SIZE)?;
    if header[0..4] != FRAME_MAGIC {
        return None;
    }
    let payload_len = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    if payload_len > MAX_PAYLOAD_SIZE {
        return None;
    }
    let frame_len = FRAME_HEADER_SIZE + payload_len as usize;
    let frame = bytes.get(offset..offset + frame_len)?;
    check_frame(frame, offset as u64).ok().map(|_| frame_len)
}

/// Offset of the first verified frame at or after `from`.
fn next_frame(bytes: &[u8], from: usize) -> Option<usize> {
    bytes
        .windows(FRAME_MAGIC.len())
        .enumerate()
        .skip(from)
        .filter(|(_, window)| *window == FRAME_MAGIC)
        .map(|(pos, _)| pos)
        .find(|&pos| frame_len_at(bytes, pos).is_some())
}

/// SHA256 of the provider identity, stored in the header.
pub fn identity_hash(identity: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(identity.as_bytes());
    hasher.finalize().into()
}

/// File header structure.
#[derive(Debug)]
struct Header {
    model_id: [u8; 32],
}

enum Entry {
    Put(VectorRecord),
    Delete(String),
}

fn encode_header(model_id: &[u8; 32]) -> [u8; HEADER_SIZE] {
    let mut header_bytes = [0u8; HEADER_SIZE];
    header_bytes[0] = FORMAT_VERSION;
    header_bytes[1..33].copy_from_slice(model_id);
    let checksum = crc32fast::hash(&header_bytes[0..33]);
    header_bytes[33..37].copy_from_slice(&checksum.to_le_bytes());
    header_bytes
}

fn frame_crc(len_bytes: &[u8], payload: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(len_bytes);
    hasher.update(payload);
    hasher.finalize()
}

fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let len_bytes = (payload.len() as u32).to_le_bytes();
    let mut frame = Vec::with_capacity(FRAME_HEADER_SIZE + payload.len());
    frame.extend_from_slice(&FRAME_MAGIC);
    frame.extend_from_slice(&len_bytes);
    frame.extend_from_slice(&frame_crc(&len_bytes, payload).to_le_bytes());
    frame.extend_from_slice(payload);
    frame
}

/// Verify a frame's checksum and return its payload.
fn check_frame(frame: &[u8], offset: u64) -> Result<&[u8], StoreError> {
    let corrupt = |reason: &str| StoreError::CorruptRecord {
        offset,
        reason: reason.to_string(),
    };

    if frame.len() < FRAME_HEADER_SIZE {
        return Err(corrupt("short frame"));
    }
    if frame[0..4] != FRAME_MAGIC {
        return Err(corrupt("missing frame marker"));
    }
    let len_bytes = &frame[4..8];
    let payload_len = u32::from_le_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]);
    let payload = &frame[FRAME_HEADER_SIZE..];
    if payload_len as usize != payload.len() {
        return Err(corrupt("length mismatch"));
    }
    let stored = u32::from_le_bytes([frame[8], frame[9], frame[10], frame[11]]);
    if frame_crc(len_bytes, payload) != stored {
        return Err(corrupt("checksum mismatch"));
    }
    Ok(payload)
}

fn encode_post_id(buf: &mut Vec<u8>, post_id: &str) -> Result<(), StoreError> {
    let len = u16::try_from(post_id.len())
        .map_err(|_| StoreError::InvalidRecord(format!("post id too long ({} bytes)", post_id.len())))?;
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(post_id.as_bytes());
    Ok(())
}

fn encode_put(record: &VectorRecord) -> Result<Vec<u8>, StoreError> {
    let language = record.language.as_str();
    let lang_len = u8::try_from(language.len())
        .map_err(|_| StoreError::InvalidRecord(format!("language tag too long: {language}")))?;
    let dimensions = u16::try_from(record.vector.len())
        .map_err(|_| StoreError::InvalidRecord(format!("{} dimensions", record.vector.len())))?;

    let mut buf = Vec::with_capacity(16 + record.post_id.len() + language.len() + record.vector.len() * 4);
    buf.push(KIND_PUT);
    encode_post_id(&mut buf, &record.post_id)?;
    buf.push(lang_len);
    buf.extend_from_slice(language.as_bytes());
    buf.extend_from_slice(&record.computed_at.timestamp().to_le_bytes());
    buf.extend_from_slice(&dimensions.to_le_bytes());
    for value in &record.vector {
        buf.extend_from_slice(&value.to_le_bytes());
    }
    Ok(buf)
}

fn encode_delete(post_id: &str) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::with_capacity(3 + post_id.len());
    buf.push(KIND_DELETE);
    encode_post_id(&mut buf, post_id)?;
    Ok(buf)
}

/// Sequential reader over a payload.
struct PayloadReader<'a> {
    buf: &'a [u8],
    pos: usize,
    offset: u64,
}

impl<'a> PayloadReader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], StoreError> {
        if self.pos + n > self.buf.len() {
            return Err(self.corrupt("payload truncated"));
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn u8(&mut self) -> Result<u8, StoreError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, StoreError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn i64(&mut self) -> Result<i64, StoreError> {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(self.take(8)?);
        Ok(i64::from_le_bytes(bytes))
    }

    fn string(&mut self, len: usize) -> Result<String, StoreError> {
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| self.corrupt("invalid utf-8"))
    }

    fn corrupt(&self, reason: &str) -> StoreError {
        StoreError::CorruptRecord {
            offset: self.offset,
            reason: reason.to_string(),
        }
    }
}

fn decode_payload(payload: &[u8], offset: u64) -> Result<Entry, StoreError> {
    let mut reader = PayloadReader {
        buf: payload,
        pos: 0,
        offset,
    };

    let kind = reader.u8()?;
    let id_len = reader.u16()? as usize;
    let post_id = reader.string(id_len)?;

    match kind {
        KIND_DELETE => Ok(Entry::Delete(post_id)),
        KIND_PUT => {
            let lang_len = reader.u8()? as usize;
            let language = LanguageTag::new(&reader.string(lang_len)?);
            let timestamp = reader.i64()?;
            let computed_at = DateTime::<Utc>::from_timestamp(timestamp, 0)
                .ok_or_else(|| reader.corrupt("timestamp out of range"))?;
            let dimensions = reader.u16()? as usize;

            let raw = reader.take(dimensions * 4)?;
            let vector: Vec<f32> = raw
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect();

            if reader.pos != payload.len() {
                return Err(reader.corrupt("trailing bytes"));
            }

            Ok(Entry::Put(VectorRecord {
                post_id,
                language,
                vector,
                computed_at,
            }))
        }
        other => Err(reader.corrupt(&format!("unknown record kind {other}"))),
    }
}
