//! Binary checkpoint format for solver state.
//!
//! Format:
//! - Header (32 bytes):
//!   - Magic: "MNK1" (4 bytes)
//!   - Version: u32 LE (4 bytes)
//!   - Rows, columns, k: u8 each (3 bytes)
//!   - Reserved: 1 byte (zero)
//!   - Entry count: u64 LE (8 bytes)
//!   - Checksum: u64 LE xxhash of data section (8 bytes)
//!   - Reserved: 4 bytes (zeros)
//! - Data section (entry_count × entry size):
//!   - Grid: 2 bits per cell, ceil(cells / 4) bytes
//!   - Side to move: u8 (1 or 2)
//!   - Outcome: i8 (1 = P1 wins, 0 = draw, -1 = P2 wins)
//!
//! Entries are sorted by key for potential binary search.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use mnk_core::{CanonicalKey, Outcome, Player};
use xxhash_rust::xxh64::xxh64;

const MAGIC: &[u8; 4] = b"MNK1";
const VERSION: u32 = 1;
const HEADER_SIZE: usize = 32;

fn invalid_data(message: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.into())
}

/// Board shape a checkpoint belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub rows: usize,
    pub columns: usize,
    pub k: usize,
}

impl Shape {
    #[inline]
    pub fn cells(&self) -> usize {
        self.rows * self.columns
    }

    /// Bytes per entry.
    #[inline]
    pub fn entry_size(&self) -> usize {
        self.cells().div_ceil(4) + 2
    }
}

struct Header {
    shape: Shape,
    count: u64,
    checksum: u64,
}

pub struct Checkpoint {
    pub shape: Shape,
    pub entries: Vec<(CanonicalKey, Outcome)>,
}

impl Checkpoint {
    /// Save transposition table to binary checkpoint file.
    pub fn save(
        path: &Path,
        shape: Shape,
        table: &HashMap<CanonicalKey, Outcome>,
    ) -> io::Result<usize> {
        let dims = [shape.rows, shape.columns, shape.k];
        if dims.iter().any(|&d| d > u8::MAX as usize) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "board {}x{} k={} too large for checkpoint header",
                    shape.rows, shape.columns, shape.k
                ),
            ));
        }

        // Collect and sort entries
        let mut entries: Vec<(&CanonicalKey, &Outcome)> = table.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let count = entries.len();

        // Build data section
        let mut data = Vec::with_capacity(count * shape.entry_size());
        for (key, outcome) in &entries {
            debug_assert_eq!(key.cells().len(), shape.cells());
            data.extend_from_slice(&key.packed_cells());
            data.push(key.to_move() as u8);
            data.push(outcome.to_i8() as u8);
        }

        // Compute checksum
        let checksum = xxh64(&data, 0);

        // Write file
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        // Header
        writer.write_all(MAGIC)?;
        writer.write_all(&VERSION.to_le_bytes())?;
        writer.write_all(&[shape.rows as u8, shape.columns as u8, shape.k as u8, 0])?;
        writer.write_all(&(count as u64).to_le_bytes())?;
        writer.write_all(&checksum.to_le_bytes())?;
        writer.write_all(&[0u8; 4])?; // Reserved

        // Data
        writer.write_all(&data)?;
        writer.flush()?;

        Ok(count)
    }

    /// Board shape recorded in a checkpoint, reading only its header.
    pub fn read_shape(path: &Path) -> io::Result<Shape> {
        let mut header = [0u8; HEADER_SIZE];
        File::open(path)?.read_exact(&mut header)?;
        Ok(Self::parse_header(&header)?.shape)
    }

    fn parse_header(header: &[u8; HEADER_SIZE]) -> io::Result<Header> {
        // Validate magic
        if &header[0..4] != MAGIC {
            return Err(invalid_data("Invalid checkpoint magic"));
        }

        // Parse header
        let version = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        if version != VERSION {
            return Err(invalid_data(format!("Unsupported checkpoint version: {}", version)));
        }

        let shape = Shape {
            rows: header[8] as usize,
            columns: header[9] as usize,
            k: header[10] as usize,
        };
        if shape.cells() == 0 {
            return Err(invalid_data("Checkpoint header has an empty board"));
        }

        let mut word = [0u8; 8];
        word.copy_from_slice(&header[12..20]);
        let count = u64::from_le_bytes(word);
        word.copy_from_slice(&header[20..28]);
        let checksum = u64::from_le_bytes(word);

        Ok(Header {
            shape,
            count,
            checksum,
        })
    }

    /// Load checkpoint from binary file.
    pub fn load(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        // Read header
        let mut header = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header)?;
        let Header {
            shape,
            count,
            checksum: stored_checksum,
        } = Self::parse_header(&header)?;

        // The header count must match the bytes actually present.
        let entry_size = shape.entry_size();
        let data_len = count
            .checked_mul(entry_size as u64)
            .filter(|&len| len == file_len.saturating_sub(HEADER_SIZE as u64))
            .ok_or_else(|| {
                invalid_data(format!(
                    "Checkpoint header claims {} entries, file holds {} data bytes",
                    count,
                    file_len.saturating_sub(HEADER_SIZE as u64)
                ))
            })?;

        // Read data section
        let mut data = vec![0u8; data_len as usize];
        reader.read_exact(&mut data)?;

        // Verify checksum
        let computed_checksum = xxh64(&data, 0);
        if computed_checksum != stored_checksum {
            return Err(invalid_data("Checkpoint checksum mismatch"));
        }

        // Parse entries
        let grid_bytes = entry_size - 2;
        let mut entries = Vec::with_capacity(data.len() / entry_size);
        for chunk in data.chunks_exact(entry_size) {
            let to_move = Player::from_bits(chunk[grid_bytes])
                .ok_or_else(|| invalid_data("Invalid side to move in checkpoint entry"))?;
            let key = CanonicalKey::from_packed(&chunk[..grid_bytes], shape.cells(), to_move)
                .ok_or_else(|| invalid_data("Invalid cell encoding in checkpoint entry"))?;
            let outcome = Outcome::from_i8(chunk[grid_bytes + 1] as i8)
                .ok_or_else(|| invalid_data("Invalid outcome in checkpoint entry"))?;
            entries.push((key, outcome));
        }

        Ok(Checkpoint { shape, entries })
    }

    /// Get file size estimate for a given number of entries.
    pub fn estimate_size(shape: Shape, count: usize) -> usize {
        HEADER_SIZE + count * shape.entry_size()
    }
}
