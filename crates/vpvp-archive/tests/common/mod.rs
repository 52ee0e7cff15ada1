//! Builds VPVP fixture files for the integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// One index record of a fixture archive.
pub enum Record {
    Push(String),
    Pop,
    Raw { name: String, data: Vec<u8> },
    Compressed { name: String, data: Vec<u8> },
    /// A record written verbatim, pointing at no payload.
    Verbatim {
        offset: u32,
        size: u32,
        dec_size: u32,
        name: String,
        timestamp: u32,
    },
}

pub fn push(name: &str) -> Record {
    Record::Push(name.to_string())
}

pub fn pop() -> Record {
    Record::Pop
}

pub fn raw(name: &str, data: &[u8]) -> Record {
    Record::Raw {
        name: name.to_string(),
        data: data.to_vec(),
    }
}

pub fn compressed(name: &str, data: &[u8]) -> Record {
    Record::Compressed {
        name: name.to_string(),
        data: data.to_vec(),
    }
}

pub fn brotli(data: &[u8]) -> Vec<u8> {
    let mut encoder = brotli::CompressorWriter::new(Vec::new(), 4096, 11, 22);
    encoder.write_all(data).unwrap();
    encoder.into_inner()
}

fn write_record(out: &mut Vec<u8>, offset: u32, size: u32, dec_size: u32, name: &str, timestamp: u32) {
    assert!(name.len() <= 32);
    let mut field = [0u8; 32];
    field[..name.len()].copy_from_slice(name.as_bytes());

    out.extend_from_slice(&offset.to_le_bytes());
    out.extend_from_slice(&size.to_le_bytes());
    out.extend_from_slice(&dec_size.to_le_bytes());
    out.extend_from_slice(&field);
    out.extend_from_slice(&timestamp.to_le_bytes());
}

/// Serialize records into a complete archive: header, payloads, index.
pub fn build(records: &[Record]) -> Vec<u8> {
    let mut payload = Vec::new();
    let mut index = Vec::new();
    let base = 16u32;

    for record in records {
        match record {
            Record::Push(name) => write_record(&mut index, 0, 0, 0, name, 0),
            Record::Pop => write_record(&mut index, 0, 0, 0, "..", 0),
            Record::Raw { name, data } => {
                let offset = base + payload.len() as u32;
                payload.extend_from_slice(data);
                write_record(&mut index, offset, data.len() as u32, 0, name, 1_600_000_000);
            }
            Record::Compressed { name, data } => {
                let packed = brotli(data);
                let offset = base + payload.len() as u32;
                payload.extend_from_slice(&packed);
                write_record(
                    &mut index,
                    offset,
                    packed.len() as u32,
                    data.len() as u32,
                    name,
                    1_600_000_000,
                );
            }
            Record::Verbatim {
                offset,
                size,
                dec_size,
                name,
                timestamp,
            } => write_record(&mut index, *offset, *size, *dec_size, name, *timestamp),
        }
    }

    let mut out = Vec::new();
    out.extend_from_slice(b"VPVP");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(base + payload.len() as u32).to_le_bytes());
    out.extend_from_slice(&(records.len() as u32).to_le_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&index);
    out
}

/// A fixture file in its own temporary directory.
pub struct Fixture {
    _dir: TempDir,
    path: PathBuf,
}

impl Fixture {
    pub fn new(bytes: &[u8]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.vp");
        std::fs::write(&path, bytes).unwrap();
        Self { _dir: dir, path }
    }

    pub fn from_records(records: &[Record]) -> Self {
        Self::new(&build(records))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
