//! Replay file storage with Zstd compression.
//!
//! Replays are stored as compressed binary files named `{chart_hash}.r` inside
//! a replay directory (`data/r` unless the caller picks another one). Data is
//! serialized with `bincode` before compression to minimize size.

use crate::models::replay::ReplayData;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use zstd::stream::{decode_all, encode_all};

/// Default directory for replay files.
pub const REPLAY_DIR: &str = "data/r";

/// Zstd level 21 (maximum).
const COMPRESSION_LEVEL: i32 = 21;

/// Path of the replay file for `hash` inside `dir`.
pub fn replay_path(dir: &Path, hash: &str) -> PathBuf {
    dir.join(format!("{}.r", hash))
}

/// Encodes replay data into its compressed on-disk form.
pub fn encode_replay(data: &ReplayData) -> io::Result<Vec<u8>> {
    let binary_data =
        bincode::serde::encode_to_vec(data, bincode::config::standard()).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Serialization error: {}", e),
            )
        })?;
    encode_all(&binary_data[..], COMPRESSION_LEVEL)
}

/// Decodes the compressed on-disk form.
pub fn decode_replay<R: io::Read>(reader: R) -> io::Result<ReplayData> {
    let binary_data = decode_all(reader)?;

    let (data, _len): (ReplayData, usize) =
        bincode::serde::decode_from_slice(&binary_data, bincode::config::standard()).map_err(
            |e| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Deserialization error: {}", e),
                )
            },
        )?;

    Ok(data)
}

/// Saves replay data under its chart hash, creating `dir` if needed.
/// Returns the path of the written file.
pub fn save_replay(dir: &Path, data: &ReplayData) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let path = replay_path(dir, &data.chart_hash);
    let compressed_data = encode_replay(data)?;
    let mut file = File::create(&path)?;
    file.write_all(&compressed_data)?;

    log::info!(
        "REPLAY: saved {} events to {:?} ({} bytes)",
        data.events.len(),
        path,
        compressed_data.len()
    );
    Ok(path)
}

/// Loads the replay stored for `hash` in `dir`.
pub fn load_replay(dir: &Path, hash: &str) -> io::Result<ReplayData> {
    load_replay_from_path(&replay_path(dir, hash))
}

/// Loads replay data from a specific path.
pub fn load_replay_from_path(path: &Path) -> io::Result<ReplayData> {
    let file = File::open(path)?;
    decode_replay(file)
}

/// Deletes a replay file. A missing file is not an error.
pub fn delete_replay(dir: &Path, hash: &str) -> io::Result<()> {
    let path = replay_path(dir, hash);
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

pub fn replay_exists(dir: &Path, hash: &str) -> bool {
    replay_path(dir, hash).exists()
}
