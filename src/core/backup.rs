use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{success, warning};
use crate::utils::path::{ensure_writable, expand_tilde};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::FileOptions;

pub struct BackupLogic;

impl BackupLogic {
    /// Copy the database to `dest_file`, optionally replacing the copy with
    /// a `.zip` archive. Returns the final path.
    pub fn backup(db_path: &str, dest_file: &str, compress: bool, force: bool) -> AppResult<PathBuf> {
        let src = Path::new(db_path);
        let dest_buf = expand_tilde(dest_file);
        let dest = dest_buf.as_path();

        if !src.exists() {
            return Err(AppError::from(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Database not found: {}", src.display()),
            )));
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        let final_path = if compress {
            let zip_path = dest.with_extension("zip");
            ensure_writable(&zip_path, force)?;
            zip_file(src, &zip_path, &file_name(dest))?;
            zip_path
        } else {
            ensure_writable(dest, force)?;
            fs::copy(src, dest)?;
            dest.to_path_buf()
        };

        success(format!("Backup created: {}", final_path.display()));

        match DbPool::new(db_path) {
            Ok(pool) => {
                let msg = if compress {
                    "Backup created and compressed"
                } else {
                    "Backup created"
                };
                if let Err(e) = ttlog(&pool.conn, "backup", &final_path.to_string_lossy(), msg) {
                    warning(format!("Failed to write internal log: {}", e));
                }
            }
            Err(e) => warning(format!("Failed to write internal log: {}", e)),
        }

        Ok(final_path)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "database.sqlite".to_string())
}

/// Write `src` as the single deflated entry `entry_name` of a new zip at `dest`.
pub fn zip_file(src: &Path, dest: &Path, entry_name: &str) -> AppResult<()> {
    let file = fs::File::create(dest)?;
    let mut zip = ZipWriter::new(file);

    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut f = fs::File::open(src)?;
    zip.start_file(entry_name, options)
        .map_err(io::Error::other)?;

    io::copy(&mut f, &mut zip)?;
    zip.finish().map_err(io::Error::other)?;
    Ok(())
}
