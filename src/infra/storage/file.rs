use crate::types::{InfraError, InfraResult};
use std::fs;
use std::path::Path;

/// ファイルに書き込む（親ディレクトリがなければ作成し、既存ファイルは上書き）
pub fn write_file(file_path: &Path, bytes: &[u8]) -> InfraResult<()> {
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| InfraError::file_system(parent.display().to_string(), e))?;
    }
    fs::write(file_path, bytes)
        .map_err(|e| InfraError::file_system(file_path.display().to_string(), e))
}
