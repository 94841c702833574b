// JSON export

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use labmerge_recon::MergedTable;

use crate::commit::commit_with;

/// Export the merged table (sources, records, conflicts) as pretty-printed JSON.
pub fn write_table(table: &MergedTable, path: &Path) -> Result<(), String> {
    commit_with(path, |part| {
        let file = File::create(part).map_err(|e| e.to_string())?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, table).map_err(|e| e.to_string())?;
        writer.write_all(b"\n").map_err(|e| e.to_string())?;
        writer.flush().map_err(|e| e.to_string())
    })
}
