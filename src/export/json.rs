use super::export_failed;
use crate::error::Result;
use std::io::Write;
use std::path::Path;

/// Export any serializable data structure to pretty-printed JSON
pub fn export_json<T, P>(data: &T, output_path: P) -> Result<()>
where
    T: serde::Serialize,
    P: AsRef<Path>,
{
    let output_path = output_path.as_ref();
    let json_data =
        serde_json::to_string_pretty(data).map_err(|e| export_failed(output_path, e))?;

    let mut file = std::fs::File::create(output_path)?;
    file.write_all(json_data.as_bytes())?;
    writeln!(file)?;

    Ok(())
}
