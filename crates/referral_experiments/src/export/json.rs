use std::io::Write;

use serde::Serialize;

use super::ExportError;

pub(crate) fn write_json_impl<T: Serialize + ?Sized>(
    value: &T,
    mut writer: impl Write,
) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer).map_err(serde_json::Error::io)?;
    Ok(())
}
