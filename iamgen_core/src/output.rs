use crate::error::Result;
use crate::policy::ResourcePolicyMap;
use std::io::Write;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One JSON object per line.
    #[default]
    Compact,
    /// Indented JSON objects, each followed by a newline.
    Pretty,
}

/// Write every non-empty policy in resource order and flush. Returns the
/// number of policies written.
pub fn write_policies<W: Write>(
    mut writer: W,
    policies: &ResourcePolicyMap,
    format: OutputFormat,
) -> Result<usize> {
    let mut written = 0;
    for policy in policies.policies() {
        match format {
            OutputFormat::Compact => serde_json::to_writer(&mut writer, policy)?,
            OutputFormat::Pretty => serde_json::to_writer_pretty(&mut writer, policy)?,
        }
        writer.write_all(b"\n")?;
        written += 1;
    }
    writer.flush()?;
    debug!(written, "wrote policies");
    Ok(written)
}
