use crate::core::heat_balance::channels::{ChannelSet, ENERGY_BALANCE_TIMESTEP_ERROR};
use anyhow::anyhow;
use csv::WriterBuilder;
use formatx::formatx;
use std::fmt::Debug;
use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

pub trait Output: Debug {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write>;
    /// Whether this output can be considered a no-op and therefore that any code that only writes to the output can be skipped.
    fn is_noop(&self) -> bool {
        false
    }
}

/// Writes each location key to a file in a directory, named by a template
/// with a `{}` placeholder for the key.
#[derive(Debug)]
pub struct FileOutput {
    directory_path: PathBuf,
    file_template: String,
}

impl FileOutput {
    pub fn new(directory_path: PathBuf, file_template: String) -> Self {
        Self {
            directory_path,
            file_template,
        }
    }
}

impl Output for FileOutput {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write> {
        let file_name = formatx!(&self.file_template, location_key)
            .map_err(|err| anyhow!("output file template is invalid: {err}"))?;
        Ok(BufWriter::new(File::create(
            self.directory_path.join(file_name),
        )?))
    }
}

impl Output for &FileOutput {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write> {
        <FileOutput as Output>::writer_for_location_key(self, location_key)
    }
}

/// An output that goes to nowhere/ a "sink"/ /dev/null.
#[derive(Debug, Default)]
pub struct SinkOutput;

impl Output for SinkOutput {
    fn writer_for_location_key(&self, _location_key: &str) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        true
    }
}

/// Serialise a zone's channel map as CSV: a heading row, a units row, then
/// one row per timestep with the timestep index in the first column.
///
/// The wire format is a convenience for downstream inspection; the channel
/// map itself is the contract.
pub fn write_channels_csv(
    output: &impl Output,
    location_key: &str,
    channels: &ChannelSet,
) -> anyhow::Result<()> {
    if output.is_noop() {
        return Ok(());
    }
    let mut writer =
        WriterBuilder::new().from_writer(output.writer_for_location_key(location_key)?);

    let mut headings = vec!["Timestep".to_owned()];
    headings.extend(channels.names().map(str::to_owned));
    writer.write_record(&headings)?;

    let mut units = vec!["count".to_owned()];
    units.extend(channels.names().map(|name| channel_unit(name).to_owned()));
    writer.write_record(&units)?;

    for step in 0..channels.num_timesteps() {
        let mut record = vec![step.to_string()];
        record.extend(channels.iter().map(|(_, series)| series[step].to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;

    Ok(())
}

fn channel_unit(name: &str) -> &'static str {
    if name == ENERGY_BALANCE_TIMESTEP_ERROR {
        "ratio"
    } else {
        "J"
    }
}
