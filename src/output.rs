use crate::record::MeetingRecord;
use anyhow::{Result, anyhow};
use memchr::{memchr, memchr3};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Default location of the processed table.
pub const DEFAULT_OUTPUT: &str = "data/processed/meeting_transcripts_all.csv";

pub enum Writer {
    Stdout(Box<dyn Write>, bool), // bool tracks if we've written headers
    JsonFile(BufWriter<File>, bool), // bool tracks if we've written the opening bracket
    JsonlFile(BufWriter<File>),
    CsvFile(BufWriter<File>, bool),
    TsvFile(BufWriter<File>, bool),
}

impl Writer {
    pub fn write_batch(&mut self, records: &[MeetingRecord]) -> Result<()> {
        match self {
            Writer::Stdout(writer, headers_written) => {
                write_csv(writer.as_mut(), headers_written, records)?;
            }
            Writer::CsvFile(writer, headers_written) => {
                write_csv(writer, headers_written, records)?;
            }
            Writer::JsonFile(writer, is_first) => {
                for record in records {
                    if *is_first {
                        write!(writer, "[")?;
                        *is_first = false;
                    } else {
                        write!(writer, ",")?;
                    }
                    let serialized = serde_json::to_string_pretty(record)?;
                    write!(writer, "\n{}", serialized)?;
                }
            }
            Writer::JsonlFile(writer) => {
                for record in records {
                    let serialized = serde_json::to_string(record)?;
                    writeln!(writer, "{}", serialized)?;
                }
            }
            Writer::TsvFile(writer, headers_written) => {
                if !*headers_written {
                    writeln!(writer, "{}", MeetingRecord::COLUMNS.join("\t"))?;
                    *headers_written = true;
                }

                for record in records {
                    let row: Vec<String> = record
                        .fields()
                        .into_iter()
                        .map(escape_tsv_field)
                        .collect();
                    writeln!(writer, "{}", row.join("\t"))?;
                }
            }
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        match self {
            Writer::JsonFile(ref mut writer, is_first) => {
                // an empty table is still a valid array
                if is_first {
                    write!(writer, "[")?;
                }
                writeln!(writer, "\n]")?;
                writer.flush()?;
            }
            Writer::JsonlFile(ref mut writer)
            | Writer::CsvFile(ref mut writer, _)
            | Writer::TsvFile(ref mut writer, _) => {
                writer.flush()?;
            }
            Writer::Stdout(ref mut writer, _) => {
                writer.flush()?;
            }
        }
        Ok(())
    }
}

fn write_csv<W: Write + ?Sized>(
    writer: &mut W,
    headers_written: &mut bool,
    records: &[MeetingRecord],
) -> Result<()> {
    if !*headers_written {
        writeln!(writer, "{}", MeetingRecord::COLUMNS.join(","))?;
        *headers_written = true;
    }

    for record in records {
        let row: Vec<String> = record.fields().into_iter().map(escape_csv_field).collect();
        writeln!(writer, "{}", row.join(","))?;
    }
    Ok(())
}

pub fn create_writer(output_arg: &str) -> Result<Writer> {
    match output_arg {
        "stdout" | "-" => Ok(Writer::Stdout(Box::new(io::stdout()), false)),
        path if path.ends_with(".json") => {
            let writer = create_file(path)?;
            Ok(Writer::JsonFile(writer, true))
        }
        path if path.ends_with(".jsonl") || path.ends_with(".ndjson") => {
            let writer = create_file(path)?;
            Ok(Writer::JsonlFile(writer))
        }
        path if path.ends_with(".csv") => {
            let writer = create_file(path)?;
            Ok(Writer::CsvFile(writer, false))
        }
        path if path.ends_with(".tsv") => {
            let writer = create_file(path)?;
            Ok(Writer::TsvFile(writer, false))
        }
        path => {
            // Default to CSV if it looks like a path
            if path.contains('/') || path.contains('\\') || path.contains('.') {
                let writer = create_file(path)?;
                Ok(Writer::CsvFile(writer, false))
            } else {
                Err(anyhow!(
                    "Unknown output format: {}. Use 'stdout' or a .csv/.tsv/.json/.jsonl path",
                    output_arg
                ))
            }
        }
    }
}

fn create_file(file_path: &str) -> Result<BufWriter<File>> {
    if let Some(parent) = Path::new(file_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(BufWriter::new(File::create(file_path)?))
}

fn escape_csv_field(field: &str) -> String {
    let bytes = field.as_bytes();
    if memchr3(b',', b'"', b'\n', bytes).is_some() || memchr(b'\r', bytes).is_some() {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn escape_tsv_field(field: &str) -> String {
    field
        .replace('\t', " ")
        .replace('\n', " ")
        .replace('\r', " ")
}

/// Write the whole table to `output_arg` in one go.
pub fn write(output_arg: &str, records: &[MeetingRecord]) -> Result<()> {
    let mut writer = create_writer(output_arg)?;
    writer.write_batch(records)?;
    writer.finish()
}
