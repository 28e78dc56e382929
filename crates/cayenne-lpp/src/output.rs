use std::fmt::Write as _;
use std::io::{IsTerminal, Write};

use cayenne_lpp::codec::{LppType, PackedFrame, Record, Value};
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput {
    size: usize,
    records: usize,
    hex: String,
}

#[derive(Serialize)]
struct SkippedOutput {
    index: usize,
    channel: u8,
    #[serde(rename = "type")]
    ty: &'static str,
    error: String,
}

#[derive(Serialize)]
struct EncodeOutput {
    schema_id: &'static str,
    max_size: usize,
    frames: Vec<FrameOutput>,
    skipped: Vec<SkippedOutput>,
    deferred: usize,
}

#[derive(Serialize)]
struct RecordOutput {
    channel: u8,
    #[serde(rename = "type")]
    ty: &'static str,
    code: u8,
    value: Value,
    display: String,
}

#[derive(Serialize)]
struct DecodeOutput {
    schema_id: &'static str,
    size: usize,
    records: Vec<RecordOutput>,
}

#[derive(Serialize)]
struct TypeOutput {
    code: u8,
    ipso_object_id: u16,
    name: &'static str,
    payload_size: Option<usize>,
    implemented: bool,
}

/// Result of an `encode` run.
pub struct EncodeReport<'a> {
    pub max_size: usize,
    pub frames: &'a [PackedFrame],
    /// Readings left over because `--split` was not given.
    pub deferred: usize,
}

pub fn print_encode(report: &EncodeReport<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = EncodeOutput {
                schema_id: "cayenne-lpp/cli/v1/encode-result",
                max_size: report.max_size,
                frames: report
                    .frames
                    .iter()
                    .map(|frame| FrameOutput {
                        size: frame.bytes.len(),
                        records: frame.encoded,
                        hex: to_hex(&frame.bytes),
                    })
                    .collect(),
                skipped: report
                    .frames
                    .iter()
                    .flat_map(|frame| &frame.skipped)
                    .map(|skip| SkippedOutput {
                        index: skip.index,
                        channel: skip.record.channel,
                        ty: skip.record.ty.name(),
                        error: skip.error.to_string(),
                    })
                    .collect(),
                deferred: report.deferred,
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FRAME", "SIZE", "RECORDS", "SKIPPED", "HEX"]);
            for (n, frame) in report.frames.iter().enumerate() {
                table.add_row(vec![
                    n.to_string(),
                    format!("{}/{}", frame.bytes.len(), report.max_size),
                    frame.encoded.to_string(),
                    frame.skipped.len().to_string(),
                    to_hex(&frame.bytes),
                ]);
            }
            println!("{table}");
            if report.deferred > 0 {
                println!("{} reading(s) did not fit; use --split", report.deferred);
            }
        }
        OutputFormat::Pretty => {
            for (n, frame) in report.frames.iter().enumerate() {
                println!(
                    "frame={} size={} records={} hex={}",
                    n,
                    frame.bytes.len(),
                    frame.encoded,
                    to_hex(&frame.bytes)
                );
                for skip in &frame.skipped {
                    println!("  skipped index={} error={}", skip.index, skip.error);
                }
            }
            if report.deferred > 0 {
                println!("deferred={}", report.deferred);
            }
        }
        OutputFormat::Raw => {
            for frame in report.frames {
                print_raw(&frame.bytes);
            }
        }
    }
}

pub fn print_records(size: usize, records: &[Record], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = DecodeOutput {
                schema_id: "cayenne-lpp/cli/v1/decode-result",
                size,
                records: records
                    .iter()
                    .map(|record| RecordOutput {
                        channel: record.channel,
                        ty: record.ty.name(),
                        code: record.ty.code(),
                        value: record.value,
                        display: record.value.to_string(),
                    })
                    .collect(),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CHANNEL", "TYPE", "CODE", "VALUE"]);
            for record in records {
                table.add_row(vec![
                    record.channel.to_string(),
                    record.ty.name().to_string(),
                    format!("0x{:02x}", record.ty.code()),
                    record.value.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for record in records {
                println!(
                    "channel={} type={} value={}",
                    record.channel, record.ty, record.value
                );
            }
        }
        OutputFormat::Raw => {
            for record in records {
                println!("{}\t{}\t{}", record.channel, record.ty.code(), record.value);
            }
        }
    }
}

pub fn print_types(types: &[LppType], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out: Vec<_> = types
                .iter()
                .map(|&ty| TypeOutput {
                    code: ty.code(),
                    ipso_object_id: ty.ipso_object_id(),
                    name: ty.name(),
                    payload_size: ty.payload_size(),
                    implemented: ty.is_implemented(),
                })
                .collect();
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CODE", "IPSO", "NAME", "PAYLOAD"]);
            for ty in types {
                table.add_row(vec![
                    format!("0x{:02x}", ty.code()),
                    ty.ipso_object_id().to_string(),
                    ty.name().to_string(),
                    ty.payload_size()
                        .map_or_else(|| "-".to_string(), |n| n.to_string()),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for ty in types {
                let size = ty
                    .payload_size()
                    .map_or_else(|| "-".to_string(), |n| n.to_string());
                println!("{}\t{}\t{}\t{}", ty.code(), ty.ipso_object_id(), ty.name(), size);
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize>(out: &T) {
    println!(
        "{}",
        serde_json::to_string(out).unwrap_or_else(|_| "{}".to_string())
    );
}

/// Lowercase hex without separators.
pub fn to_hex(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(text, "{byte:02x}");
    }
    text
}

/// Parse hex text. Whitespace, `:` and `-` separators and a `0x` prefix are
/// accepted.
pub fn parse_hex(text: &str) -> Result<Vec<u8>, String> {
    let text = text.trim();
    let text = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    let digits: Vec<u8> = text
        .bytes()
        .filter(|b| !b.is_ascii_whitespace() && *b != b':' && *b != b'-')
        .collect();

    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits ({})", digits.len()));
    }

    digits
        .chunks_exact(2)
        .map(|pair| {
            let hi = hex_digit(pair[0])?;
            let lo = hex_digit(pair[1])?;
            Ok((hi << 4) | lo)
        })
        .collect()
}

fn hex_digit(c: u8) -> Result<u8, String> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(format!("invalid hex digit {:?}", c as char)),
    }
}
