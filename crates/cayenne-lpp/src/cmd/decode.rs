use std::io::Read;

use cayenne_lpp::codec::LppStream;
use tracing::debug;

use crate::cmd::DecodeArgs;
use crate::exit::{io_error, lpp_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{parse_hex, print_records, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = read_frame(&args)?;
    let mut stream = LppStream::from_bytes(&bytes).map_err(|err| lpp_error("decode", err))?;

    let mut records = Vec::new();
    let mut failure = None;
    for item in stream.records() {
        match item {
            Ok(record) => records.push(record),
            Err(err) => failure = Some(err),
        }
    }
    debug!(size = bytes.len(), records = records.len(), "decoded frame");

    print_records(bytes.len(), &records, format);

    match failure {
        Some(err) => {
            let offset = bytes.len() - stream.remaining();
            Err(lpp_error(&format!("decode failed at byte {offset}"), err))
        }
        None => Ok(SUCCESS),
    }
}

fn read_frame(args: &DecodeArgs) -> CliResult<Vec<u8>> {
    if let Some(path) = &args.file {
        return std::fs::read(path).map_err(|err| io_error(&format!("read {}", path.display()), err));
    }
    let text = match &args.hex {
        Some(hex) => hex.clone(),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|err| io_error("read stdin", err))?;
            text
        }
    };
    parse_hex(&text).map_err(|msg| CliError::new(DATA_INVALID, format!("invalid hex: {msg}")))
}
