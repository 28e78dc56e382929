use std::io::Read;

use cayenne_lpp::codec::{
    pack_frame, pack_frames, LppError, LppType, PackConfig, PackedFrame, Record,
};
use cayenne_lpp::sensor::{SampleValue, SensorSample};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::cmd::EncodeArgs;
use crate::exit::{
    io_error, json_error, lpp_error, sensor_error, CliError, CliResult, DATA_INVALID, SUCCESS,
    USAGE,
};
use crate::output::{print_encode, EncodeReport, OutputFormat};

/// One input reading: a sensor sample or an explicit LPP record.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Reading {
    Sensor(SensorSample),
    Record {
        channel: u8,
        #[serde(rename = "type")]
        ty: LppType,
        value: SampleValue,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Input {
    Many(Vec<Reading>),
    One(Reading),
}

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    if args.max_size == 0 {
        return Err(CliError::new(USAGE, "--max-size must be at least 1"));
    }

    let text = read_input(&args)?;
    let records = parse_readings(&text)?;
    let config = PackConfig {
        max_frame_size: args.max_size,
    };

    let (frames, deferred) = if args.split {
        let frames = pack_frames(&records, &config).map_err(|err| lpp_error("encode", err))?;
        (frames, 0)
    } else {
        let frame = pack_frame(&records, &config).map_err(|err| lpp_error("encode", err))?;
        let deferred = records.len() - frame.consumed;
        if deferred > 0 {
            warn!(deferred, max_size = args.max_size, "readings did not fit in one frame");
        }
        (vec![frame], deferred)
    };

    info!(
        readings = records.len(),
        frames = frames.len(),
        "encoded readings"
    );

    print_encode(
        &EncodeReport {
            max_size: args.max_size,
            frames: &frames,
            deferred,
        },
        format,
    );

    if !records.is_empty() && frames.iter().all(PackedFrame::is_empty) {
        warn!("no reading could be encoded");
        return Ok(DATA_INVALID);
    }
    Ok(SUCCESS)
}

fn read_input(args: &EncodeArgs) -> CliResult<String> {
    if let Some(json) = &args.json {
        return Ok(json.clone());
    }
    if let Some(path) = &args.file {
        return std::fs::read_to_string(path)
            .map_err(|err| io_error(&format!("read {}", path.display()), err));
    }
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .map_err(|err| io_error("read stdin", err))?;
    Ok(text)
}

fn parse_readings(text: &str) -> CliResult<Vec<Record>> {
    let input: Input = serde_json::from_str(text).map_err(|err| json_error("parse readings", err))?;
    let readings = match input {
        Input::Many(readings) => readings,
        Input::One(reading) => vec![reading],
    };

    let mut records = Vec::with_capacity(readings.len());
    for (index, reading) in readings.into_iter().enumerate() {
        let context = format!("reading {index}");
        match reading {
            Reading::Sensor(sample) => {
                match sample.to_record().map_err(|err| sensor_error(&context, err))? {
                    Some(record) => records.push(record),
                    None => debug!(index, sensor = %sample.kind, "sensor has no LPP mapping"),
                }
            }
            Reading::Record { channel, ty, value } => {
                let encoding = ty
                    .encoding()
                    .ok_or_else(|| lpp_error(&context, LppError::NotImplemented(ty)))?;
                let value = value
                    .to_value(encoding)
                    .map_err(|err| sensor_error(&context, err))?;
                records.push(Record::new(channel, ty, value));
            }
        }
    }
    Ok(records)
}
