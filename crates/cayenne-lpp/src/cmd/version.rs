use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("cayenne-lpp {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: cayenne-lpp");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("CAYENNE_LPP_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "default_max_frame_size: {}",
        cayenne_lpp::codec::DEFAULT_MAX_FRAME_SIZE
    );
    println!("features: serde={}, cli=true", cfg!(feature = "serde"));

    Ok(SUCCESS)
}
