use cayenne_lpp::codec::CATALOG;

use crate::cmd::TypesArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_types, OutputFormat};

pub fn run(args: TypesArgs, format: OutputFormat) -> CliResult<i32> {
    let types: Vec<_> = CATALOG
        .iter()
        .copied()
        .filter(|ty| args.all || ty.is_implemented())
        .collect();
    print_types(&types, format);
    Ok(SUCCESS)
}
