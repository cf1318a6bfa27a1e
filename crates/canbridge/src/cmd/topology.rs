use crate::cmd::TopologyArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_topology, OutputFormat};

pub fn run(args: TopologyArgs, format: OutputFormat) -> CliResult<i32> {
    let settings = args.bridge.settings()?;
    print_topology(&settings, format);
    Ok(SUCCESS)
}
