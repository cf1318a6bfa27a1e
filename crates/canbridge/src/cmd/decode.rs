use canbridge_decode::{DecoderIds, DecoderRegistry};
use canbridge_frame::Frame;
use canbridge_router::{ConsoleObserver, FrameObserver};

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::OutputFormat;

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let frame =
        Frame::with_id(args.id, &args.data).map_err(|err| frame_error("invalid frame", err))?;

    let defaults = DecoderIds::default();
    let ids = DecoderIds {
        keypad_id: args.keypad_id.unwrap_or(defaults.keypad_id),
        control_id: args.control_id.unwrap_or(defaults.control_id),
    };

    let mut observer = ConsoleObserver::new(
        std::io::stdout(),
        format.observer_format(),
        DecoderRegistry::with_builtins(ids),
    );
    observer.observe(&args.link, &frame);

    Ok(SUCCESS)
}
