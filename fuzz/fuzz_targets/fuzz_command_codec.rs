//! Fuzz target: `decode_command`
//!
//! Feeds arbitrary bytes to the executor command codec. Decoding must
//! never panic; whatever comes back is either a well-formed command or a
//! typed error.
//!
//! cargo fuzz run fuzz_command_codec

#![no_main]

use homelink::app::commands::DeviceCommand;
use homelink::link::decode_command;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(cmd) = decode_command(data) {
        // any accepted declaration carries a name the registry could key on
        match cmd {
            DeviceCommand::AddActuator { name, .. }
            | DeviceCommand::AddSensor { name, .. }
            | DeviceCommand::PublishState { name, .. } => {
                let _ = name.len();
            }
            DeviceCommand::QueryConnection => {}
        }
    }
});
