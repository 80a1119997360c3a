//! Example printing tag arrivals and removals on the first reader
//!
//! Reads the UID of every tag that arrives. Press Ctrl+C to exit.

use std::time::Duration;

use tagrelay_pcsc::{CardConnection, CardSubsystem, ConnectOptions, PcscSubsystem, ReaderState};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subsystem = PcscSubsystem::establish()?;
    let options = ConnectOptions::default();

    let Some(reader) = subsystem.list_readers()?.into_iter().next() else {
        println!("No readers found");
        return Ok(());
    };

    println!("Watching '{}'. Press Ctrl+C to exit.", reader);

    let mut states = [ReaderState::new(reader.clone())];
    loop {
        match subsystem.wait_for_status_change(&mut states, Duration::from_secs(1)) {
            Ok(()) => {}
            Err(e) if e.is_timeout() => continue,
            Err(e) => return Err(e.into()),
        }

        let status = states[0].status;
        println!("{} -> {}", status.current, status.event);

        if status.just_arrived() {
            let mut connection = subsystem.connect(&reader, options.share_mode, options.protocol)?;
            let response = connection.transmit(&[0xFF, 0xCA, 0x00, 0x00, 0x00]);
            connection.disconnect(options.disposition)?;
            println!("Tag arrived, UID response: {}", hex::encode_upper(response?));
        }
        if status.just_removed() {
            println!("Tag removed");
        }

        states[0].status.advance();
    }
}
