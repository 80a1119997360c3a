//! Example showing how to enumerate connected card readers

use tagrelay_pcsc::{CardSubsystem, PcscSubsystem};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subsystem = PcscSubsystem::establish()?;

    let readers = subsystem.list_readers()?;

    println!("Found {} readers:", readers.len());

    for (i, reader) in readers.iter().enumerate() {
        println!("{}. Reader: {}", i + 1, reader);
    }

    subsystem.release()?;

    Ok(())
}
