use crate::dimension::DimensionPair;

pub const READING_IMAGE: &str = "Reading image…";
pub const READY: &str = "Ready.";
pub const UNREADABLE_IMAGE: &str = "Could not read that image file.";
pub const NO_IMAGE_SELECTED: &str = "Choose an image first.";

pub fn converting(dimensions: DimensionPair) -> String {
    format!(
        "Converting… ({}×{})",
        dimensions.width(),
        dimensions.height()
    )
}

pub fn done(file_name: &str) -> String {
    format!("Done. Wrote: {}", file_name)
}

/// Sink for human-readable progress and error messages.
pub trait StatusReporter {
    fn report(&mut self, message: &str);
}

pub struct ConsoleStatusReporter;

impl StatusReporter for ConsoleStatusReporter {
    fn report(&mut self, message: &str) {
        log::info!("{}", message);
        println!("{}", message);
    }
}
