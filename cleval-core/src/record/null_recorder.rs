use super::{Record, Recorder};

/// A recorder that ignores any record. This struct is used just for debugging.
pub struct NullRecorder {}

impl Recorder for NullRecorder {
    /// Discard the given record.
    fn write(&mut self, _record: Record) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discards_records() {
        let mut recorder = NullRecorder {};
        recorder.write(Record::from_scalar("episode_return", 21.0));
    }
}
