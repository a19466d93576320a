use std::time::SystemTime;

pub trait SystemTimeExt {
    /// Milliseconds since the Unix epoch, negative for instants before it.
    fn to_epoch_millis(&self) -> i64;
}

impl SystemTimeExt for SystemTime {
    fn to_epoch_millis(&self) -> i64 {
        match self.duration_since(SystemTime::UNIX_EPOCH) {
            Ok(after) => i64::try_from(after.as_millis()).unwrap_or(i64::MAX),
            Err(before) => i64::try_from(before.duration().as_millis())
                .map(|millis| -millis)
                .unwrap_or(i64::MIN),
        }
    }
}
