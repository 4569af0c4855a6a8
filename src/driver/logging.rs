use super::Diagnostics;
use log::{Level, warn};

/// This function inspects all the diagnostics of a statement and logs their text messages as
/// warnings.
pub fn log_diagnostics(handle: &(impl Diagnostics + ?Sized)) {
    if log::max_level() < Level::Warn {
        // Early return to safe work creating all these log records in case we would not log
        // anything.
        return;
    }

    let mut rec_number = 1;

    // Log results, while there are diagnostic records
    while let Some(rec) = handle.diagnostic_record(rec_number) {
        warn!("{rec}");
        // Prevent overflow. This is not that unlikely to happen, since some `execute` or `fetch`
        // calls can cause diagnostic messages for each row
        if rec_number == i16::MAX {
            warn!("Too many diagnostic records were generated. Not all could be logged.");
            break;
        }
        rec_number += 1;
    }
}
