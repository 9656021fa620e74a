pub mod probe;
pub mod result;

pub mod prelude {
    pub use super::probe::{ProbeMode, probe_url};
    pub use super::result::ProbeResult;
}

use std::fmt::Write;

/// Flattens an error and its source chain into a single message.
fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let _ = write!(s, ": {}", src);
        err = src;
    }
    s
}
