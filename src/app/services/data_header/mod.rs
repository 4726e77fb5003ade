//! Data file header parser
//!
//! BCS data files open with a free-text header whose layout depends on the
//! scan type. The parser walks it line by line:
//!
//! - keyword lines (`Start:`, `Count Time (s):`, ...) fill typed fields
//! - some keywords announce a value on the following line (motor name,
//!   pause motor, scan file path, memo), tracked by [`PendingCapture`]
//! - time scans open with four positional numeric lines, tracked by
//!   [`TimeScanStep`]
//! - the first digit-leading line not claimed above is the data table
//!
//! Trajectory scans name a separate scan file; its motor table for this
//! data file's output number is merged into the returned [`HeaderInfo`].
//!
//! [`HeaderInfo`]: crate::app::models::HeaderInfo

pub mod motor_table;
pub mod parser;
pub mod state;

#[cfg(test)]
pub mod tests;

pub use motor_table::{FlyingStep, apply_motor_table, parse_flying_descriptor};
pub use parser::{DataHeaderParser, parse_data_header};
pub use state::{LineOutcome, PendingCapture, TimeScanStep};
