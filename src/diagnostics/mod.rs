// On-demand connectivity check across the endpoint table
mod probe;
mod recommendations;

pub use probe::{DiagnosticProbe, DiagnosticReport, ProbeResult};
pub use recommendations::{GENERIC_HINTS, recommendations_for};
