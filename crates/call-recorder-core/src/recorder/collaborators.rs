use crate::CoreResult;

/// Best-effort resolution of a phone number to a contact display name.
///
/// Lookups may be slow or fail; the recorder never lets either block
/// finalizing a recording.
pub trait ContactLookup: Send {
    /// Display name for `number`, or `None` if unknown.
    fn lookup(&self, number: &str) -> CoreResult<Option<String>>;
}

/// Receives user-visible recording start/stop signals.
///
/// Failures are logged by the recorder and otherwise ignored.
pub trait StatusSink: Send {
    /// A recording started for the party described by `label`.
    fn recording_started(&self, label: &str) -> CoreResult<()>;

    /// The running recording stopped.
    fn recording_stopped(&self) -> CoreResult<()>;
}
