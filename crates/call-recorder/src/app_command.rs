use call_recorder_core::LineNotification;

/// Commands delivered to the application loop.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// A line-state notification from the telephony side.
    Line(LineNotification),
    /// Request application shutdown.
    Shutdown,
}
