/// Requests delivered to the UI thread from background services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    Show,
    Hide,
    ConfigReload,
}
