mod behaviour_config;
mod capture_config;
#[allow(clippy::module_inception)]
mod config;
mod server_config;
mod storage_config;

pub(crate) use {
    behaviour_config::BehaviourConfig, capture_config::CaptureConfig, config::Config,
    server_config::ServerConfig, storage_config::StorageConfig,
};

pub(crate) const DEFAULT_SHUTDOWN_ON_CAPTURE_FAILURE: bool = false;
pub(crate) const DEFAULT_PORT: u16 = 7878;

pub(crate) const ORGANIZATION: &str = "call-recorder";
pub(crate) const APPLICATION: &str = "Call-Recorder";

pub(crate) fn default_shutdown_on_capture_failure() -> bool {
    DEFAULT_SHUTDOWN_ON_CAPTURE_FAILURE
}

pub(crate) fn default_port() -> u16 {
    DEFAULT_PORT
}
