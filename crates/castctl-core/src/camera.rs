use crate::config::CameraConfig;

/// The PTZ camera's CGI endpoint. Commands are opaque URLs; this crate never
/// speaks the camera protocol itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraEndpoint {
    pub host: String,
    pub port: u16,
}

impl CameraEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    fn base(&self) -> String {
        format!("http://{}:{}/cgi-bin", self.host, self.port)
    }

    /// Recall a stored position.
    pub fn preset_url(&self, preset: i64) -> String {
        format!("{}/ptzctrl.cgi?ptzcmd&poscall&{preset}", self.base())
    }

    /// Drive pan/tilt back to home.
    pub fn rehome_url(&self) -> String {
        format!("{}/param.cgi?pan_tiltdrive_reset", self.base())
    }
}

impl From<&CameraConfig> for CameraEndpoint {
    fn from(cfg: &CameraConfig) -> Self {
        Self::new(cfg.host.clone(), cfg.port)
    }
}
