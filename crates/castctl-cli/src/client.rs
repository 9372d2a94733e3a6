use anyhow::Context;
use castctl_core::camera::CameraEndpoint;
use castctl_core::snapshot::ControlSnapshot;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP side of the panel: the control endpoint plus the camera's CGI.
#[derive(Debug, Clone)]
pub struct ControlClient {
    http: reqwest::Client,
    base_url: String,
    camera: CameraEndpoint,
}

impl ControlClient {
    pub fn new(base_url: impl Into<String>, camera: CameraEndpoint) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            camera,
        })
    }

    pub fn control_url(&self) -> String {
        format!("{}/control", self.base_url)
    }

    /// Send one action and return the snapshot the server answers with.
    pub async fn fetch(&self, action: &str) -> anyhow::Result<ControlSnapshot> {
        let url = self.control_url();
        let snap = self
            .http
            .get(&url)
            .query(&[("action", action)])
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?
            .error_for_status()?
            .json::<ControlSnapshot>()
            .await
            .context("control endpoint returned malformed JSON")?;
        Ok(snap)
    }

    pub async fn recall_preset(&self, preset: i64) -> anyhow::Result<()> {
        self.camera_command(&self.camera.preset_url(preset)).await
    }

    pub async fn rehome(&self) -> anyhow::Result<()> {
        self.camera_command(&self.camera.rehome_url()).await
    }

    async fn camera_command(&self, url: &str) -> anyhow::Result<()> {
        let body = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("camera request {url} failed"))?
            .error_for_status()?
            .text()
            .await
            .unwrap_or_default();
        tracing::debug!(%url, response = %body.trim(), "camera command sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn camera_for(server: &mockito::ServerGuard) -> CameraEndpoint {
        let addr = server.host_with_port();
        let (host, port) = addr.rsplit_once(':').unwrap();
        CameraEndpoint::new(host, port.parse().unwrap())
    }

    #[tokio::test]
    async fn fetch_sends_action_and_parses_snapshot() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/control")
            .match_query(Matcher::UrlEncoded("action".into(), "pause".into()))
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"action":"pause","buttonPaused":true,
                    "schedule":[["start","2024-03-10 09:00:00Z","ward"]],
                    "bandwidth":"3000","preset":"2","recording":false,"viewers":"5"}"#,
            )
            .create_async()
            .await;

        let client = ControlClient::new(server.url(), camera_for(&server)).unwrap();
        let snap = client.fetch("pause").await.unwrap();
        mock.assert_async().await;
        assert!(snap.button_paused);
        assert_eq!(snap.schedule[0].org(), "ward");
        assert_eq!(snap.viewers, 5);
    }

    #[tokio::test]
    async fn fetch_surfaces_http_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/control")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let client = ControlClient::new(server.url(), camera_for(&server)).unwrap();
        assert!(client.fetch("status").await.is_err());
    }

    #[tokio::test]
    async fn camera_commands_hit_cgi_urls() {
        let mut server = mockito::Server::new_async().await;
        let preset = server
            .mock("GET", "/cgi-bin/ptzctrl.cgi")
            .match_query(Matcher::Exact("ptzcmd&poscall&4".into()))
            .with_body("ok")
            .create_async()
            .await;
        let rehome = server
            .mock("GET", "/cgi-bin/param.cgi")
            .match_query(Matcher::Exact("pan_tiltdrive_reset".into()))
            .with_body("ok")
            .create_async()
            .await;

        let client = ControlClient::new(server.url(), camera_for(&server)).unwrap();
        client.recall_preset(4).await.unwrap();
        client.rehome().await.unwrap();
        preset.assert_async().await;
        rehome.assert_async().await;
    }
}
