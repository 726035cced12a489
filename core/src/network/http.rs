use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, header, redirect};
use subscout_common::error::ProbeError;
use subscout_common::models::host::HttpResponse;
use subscout_common::ports::HttpProber;

const MAX_REDIRECTS: usize = 10;
const USER_AGENT: &str = concat!("subscout/", env!("CARGO_PKG_VERSION"));

/// [`HttpProber`] over a shared `reqwest` client.
pub struct ReqwestProber {
    client: Client,
}

impl ReqwestProber {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client: Client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpProber for ReqwestProber {
    async fn get(&self, url: &str) -> Result<HttpResponse, ProbeError> {
        let response: Response = self.client.get(url).send().await.map_err(transport_error)?;

        let status: u16 = response.status().as_u16();
        let server: Option<String> = response
            .headers()
            .get(header::SERVER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body: Vec<u8> = response
            .bytes()
            .await
            .map_err(|e| ProbeError::Malformed(e.to_string()))?
            .to_vec();

        Ok(HttpResponse {
            status,
            server,
            body,
        })
    }
}

fn transport_error(err: reqwest::Error) -> ProbeError {
    if err.is_timeout() {
        ProbeError::Timeout
    } else {
        ProbeError::Connect(err.to_string())
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn prober() -> ReqwestProber {
        ReqwestProber::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn get_returns_status_server_and_body() {
        let server: MockServer = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Server", "wiremock-test")
                    .set_body_string("<title>Hi</title>"),
            )
            .mount(&server)
            .await;

        let response: HttpResponse = prober().get(&server.uri()).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.server.as_deref(), Some("wiremock-test"));
        assert_eq!(response.body, b"<title>Hi</title>");
    }

    #[tokio::test]
    async fn error_statuses_are_still_responses() {
        let server: MockServer = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let response: HttpResponse = prober().get(&server.uri()).await.unwrap();
        assert_eq!(response.status, 503);
        assert!(response.server.is_none());
    }

    #[tokio::test]
    async fn redirects_are_followed() {
        let server: MockServer = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("Location", format!("{}/home", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/home"))
            .respond_with(ResponseTemplate::new(200).set_body_string("home"))
            .mount(&server)
            .await;

        let response: HttpResponse = prober().get(&server.uri()).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"home");
    }

    #[tokio::test]
    async fn slow_responses_time_out() {
        let server: MockServer = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let prober: ReqwestProber = ReqwestProber::new(Duration::from_millis(200)).unwrap();
        assert_eq!(prober.get(&server.uri()).await, Err(ProbeError::Timeout));
    }
}
