use crate::domain::constants::USER_AGENT;
use crate::error::{PipelineError, PipelineResult};
use std::io::Write;
use std::time::Duration;

/// Blocking GET that streams the response body into `sink`.
///
/// Implementations must fail on non-success statuses and return the number of
/// bytes written on success.
pub trait Transport {
    fn get(&self, url: &str, timeout: Duration, sink: &mut dyn Write) -> PipelineResult<u64>;
}

pub struct HttpTransport {
    connect_timeout: Duration,
}

impl HttpTransport {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, timeout: Duration, sink: &mut dyn Write) -> PipelineResult<u64> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PipelineError::network(url, e))?;
        tracing::debug!(url, ?timeout, "GET");
        let mut resp = client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| PipelineError::network(url, e))?;
        let mut tracked = TrackedSink {
            inner: sink,
            failed: None,
        };
        match std::io::copy(&mut resp, &mut tracked) {
            Ok(n) => Ok(n),
            Err(e) => match tracked.failed.take() {
                Some(write_err) => Err(PipelineError::Sink(write_err)),
                None => Err(PipelineError::network(url, e)),
            },
        }
    }
}

/// Remembers whether a copy failed on the write side rather than the body read.
struct TrackedSink<'a> {
    inner: &'a mut dyn Write,
    failed: Option<std::io::Error>,
}

impl Write for TrackedSink<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf).map_err(|e| {
            self.failed = Some(std::io::Error::new(e.kind(), e.to_string()));
            e
        })
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

pub fn polygon_url(service: &str, polygon_id: u64, params: &str) -> PipelineResult<String> {
    let id = polygon_id.to_string();
    reqwest::Url::parse_with_params(service, &[("id", id.as_str()), ("params", params)])
        .map(String::from)
        .map_err(|e| PipelineError::Config(format!("polygon_service {service:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::polygon_url;

    #[test]
    fn polygon_url_encodes_id_and_params() {
        let url = polygon_url(
            "https://polygons.openstreetmap.fr/get_poly.py",
            198848,
            "0.020000-0.005000-0.005000",
        )
        .unwrap();
        assert_eq!(
            url,
            "https://polygons.openstreetmap.fr/get_poly.py?id=198848&params=0.020000-0.005000-0.005000"
        );
    }

    #[test]
    fn polygon_url_rejects_relative_service() {
        assert!(polygon_url("get_poly.py", 1, "0").is_err());
    }
}
