use std::time::Duration;
use log::debug;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, InvalidHeaderValue, USER_AGENT};
use thiserror::Error;

/// Why a page could not be fetched. Display strings are the messages shown
/// to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,
    #[error("Connection failed. Check your internet.")]
    Connect,
    #[error("HTTP Error: {0}")]
    Status(u16),
    #[error("Unexpected error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::Connect
        } else if let Some(status) = e.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Other(e.to_string())
        }
    }
}

/// Anything that can turn a URL into a response body.
pub trait Fetch {
    fn get(&self, url: &str) -> Result<String, FetchError>;
}

impl<F: Fetch + ?Sized> Fetch for &F {
    fn get(&self, url: &str) -> Result<String, FetchError> {
        (**self).get(url)
    }
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(headers: HeaderMap, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(HttpFetcher { client })
    }
}

impl Fetch for HttpFetcher {
    fn get(&self, url: &str) -> Result<String, FetchError> {
        let resp = self.client.get(url).send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = resp.text()?;
        debug!("GET {} -> {} ({} bytes)", url, status, body.len());
        Ok(body)
    }
}

pub fn default_headers(user_agent: &str) -> Result<HeaderMap, InvalidHeaderValue> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc::{self, Receiver};
    use std::thread;

    // Serves exactly one connection: forwards the request head on the
    // returned channel, then either writes `response` or stalls for `stall`.
    fn serve_once(response: Option<&'static str>, stall: Duration) -> (String, Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (head_tx, head_rx) = mpsc::channel();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 1024];
                let mut seen = Vec::new();
                while !seen.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => seen.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = head_tx.send(String::from_utf8_lossy(&seen).into_owned());
                match response {
                    Some(r) => {
                        let _ = stream.write_all(r.as_bytes());
                    }
                    None => thread::sleep(stall),
                }
            }
        });
        (format!("http://{}/", addr), head_rx)
    }

    fn fetcher(timeout: Duration) -> HttpFetcher {
        HttpFetcher::new(default_headers("test-agent").unwrap(), timeout).unwrap()
    }

    #[test]
    fn returns_body_on_success() {
        let (url, _) = serve_once(
            Some("HTTP/1.1 200 OK\r\nContent-Length: 12\r\nConnection: close\r\n\r\n<p>hello</p>"),
            Duration::ZERO,
        );
        let body = fetcher(Duration::from_secs(5)).get(&url).unwrap();
        assert_eq!(body, "<p>hello</p>");
    }

    #[test]
    fn configured_user_agent_is_sent() {
        let (url, head) = serve_once(
            Some("HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n"),
            Duration::ZERO,
        );
        fetcher(Duration::from_secs(5)).get(&url).unwrap();

        let head = head.recv_timeout(Duration::from_secs(5)).unwrap().to_ascii_lowercase();
        assert!(head.starts_with("get / http/1.1\r\n"));
        assert!(head.contains("user-agent: test-agent\r\n"), "{}", head);
    }

    #[test]
    fn non_success_status_is_classified() {
        let (url, _) = serve_once(
            Some("HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"),
            Duration::ZERO,
        );
        let err = fetcher(Duration::from_secs(5)).get(&url).unwrap_err();
        assert_eq!(err, FetchError::Status(404));
        assert_eq!(err.to_string(), "HTTP Error: 404");
    }

    #[test]
    fn refused_connection_is_classified() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = fetcher(Duration::from_secs(5))
            .get(&format!("http://{}/", addr))
            .unwrap_err();
        assert_eq!(err, FetchError::Connect);
    }

    #[test]
    fn stalled_server_times_out() {
        let (url, _) = serve_once(None, Duration::from_secs(3));
        let err = fetcher(Duration::from_millis(300)).get(&url).unwrap_err();
        assert_eq!(err, FetchError::Timeout);
    }

    #[test]
    fn each_failure_class_has_its_own_message() {
        let messages = [
            FetchError::Timeout.to_string(),
            FetchError::Connect.to_string(),
            FetchError::Status(500).to_string(),
            FetchError::Other("boom".into()).to_string(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
