use crate::{FetchError, Fetcher};
use std::io::Read;

/// Plain HTTP(S) GET fetcher.
///
/// Requests go out with the agent's default headers, timeouts and redirect
/// policy. Any status of 400 or above is an error.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    pub fn new() -> Self {
        let agent = ureq::Agent::new_with_defaults();
        Self { agent }
    }

    fn do_get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let resp = match self.agent.get(url).call() {
            Ok(r) => r,
            Err(ureq::Error::StatusCode(404)) => {
                return Err(FetchError::NotFound(url.to_owned()));
            }
            Err(ureq::Error::StatusCode(code)) => {
                return Err(FetchError::Status {
                    url: url.to_owned(),
                    code,
                });
            }
            Err(e) => {
                return Err(FetchError::Http(format!("{url}: {e}")));
            }
        };

        let code = resp.status().as_u16();
        if code == 404 {
            return Err(FetchError::NotFound(url.to_owned()));
        }
        if code >= 400 {
            return Err(FetchError::Status {
                url: url.to_owned(),
                code,
            });
        }

        let mut reader = resp.into_body().into_reader();
        let mut body = Vec::new();
        reader
            .read_to_end(&mut body)
            .map_err(|e| FetchError::Http(format!("{url}: {e}")))?;
        Ok(body)
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        tracing::debug!("GET {url}");
        let body = self.do_get(url)?;
        tracing::debug!("GET {url}: {} bytes", body.len());
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::{Arc, Mutex};

    /// A captured HTTP request for header inspection.
    #[derive(Debug, Clone)]
    struct CapturedRequest {
        method: String,
        path: String,
        headers: HashMap<String, String>,
    }

    /// Serves fixed `(status, body)` pairs by request path.
    struct MockServer {
        addr: String,
        _handle: std::thread::JoinHandle<()>,
        requests: Arc<Mutex<Vec<CapturedRequest>>>,
    }

    impl MockServer {
        fn start(routes: &[(&str, u16, &[u8])]) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let addr = format!("http://{}", listener.local_addr().unwrap());
            let routes: Arc<HashMap<String, (u16, Vec<u8>)>> = Arc::new(
                routes
                    .iter()
                    .map(|(path, code, body)| ((*path).to_owned(), (*code, body.to_vec())))
                    .collect(),
            );
            let requests: Arc<Mutex<Vec<CapturedRequest>>> = Arc::new(Mutex::new(Vec::new()));

            let requests_clone = Arc::clone(&requests);
            let handle = std::thread::spawn(move || {
                for stream in listener.incoming() {
                    let Ok(mut stream) = stream else { break };
                    let routes = Arc::clone(&routes);
                    let reqs = Arc::clone(&requests_clone);

                    std::thread::spawn(move || {
                        let mut reader = BufReader::new(stream.try_clone().unwrap());
                        let mut request_line = String::new();
                        if reader.read_line(&mut request_line).is_err() {
                            return;
                        }
                        let parts: Vec<&str> = request_line.trim().splitn(3, ' ').collect();
                        if parts.len() < 2 {
                            return;
                        }
                        let method = parts[0].to_owned();
                        let path = parts[1].to_owned();

                        let mut headers = HashMap::new();
                        loop {
                            let mut line = String::new();
                            if reader.read_line(&mut line).is_err() || line.trim().is_empty() {
                                break;
                            }
                            if let Some((k, v)) = line.trim().split_once(": ") {
                                headers.insert(k.to_lowercase(), v.to_owned());
                            }
                        }

                        reqs.lock().unwrap().push(CapturedRequest {
                            method,
                            path: path.clone(),
                            headers,
                        });

                        let (code, body) = routes
                            .get(&path)
                            .cloned()
                            .unwrap_or((404, Vec::new()));
                        let reason = match code {
                            200 => "OK",
                            404 => "Not Found",
                            _ => "Error",
                        };
                        let head = format!(
                            "HTTP/1.1 {code} {reason}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                            body.len()
                        );
                        let _ = stream.write_all(head.as_bytes());
                        let _ = stream.write_all(&body);
                        let _ = stream.flush();
                    });
                }
            });

            MockServer {
                addr,
                _handle: handle,
                requests,
            }
        }

        fn url(&self, path: &str) -> String {
            format!("{}{path}", self.addr)
        }

        fn captured_requests(&self) -> Vec<CapturedRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[test]
    fn http_fetch_returns_body() {
        let server = MockServer::start(&[("/index.json", 200, b"{\"packages\":[]}".as_slice())]);
        let body = HttpFetcher::new()
            .fetch(&server.url("/index.json"))
            .unwrap();
        assert_eq!(body, b"{\"packages\":[]}");
    }

    #[test]
    fn http_missing_path_is_not_found() {
        let server = MockServer::start(&[]);
        let err = HttpFetcher::new()
            .fetch(&server.url("/nope.zip"))
            .unwrap_err();
        assert!(matches!(err, FetchError::NotFound(_)), "{err}");
    }

    #[test]
    fn http_server_error_is_status() {
        let server = MockServer::start(&[("/broken.zip", 500, b"".as_slice())]);
        let err = HttpFetcher::new()
            .fetch(&server.url("/broken.zip"))
            .unwrap_err();
        assert!(
            matches!(err, FetchError::Status { code: 500, .. }),
            "{err}"
        );
    }

    #[test]
    fn http_connection_refused_returns_error() {
        let err = HttpFetcher::new()
            .fetch("http://127.0.0.1:1/archive.zip")
            .unwrap_err();
        assert!(matches!(err, FetchError::Http(_)), "{err}");
    }

    #[test]
    fn http_fetch_to_file_writes_exact_bytes() {
        let payload: Vec<u8> = (0..300_000).map(|i| (i % 251) as u8).collect();
        let server = MockServer::start(&[("/dl/core.zip", 200, payload.as_slice())]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("core.zip");

        HttpFetcher::new()
            .fetch_to_file(&server.url("/dl/core.zip"), &path)
            .unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), payload);
    }

    #[test]
    fn http_sends_plain_get_without_auth() {
        let server = MockServer::start(&[("/a", 200, b"a".as_slice())]);
        HttpFetcher::new().fetch(&server.url("/a")).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(50));

        let reqs = server.captured_requests();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].method, "GET");
        assert_eq!(reqs[0].path, "/a");
        assert!(!reqs[0].headers.contains_key("authorization"));
    }

    #[test]
    fn http_every_fetch_hits_the_server() {
        let server = MockServer::start(&[("/a", 200, b"a".as_slice())]);
        let fetcher = HttpFetcher::new();
        fetcher.fetch(&server.url("/a")).unwrap();
        fetcher.fetch(&server.url("/a")).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(50));
        assert_eq!(server.captured_requests().len(), 2);
    }
}
