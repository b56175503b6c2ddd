use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

use crate::error::FetchError;
use crate::settings::Settings;

/// A retrieved HTML document and the URL it was served from, after redirects.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: Url,
    pub body: String,
}

/// Retrieves one page per call. No retries.
pub trait Fetch {
    fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// Blocking HTTP client shared by every request of a crawl.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(settings: &Settings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.request_timeout())
            .build()?;
        Ok(HttpFetcher { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let resp = self.client.get(url.clone()).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let served_from = resp.url().clone();
        let body = resp.text()?;
        if served_from != *url {
            debug!(%url, %served_from, "redirected");
        }
        debug!(url = %served_from, bytes = body.len(), "fetched");
        Ok(FetchedPage {
            url: served_from,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    use super::*;

    /// Answers `requests` connections on a local port, one response per
    /// request line, and returns the server's base URL.
    fn serve(requests: usize, respond: fn(&str) -> String) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = Url::parse(&format!("http://{}/", listener.local_addr().unwrap())).unwrap();
        thread::spawn(move || {
            for stream in listener.incoming().take(requests) {
                let mut stream = stream.unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                let mut header = String::new();
                loop {
                    header.clear();
                    if reader.read_line(&mut header).unwrap() <= 2 {
                        break;
                    }
                }
                stream.write_all(respond(&request_line).as_bytes()).unwrap();
            }
        });
        base
    }

    fn local_fetcher() -> HttpFetcher {
        HttpFetcher {
            client: Client::builder().no_proxy().build().unwrap(),
        }
    }

    fn html(body: &str) -> String {
        format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    #[test]
    fn page_url_is_where_the_redirect_landed() {
        let base = serve(2, |request| {
            if request.starts_with("GET /catalog/jars ") {
                html("<html><body><h1>Jars</h1></body></html>")
            } else {
                "HTTP/1.1 301 Moved Permanently\r\nLocation: /catalog/jars\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string()
            }
        });
        let page = local_fetcher().fetch(&base.join("jars").unwrap()).unwrap();
        assert_eq!(page.url, base.join("catalog/jars").unwrap());
        assert!(page.body.contains("<h1>Jars</h1>"));
        // relative links on the page now resolve against the final location
        assert_eq!(page.url.join("amber").unwrap().path(), "/catalog/amber");
    }

    #[test]
    fn error_status_is_reported() {
        let base = serve(1, |_| {
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string()
        });
        let err = local_fetcher().fetch(&base.join("gone").unwrap()).unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }
}
