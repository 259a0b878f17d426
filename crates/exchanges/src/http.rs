//! Monoio-native HTTP/HTTPS transport
//!
//! - `Transport` is the seam every adapter sends through
//! - `MonoioHttpsClient` speaks HTTP/1.1 over rustls on monoio TCP, one
//!   connection per request (`Connection: close`)
//! - connect and read phases are bounded by separate timeouts
//! - an optional `https` forward proxy is reached over TLS, and the venue
//!   session runs inside a `CONNECT` tunnel carried by that session

use crate::errors::{ExchangeError, Result, TransportError};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use monoio::io::{AsyncReadRent, AsyncWriteRentExt};
use monoio::net::TcpStream;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection};
use std::fmt;
use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

type TransportResult<T> = std::result::Result<T, TransportError>;

const USER_AGENT: &str = concat!("coinwire/", env!("CARGO_PKG_VERSION"));
const MAX_PROXY_HEAD: usize = 16 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built request; adapters construct a new one per call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: Url) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_form_body(self, body: String) -> Self {
        let mut request = self.with_header("Content-Type", "application/x-www-form-urlencoded");
        request.body = Some(body);
        request
    }

    pub fn with_json_body(self, body: String) -> Self {
        let mut request = self.with_header("Content-Type", "application/json");
        request.body = Some(body);
        request
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// `path?query` as sent on the request line
    pub fn target(&self) -> String {
        match self.url.query() {
            Some(query) => format!("{}?{}", self.url.path(), query),
            None => self.url.path().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// One request, one response
#[async_trait(?Send)]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Timeouts and proxy for `MonoioHttpsClient`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// TCP connect, proxy tunnel and TLS handshake
    pub connect_timeout: Duration,
    /// Writing the request and reading the full response
    pub read_timeout: Duration,
    /// Forward proxy URL; must use the `https` scheme
    pub proxy: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(8),
            read_timeout: Duration::from_secs(15),
            proxy: None,
        }
    }
}

/// Monoio-native HTTPS client
pub struct MonoioHttpsClient {
    tls_config: Arc<ClientConfig>,
    config: TransportConfig,
    proxy: Option<Url>,
}

impl MonoioHttpsClient {
    /// Client with default timeouts and no proxy
    pub fn new() -> Result<Self> {
        Self::with_config(TransportConfig::default())
    }

    pub fn with_config(config: TransportConfig) -> Result<Self> {
        let proxy = config.proxy.as_deref().map(parse_proxy).transpose()?;

        let mut root_store = rustls::RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let tls_config = ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        Ok(Self {
            tls_config: Arc::new(tls_config),
            config,
            proxy,
        })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn tls_session(&self, host: &str) -> TransportResult<ClientConnection> {
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|e| TransportError::Tls(format!("invalid server name {host}: {e:?}")))?;
        ClientConnection::new(self.tls_config.clone(), server_name)
            .map_err(|e| TransportError::Tls(format!("TLS setup failed: {e}")))
    }

    async fn connect(&self, host: &str, port: u16) -> Result<TlsStream<Wire>> {
        let wire = match &self.proxy {
            Some(proxy) => Wire::Tunnel(Box::new(self.open_tunnel(proxy, host, port).await?)),
            None => Wire::Direct(
                TcpStream::connect(format!("{host}:{port}"))
                    .await
                    .map_err(|e| TransportError::Connect(format!("{host}:{port}: {e}")))?,
            ),
        };

        let mut tls_stream = TlsStream::new(wire, self.tls_session(host)?);
        tls_stream.complete_handshake().await?;
        Ok(tls_stream)
    }

    /// TLS session to the proxy carrying a `CONNECT` tunnel to `host:port`
    async fn open_tunnel(&self, proxy: &Url, host: &str, port: u16) -> TransportResult<TlsStream<TcpStream>> {
        let proxy_host = proxy.host_str().unwrap_or_default();
        let proxy_port = proxy.port_or_known_default().unwrap_or(443);

        let stream = TcpStream::connect(format!("{proxy_host}:{proxy_port}"))
            .await
            .map_err(|e| TransportError::Proxy(format!("connect {proxy_host}:{proxy_port}: {e}")))?;
        let mut tunnel = TlsStream::new(stream, self.tls_session(proxy_host)?);
        tunnel.complete_handshake().await?;

        tunnel.write_all(connect_request(proxy, host, port).as_bytes()).await?;

        let mut head = Vec::new();
        while find_header_end(&head).is_none() {
            let chunk = tunnel.recv_bytes().await?;
            if chunk.is_empty() {
                return Err(TransportError::Proxy("proxy closed the tunnel".to_string()));
            }
            head.extend_from_slice(&chunk);
            if head.len() > MAX_PROXY_HEAD {
                return Err(TransportError::Proxy("oversized CONNECT response".to_string()));
            }
        }

        let status = parse_status_line(&String::from_utf8_lossy(&head))?;
        if !(200..300).contains(&status) {
            return Err(TransportError::Proxy(format!("CONNECT {host}:{port} refused with {status}")));
        }
        debug!("🔀 tunnel to {}:{} via {}", host, port, proxy_host);
        Ok(tunnel)
    }
}

#[async_trait(?Send)]
impl Transport for MonoioHttpsClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        if request.url.scheme() != "https" {
            return Err(ExchangeError::InvalidUrl(format!("only https is supported: {}", request.url)));
        }
        let host = request
            .url
            .host_str()
            .ok_or_else(|| ExchangeError::InvalidUrl(format!("no host in {}", request.url)))?
            .to_string();
        let port = request.url.port_or_known_default().unwrap_or(443);

        debug!("📡 {} {}", request.method, request.url);

        let connect_timeout = self.config.connect_timeout;
        let mut tls_stream = monoio::time::timeout(connect_timeout, self.connect(&host, port))
            .await
            .map_err(|_| TransportError::Timeout(connect_timeout.as_millis() as u64))??;

        let raw = encode_request(&request, &host, port);
        let read_timeout = self.config.read_timeout;
        let data = monoio::time::timeout(read_timeout, async {
            tls_stream.write_all(&raw).await?;
            Ok::<Vec<u8>, TransportError>(tls_stream.read_to_end().await?)
        })
        .await
        .map_err(|_| TransportError::Timeout(read_timeout.as_millis() as u64))??;

        let response = parse_http_response(&data)?;
        debug!("📥 {} {} -> {}", request.method, request.url, response.status);
        Ok(response)
    }
}

/// Validate a proxy URL; only `https` proxies are accepted
pub fn parse_proxy(proxy: &str) -> Result<Url> {
    let url = Url::parse(proxy)
        .map_err(|e| ExchangeError::Configuration(format!("invalid proxy URL {proxy}: {e}")))?;
    if url.scheme() != "https" {
        return Err(ExchangeError::Configuration(format!(
            "proxy must be an https URL, got {proxy}"
        )));
    }
    if url.host_str().is_none() {
        return Err(ExchangeError::Configuration(format!("proxy URL has no host: {proxy}")));
    }
    Ok(url)
}

fn connect_request(proxy: &Url, host: &str, port: u16) -> String {
    let mut request = format!("CONNECT {host}:{port} HTTP/1.1\r\nHost: {host}:{port}\r\n");
    if !proxy.username().is_empty() {
        let user = urlencoding::decode(proxy.username()).map(|u| u.into_owned()).unwrap_or_default();
        let password = proxy
            .password()
            .and_then(|p| urlencoding::decode(p).ok())
            .map(|p| p.into_owned())
            .unwrap_or_default();
        let token = BASE64.encode(format!("{user}:{password}"));
        request.push_str(&format!("Proxy-Authorization: Basic {token}\r\n"));
    }
    request.push_str("\r\n");
    request
}

fn encode_request(request: &HttpRequest, host: &str, port: u16) -> Vec<u8> {
    let host_header = if port == 443 {
        host.to_string()
    } else {
        format!("{host}:{port}")
    };
    let body = request.body.as_deref().unwrap_or("");

    let mut head = format!(
        "{} {} HTTP/1.1\r\n\
         Host: {host_header}\r\n\
         User-Agent: {USER_AGENT}\r\n\
         Accept: application/json\r\n\
         Connection: close\r\n",
        request.method,
        request.target(),
    );
    if request.body.is_some() || request.method != Method::Get {
        head.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    for (key, value) in &request.headers {
        head.push_str(&format!("{key}: {value}\r\n"));
    }
    head.push_str("\r\n");

    let mut raw = head.into_bytes();
    raw.extend_from_slice(body.as_bytes());
    raw
}

fn find_header_end(data: &[u8]) -> Option<usize> {
    data.windows(4).position(|window| window == b"\r\n\r\n")
}

fn parse_status_line(head: &str) -> TransportResult<u16> {
    head.lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| TransportError::MalformedResponse("invalid status line".to_string()))
}

/// Split a raw HTTP/1.1 response into status, headers and decoded body
pub fn parse_http_response(data: &[u8]) -> TransportResult<HttpResponse> {
    let header_end = find_header_end(data)
        .ok_or_else(|| TransportError::MalformedResponse("no header terminator".to_string()))?;

    let head = String::from_utf8_lossy(&data[..header_end]);
    let raw_body = &data[header_end + 4..];
    let status = parse_status_line(&head)?;

    let headers: Vec<(String, String)> = head
        .lines()
        .skip(1)
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect();

    let header = |name: &str| {
        headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    };

    let chunked = header("Transfer-Encoding").is_some_and(|v| v.to_ascii_lowercase().contains("chunked"));
    let body = if chunked {
        decode_chunked(raw_body)?
    } else if let Some(length) = header("Content-Length").and_then(|v| v.parse::<usize>().ok()) {
        if raw_body.len() < length {
            return Err(TransportError::MalformedResponse(format!(
                "body truncated: expected {length} bytes, got {}",
                raw_body.len()
            )));
        }
        raw_body[..length].to_vec()
    } else {
        raw_body.to_vec()
    };

    Ok(HttpResponse {
        status,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

/// Reassemble a `Transfer-Encoding: chunked` body, ignoring trailers
pub fn decode_chunked(mut data: &[u8]) -> TransportResult<Vec<u8>> {
    let mut body = Vec::with_capacity(data.len());
    loop {
        let line_end = data
            .windows(2)
            .position(|window| window == b"\r\n")
            .ok_or_else(|| TransportError::MalformedResponse("unterminated chunk size".to_string()))?;
        let size_line = String::from_utf8_lossy(&data[..line_end]);
        let size_hex = size_line.split(';').next().unwrap_or("").trim();
        let size = usize::from_str_radix(size_hex, 16)
            .map_err(|_| TransportError::MalformedResponse(format!("bad chunk size '{size_hex}'")))?;
        data = &data[line_end + 2..];

        if size == 0 {
            return Ok(body);
        }
        if data.len() < size {
            return Err(TransportError::MalformedResponse("chunk truncated".to_string()));
        }
        body.extend_from_slice(&data[..size]);
        data = data.get(size + 2..).unwrap_or_default();
    }
}

/// Byte transport under a TLS session: a TCP socket, or a TLS session to
/// a proxy carrying a `CONNECT` tunnel
#[async_trait(?Send)]
trait ByteStream {
    /// Write everything, handing the buffer back
    async fn send_bytes(&mut self, data: Vec<u8>) -> TransportResult<Vec<u8>>;

    /// Next chunk of bytes; empty on EOF
    async fn recv_bytes(&mut self) -> TransportResult<Vec<u8>>;
}

#[async_trait(?Send)]
impl ByteStream for TcpStream {
    async fn send_bytes(&mut self, data: Vec<u8>) -> TransportResult<Vec<u8>> {
        let (result, buf) = self.write_all(data).await;
        result.map_err(|e| TransportError::Io(format!("TCP write failed: {e}")))?;
        Ok(buf)
    }

    async fn recv_bytes(&mut self) -> TransportResult<Vec<u8>> {
        let (result, mut buf) = self.read(vec![0u8; 4096]).await;
        let bytes_read = result.map_err(|e| TransportError::Io(format!("TCP read failed: {e}")))?;
        buf.truncate(bytes_read);
        Ok(buf)
    }
}

/// What the venue TLS session runs over
enum Wire {
    Direct(TcpStream),
    Tunnel(Box<TlsStream<TcpStream>>),
}

#[async_trait(?Send)]
impl ByteStream for Wire {
    async fn send_bytes(&mut self, data: Vec<u8>) -> TransportResult<Vec<u8>> {
        match self {
            Wire::Direct(stream) => stream.send_bytes(data).await,
            Wire::Tunnel(tunnel) => tunnel.send_bytes(data).await,
        }
    }

    async fn recv_bytes(&mut self) -> TransportResult<Vec<u8>> {
        match self {
            Wire::Direct(stream) => stream.recv_bytes().await,
            Wire::Tunnel(tunnel) => tunnel.recv_bytes().await,
        }
    }
}

/// rustls client session driven over a monoio byte stream
struct TlsStream<S> {
    stream: S,
    tls_conn: ClientConnection,
    write_buf: Vec<u8>,
    tls_read_buf: Vec<u8>,
    handshake_complete: bool,
}

impl<S: ByteStream> TlsStream<S> {
    fn new(stream: S, tls_conn: ClientConnection) -> Self {
        Self {
            stream,
            tls_conn,
            write_buf: Vec::with_capacity(8192),
            tls_read_buf: Vec::with_capacity(8192),
            handshake_complete: false,
        }
    }

    /// Push every pending TLS record to the underlying stream
    async fn flush_tls(&mut self) -> TransportResult<()> {
        while self.tls_conn.wants_write() {
            self.write_buf.clear();
            let tls_bytes = self
                .tls_conn
                .write_tls(&mut self.write_buf)
                .map_err(|e| TransportError::Tls(format!("TLS write failed: {e}")))?;

            if tls_bytes > 0 {
                self.write_buf = self.stream.send_bytes(std::mem::take(&mut self.write_buf)).await?;
            }
        }
        Ok(())
    }

    /// Feed one chunk from the underlying stream into the TLS engine; false on EOF
    async fn fill_tls(&mut self) -> TransportResult<bool> {
        let chunk = self.stream.recv_bytes().await?;
        if chunk.is_empty() {
            return Ok(false);
        }

        self.tls_conn
            .read_tls(&mut std::io::Cursor::new(&chunk[..]))
            .map_err(|e| TransportError::Tls(format!("TLS read failed: {e}")))?;
        self.tls_conn
            .process_new_packets()
            .map_err(|e| TransportError::Tls(format!("TLS process failed: {e}")))?;
        Ok(true)
    }

    async fn complete_handshake(&mut self) -> TransportResult<()> {
        if self.handshake_complete {
            return Ok(());
        }

        loop {
            self.flush_tls().await?;

            if !self.tls_conn.is_handshaking() {
                self.handshake_complete = true;
                return Ok(());
            }

            if self.tls_conn.wants_read() {
                if !self.fill_tls().await? {
                    return Err(TransportError::Tls("connection closed during handshake".to_string()));
                }
            } else if !self.tls_conn.wants_write() {
                return Err(TransportError::Tls("TLS handshake stalled".to_string()));
            }
        }
    }

    async fn write_all(&mut self, data: &[u8]) -> TransportResult<()> {
        self.complete_handshake().await?;

        self.tls_conn
            .writer()
            .write_all(data)
            .map_err(|e| TransportError::Tls(format!("TLS application write failed: {e}")))?;

        self.flush_tls().await
    }

    /// Plaintext already decrypted, or the next record's worth; empty on EOF
    async fn read_plaintext(&mut self) -> TransportResult<Vec<u8>> {
        self.complete_handshake().await?;

        loop {
            self.tls_read_buf.clear();
            self.tls_read_buf.resize(4096, 0);

            match self.tls_conn.reader().read(&mut self.tls_read_buf) {
                Ok(0) => return Ok(Vec::new()),
                Ok(n) => return Ok(self.tls_read_buf[..n].to_vec()),
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {}
                Err(e) => return Err(TransportError::Tls(format!("TLS read failed: {e}"))),
            }

            if !self.fill_tls().await? {
                return Ok(Vec::new());
            }
        }
    }

    async fn read_to_end(&mut self) -> TransportResult<Vec<u8>> {
        let mut response_data = Vec::new();
        loop {
            let chunk = self.read_plaintext().await?;
            if chunk.is_empty() {
                return Ok(response_data);
            }
            response_data.extend_from_slice(&chunk);
        }
    }
}

#[async_trait(?Send)]
impl<S: ByteStream> ByteStream for TlsStream<S> {
    async fn send_bytes(&mut self, data: Vec<u8>) -> TransportResult<Vec<u8>> {
        self.write_all(&data).await?;
        Ok(data)
    }

    async fn recv_bytes(&mut self) -> TransportResult<Vec<u8>> {
        self.read_plaintext().await
    }
}
