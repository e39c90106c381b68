//! Test helpers for integration tests
//!
//! Provides a server that runs the real accept loop and a line-oriented
//! client for scripting sessions.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chat_common::AppConfig;
use chat_gateway::GatewayState;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

/// How long a client waits for an expected line
pub const READ_TIMEOUT: Duration = Duration::from_secs(3);

/// Quiet period used to assert that nothing arrives
pub const QUIET_PERIOD: Duration = Duration::from_millis(300);

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: GatewayState,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server with the default test configuration
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()).await
    }

    /// Start a server with custom config
    pub async fn start_with_config(mut config: AppConfig) -> Result<Self> {
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;

        let listener = chat_gateway::bind(&config).await?;
        let addr = listener.local_addr()?;
        let state = GatewayState::new(&config);

        let serving = state.clone();
        let handle = tokio::spawn(async move {
            chat_gateway::serve(listener, serving).await.ok();
        });

        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    /// Connect a client and consume its own join notice
    pub async fn connect(&self) -> Result<TestClient> {
        let mut client = TestClient::connect(self.addr).await?;
        let joined = format!("[{0}] {0}: joined", client.addr);
        client.expect(&joined).await?;
        Ok(client)
    }

    /// Wait until the registry holds exactly `count` sessions
    pub async fn wait_for_online(&self, count: usize) -> Result<()> {
        let deadline = tokio::time::Instant::now() + READ_TIMEOUT;
        while self.state.registry().len() != count {
            if tokio::time::Instant::now() >= deadline {
                bail!(
                    "expected {count} sessions online, found {}",
                    self.state.registry().len()
                );
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        Ok(())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Line-oriented chat client
pub struct TestClient {
    /// Local address, which the server uses as address and initial name
    pub addr: String,
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    /// Open a connection
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .with_context(|| format!("connect to {addr}"))?;
        let local = stream.local_addr()?.to_string();
        let (reader, writer) = stream.into_split();

        Ok(Self {
            addr: local,
            lines: BufReader::new(reader).lines(),
            writer,
        })
    }

    /// Send one line
    pub async fn send(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        Ok(())
    }

    /// Next line, failing on timeout or EOF
    pub async fn recv(&mut self) -> Result<String> {
        match tokio::time::timeout(READ_TIMEOUT, self.lines.next_line()).await {
            Ok(Ok(Some(line))) => Ok(line),
            Ok(Ok(None)) => bail!("connection closed"),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => bail!("no line within {READ_TIMEOUT:?}"),
        }
    }

    /// Read until a line equal to `expected` arrives, returning the lines skipped
    pub async fn expect(&mut self, expected: &str) -> Result<Vec<String>> {
        let mut skipped = Vec::new();
        loop {
            let line = self
                .recv()
                .await
                .with_context(|| format!("waiting for {expected:?}, skipped {skipped:?}"))?;
            if line == expected {
                return Ok(skipped);
            }
            skipped.push(line);
        }
    }

    /// Collect every line that arrives within the quiet period
    pub async fn drain(&mut self) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        while let Ok(next) = tokio::time::timeout(QUIET_PERIOD, self.lines.next_line()).await {
            match next? {
                Some(line) => lines.push(line),
                None => break,
            }
        }
        Ok(lines)
    }

    /// Wait for the server to close the connection
    pub async fn expect_closed(&mut self) -> Result<()> {
        loop {
            match tokio::time::timeout(READ_TIMEOUT, self.lines.next_line()).await {
                Ok(Ok(None)) | Ok(Err(_)) => return Ok(()),
                Ok(Ok(Some(_))) => {}
                Err(_) => bail!("connection still open after {READ_TIMEOUT:?}"),
            }
        }
    }

    /// Close the write side, signalling EOF to the server
    pub async fn shutdown(&mut self) -> Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }
}

/// Default configuration for tests
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.session.idle_timeout_secs = 600;
    config
}

/// Configuration with a short idle window
pub fn idle_config(idle_secs: u64) -> AppConfig {
    let mut config = test_config();
    config.session.idle_timeout_secs = idle_secs;
    config
}
