use std::collections::VecDeque;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use session::{DisconnectSignal, SessionId};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc;

use crate::markup;
use crate::telnet::LineBuffer;

const READ_CHUNK: usize = 4096;

enum Outbound {
    Text(String),
    Close,
}

/// Why [`LineReader::read_line`] stopped. A trailing unterminated fragment,
/// if the peer sent one, rides along with the error.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("connection closed by peer")]
    Closed { fragment: Option<String> },

    #[error("read failed: {source}")]
    Io {
        fragment: Option<String>,
        #[source]
        source: io::Error,
    },

    #[error("disconnect requested")]
    Disconnected,
}

impl ReadError {
    pub fn fragment(&self) -> Option<&str> {
        match self {
            ReadError::Closed { fragment } | ReadError::Io { fragment, .. } => fragment.as_deref(),
            ReadError::Disconnected => None,
        }
    }
}

/// Cloneable outbound half of a session.
///
/// Writes are queued to a dedicated writer task, so callers never block on a
/// slow peer. After a disconnect request every write is a silent no-op.
#[derive(Clone)]
pub struct ConnectionWriter {
    session_id: SessionId,
    tx: mpsc::UnboundedSender<Outbound>,
    disconnect: Arc<DisconnectSignal>,
}

impl ConnectionWriter {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Queue `text` as-is (no newline appended). Markup is rendered on send.
    pub fn write(&self, text: &str) {
        if self.disconnect.is_requested() {
            return;
        }
        let _ = self.tx.send(Outbound::Text(text.to_string()));
    }

    pub fn write_line(&self, text: &str) {
        if self.disconnect.is_requested() {
            return;
        }
        let _ = self.tx.send(Outbound::Text(format!("{}\n", text)));
    }

    /// Ask for the connection to close. Only the first request has any effect;
    /// output queued before it is still flushed.
    pub fn request_disconnect(&self, reason: &str) {
        if self.disconnect.request(reason) {
            tracing::debug!(session_id = %self.session_id, reason, "disconnect requested");
            let _ = self.tx.send(Outbound::Close);
        }
    }

    pub fn is_disconnect_requested(&self) -> bool {
        self.disconnect.is_requested()
    }
}

/// Inbound half of a session: newline-delimited commands.
pub struct LineReader<R> {
    session_id: SessionId,
    reader: R,
    buffer: LineBuffer,
    pending: VecDeque<String>,
    writer: ConnectionWriter,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    /// Next complete line. Lines already received are returned even after a
    /// disconnect request; once they run out the request wins.
    pub async fn read_line(&mut self) -> Result<String, ReadError> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some(line) = self.pending.pop_front() {
                return Ok(line);
            }
            if self.writer.is_disconnect_requested() {
                return Err(ReadError::Disconnected);
            }

            let disconnect = self.writer.disconnect.clone();
            let read = tokio::select! {
                _ = disconnect.wait() => return Err(ReadError::Disconnected),
                read = self.reader.read(&mut chunk) => read,
            };

            match read {
                Ok(0) => {
                    self.writer.request_disconnect("peer closed");
                    return Err(ReadError::Closed {
                        fragment: self.buffer.finish(),
                    });
                }
                Ok(n) => self.pending.extend(self.buffer.feed(&chunk[..n])),
                Err(source) => {
                    tracing::debug!(session_id = %self.session_id, error = %source, "read error");
                    self.writer.request_disconnect("read error");
                    return Err(ReadError::Io {
                        fragment: self.buffer.finish(),
                        source,
                    });
                }
            }
        }
    }
}

/// Wire up a reader/writer pair over any byte stream halves and spawn the
/// writer task.
pub fn open<R, W>(session_id: SessionId, reader: R, writer: W) -> (LineReader<R>, ConnectionWriter)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let out = ConnectionWriter {
        session_id,
        tx,
        disconnect: Arc::new(DisconnectSignal::new()),
    };

    tokio::spawn(run_writer(session_id, writer, rx));

    let reader = LineReader {
        session_id,
        reader,
        buffer: LineBuffer::new(),
        pending: VecDeque::new(),
        writer: out.clone(),
    };
    (reader, out)
}

async fn run_writer<W: AsyncWrite + Unpin>(
    session_id: SessionId,
    mut writer: W,
    mut rx: mpsc::UnboundedReceiver<Outbound>,
) {
    while let Some(msg) = rx.recv().await {
        let text = match msg {
            Outbound::Text(text) => text,
            Outbound::Close => break,
        };
        // Telnet clients expect CRLF
        let wire = markup::render(&text)
            .replace("\r\n", "\n")
            .replace('\n', "\r\n");
        if writer.write_all(wire.as_bytes()).await.is_err() {
            break;
        }
    }
    let _ = writer.shutdown().await;
    tracing::debug!(%session_id, "writer closed");
}

/// One accepted TCP connection, split into its two halves.
pub struct Connection {
    pub session_id: SessionId,
    pub peer_addr: SocketAddr,
    pub reader: LineReader<OwnedReadHalf>,
    pub writer: ConnectionWriter,
}

impl Connection {
    pub fn from_tcp(stream: TcpStream, session_id: SessionId, peer_addr: SocketAddr) -> Self {
        let (read_half, write_half) = stream.into_split();
        let (reader, writer) = open(session_id, read_half, write_half);
        Self {
            session_id,
            peer_addr,
            reader,
            writer,
        }
    }
}
