//! JSONL transport to the bus broker over Unix or TCP sockets.

use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

#[cfg(unix)]
use std::os::fd::OwnedFd;
#[cfg(unix)]
use std::os::unix::net::UnixStream;

use iarm_config::SocketEndpoint;
use serde_json::Value;
#[cfg(unix)]
use socket2::{Domain, SockAddr, Socket, Type};
use tracing::{debug, trace};

use crate::BUS_TARGET;
use crate::errors::BusError;
use crate::frame::{BusEvent, BusMessage, BusRequest, parse_message, write_request};
use crate::payload::EventPayload;
use crate::transport::BusTransport;

/// Timeout for establishing a connection and for awaiting a reply.
pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

const MIN_POLL: Duration = Duration::from_millis(1);

enum Connection {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl Connection {
    fn try_clone(&self) -> io::Result<Self> {
        match self {
            Self::Tcp(stream) => stream.try_clone().map(Self::Tcp),
            #[cfg(unix)]
            Self::Unix(stream) => stream.try_clone().map(Self::Unix),
        }
    }

    fn set_read_timeout(&self, timeout: Duration) -> io::Result<()> {
        let timeout = Some(timeout.max(MIN_POLL));
        match self {
            Self::Tcp(stream) => stream.set_read_timeout(timeout),
            #[cfg(unix)]
            Self::Unix(stream) => stream.set_read_timeout(timeout),
        }
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            Self::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            Self::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            Self::Unix(stream) => stream.flush(),
        }
    }
}

fn connect(endpoint: &SocketEndpoint) -> Result<Connection, BusError> {
    match endpoint {
        SocketEndpoint::Tcp { host, port } => {
            let address = resolve_tcp_address(host, *port).map_err(|source| BusError::Resolve {
                endpoint: endpoint.to_string(),
                source,
            })?;

            TcpStream::connect_timeout(&address, CONNECTION_TIMEOUT)
                .map(Connection::Tcp)
                .map_err(|source| BusError::Connect {
                    endpoint: endpoint.to_string(),
                    source,
                })
        }
        SocketEndpoint::Unix { path } => {
            #[cfg(unix)]
            {
                connect_unix(path.as_str()).map_err(|source| BusError::Connect {
                    endpoint: endpoint.to_string(),
                    source,
                })
            }

            #[cfg(not(unix))]
            {
                let _ = path;
                Err(BusError::UnsupportedUnixTransport(endpoint.to_string()))
            }
        }
    }
}

fn resolve_tcp_address(host: &str, port: u16) -> io::Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved addresses"))
}

#[cfg(unix)]
fn connect_unix(path: &str) -> io::Result<Connection> {
    let socket = Socket::new(Domain::UNIX, Type::STREAM, None)?;
    let address = SockAddr::unix(path)?;
    socket.connect_timeout(&address, CONNECTION_TIMEOUT)?;
    Ok(Connection::Unix(UnixStream::from(OwnedFd::from(socket))))
}

struct Stream {
    reader: BufReader<Connection>,
    writer: Connection,
    partial: Vec<u8>,
}

enum ReadOutcome {
    Line(String),
    TimedOut,
    Closed,
}

impl Stream {
    fn open(endpoint: &SocketEndpoint) -> Result<Self, BusError> {
        let writer = connect(endpoint)?;
        let reader = writer.try_clone().map_err(|source| BusError::Connect {
            endpoint: endpoint.to_string(),
            source,
        })?;
        Ok(Self {
            reader: BufReader::new(reader),
            writer,
            partial: Vec::new(),
        })
    }

    fn send(&mut self, request: &BusRequest) -> Result<(), BusError> {
        trace!(target: BUS_TARGET, operation = request.operation(), "sending bus request");
        write_request(&mut self.writer, request)
    }

    /// Reads one line, keeping partial data across timeouts.
    fn read_line(&mut self, timeout: Duration) -> Result<ReadOutcome, BusError> {
        self.reader
            .get_ref()
            .set_read_timeout(timeout)
            .map_err(BusError::Receive)?;

        match self.reader.read_until(b'\n', &mut self.partial) {
            Ok(0) => Ok(ReadOutcome::Closed),
            Ok(_) if self.partial.last() == Some(&b'\n') => {
                let bytes = std::mem::take(&mut self.partial);
                let line = String::from_utf8(bytes).map_err(|error| {
                    BusError::Receive(io::Error::new(io::ErrorKind::InvalidData, error))
                })?;
                Ok(ReadOutcome::Line(line))
            }
            Ok(_) => Ok(ReadOutcome::Closed),
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                ) =>
            {
                Ok(ReadOutcome::TimedOut)
            }
            Err(error) => Err(BusError::Receive(error)),
        }
    }
}

fn active_stream<'a>(
    member: Option<&str>,
    stream: Option<&'a mut Stream>,
) -> Result<&'a mut Stream, BusError> {
    let Some(member) = member else {
        return Err(BusError::NotInitialised);
    };
    stream.ok_or_else(|| BusError::NotConnected {
        member: member.to_owned(),
    })
}

/// [`BusTransport`] speaking JSONL to a broker socket.
pub struct SocketTransport {
    endpoint: SocketEndpoint,
    member: Option<String>,
    stream: Option<Stream>,
    pending_events: VecDeque<BusEvent>,
}

impl SocketTransport {
    /// Creates a transport for the broker at `endpoint`. No connection is
    /// made until [`BusTransport::connect`].
    #[must_use]
    pub const fn new(endpoint: SocketEndpoint) -> Self {
        Self {
            endpoint,
            member: None,
            stream: None,
            pending_events: VecDeque::new(),
        }
    }

    /// Returns the configured broker endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &SocketEndpoint {
        &self.endpoint
    }

    fn request(&mut self, request: &BusRequest) -> Result<Value, BusError> {
        let operation = request.operation();
        let stream = active_stream(self.member.as_deref(), self.stream.as_mut())?;
        stream.send(request)?;

        loop {
            match stream.read_line(CONNECTION_TIMEOUT)? {
                ReadOutcome::Line(line) if line.trim().is_empty() => {}
                ReadOutcome::Line(line) => match parse_message(&line)? {
                    BusMessage::Result { code, payload } if code.is_success() => {
                        return Ok(payload);
                    }
                    BusMessage::Result { code, .. } => {
                        return Err(BusError::Rejected {
                            operation,
                            result: code,
                        });
                    }
                    BusMessage::Event(event) => self.pending_events.push_back(event),
                },
                ReadOutcome::TimedOut => {
                    return Err(BusError::Receive(io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("no reply to {operation}"),
                    )));
                }
                ReadOutcome::Closed => return Err(BusError::ClosedWithoutReply { operation }),
            }
        }
    }
}

impl BusTransport for SocketTransport {
    fn init(&mut self, member: &str) -> Result<(), BusError> {
        debug!(target: BUS_TARGET, member, endpoint = %self.endpoint, "bus init");
        self.member = Some(member.to_owned());
        Ok(())
    }

    fn connect(&mut self) -> Result<(), BusError> {
        let Some(member) = self.member.clone() else {
            return Err(BusError::NotInitialised);
        };
        if self.stream.is_none() {
            self.stream = Some(Stream::open(&self.endpoint)?);
        }
        if let Err(error) = self.request(&BusRequest::Hello {
            member: member.clone(),
        }) {
            self.stream = None;
            return Err(error);
        }
        debug!(target: BUS_TARGET, member = %member, "bus connected");
        Ok(())
    }

    fn broadcast_event(
        &mut self,
        owner: &str,
        event_id: u32,
        payload: &EventPayload,
    ) -> Result<(), BusError> {
        self.request(&BusRequest::Broadcast {
            owner: owner.to_owned(),
            event_id,
            payload: payload.clone(),
        })
        .map(|_| ())
    }

    fn call(&mut self, owner: &str, method: &str, argument: &Value) -> Result<Value, BusError> {
        self.request(&BusRequest::Call {
            owner: owner.to_owned(),
            method: method.to_owned(),
            argument: argument.clone(),
        })
    }

    fn register_event_handler(&mut self, owner: &str, event_id: u32) -> Result<(), BusError> {
        self.request(&BusRequest::RegisterEvent {
            owner: owner.to_owned(),
            event_id,
        })
        .map(|_| ())
    }

    fn unregister_event_handler(&mut self, owner: &str, event_id: u32) -> Result<(), BusError> {
        self.request(&BusRequest::UnregisterEvent {
            owner: owner.to_owned(),
            event_id,
        })
        .map(|_| ())
    }

    fn next_event(&mut self, timeout: Duration) -> Result<Option<BusEvent>, BusError> {
        if let Some(event) = self.pending_events.pop_front() {
            return Ok(Some(event));
        }

        let stream = active_stream(self.member.as_deref(), self.stream.as_mut())?;
        loop {
            match stream.read_line(timeout)? {
                ReadOutcome::Line(line) if line.trim().is_empty() => {}
                ReadOutcome::Line(line) => match parse_message(&line)? {
                    BusMessage::Event(event) => return Ok(Some(event)),
                    BusMessage::Result { code, .. } => {
                        debug!(target: BUS_TARGET, %code, "discarding unsolicited result");
                    }
                },
                ReadOutcome::TimedOut => return Ok(None),
                ReadOutcome::Closed => {
                    return Err(BusError::ClosedWithoutReply { operation: "event" });
                }
            }
        }
    }

    fn disconnect(&mut self) -> Result<(), BusError> {
        let Some(mut stream) = self.stream.take() else {
            return Ok(());
        };
        self.pending_events.clear();
        debug!(target: BUS_TARGET, member = ?self.member, "bus disconnect");
        stream.send(&BusRequest::Bye)
    }

    fn term(&mut self) -> Result<(), BusError> {
        if self.stream.is_some() {
            self.disconnect()?;
        }
        debug!(target: BUS_TARGET, member = ?self.member, "bus term");
        self.member = None;
        Ok(())
    }
}
