// src/resolver.rs
use crate::types::{GuesserError, RecordKind, ResolveError, ResolverConfig};
use async_trait::async_trait;
use log::{debug, trace};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use tokio::net::{lookup_host, UdpSocket};
use trust_dns_resolver::proto::op::{Message, MessageType, OpCode, Query};
use trust_dns_resolver::proto::rr::{Name, RData, Record, RecordType};

const MAX_DATAGRAM: usize = 4096;

/// A single-question DNS exchange.
///
/// Implementations send exactly one query and never retry. The values are
/// returned in reply order: dotted IPv4 strings for [`RecordKind::A`],
/// canonical target names for [`RecordKind::Cname`].
#[async_trait]
pub trait Resolve: Send + Sync {
    async fn resolve(&self, name: &str, kind: RecordKind) -> Result<Vec<String>, ResolveError>;
}

impl From<RecordKind> for RecordType {
    fn from(kind: RecordKind) -> Self {
        match kind {
            RecordKind::A => RecordType::A,
            RecordKind::Cname => RecordType::CNAME,
        }
    }
}

/// One answer record, reduced to what a lookup can use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    A(Ipv4Addr),
    Cname(String),
    Other,
}

impl Answer {
    pub fn from_record(record: &Record) -> Self {
        match record.data() {
            Some(RData::A(a)) => Answer::A(a.0),
            Some(RData::CNAME(cname)) => Answer::Cname(cname.0.to_utf8()),
            _ => Answer::Other,
        }
    }

    /// The value this answer contributes to a query of `kind`, if any.
    pub fn project(&self, kind: RecordKind) -> Option<String> {
        match (self, kind) {
            (Answer::A(addr), RecordKind::A) => Some(addr.to_string()),
            (Answer::Cname(target), RecordKind::Cname) => Some(target.clone()),
            _ => None,
        }
    }
}

/// Append the root label when `name` does not already end with one.
pub fn fqdn(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.", name)
    }
}

pub fn build_query(name: &str, kind: RecordKind, id: u16) -> Result<Vec<u8>, ResolveError> {
    let qname = Name::from_ascii(fqdn(name))
        .map_err(|e| ResolveError::Transport(format!("Invalid name {}: {}", name, e)))?;

    let mut message = Message::new();
    message
        .set_id(id)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true)
        .add_query(Query::query(qname, kind.into()));

    message
        .to_vec()
        .map_err(|e| ResolveError::Transport(format!("Failed to encode query for {}: {}", name, e)))
}

/// Project the answer section of `reply` onto `kind`.
pub fn extract_answers(reply: &Message, name: &str, kind: RecordKind) -> Result<Vec<String>, ResolveError> {
    let values: Vec<String> = reply
        .answers()
        .iter()
        .map(Answer::from_record)
        .filter_map(|answer| answer.project(kind))
        .collect();

    if values.is_empty() {
        return Err(ResolveError::NoAnswer {
            name: name.to_string(),
            kind,
        });
    }

    Ok(values)
}

/// Plain UDP transport against one configured server.
#[derive(Debug, Clone)]
pub struct UdpResolver {
    server: SocketAddr,
    timeout: Duration,
}

impl UdpResolver {
    pub fn new(server: SocketAddr, timeout: Duration) -> Self {
        Self { server, timeout }
    }

    /// Accepts a literal socket address or a `host:port` pair, resolving the
    /// host once through the system resolver. IPv4 addresses are preferred.
    pub async fn from_config(config: &ResolverConfig) -> Result<Self, GuesserError> {
        if let Ok(server) = SocketAddr::from_str(&config.server) {
            return Ok(Self::new(server, config.timeout));
        }

        let addrs: Vec<SocketAddr> = tokio::time::timeout(config.timeout, lookup_host(config.server.as_str()))
            .await
            .map_err(|_| {
                GuesserError::ConfigError(format!("Timed out resolving DNS server {}", config.server))
            })?
            .map_err(|e| {
                GuesserError::ConfigError(format!("Invalid DNS server address {}: {}", config.server, e))
            })?
            .collect();

        let server = addrs
            .iter()
            .find(|addr| addr.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
            .ok_or_else(|| {
                GuesserError::ConfigError(format!("DNS server {} has no addresses", config.server))
            })?;

        debug!("Using DNS server {} ({})", config.server, server);
        Ok(Self::new(server, config.timeout))
    }

    async fn exchange(&self, query: &[u8], id: u16) -> Result<Message, ResolveError> {
        let bind_addr: SocketAddr = if self.server.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| ResolveError::Transport(format!("Failed to bind UDP socket: {}", e)))?;
        socket
            .connect(self.server)
            .await
            .map_err(|e| ResolveError::Transport(format!("Failed to connect to {}: {}", self.server, e)))?;
        socket
            .send(query)
            .await
            .map_err(|e| ResolveError::Transport(format!("Failed to send query to {}: {}", self.server, e)))?;

        match tokio::time::timeout(self.timeout, Self::read_reply(&socket, id)).await {
            Ok(reply) => reply,
            Err(_) => Err(ResolveError::Transport(format!(
                "No reply from {} within {:?}",
                self.server, self.timeout
            ))),
        }
    }

    async fn read_reply(socket: &UdpSocket, id: u16) -> Result<Message, ResolveError> {
        let mut buf = vec![0u8; MAX_DATAGRAM];
        loop {
            let len = socket
                .recv(&mut buf)
                .await
                .map_err(|e| ResolveError::Transport(format!("Failed to receive reply: {}", e)))?;

            let reply = Message::from_vec(&buf[..len])
                .map_err(|e| ResolveError::Transport(format!("Malformed reply: {}", e)))?;

            // Late answers to an earlier query on a reused port.
            if reply.id() != id || reply.message_type() != MessageType::Response {
                trace!("Discarding unrelated datagram with id {}", reply.id());
                continue;
            }

            return Ok(reply);
        }
    }
}

#[async_trait]
impl Resolve for UdpResolver {
    async fn resolve(&self, name: &str, kind: RecordKind) -> Result<Vec<String>, ResolveError> {
        let id: u16 = rand::random();
        let query = build_query(name, kind, id)?;
        let reply = self.exchange(&query, id).await?;
        trace!(
            "{} {} -> {:?}, {} answer(s)",
            kind,
            name,
            reply.response_code(),
            reply.answers().len()
        );
        extract_answers(&reply, name, kind)
    }
}
