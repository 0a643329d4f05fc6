// src/testing.rs
//! Test doubles: a static zone, an in-memory resolver over it, and a
//! loopback UDP server that answers from it.

use crate::resolver::Resolve;
use crate::types::{RecordKind, ResolveError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Mutex;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use trust_dns_resolver::proto::op::{Message, MessageType, ResponseCode};
use trust_dns_resolver::proto::rr::rdata::{A, CNAME};
use trust_dns_resolver::proto::rr::{Name, RData, Record, RecordType};

fn key(name: &str) -> String {
    name.trim_end_matches('.').to_lowercase()
}

#[derive(Debug, Clone, Default)]
pub struct Zone {
    a: HashMap<String, Vec<Ipv4Addr>>,
    cname: HashMap<String, String>,
}

impl Zone {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_a(mut self, name: &str, addrs: &[&str]) -> Self {
        let addrs = addrs.iter().map(|a| a.parse().expect("fixture address")).collect();
        self.a.insert(key(name), addrs);
        self
    }

    pub fn with_cname(mut self, name: &str, target: &str) -> Self {
        self.cname.insert(key(name), target.to_string());
        self
    }

    fn contains(&self, name: &str) -> bool {
        let name = key(name);
        self.a.contains_key(&name) || self.cname.contains_key(&name)
    }

    fn values(&self, name: &str, kind: RecordKind) -> Vec<String> {
        let name = key(name);
        match kind {
            RecordKind::A => self
                .a
                .get(&name)
                .map(|addrs| addrs.iter().map(|a| a.to_string()).collect())
                .unwrap_or_default(),
            RecordKind::Cname => self.cname.get(&name).cloned().into_iter().collect(),
        }
    }

    /// Build the reply an authoritative server for this zone would send.
    /// An A question on an alias is answered with the CNAME record only.
    fn reply_to(&self, request: &Message) -> Message {
        let mut reply = Message::new();
        reply
            .set_id(request.id())
            .set_message_type(MessageType::Response)
            .set_op_code(request.op_code())
            .set_recursion_desired(request.recursion_desired())
            .set_recursion_available(true);

        let Some(query) = request.queries().first() else {
            reply.set_response_code(ResponseCode::FormErr);
            return reply;
        };
        reply.add_query(query.clone());

        let qname = query.name().clone();
        let name = qname.to_utf8();
        if !self.contains(&name) {
            reply.set_response_code(ResponseCode::NXDomain);
            return reply;
        }

        let alias = self.values(&name, RecordKind::Cname).into_iter().next();
        match (query.query_type(), alias) {
            (RecordType::A | RecordType::CNAME, Some(target)) => {
                let target = Name::from_ascii(target).expect("fixture target");
                reply.add_answer(Record::from_rdata(qname, 300, RData::CNAME(CNAME(target))));
            }
            (RecordType::A, None) => {
                for addr in self.values(&name, RecordKind::A) {
                    let addr: Ipv4Addr = addr.parse().expect("fixture address");
                    reply.add_answer(Record::from_rdata(qname.clone(), 300, RData::A(A(addr))));
                }
            }
            _ => {}
        }

        reply
    }
}

/// `www → A`, `mail → CNAME m → A`, nothing else.
pub fn example_zone() -> Zone {
    Zone::new()
        .with_a("www.example.com", &["93.184.216.34"])
        .with_cname("mail.example.com", "m.example.com.")
        .with_a("m.example.com", &["93.184.216.35"])
}

/// Answers straight from a [`Zone`] and records every question it was asked.
#[derive(Debug, Default)]
pub struct StaticResolver {
    zone: Zone,
    queries: Mutex<Vec<(String, RecordKind)>>,
}

impl StaticResolver {
    pub fn new(zone: Zone) -> Self {
        Self {
            zone,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<(String, RecordKind)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Resolve for StaticResolver {
    async fn resolve(&self, name: &str, kind: RecordKind) -> Result<Vec<String>, ResolveError> {
        self.queries.lock().unwrap().push((name.to_string(), kind));
        tokio::task::yield_now().await;

        let values = self.zone.values(name, kind);
        if values.is_empty() {
            return Err(ResolveError::NoAnswer {
                name: name.to_string(),
                kind,
            });
        }
        Ok(values)
    }
}

/// Loopback DNS server, stopped when dropped.
pub struct FixtureServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl FixtureServer {
    pub async fn start(zone: Zone) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.expect("bind fixture server");
        let addr = socket.local_addr().expect("fixture address");

        let handle = tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            loop {
                let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
                    break;
                };
                let Ok(request) = Message::from_vec(&buf[..len]) else {
                    continue;
                };
                if let Ok(bytes) = zone.reply_to(&request).to_vec() {
                    let _ = socket.send_to(&bytes, peer).await;
                }
            }
        });

        Self { addr, handle }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
