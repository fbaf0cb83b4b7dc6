//! Test doubles: a programmable UDP DNS server and an in-memory lookup.

use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hickory_proto::op::{Message, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::rdata::{A, AAAA, CNAME};
use hickory_proto::rr::{Name, RData, Record};
use tokio::net::UdpSocket;
use tokio::sync::oneshot;

use crate::error::ResolveError;
use crate::lookup::HostLookup;
use crate::transport::{LookupResult, RecordKind};

/// Records served by a [`FakeDnsServer`]. Names are matched case-insensitively
/// without the trailing dot.
#[derive(Debug, Clone, Default)]
pub struct Zone {
	a: HashMap<String, Vec<(Ipv4Addr, u32)>>,
	cname: HashMap<String, (String, u32)>,
	aaaa: HashMap<String, (Ipv6Addr, u32)>,
	wildcard: Option<(String, Ipv4Addr)>,
	delay: Duration,
	silent: bool,
}

impl Zone {
	pub fn new() -> Self {
		Zone::default()
	}

	pub fn a(mut self, name: &str, ip: Ipv4Addr, ttl: u32) -> Self {
		self.a.entry(name.to_lowercase()).or_default().push((ip, ttl));
		self
	}

	pub fn cname(mut self, name: &str, target: &str, ttl: u32) -> Self {
		self.cname.insert(name.to_lowercase(), (target.to_string(), ttl));
		self
	}

	pub fn aaaa(mut self, name: &str, ip: Ipv6Addr, ttl: u32) -> Self {
		self.aaaa.insert(name.to_lowercase(), (ip, ttl));
		self
	}

	/// Answer every otherwise unknown name under `domain` with `ip`.
	pub fn wildcard(mut self, domain: &str, ip: Ipv4Addr) -> Self {
		self.wildcard = Some((domain.to_lowercase(), ip));
		self
	}

	pub fn delay(mut self, delay: Duration) -> Self {
		self.delay = delay;
		self
	}

	/// Swallow every query without answering.
	pub fn silent(mut self) -> Self {
		self.silent = true;
		self
	}

	fn wildcard_for(&self, key: &str) -> Option<Ipv4Addr> {
		let (domain, ip) = self.wildcard.as_ref()?;
		key.ends_with(&format!(".{}", domain)).then_some(*ip)
	}

	fn respond(&self, query: &Message) -> Message {
		let mut response = Message::new();
		response.set_id(query.id());
		response.set_message_type(MessageType::Response);
		response.set_op_code(OpCode::Query);
		response.set_recursion_desired(query.recursion_desired());
		response.set_recursion_available(true);

		let Some(question) = query.queries().first() else {
			response.set_response_code(ResponseCode::FormErr);
			return response;
		};
		response.add_query(question.clone());

		let qname = question.name().clone();
		let key = qname.to_utf8().trim_end_matches('.').to_lowercase();

		if let Some((target, ttl)) = self.cname.get(&key) {
			if let Ok(target) = Name::from_ascii(target) {
				response.add_answer(Record::from_rdata(qname, *ttl, RData::CNAME(CNAME(target))));
			}
		} else if let Some(records) = self.a.get(&key) {
			for (ip, ttl) in records {
				response.add_answer(Record::from_rdata(qname.clone(), *ttl, RData::A(A(*ip))));
			}
		} else if let Some((ip, ttl)) = self.aaaa.get(&key) {
			response.add_answer(Record::from_rdata(qname, *ttl, RData::AAAA(AAAA(*ip))));
		} else if let Some(ip) = self.wildcard_for(&key) {
			response.add_answer(Record::from_rdata(qname, 60, RData::A(A(ip))));
		} else {
			response.set_response_code(ResponseCode::NXDomain);
		}
		response
	}
}

/// UDP DNS server on 127.0.0.1 answering from a [`Zone`]
pub struct FakeDnsServer {
	addr: SocketAddr,
	queries: Arc<AtomicUsize>,
	shutdown_tx: Option<oneshot::Sender<()>>,
}

impl FakeDnsServer {
	pub async fn start(zone: Zone) -> Self {
		let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
		let addr = socket.local_addr().unwrap();
		let socket = Arc::new(socket);
		let queries = Arc::new(AtomicUsize::new(0));
		let counter = Arc::clone(&queries);
		let zone = Arc::new(zone);
		let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

		tokio::spawn(async move {
			let mut buf = vec![0u8; 512];
			loop {
				tokio::select! {
					_ = &mut shutdown_rx => break,
					received = socket.recv_from(&mut buf) => {
						let Ok((len, peer)) = received else { continue };
						counter.fetch_add(1, Ordering::SeqCst);
						if zone.silent {
							continue;
						}
						let Ok(query) = Message::from_vec(&buf[..len]) else { continue };
						let response = zone.respond(&query);
						let Ok(bytes) = response.to_vec() else { continue };
						let socket = Arc::clone(&socket);
						let delay = zone.delay;
						tokio::spawn(async move {
							if !delay.is_zero() {
								tokio::time::sleep(delay).await;
							}
							let _ = socket.send_to(&bytes, peer).await;
						});
					}
				}
			}
		});

		FakeDnsServer {
			addr,
			queries,
			shutdown_tx: Some(shutdown_tx),
		}
	}

	pub fn addr(&self) -> SocketAddr {
		self.addr
	}

	/// Number of datagrams received so far.
	pub fn query_count(&self) -> usize {
		self.queries.load(Ordering::SeqCst)
	}
}

impl Drop for FakeDnsServer {
	fn drop(&mut self) {
		if let Some(tx) = self.shutdown_tx.take() {
			let _ = tx.send(());
		}
	}
}

/// Server reported by every [`FakeLookup`] answer
pub const FAKE_SERVER: SocketAddr = SocketAddr::V4(std::net::SocketAddrV4::new(Ipv4Addr::new(192, 0, 2, 53), 53));

/// In-memory [`HostLookup`] that tracks how many lookups run at once
#[derive(Debug, Default)]
pub struct FakeLookup {
	answers: HashMap<String, Vec<Ipv4Addr>>,
	wildcard: Option<(String, Ipv4Addr)>,
	latency: Duration,
	in_flight: AtomicUsize,
	max_in_flight: AtomicUsize,
	calls: Mutex<Vec<String>>,
}

impl FakeLookup {
	pub fn new() -> Self {
		FakeLookup::default()
	}

	pub fn answer(mut self, host: &str, ips: &[Ipv4Addr]) -> Self {
		self.answers.insert(host.to_string(), ips.to_vec());
		self
	}

	pub fn wildcard(mut self, domain: &str, ip: Ipv4Addr) -> Self {
		self.wildcard = Some((domain.to_string(), ip));
		self
	}

	pub fn latency(mut self, latency: Duration) -> Self {
		self.latency = latency;
		self
	}

	pub fn max_in_flight(&self) -> usize {
		self.max_in_flight.load(Ordering::SeqCst)
	}

	pub fn calls(&self) -> Vec<String> {
		self.calls.lock().unwrap().clone()
	}
}

impl HostLookup for FakeLookup {
	async fn lookup(&self, host: &str) -> Result<LookupResult, ResolveError> {
		let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
		self.max_in_flight.fetch_max(now, Ordering::SeqCst);
		self.calls.lock().unwrap().push(host.to_string());
		if !self.latency.is_zero() {
			tokio::time::sleep(self.latency).await;
		}
		self.in_flight.fetch_sub(1, Ordering::SeqCst);

		let ips = match self.answers.get(host) {
			Some(ips) => ips.clone(),
			None => match &self.wildcard {
				Some((domain, ip)) if host.ends_with(&format!(".{}", domain)) => vec![*ip],
				_ => return Err(ResolveError::AllServersFailed),
			},
		};
		Ok(LookupResult {
			ip_addresses: ips,
			cname: None,
			ttl: 300,
			record_type: RecordKind::A,
			server: FAKE_SERVER,
		})
	}
}
