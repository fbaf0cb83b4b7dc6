use std::net::{Ipv4Addr, SocketAddr};

use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{Name, RData, RecordType};
use log::debug;
use tokio::net::UdpSocket;
use tokio::time::Instant;

use crate::error::ResolveError;
use crate::transport::{LookupResult, RecordKind};

/// Largest plain DNS message over UDP without EDNS
const MAX_UDP_PAYLOAD: usize = 512;

/// Stray or mismatched datagrams tolerated before giving up on a server
const MAX_RECV_ATTEMPTS: usize = 3;

/// How many alias hops are chased against the answering server
pub const MAX_CNAME_DEPTH: usize = 1;

/// Records extracted from one response's answer section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answer {
	pub ips: Vec<Ipv4Addr>,
	pub cname: Option<String>,
	pub ttl: Option<u32>,
	pub kind: Option<RecordKind>,
}

impl Answer {
	/// Fold a chased alias target into this answer.
	///
	/// Addresses already present are not duplicated. The TTL only drops to
	/// the target's when the target actually produced addresses.
	fn merge_chased(&mut self, chased: Answer) {
		if chased.ips.is_empty() {
			return;
		}
		for ip in chased.ips {
			if !self.ips.contains(&ip) {
				self.ips.push(ip);
			}
		}
		self.ttl = match (self.ttl, chased.ttl) {
			(Some(own), Some(target)) => Some(own.min(target)),
			(own, target) => own.or(target),
		};
	}
}

/// Build a single-question A query with recursion desired.
///
/// Returns the serialized query bytes ready to send over UDP.
pub fn build_query(domain: &str, txid: u16) -> Result<Vec<u8>, ResolveError> {
	let name = Name::from_ascii(domain)
		.map_err(|e| ResolveError::Protocol(format!("invalid domain name '{}': {}", domain, e)))?;

	let mut message = Message::new();
	message.set_id(txid);
	message.set_message_type(MessageType::Query);
	message.set_op_code(OpCode::Query);
	message.set_recursion_desired(true);
	message.add_query(Query::query(name, RecordType::A));

	message.to_vec()
		.map_err(|e| ResolveError::Protocol(format!("failed to serialize DNS query: {}", e)))
}

/// Parse a DNS response, validating the transaction ID and message type.
pub fn parse_response(bytes: &[u8], expected_txid: u16) -> Result<Message, ResolveError> {
	let message = Message::from_vec(bytes)
		.map_err(|e| ResolveError::Protocol(format!("failed to parse DNS response: {}", e)))?;

	if message.id() != expected_txid {
		return Err(ResolveError::Protocol(format!(
			"txid mismatch: expected {}, got {}",
			expected_txid, message.id()
		)));
	}

	if message.message_type() != MessageType::Response {
		return Err(ResolveError::Protocol(
			"received a query instead of a response".to_string(),
		));
	}

	Ok(message)
}

/// Walk the answer section of a response.
///
/// A records contribute addresses and the first one seen sets the TTL.
/// A CNAME sets the alias and overrides the TTL and record type. AAAA
/// records only set bookkeeping when nothing else has been seen yet.
/// Any rcode other than NOERROR is an error.
pub fn extract_answer(message: &Message) -> Result<Answer, ResolveError> {
	let rcode = message.response_code();
	if rcode != ResponseCode::NoError {
		return Err(ResolveError::Protocol(format!("server answered {}", rcode)));
	}

	let mut answer = Answer::default();
	for record in message.answers() {
		match record.data() {
			RData::A(a) => {
				answer.ips.push(a.0);
				if answer.ttl.is_none() {
					answer.ttl = Some(record.ttl());
					answer.kind = Some(RecordKind::A);
				}
			}
			RData::CNAME(cname) => {
				let target = cname.0.to_utf8();
				answer.cname = Some(target.trim_end_matches('.').to_string());
				answer.ttl = Some(record.ttl());
				answer.kind = Some(RecordKind::Cname);
			}
			RData::AAAA(_) => {
				if answer.ips.is_empty() && answer.ttl.is_none() {
					answer.ttl = Some(record.ttl());
					answer.kind = Some(RecordKind::Aaaa);
				}
			}
			_ => {}
		}
	}
	Ok(answer)
}

/// Send one A query to a server and wait for its response until `deadline`.
///
/// Creates a dedicated socket per query so concurrent lookups never read
/// each other's responses.
pub async fn exchange(
	server: SocketAddr,
	domain: &str,
	deadline: Instant,
) -> Result<Message, ResolveError> {
	let txid: u16 = rand::random();
	let query_bytes = build_query(domain, txid)?;

	let bind_addr = if server.is_ipv4() {
		"0.0.0.0:0"
	} else {
		"[::]:0"
	};
	let socket = UdpSocket::bind(bind_addr).await
		.map_err(|e| ResolveError::Protocol(format!("failed to bind UDP socket: {}", e)))?;

	socket.send_to(&query_bytes, server).await
		.map_err(|e| ResolveError::Protocol(format!("failed to send query: {}", e)))?;

	let mut buf = vec![0u8; MAX_UDP_PAYLOAD];
	let mut last_error = ResolveError::Timeout;
	for _ in 0..MAX_RECV_ATTEMPTS {
		match tokio::time::timeout_at(deadline, socket.recv_from(&mut buf)).await {
			Ok(Ok((len, src))) => {
				if src.ip() != server.ip() {
					last_error = ResolveError::Protocol(format!("response from unexpected source {}", src));
					continue;
				}
				match parse_response(&buf[..len], txid) {
					Ok(message) => return Ok(message),
					Err(e) => {
						last_error = e;
						continue;
					}
				}
			}
			Ok(Err(e)) => {
				return Err(ResolveError::Protocol(format!("failed to receive response: {}", e)));
			}
			Err(_) => return Err(ResolveError::Timeout),
		}
	}
	Err(last_error)
}

/// Resolve `domain` against a single server, chasing an alias on that
/// same server at most [`MAX_CNAME_DEPTH`] times.
///
/// A response that yields no IPv4 address is a failure even when the
/// exchange itself succeeded.
pub async fn query_server(
	server: SocketAddr,
	domain: &str,
	deadline: Instant,
) -> Result<LookupResult, ResolveError> {
	let message = exchange(server, domain, deadline).await?;
	let mut answer = extract_answer(&message)?;

	let mut pending = answer.cname.clone();
	let mut depth = 0;
	while let Some(target) = pending.take() {
		if depth >= MAX_CNAME_DEPTH {
			break;
		}
		depth += 1;
		let chased = match exchange(server, &target, deadline).await {
			Ok(message) => extract_answer(&message),
			Err(e) => Err(e),
		};
		match chased {
			Ok(chased) => {
				pending = chased.cname.clone();
				answer.merge_chased(chased);
			}
			Err(e) => debug!("{}: chasing alias {} failed: {}", server, target, e),
		}
	}

	if answer.ips.is_empty() {
		return Err(ResolveError::Protocol("no IPv4 address in answer".to_string()));
	}

	Ok(LookupResult {
		ip_addresses: answer.ips,
		cname: answer.cname,
		ttl: answer.ttl.unwrap_or(0),
		record_type: answer.kind.unwrap_or(RecordKind::A),
		server,
	})
}
