use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{timeout_at, Instant};

use dns_wire::protocol::deserialise::DecodeError;
use dns_wire::protocol::query::IdSource;
use dns_wire::protocol::serialise::EncodeError;
use dns_wire::protocol::types::*;

/// Responses bigger than this are cut off, and will then fail to
/// decode.
pub const UDP_MAX_LEN: usize = 512;

/// Errors which can stop a lookup from producing an answer.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("network error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("could not build query: {0}")]
    Encode(#[from] EncodeError),

    #[error("could not decode response: {0}")]
    Decode(#[from] DecodeError),

    /// Only responses with the wrong id arrived before the timeout.
    #[error("response id {actual} does not match query id {expected}")]
    IdMismatch { expected: u16, actual: u16 },

    #[error("message from nameserver is not a response")]
    NotAResponse,

    #[error("nameserver returned {0}")]
    ResponseCode(Rcode),

    #[error("question in response does not match query")]
    QuestionMismatch,

    #[error("response has no answers")]
    EmptyAnswerSet,

    #[error("response has no address answers")]
    NoAddress,
}

/// Send a query for `question` to `server` over UDP, and return the
/// validated response.
///
/// Responses with the wrong id are discarded, and the lookup keeps
/// waiting for the right one until `limit` has passed since the query
/// was sent.  Any other problem with a response ends the lookup.
pub async fn lookup(
    server: SocketAddr,
    limit: Duration,
    question: Question,
    flags: u16,
    ids: &mut dyn IdSource,
) -> Result<Packet, LookupError> {
    let request = Packet::from_question(ids.next_id(), flags, question);
    let serialised = request.to_octets()?;

    let sock = if server.is_ipv4() {
        UdpSocket::bind("0.0.0.0:0").await?
    } else {
        UdpSocket::bind("[::]:0").await?
    };
    sock.connect(server).await?;

    // a limit too far in the future to represent is no limit at all
    let deadline = Instant::now().checked_add(limit);
    sock.send(&serialised).await?;
    tracing::debug!(id = request.header.id, octets = serialised.len(), %server, "sent query");

    let mut discarded = None;
    let mut buf = vec![0u8; UDP_MAX_LEN];
    loop {
        let received = match deadline {
            Some(deadline) => timeout_at(deadline, sock.recv(&mut buf)).await,
            None => Ok(sock.recv(&mut buf).await),
        };
        let Ok(received) = received else {
            return Err(match discarded {
                Some(actual) => LookupError::IdMismatch {
                    expected: request.header.id,
                    actual,
                },
                None => LookupError::Timeout(limit),
            });
        };
        let len = received?;
        tracing::debug!(octets = len, "received response");

        let response = Packet::from_octets(&buf[..len])?;
        if response.header.id != request.header.id {
            tracing::warn!(
                expected = request.header.id,
                actual = response.header.id,
                "discarding response with wrong id"
            );
            discarded = Some(response.header.id);
            continue;
        }

        validate_response(&request, &response)?;
        if response.header.is_truncated() {
            tracing::warn!(id = response.header.id, "response is truncated");
        }
        return Ok(response);
    }
}

/// Check that a response answers the request:
///
/// - Check the ID and questions match.
///
/// - Check it is a response and no error is signalled.
pub fn validate_response(request: &Packet, response: &Packet) -> Result<(), LookupError> {
    if request.header.id != response.header.id {
        return Err(LookupError::IdMismatch {
            expected: request.header.id,
            actual: response.header.id,
        });
    }
    if !response.header.is_response() {
        return Err(LookupError::NotAResponse);
    }
    if response.header.rcode() != Rcode::NoError {
        return Err(LookupError::ResponseCode(response.header.rcode()));
    }
    if request.questions != response.questions {
        return Err(LookupError::QuestionMismatch);
    }

    Ok(())
}

/// The address in the first `A` answer.
pub fn first_address(response: &Packet) -> Result<Ipv4Addr, LookupError> {
    if response.answers.is_empty() {
        return Err(LookupError::EmptyAnswerSet);
    }

    response
        .answers
        .iter()
        .find_map(ResourceRecord::address)
        .ok_or(LookupError::NoAddress)
}
