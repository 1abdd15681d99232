use dns_codec::protocol::types::*;
use dns_codec::protocol::{deserialise, serialise};
use tracing::Instrument;

use crate::transport::{Transport, TransportError};

/// Ask a nameserver a single question in class `IN`, returning the
/// decoded response.
///
/// The response is checked against the request (see
/// `response_matches_request`), but its rcode is not: a `NXDOMAIN` or
/// `SERVFAIL` is still a successful lookup.
///
/// # Errors
///
/// If the name is invalid, the exchange fails, or the response is
/// malformed or does not match.
pub async fn lookup<T: Transport>(
    transport: &T,
    name: &str,
    qtype: RecordType,
    recursion_desired: bool,
) -> Result<Message, LookupError> {
    let question = Question {
        name: DomainName::from_dotted_string(name).map_err(serialise::Error::from)?,
        qtype,
        qclass: RecordClass::IN,
    };

    let span = tracing::error_span!("lookup", name = %question.name, qtype = %question.qtype);
    lookup_question(transport, question, recursion_desired)
        .instrument(span)
        .await
}

async fn lookup_question<T: Transport>(
    transport: &T,
    question: Question,
    recursion_desired: bool,
) -> Result<Message, LookupError> {
    let request = Message::query(question, recursion_desired);
    let serialised_request = request.to_octets()?;
    tracing::debug!(id = %request.header.id, length = %serialised_request.len(), "built query");

    let serialised_response = transport.exchange(&serialised_request).await?;
    let response = Message::from_octets(&serialised_response)?;
    tracing::debug!(id = %response.header.id, rcode = %response.header.rcode, "decoded response");

    if !response_matches_request(&request, &response) {
        return Err(LookupError::MismatchedResponse {
            id: response.header.id,
        });
    }

    if response.header.is_truncated {
        tracing::warn!(id = %response.header.id, "response is truncated");
    }

    Ok(response)
}

/// Very basic validation that a nameserver response matches a
/// message:
///
/// - Check the ID, opcode, and questions match the question.
///
/// - Check it is a response.
pub fn response_matches_request(request: &Message, response: &Message) -> bool {
    if request.header.id != response.header.id {
        return false;
    }
    if !response.header.is_response {
        return false;
    }
    if request.header.opcode != response.header.opcode {
        return false;
    }
    if request.questions != response.questions {
        return false;
    }

    true
}

/// An error that can occur during a lookup.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("could not build query: {0}")]
    Encode(#[from] serialise::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("could not decode response: {0}")]
    Decode(#[from] deserialise::Error),

    #[error("response {id} does not match the query")]
    MismatchedResponse { id: u16 },
}
