pub mod deserialise;
pub mod serialise;
pub mod types;

use bytes::BytesMut;

use self::types::*;

/// Build and serialise a query for `name` in class `IN`, with a random
/// ID.
///
/// # Errors
///
/// If `name` is not a valid domain name, or the query is too big for
/// a UDP datagram.
pub fn encode_query(
    name: &str,
    rtype: RecordType,
    recursion_desired: bool,
) -> Result<BytesMut, serialise::Error> {
    let question = Question {
        name: DomainName::from_dotted_string(name)?,
        qtype: rtype,
        qclass: RecordClass::IN,
    };

    Message::query(question, recursion_desired).to_octets()
}

/// Parse a complete message.
///
/// # Errors
///
/// If the message cannot be parsed.
pub fn decode_message(octets: &[u8]) -> Result<Message, deserialise::Error> {
    Message::from_octets(octets)
}
