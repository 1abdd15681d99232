#![no_main]
use libfuzzer_sys::fuzz_target;

use dns_codec::protocol::serialise::WritableBuffer;
use dns_codec::protocol::types::Message;

fuzz_target!(|data: &[u8]| {
    if let Ok(deserialised) = Message::from_octets(data) {
        // expanding compressed names can take it over 512 octets
        let mut buffer = WritableBuffer::default();
        deserialised.serialise(&mut buffer).unwrap();
        let re_deserialised = Message::from_octets(&buffer.octets);
        assert_eq!(Ok(deserialised), re_deserialised);
    }
});
