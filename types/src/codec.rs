//! Length-prefixed binary helpers shared by the snapshot codec.
//!
//! Persisted blobs carry no self-describing schema: every list is a `u32`
//! count followed by fixed-width elements, and decode order must exactly
//! match encode order.

use bytes::{Buf, BufMut};
use commonware_codec::{Error, ReadExt, Write};

/// Write a string as length-prefixed UTF-8 bytes.
pub fn write_string(s: &str, writer: &mut impl BufMut) {
    let bytes = s.as_bytes();
    (bytes.len() as u32).write(writer);
    writer.put_slice(bytes);
}

/// Read a string from length-prefixed UTF-8 bytes.
pub fn read_string(reader: &mut impl Buf, max_len: usize) -> Result<String, Error> {
    let len = u32::read(reader)? as usize;
    if len > max_len {
        return Err(Error::Invalid("String", "too long"));
    }
    if reader.remaining() < len {
        return Err(Error::EndOfBuffer);
    }
    let mut bytes = vec![0u8; len];
    reader.copy_to_slice(&mut bytes);
    String::from_utf8(bytes).map_err(|_| Error::Invalid("String", "invalid UTF-8"))
}

/// Encoded size of a length-prefixed string.
pub fn string_encode_size(s: &str) -> usize {
    4 + s.len()
}

/// Write a `u64` list as a `u32` count followed by fixed-width values.
pub fn write_u64_list(values: &[u64], writer: &mut impl BufMut) {
    (values.len() as u32).write(writer);
    for value in values {
        value.write(writer);
    }
}

/// Read a `u64` list written by [`write_u64_list`].
pub fn read_u64_list(reader: &mut impl Buf, max_len: usize) -> Result<Vec<u64>, Error> {
    let len = u32::read(reader)? as usize;
    if len > max_len {
        return Err(Error::Invalid("U64List", "too long"));
    }
    if reader.remaining() < len * 8 {
        return Err(Error::EndOfBuffer);
    }
    let mut values = Vec::with_capacity(len);
    for _ in 0..len {
        values.push(u64::read(reader)?);
    }
    Ok(values)
}

/// Encoded size of a length-prefixed `u64` list.
pub fn u64_list_encode_size(values: &[u64]) -> usize {
    4 + values.len() * 8
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn string_round_trip() {
        let mut buf = BytesMut::new();
        write_string("free_games:pick_3", &mut buf);
        assert_eq!(buf.len(), string_encode_size("free_games:pick_3"));

        let mut reader = buf.as_ref();
        let decoded = read_string(&mut reader, 64).unwrap();
        assert_eq!(decoded, "free_games:pick_3");
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn string_rejects_too_long() {
        let mut buf = BytesMut::new();
        write_string("hello", &mut buf);

        let mut reader = buf.as_ref();
        let err = read_string(&mut reader, 4).expect_err("should reject too-long string");
        assert!(matches!(err, Error::Invalid("String", "too long")));
    }

    #[test]
    fn string_rejects_truncated_buffer() {
        let mut buf = BytesMut::new();
        (3u32).write(&mut buf);
        buf.extend_from_slice(b"ab");

        let mut reader = buf.as_ref();
        let err = read_string(&mut reader, 10).expect_err("should reject truncated buffer");
        assert!(matches!(err, Error::EndOfBuffer));
    }

    #[test]
    fn string_rejects_invalid_utf8() {
        let mut buf = BytesMut::new();
        (2u32).write(&mut buf);
        buf.extend_from_slice(&[0xff, 0xff]);

        let mut reader = buf.as_ref();
        let err = read_string(&mut reader, 10).expect_err("should reject invalid UTF-8");
        assert!(matches!(err, Error::Invalid("String", "invalid UTF-8")));
    }

    #[test]
    fn u64_list_round_trip() {
        let values = vec![0u64, 7, u64::MAX, 42];
        let mut buf = BytesMut::new();
        write_u64_list(&values, &mut buf);
        assert_eq!(buf.len(), u64_list_encode_size(&values));

        let mut reader = buf.as_ref();
        let decoded = read_u64_list(&mut reader, 16).unwrap();
        assert_eq!(decoded, values);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn u64_list_empty() {
        let mut buf = BytesMut::new();
        write_u64_list(&[], &mut buf);

        let mut reader = buf.as_ref();
        let decoded = read_u64_list(&mut reader, 0).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn u64_list_rejects_too_long() {
        let values = vec![1u64, 2, 3];
        let mut buf = BytesMut::new();
        write_u64_list(&values, &mut buf);

        let mut reader = buf.as_ref();
        let err = read_u64_list(&mut reader, 2).expect_err("should reject too-long list");
        assert!(matches!(err, Error::Invalid("U64List", "too long")));
    }

    #[test]
    fn u64_list_rejects_truncated_buffer() {
        let mut buf = BytesMut::new();
        (4u32).write(&mut buf);
        (1u64).write(&mut buf);

        let mut reader = buf.as_ref();
        let err = read_u64_list(&mut reader, 8).expect_err("should reject truncated buffer");
        assert!(matches!(err, Error::EndOfBuffer));
    }
}
