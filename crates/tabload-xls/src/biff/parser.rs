//! Little-endian cursor over a record body.

use crate::error::{XlsError, XlsResult};

/// Reads fixed-size fields from a BIFF8 record body
#[derive(Debug, Clone)]
pub struct RecordCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> RecordCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte position
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the current position
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Take the next `n` bytes
    pub fn bytes(&mut self, n: usize) -> XlsResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(XlsError::Parse(format!(
                "unexpected end of record at offset {}, need {} bytes, have {}",
                self.pos,
                n,
                self.remaining()
            )));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Skip `n` bytes, clamping at the end of the record
    pub fn skip(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.data.len());
    }

    pub fn u8(&mut self) -> XlsResult<u8> {
        Ok(self.bytes(1)?[0])
    }

    pub fn u16(&mut self) -> XlsResult<u16> {
        let b = self.bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn u32(&mut self) -> XlsResult<u32> {
        let b = self.bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn f64(&mut self) -> XlsResult<f64> {
        let b = self.bytes(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(b);
        Ok(f64::from_le_bytes(raw))
    }

    /// Read an RK-compressed number
    pub fn rk(&mut self) -> XlsResult<f64> {
        self.u32().map(decode_rk)
    }
}

/// Decode an RK-encoded number.
///
/// - Bit 0: the decoded number is divided by 100
/// - Bit 1: bits 2..31 hold a signed 30-bit integer; otherwise they are the
///   upper 30 bits of an IEEE 754 double whose low 34 bits are zero
pub fn decode_rk(rk: u32) -> f64 {
    let value = if rk & 0x02 != 0 {
        ((rk as i32) >> 2) as f64
    } else {
        f64::from_bits(((rk & 0xFFFF_FFFC) as u64) << 32)
    };

    if rk & 0x01 != 0 {
        value / 100.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rk_integers() {
        assert_eq!(decode_rk((42u32 << 2) | 0x02), 42.0);
        assert_eq!(decode_rk(((-5i32 << 2) as u32) | 0x02), -5.0);
        assert_eq!(decode_rk((4200u32 << 2) | 0x03), 42.0);
        assert_eq!(decode_rk(0xFFFF_FE72), -100.0);
    }

    #[test]
    fn test_decode_rk_float() {
        let upper = ((45306.0_f64.to_bits() >> 32) as u32) & 0xFFFF_FFFC;
        assert_eq!(decode_rk(upper), 45306.0);
        assert!((decode_rk(0x0000_04EB) - 3.14).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cursor_reads_little_endian() {
        let mut data = vec![0x34, 0x12, 0x78, 0x56, 0x34, 0x12];
        data.extend_from_slice(&2.5f64.to_le_bytes());
        let mut cur = RecordCursor::new(&data);

        assert_eq!(cur.u16().unwrap(), 0x1234);
        assert_eq!(cur.u32().unwrap(), 0x1234_5678);
        assert_eq!(cur.f64().unwrap(), 2.5);
        assert_eq!(cur.remaining(), 0);
        assert!(cur.u8().is_err());
    }
}
