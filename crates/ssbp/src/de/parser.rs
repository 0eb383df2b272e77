use bytemuck::AnyBitPattern;

use crate::de::error::DecodeError;

/// Represents an ongoing parse.
///
/// Unlike a plain byte stream, SSBP records point at each other through absolute offsets, so the
/// parser keeps the whole buffer and a cursor into it.
pub struct Parser<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Parser<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub const fn position(&self) -> usize {
        self.position
    }

    pub const fn bytes_remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Return the next `size` bytes.
    ///
    /// # Errors
    ///
    /// This function returns an error if:
    ///
    /// - There are not enough bytes to fill a buffer of size `size`.
    pub fn read_bytes(&mut self, size: usize) -> Result<&'a [u8], DecodeError> {
        let data = self.data;
        let start = self.position;
        let bytes = data
            .get(start..)
            .and_then(|rest| rest.get(..size))
            .ok_or_else(|| DecodeError::NotEnoughBytes {
                offset: start,
                needed: size.saturating_sub(self.bytes_remaining()),
            })?;

        self.position += size;
        Ok(bytes)
    }

    /// Step over `size` reserved bytes.
    pub fn skip(&mut self, size: usize) -> Result<(), DecodeError> {
        self.read_bytes(size).map(|_| ())
    }

    /// Read a plain-old-data record.
    ///
    /// Multi-byte fields of `T` are left in file (little-endian) byte order; record types convert
    /// them in their accessors.
    pub fn read<T>(&mut self) -> Result<T, DecodeError>
    where
        T: AnyBitPattern,
    {
        let bytes = self.read_bytes(size_of::<T>())?;
        Ok(bytemuck::pod_read_unaligned(bytes))
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_i16(&mut self) -> Result<i16, DecodeError> {
        let bytes = self.read_bytes(2)?;
        Ok(i16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_f32(&mut self) -> Result<f32, DecodeError> {
        self.read_u32().map(f32::from_bits)
    }

    /// Read a position component stored in tenths of a pixel.
    pub fn read_tenths(&mut self) -> Result<i32, DecodeError> {
        self.read_i16().map(tenths)
    }

    /// Jump to the absolute offset `pointer`, run `f`, then return to the current position.
    ///
    /// The cursor is restored on every exit path, including when `f` fails, so sibling records
    /// keep reading sequentially after a pointer has been followed.
    ///
    /// # Errors
    ///
    /// This function returns an error if:
    ///
    /// - `pointer` lies outside of the data.
    /// - `f` returns an error.
    pub fn at<T, F>(&mut self, pointer: u32, f: F) -> Result<T, DecodeError>
    where
        F: FnOnce(&mut Self) -> Result<T, DecodeError>,
    {
        let target = usize::try_from(pointer)
            .ok()
            .filter(|&target| target <= self.data.len())
            .ok_or(DecodeError::InvalidPointer { pointer })?;

        let saved = self.position;
        self.position = target;
        let result = f(self);
        self.position = saved;
        result
    }

    /// Read the null-terminated string that `pointer` refers to.
    ///
    /// Strings are stored as single-byte characters.
    pub fn read_string_at(&mut self, pointer: u32) -> Result<String, DecodeError> {
        self.at(pointer, |parser| {
            let rest = parser.data.get(parser.position..).unwrap_or_default();
            let length = rest.iter().position(|&b| b == 0).ok_or(
                DecodeError::NotEnoughBytes {
                    offset: parser.position,
                    needed: 1,
                },
            )?;

            Ok(rest[..length].iter().copied().map(char::from).collect())
        })
    }

    /// Same as [`Self::read_string_at`], but a null pointer or an empty string mean "absent".
    pub fn read_optional_string_at(&mut self, pointer: u32) -> Result<Option<String>, DecodeError> {
        if pointer == 0 {
            return Ok(None);
        }

        self.read_string_at(pointer)
            .map(|s| if s.is_empty() { None } else { Some(s) })
    }
}

/// Convert a value stored in tenths to whole units, rounding half to even.
#[expect(clippy::cast_possible_truncation)]
pub fn tenths(value: i16) -> i32 {
    (f32::from(value) / 10.0).round_ties_even() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn little_endian_scalars() {
        let data = [0x34, 0x12, 0xFE, 0xFF, 0x00, 0x00, 0x80, 0x3F];
        let mut parser = Parser::new(&data);

        assert_eq!(parser.read_u16().unwrap(), 0x1234);
        assert_eq!(parser.read_i16().unwrap(), -2);
        assert_eq!(parser.read_f32().unwrap(), 1.0);
        assert_eq!(parser.bytes_remaining(), 0);
    }

    #[test]
    fn not_enough_bytes() {
        let mut parser = Parser::new(&[1, 2, 3]);
        parser.skip(2).unwrap();

        match parser.read_u32() {
            Err(DecodeError::NotEnoughBytes { offset, needed }) => {
                assert_eq!(offset, 2);
                assert_eq!(needed, 3);
            }
            other => panic!("expected NotEnoughBytes, got {other:?}"),
        }
        assert_eq!(parser.position(), 2);
    }

    #[test]
    fn scoped_jump_restores_position() {
        let data = [8, 0, 0, 0, 0xAA, 0xBB, 0, 0, 7, 0];
        let mut parser = Parser::new(&data);

        let pointer = parser.read_u32().unwrap();
        let value = parser.at(pointer, Parser::read_u16).unwrap();

        assert_eq!(value, 7);
        assert_eq!(parser.position(), 4);
        assert_eq!(parser.read_u16().unwrap(), 0xBBAA);
    }

    #[test]
    fn scoped_jump_restores_position_on_failure() {
        let data = [0u8; 6];
        let mut parser = Parser::new(&data);
        parser.skip(2).unwrap();

        assert!(parser.at(4, Parser::read_u32).is_err());
        assert_eq!(parser.position(), 2);

        assert!(matches!(
            parser.at(64, Parser::read_u16),
            Err(DecodeError::InvalidPointer { pointer: 64 })
        ));
        assert_eq!(parser.position(), 2);
    }

    #[test]
    fn strings() {
        let data = b"\0root\0\0";
        let mut parser = Parser::new(data);

        assert_eq!(parser.read_string_at(1).unwrap(), "root");
        assert_eq!(parser.read_optional_string_at(0).unwrap(), None);
        assert_eq!(parser.read_optional_string_at(6).unwrap(), None);
        assert_eq!(parser.read_optional_string_at(2).unwrap().as_deref(), Some("oot"));
        assert_eq!(parser.position(), 0);
    }

    #[test]
    fn unterminated_string() {
        let mut parser = Parser::new(b"abc");
        assert!(matches!(
            parser.read_string_at(0),
            Err(DecodeError::NotEnoughBytes { .. })
        ));
    }

    #[test]
    fn tenths_round_half_to_even() {
        assert_eq!(tenths(100), 10);
        assert_eq!(tenths(104), 10);
        assert_eq!(tenths(106), 11);
        assert_eq!(tenths(25), 2);
        assert_eq!(tenths(35), 4);
        assert_eq!(tenths(-15), -2);
        assert_eq!(tenths(-250), -25);
    }
}
