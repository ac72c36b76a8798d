use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Packet too short")]
    UnexpectedEnd,
}

/// A trait that allows for decoding a structure from a little-endian byte sequence.
///
/// Decoding advances the slice past the consumed bytes, so fields can be read
/// in wire order. A failed decode never produces a partial structure.
pub trait Decode {
    fn decode(data: &mut &[u8]) -> Result<Self, DecodeError>
    where
        Self: Sized;
}

impl Decode for () {
    fn decode(_data: &mut &[u8]) -> Result<Self, DecodeError> {
        Ok(())
    }
}

macro_rules! impl_decode_for_primitive {
    ($($t:ty),*) => {
        $(
            impl Decode for $t {
                fn decode(data: &mut &[u8]) -> Result<Self, DecodeError> {
                    let bytes = data.get(..size_of::<Self>()).ok_or(DecodeError::UnexpectedEnd)?;
                    let value = Self::from_le_bytes(bytes.try_into().unwrap());
                    *data = &data[size_of::<Self>()..];
                    Ok(value)
                }
            }
        )*
    };
}

impl_decode_for_primitive!(u8, u16, u32, u64, i8, i16, i32, i64);

impl<const N: usize> Decode for [u8; N] {
    fn decode(data: &mut &[u8]) -> Result<Self, DecodeError> {
        let bytes = data.get(..N).ok_or(DecodeError::UnexpectedEnd)?;
        let arr = bytes.try_into().unwrap();
        *data = &data[N..];
        Ok(arr)
    }
}

#[cfg(test)]
mod tests {
    use super::{Decode, DecodeError};

    #[test]
    fn little_endian_primitives() {
        let mut data: &[u8] = &[0x39, 0x05, 0xFB, 0xFF];
        assert_eq!(u16::decode(&mut data), Ok(0x0539));
        assert_eq!(i16::decode(&mut data), Ok(-5));
        assert!(data.is_empty());
    }

    #[test]
    fn rejects_short_input() {
        let mut data: &[u8] = &[0x01];
        assert_eq!(u32::decode(&mut data), Err(DecodeError::UnexpectedEnd));
    }

    #[test]
    fn arrays_advance_the_cursor() {
        let mut data: &[u8] = &[1, 2, 3, 4];
        let head: [u8; 3] = Decode::decode(&mut data).unwrap();
        assert_eq!(head, [1, 2, 3]);
        assert_eq!(data, &[4]);
    }
}
