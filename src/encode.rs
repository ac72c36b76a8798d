/// A trait that allows for encoding a structure into a byte sequence.
pub trait Encode {
    /// Encodes a structure into a byte sequence.
    fn encode(&self) -> Vec<u8>;
    fn into_encoded(self) -> Vec<u8>
    where
        Self: Sized,
    {
        self.encode()
    }
}

impl Encode for Vec<u8> {
    fn encode(&self) -> Vec<u8> {
        self.clone()
    }
}
