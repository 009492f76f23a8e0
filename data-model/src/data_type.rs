use thiserror::Error;

/// Largest encoded attribute value: a 32 character string plus its length prefix.
pub const MAX_ATTR_VALUE_LEN: usize = 33;

/// ZCL data types understood by the device model.
///
/// The discriminant is the on-air type id.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum DataType {
    NoData = 0x00,
    Data8 = 0x08,
    Bool = 0x10,
    Bitmap8 = 0x18,
    Bitmap16 = 0x19,
    Uint8 = 0x20,
    Uint16 = 0x21,
    Uint24 = 0x22,
    Uint32 = 0x23,
    Int8 = 0x28,
    Int16 = 0x29,
    Int32 = 0x2b,
    Enum8 = 0x30,
    Enum16 = 0x31,
    OctetString = 0x41,
    CharString = 0x42,
}

impl DataType {
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Some(match id {
            0x00 => DataType::NoData,
            0x08 => DataType::Data8,
            0x10 => DataType::Bool,
            0x18 => DataType::Bitmap8,
            0x19 => DataType::Bitmap16,
            0x20 => DataType::Uint8,
            0x21 => DataType::Uint16,
            0x22 => DataType::Uint24,
            0x23 => DataType::Uint32,
            0x28 => DataType::Int8,
            0x29 => DataType::Int16,
            0x2b => DataType::Int32,
            0x30 => DataType::Enum8,
            0x31 => DataType::Enum16,
            0x41 => DataType::OctetString,
            0x42 => DataType::CharString,
            _ => return None,
        })
    }

    /// Encoded width for fixed-size types, `None` for length-prefixed strings.
    pub fn fixed_len(self) -> Option<usize> {
        match self {
            DataType::NoData => Some(0),
            DataType::Data8
            | DataType::Bool
            | DataType::Bitmap8
            | DataType::Uint8
            | DataType::Int8
            | DataType::Enum8 => Some(1),
            DataType::Bitmap16 | DataType::Uint16 | DataType::Int16 | DataType::Enum16 => Some(2),
            DataType::Uint24 => Some(3),
            DataType::Uint32 | DataType::Int32 => Some(4),
            DataType::OctetString | DataType::CharString => None,
        }
    }

    /// Whether `bytes` is a well formed encoding of this type.
    ///
    /// Strings carry a one byte length prefix that must cover the rest of the buffer.
    pub fn accepts(self, bytes: &[u8]) -> bool {
        match self.fixed_len() {
            Some(len) => bytes.len() == len,
            None => match bytes.split_first() {
                Some((&len, rest)) => usize::from(len) == rest.len(),
                None => false,
            },
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum ValueError {
    #[error("value of {len} bytes exceeds the {max} byte attribute storage")]
    TooLong { len: usize, max: usize },

    #[error("{len} byte value is not a valid {data_type:?} encoding")]
    TypeMismatch {
        data_type: DataType,
        len: usize,
    },
}

/// Live, ZCL-encoded attribute value in fixed-capacity storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AttributeValue(heapless::Vec<u8, MAX_ATTR_VALUE_LEN>);

impl AttributeValue {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ValueError> {
        heapless::Vec::from_slice(bytes)
            .map(AttributeValue)
            .map_err(|_| ValueError::TooLong {
                len: bytes.len(),
                max: MAX_ATTR_VALUE_LEN,
            })
    }

    /// Like [`AttributeValue::from_bytes`], additionally checking the encoding against `data_type`.
    pub fn typed(data_type: DataType, bytes: &[u8]) -> Result<Self, ValueError> {
        if !data_type.accepts(bytes) {
            return Err(ValueError::TypeMismatch {
                data_type,
                len: bytes.len(),
            });
        }
        Self::from_bytes(bytes)
    }

    pub fn bool(value: bool) -> Self {
        Self::from_le([u8::from(value)])
    }

    pub fn u8(value: u8) -> Self {
        Self::from_le([value])
    }

    pub fn u16(value: u16) -> Self {
        Self::from_le(value.to_le_bytes())
    }

    pub fn u32(value: u32) -> Self {
        Self::from_le(value.to_le_bytes())
    }

    pub fn i16(value: i16) -> Self {
        Self::from_le(value.to_le_bytes())
    }

    /// Length-prefixed character string.
    pub fn char_string(value: &str) -> Result<Self, ValueError> {
        let bytes = value.as_bytes();
        let len = u8::try_from(bytes.len()).map_err(|_| ValueError::TooLong {
            len: bytes.len() + 1,
            max: MAX_ATTR_VALUE_LEN,
        })?;
        let mut out = heapless::Vec::new();
        out.push(len).map_err(|_| ValueError::TooLong {
            len: bytes.len() + 1,
            max: MAX_ATTR_VALUE_LEN,
        })?;
        out.extend_from_slice(bytes).map_err(|_| ValueError::TooLong {
            len: bytes.len() + 1,
            max: MAX_ATTR_VALUE_LEN,
        })?;
        Ok(AttributeValue(out))
    }

    /// Scalar encodings, at most four bytes.
    fn from_le<const N: usize>(bytes: [u8; N]) -> Self {
        AttributeValue(heapless::Vec::from_slice(&bytes).unwrap_or_default())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.as_bytes() {
            [b] => Some(*b != 0),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> Option<u8> {
        match self.as_bytes() {
            [b] => Some(*b),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<u16> {
        match self.as_bytes() {
            [lo, hi] => Some(u16::from_le_bytes([*lo, *hi])),
            _ => None,
        }
    }
}
