pub mod codec;
pub mod error;
pub mod format;
pub mod plain;

pub use codec::{Codec, CompressionCodec};
pub use error::{PageCodecError, Result};
pub use plain::{
    decode_bools, decode_float32s, decode_float64s, decode_int32s, decode_int64s, encode_bools,
    encode_float32s, encode_float64s, encode_int32s, encode_int64s, PhysicalType, PlainType,
    PlainValues,
};
