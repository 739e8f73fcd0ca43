//! Serializes `bool` columns as the `0`/`1` integers the storefront UI expects.

use serde::Serializer;

pub fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u8(u8::from(*value))
}
