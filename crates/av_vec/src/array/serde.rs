use core::fmt;
use core::marker::PhantomData;

use serde_core::de::{SeqAccess, Visitor};
use serde_core::{Deserialize, Deserializer, Serialize, Serializer};

use super::DynamicArray;

/// Upper bound for trusting a deserializer's length hint.
const MAX_PREALLOC: usize = 4096;

impl<T: Serialize> Serialize for DynamicArray<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

struct ArrayVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for ArrayVisitor<T> {
    type Value = DynamicArray<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<V>(self, mut seq: V) -> Result<Self::Value, V::Error>
    where
        V: SeqAccess<'de>,
    {
        let hint = seq.size_hint().unwrap_or_default().min(MAX_PREALLOC);
        let mut array = DynamicArray::with_capacity(hint);

        while let Some(value) = seq.next_element()? {
            array.push(value);
        }

        Ok(array)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for DynamicArray<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(ArrayVisitor(PhantomData))
    }
}

// -----------------------------------------------------------------------------
// Tests
