use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::model::{NameValuePair, StructuredData};

/// Serialize an ordered parameter list as a JSON object.
///
/// The in-memory representation keeps order and duplicates; downstream
/// consumers want plain objects, so a repeated name keeps its last value
/// in the serialized form.
pub fn serialize_params_as_map<S>(
    params: &[NameValuePair],
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(params.len()))?;
    for pair in params {
        map.serialize_entry(&pair.name, &pair.value)?;
    }
    map.end()
}

struct ParamsAsMap<'a>(&'a [NameValuePair]);

impl Serialize for ParamsAsMap<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serialize_params_as_map(self.0, serializer)
    }
}

/// Serialize structured data as a JSON object of objects, keyed by
/// element id.
pub fn serialize_structured_data<S>(
    data: &StructuredData,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(data.len()))?;
    for (id, params) in data {
        map.serialize_entry(id, &ParamsAsMap(params))?;
    }
    map.end()
}
