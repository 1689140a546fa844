use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One record of the map lookup endpoint.
///
/// Only the fields the importer relies on are typed; everything else the server
/// sends is kept untouched in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MapInfo {
    pub map_uid: String,
    pub name: String,
    pub file_url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MapInfo {
    /// File name used when storing the downloaded map
    pub fn file_name(&self) -> String {
        format!("{}.Map.Gbx", self.map_uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_fields_are_preserved() {
        let info: MapInfo = serde_json::from_value(json!({
            "mapUid": "abc123",
            "name": "Winter 01",
            "fileUrl": "https://core.trackmania.nadeo.live/maps/abc123/file",
            "author": "d2372a08-a8a1-46cb-97fb-23a161d85ad0",
            "authorScore": 42042
        }))
        .unwrap();

        assert_eq!(info.file_name(), "abc123.Map.Gbx");
        assert_eq!(info.extra["authorScore"], json!(42042));
        assert_eq!(serde_json::to_value(&info).unwrap()["author"], json!("d2372a08-a8a1-46cb-97fb-23a161d85ad0"));
    }
}
