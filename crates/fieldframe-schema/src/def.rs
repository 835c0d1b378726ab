use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::Schema;
use crate::types::{FieldSpec, FieldType};

/// Serializable schema declaration, as stored in `*.schema.json` files.
///
/// ```json
/// {
///   "name": "stream1",
///   "stream_id": 1,
///   "fields": [
///     { "id": 1, "type": "i32", "name": "field1" },
///     { "enabled": false, "id": 2, "type": "f32", "name": "field2" },
///     { "id": 3, "type": "bytes[20]", "name": "field3" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub stream_id: u32,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDef {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    pub id: u32,
    #[serde(rename = "type")]
    pub ty: FieldType,
    pub name: String,
}

fn enabled_by_default() -> bool {
    true
}

impl From<&FieldDef> for FieldSpec {
    fn from(def: &FieldDef) -> Self {
        FieldSpec {
            enabled: def.enabled,
            id: def.id,
            ty: def.ty,
            name: def.name.clone(),
        }
    }
}

impl SchemaDef {
    /// Parse a definition from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Compile the declared field list into a [`Schema`].
    pub fn compile(&self) -> Result<Schema> {
        let specs: Vec<FieldSpec> = self.fields.iter().map(FieldSpec::from).collect();
        Schema::compile(self.stream_id, &specs)
    }
}
