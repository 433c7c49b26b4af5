// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! City objects: the named entities of a CityJSON document.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::geometry::Geometry;

/// Member names that describe structure rather than attributes.
pub const RESERVED_KEYS: [&str; 3] = ["geometry", "children", "parents"];

/// A decoded city object.
#[derive(Debug, Clone, PartialEq)]
pub struct CityObject {
    /// Key of the object in `CityObjects`.
    pub id: String,
    /// CityJSON type tag, e.g. `Building` or `BuildingPart`.
    pub object_type: String,
    pub geometry: Vec<Geometry>,
    /// Declared parent ids. Only the first one is honoured when building the hierarchy.
    pub parents: Vec<String>,
    pub children: Vec<String>,
    /// Every member of the object except `geometry`, in document order.
    pub properties: Map<String, Value>,
}

impl CityObject {
    /// Decode a city object from its JSON value.
    pub fn from_json(id: impl Into<String>, value: Value) -> Result<Self> {
        let id = id.into();
        let Value::Object(mut properties) = value else {
            return Err(Error::MalformedDocument(format!(
                "CityObject \"{}\" is not a JSON object",
                id
            )));
        };

        let object_type = properties
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| {
                Error::MalformedDocument(format!("CityObject \"{}\" has no \"type\"", id))
            })?;

        let geometry = match properties.get("geometry") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(Geometry::from_json)
                .collect::<Result<Vec<_>>>()?,
            Some(_) => {
                return Err(Error::MalformedDocument(format!(
                    "CityObject \"{}\": \"geometry\" must be an array",
                    id
                )))
            }
        };

        let parents = id_list(&id, "parents", properties.get("parents"))?;
        let children = id_list(&id, "children", properties.get("children"))?;

        properties.retain(|key, _| key != "geometry");

        Ok(Self {
            id,
            object_type,
            geometry,
            parents,
            children,
            properties,
        })
    }

    /// The parent honoured by the hierarchy, if any.
    pub fn primary_parent(&self) -> Option<&str> {
        self.parents.first().map(String::as_str)
    }
}

fn id_list(id: &str, member: &str, value: Option<&Value>) -> Result<Vec<String>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(v) => Vec::<String>::deserialize(v).map_err(|e| {
            Error::MalformedDocument(format!("CityObject \"{}\": \"{}\": {}", id, member, e))
        }),
    }
}
