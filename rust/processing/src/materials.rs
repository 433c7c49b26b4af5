// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Materials and the strategies that bind them to geometry
//!
//! A [`SemanticResolver`] decides which materials a geometry uses. Three
//! strategies are provided:
//!
//! - [`BasicResolver`]: one fresh material per semantic surface
//! - [`ReuseResolver`]: surfaces of the same type share a material
//! - [`CityObjectTypeResolver`]: one material per city object type, applied
//!   uniformly to every face of every geometry of that type
//!
//! Resolvers run single-threaded in document order, so material ids are
//! deterministic for a given document.

use std::fmt;
use std::str::FromStr;

use cityjson_lite_core::{CityObject, Geometry, SurfaceDescriptor};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::properties::{flatten_properties, PropertyMap};

/// Index of a material inside a [`MaterialLibrary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MaterialId(pub u32);

impl MaterialId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a material was created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MaterialSource {
    SemanticSurface,
    CityObjectType,
}

/// A shared material.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Material {
    /// Display name. Starts with the surface or object type it was built from.
    pub name: String,
    /// Surface type (`WallSurface`, ...) or city object type (`Building`, ...).
    pub type_tag: String,
    pub source: MaterialSource,
    /// RGBA diffuse colour in 0..1.
    pub diffuse_color: [f32; 4],
    /// Flattened surface attributes, including `type`.
    pub attributes: PropertyMap,
}

impl Material {
    /// Material for one semantic surface.
    pub fn for_surface(surface: &SurfaceDescriptor) -> Self {
        Self {
            name: surface.surface_type.clone(),
            type_tag: surface.surface_type.clone(),
            source: MaterialSource::SemanticSurface,
            diffuse_color: surface_color(&surface.surface_type),
            attributes: flatten_properties(&surface.to_map()),
        }
    }

    /// Material shared by every object of `object_type`.
    pub fn for_object_type(object_type: &str) -> Self {
        let mut attributes = PropertyMap::new();
        attributes.insert("type".into(), object_type.into());
        Self {
            name: object_type.to_string(),
            type_tag: object_type.to_string(),
            source: MaterialSource::CityObjectType,
            diffuse_color: object_type_color(object_type),
            attributes,
        }
    }

    /// Whether this material may stand in for `surface` under reuse.
    ///
    /// Matches on type tag and name prefix only. Surfaces of the same type
    /// but with different attributes still share a material.
    pub fn can_represent(&self, surface: &SurfaceDescriptor) -> bool {
        self.source == MaterialSource::SemanticSurface
            && self.type_tag == surface.surface_type
            && self.name.starts_with(&surface.surface_type)
    }
}

/// Append-only material store. Ids are positions in creation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MaterialLibrary {
    materials: Vec<Material>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a material and return its id.
    pub fn add(&mut self, material: Material) -> MaterialId {
        let id = MaterialId(self.materials.len() as u32);
        self.materials.push(material);
        id
    }

    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.index())
    }

    /// First material satisfying `predicate`, in creation order.
    pub fn find(&self, predicate: impl Fn(&Material) -> bool) -> Option<MaterialId> {
        self.materials
            .iter()
            .position(predicate)
            .map(|i| MaterialId(i as u32))
    }

    pub fn iter(&self) -> impl Iterator<Item = (MaterialId, &Material)> {
        self.materials
            .iter()
            .enumerate()
            .map(|(i, m)| (MaterialId(i as u32), m))
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

/// Diffuse colour for a semantic surface type.
pub fn surface_color(surface_type: &str) -> [f32; 4] {
    match surface_type {
        "WallSurface" => [0.8, 0.8, 0.8, 1.0],
        "RoofSurface" => [0.9, 0.057, 0.086, 1.0],
        "GroundSurface" => [0.507, 0.233, 0.036, 1.0],
        _ => [0.0, 0.0, 0.0, 1.0],
    }
}

/// Diffuse colour for a city object type.
pub fn object_type_color(object_type: &str) -> [f32; 4] {
    match object_type {
        "Building" | "BuildingPart" | "BuildingInstallation" => [0.75, 0.7, 0.65, 1.0],
        "Bridge" | "BridgePart" | "BridgeInstallation" | "BridgeConstructionElement" => {
            [0.55, 0.5, 0.45, 1.0]
        }
        "Road" | "Railway" | "TransportSquare" => [0.35, 0.35, 0.38, 1.0],
        "TINRelief" => [0.45, 0.55, 0.3, 1.0],
        "WaterBody" => [0.2, 0.4, 0.8, 1.0],
        "PlantCover" | "SolitaryVegetationObject" => [0.2, 0.6, 0.2, 1.0],
        "LandUse" => [0.7, 0.65, 0.4, 1.0],
        "CityFurniture" => [0.6, 0.3, 0.2, 1.0],
        "Tunnel" | "TunnelPart" | "TunnelInstallation" => [0.4, 0.35, 0.3, 1.0],
        _ => [0.6, 0.6, 0.6, 1.0],
    }
}

/// How a geometry's faces map onto materials.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceBinding {
    /// One material per semantic surface, in surface order. Faces pick one
    /// through the geometry's semantic values.
    PerSurface(Vec<MaterialId>),
    /// One material for every face.
    Uniform(MaterialId),
    /// No materials.
    Unbound,
}

/// A material-binding strategy.
pub trait SemanticResolver: Send {
    /// Which strategy this resolver implements.
    fn strategy(&self) -> MaterialStrategy;

    /// Bind materials for one geometry, adding any new ones to `library`.
    fn bind(
        &mut self,
        geometry: &Geometry,
        object: &CityObject,
        library: &mut MaterialLibrary,
    ) -> SurfaceBinding;

    /// Forget state tied to a previous import's library.
    fn reset(&mut self) {}
}

/// One fresh material per semantic surface. Nothing is shared.
#[derive(Debug, Default)]
pub struct BasicResolver;

impl SemanticResolver for BasicResolver {
    fn strategy(&self) -> MaterialStrategy {
        MaterialStrategy::Basic
    }

    fn bind(
        &mut self,
        geometry: &Geometry,
        _object: &CityObject,
        library: &mut MaterialLibrary,
    ) -> SurfaceBinding {
        if !geometry.has_semantics() {
            return SurfaceBinding::Unbound;
        }
        let ids = geometry
            .semantic_surfaces()
            .iter()
            .map(|surface| library.add(Material::for_surface(surface)))
            .collect();
        SurfaceBinding::PerSurface(ids)
    }
}

/// Surfaces whose type already has a material reuse it.
#[derive(Debug, Default)]
pub struct ReuseResolver;

impl SemanticResolver for ReuseResolver {
    fn strategy(&self) -> MaterialStrategy {
        MaterialStrategy::Reuse
    }

    fn bind(
        &mut self,
        geometry: &Geometry,
        _object: &CityObject,
        library: &mut MaterialLibrary,
    ) -> SurfaceBinding {
        if !geometry.has_semantics() {
            return SurfaceBinding::Unbound;
        }
        let ids = geometry
            .semantic_surfaces()
            .iter()
            .map(|surface| match library.find(|m| m.can_represent(surface)) {
                Some(id) => id,
                None => library.add(Material::for_surface(surface)),
            })
            .collect();
        SurfaceBinding::PerSurface(ids)
    }
}

/// One material per city object type, ignoring surface semantics.
#[derive(Debug, Default)]
pub struct CityObjectTypeResolver {
    by_type: FxHashMap<String, MaterialId>,
}

impl SemanticResolver for CityObjectTypeResolver {
    fn strategy(&self) -> MaterialStrategy {
        MaterialStrategy::CityObjectType
    }

    fn bind(
        &mut self,
        _geometry: &Geometry,
        object: &CityObject,
        library: &mut MaterialLibrary,
    ) -> SurfaceBinding {
        let id = *self
            .by_type
            .entry(object.object_type.clone())
            .or_insert_with(|| library.add(Material::for_object_type(&object.object_type)));
        SurfaceBinding::Uniform(id)
    }

    fn reset(&mut self) {
        self.by_type.clear();
    }
}

/// Selects a [`SemanticResolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum MaterialStrategy {
    /// One material per semantic surface.
    Basic,
    /// Share materials between surfaces of the same type.
    #[default]
    Reuse,
    /// One material per city object type.
    CityObjectType,
}

impl MaterialStrategy {
    /// Strategy for the classic `(material_type, reuse_materials)` option pair.
    ///
    /// `"SURFACES"` selects surface materials, shared when `reuse` is set.
    /// Anything else selects per-type materials.
    pub fn from_options(material_type: &str, reuse: bool) -> Self {
        match material_type {
            "SURFACES" if reuse => MaterialStrategy::Reuse,
            "SURFACES" => MaterialStrategy::Basic,
            _ => MaterialStrategy::CityObjectType,
        }
    }

    /// A fresh resolver implementing this strategy.
    pub fn resolver(self) -> Box<dyn SemanticResolver> {
        match self {
            MaterialStrategy::Basic => Box::new(BasicResolver),
            MaterialStrategy::Reuse => Box::new(ReuseResolver),
            MaterialStrategy::CityObjectType => Box::new(CityObjectTypeResolver::default()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialStrategy::Basic => "surfaces",
            MaterialStrategy::Reuse => "reuse",
            MaterialStrategy::CityObjectType => "type",
        }
    }
}

impl fmt::Display for MaterialStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaterialStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "surfaces" | "basic" => Ok(MaterialStrategy::Basic),
            "reuse" => Ok(MaterialStrategy::Reuse),
            "type" | "city-object-type" => Ok(MaterialStrategy::CityObjectType),
            other => Err(format!(
                "unknown material strategy \"{}\" (expected surfaces, reuse or type)",
                other
            )),
        }
    }
}
