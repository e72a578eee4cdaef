//! Items: named, transformable handles onto geometry.

use nalgebra::{Matrix3, Point2, Vector2};
use serde::{Deserialize, Serialize};
use tordie_core::Identifier;

use crate::geometry::{GeometryKind, Point};

/// Placement of an item: translation, rotation in degrees, and per-axis scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Homogeneous matrix applying scale, then rotation, then translation.
    pub fn to_matrix(&self) -> Matrix3<f64> {
        Matrix3::new_translation(&Vector2::new(self.x, self.y))
            * Matrix3::new_rotation(self.rotation.to_radians())
            * Matrix3::new_nonuniform_scaling(&Vector2::new(self.scale_x, self.scale_y))
    }

    pub fn apply(&self, p: Point) -> Point {
        if self.is_identity() {
            return p;
        }
        let out = self.to_matrix().transform_point(&Point2::new(p.x, p.y));
        Point::new(out.x, out.y)
    }

    /// Factor applied to radii: the mean of the absolute axis scales.
    pub fn radius_scale(&self) -> f64 {
        (self.scale_x.abs() + self.scale_y.abs()) / 2.0
    }
}

/// A node of the item tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Identifier,
    pub name: Option<String>,
    pub parent: Option<Identifier>,
    pub children: Vec<Identifier>,
    pub transform: Transform,
    pub tags: Vec<String>,
    pub geometry: Option<Identifier>,
    /// Modifier stack, applied in order.
    pub modifiers: Vec<Identifier>,
    pub visible: bool,
}

/// Options accepted by `Diagram::create_item`.
#[derive(Debug, Clone, Default)]
pub struct ItemOptions {
    pub name: Option<String>,
    pub parent: Option<Identifier>,
    pub geometry: Option<Identifier>,
    pub tags: Vec<String>,
    pub hidden: bool,
}

impl ItemOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_geometry(mut self, geometry: Identifier) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn with_parent(mut self, parent: Identifier) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// One row of the outliner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayLabel {
    pub id: Identifier,
    /// Kind of the referenced geometry, `None` for pure container items.
    pub kind: Option<GeometryKind>,
    pub name: String,
    pub visible: bool,
    pub children: Vec<DisplayLabel>,
}
