//! Modifiers and the evaluator registry.
//!
//! A modifier is a named, parameterized transform stage. Evaluators are pure
//! functions `(geometry, params, inputs, diagram) -> geometry` looked up by
//! modifier type. The geometry handed to an evaluator always has its point
//! references resolved to inline coordinates.

use nalgebra::{Matrix3, Point2, Vector2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tordie_core::{DiagramError, Identifier};

use crate::diagram::Diagram;
use crate::geometry::{Geometry, Point};

/// Free-form modifier parameters.
pub type ModifierParams = serde_json::Map<String, serde_json::Value>;

/// Evaluator signature for a modifier type.
pub type GeometryEvaluator =
    Rc<dyn Fn(&Geometry, &ModifierParams, &[Geometry], &Diagram) -> Geometry>;

/// A modifier instance stored in the diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub id: Identifier,
    #[serde(rename = "type")]
    pub modifier_type: String,
    pub params: ModifierParams,
    /// Geometry or item ids read by the evaluator.
    pub inputs: Vec<Identifier>,
}

/// Reads a numeric parameter, falling back to `default` when absent or not a number.
pub fn param_f64(params: &ModifierParams, key: &str, default: f64) -> f64 {
    params
        .get(key)
        .and_then(serde_json::Value::as_f64)
        .unwrap_or(default)
}

/// Reads a string parameter.
pub fn param_str<'a>(params: &'a ModifierParams, key: &str) -> Option<&'a str> {
    params.get(key).and_then(serde_json::Value::as_str)
}

fn apply_matrix(geometry: &Geometry, m: &Matrix3<f64>) -> Geometry {
    geometry.map_points(|p| {
        let out = m.transform_point(&Point2::new(p.x, p.y));
        Point::new(out.x, out.y)
    })
}

/// Mirror across `x = at` (`axis = "x"`, the default) or `y = at` (`axis = "y"`).
pub fn reflect(
    geometry: &Geometry,
    params: &ModifierParams,
    _inputs: &[Geometry],
    _ctx: &Diagram,
) -> Geometry {
    let at = param_f64(params, "at", 0.0);
    let (offset, scale) = match param_str(params, "axis") {
        Some("y") => (Vector2::new(0.0, at), Vector2::new(1.0, -1.0)),
        _ => (Vector2::new(at, 0.0), Vector2::new(-1.0, 1.0)),
    };
    let m = Matrix3::new_translation(&offset)
        * Matrix3::new_nonuniform_scaling(&scale)
        * Matrix3::new_translation(&-offset);
    apply_matrix(geometry, &m)
}

/// Rotate by `angle` degrees about `(cx, cy)`.
pub fn twist(
    geometry: &Geometry,
    params: &ModifierParams,
    _inputs: &[Geometry],
    _ctx: &Diagram,
) -> Geometry {
    let angle = param_f64(params, "angle", 0.0);
    let pivot = Vector2::new(param_f64(params, "cx", 0.0), param_f64(params, "cy", 0.0));
    let m = Matrix3::new_translation(&pivot)
        * Matrix3::new_rotation(angle.to_radians())
        * Matrix3::new_translation(&-pivot);
    apply_matrix(geometry, &m)
}

/// Offset by `(dx, dy)`.
pub fn translate(
    geometry: &Geometry,
    params: &ModifierParams,
    _inputs: &[Geometry],
    _ctx: &Diagram,
) -> Geometry {
    let dx = param_f64(params, "dx", 0.0);
    let dy = param_f64(params, "dy", 0.0);
    geometry.map_points(|p| p.translated(dx, dy))
}

/// Maps modifier type names to evaluators.
#[derive(Clone, Default)]
pub struct ModifierRegistry {
    evaluators: HashMap<String, GeometryEvaluator>,
}

impl ModifierRegistry {
    /// Empty registry with no evaluators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with `Reflect`, `Twist` and `Translate`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.insert("Reflect", Rc::new(reflect));
        registry.insert("Twist", Rc::new(twist));
        registry.insert("Translate", Rc::new(translate));
        registry
    }

    fn insert(&mut self, name: &str, evaluator: GeometryEvaluator) {
        self.evaluators.insert(name.to_string(), evaluator);
    }

    /// Registers or replaces the evaluator for `name`.
    ///
    /// Blank names are rejected.
    pub fn register(
        &mut self,
        name: &str,
        evaluator: GeometryEvaluator,
    ) -> Result<(), DiagramError> {
        if name.trim().is_empty() {
            return Err(DiagramError::InvalidModifierType {
                modifier_type: name.to_string(),
            });
        }
        if self.evaluators.insert(name.to_string(), evaluator).is_some() {
            tracing::debug!("Replaced evaluator for modifier type {}", name);
        } else {
            tracing::debug!("Registered modifier type {}", name);
        }
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.evaluators.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<GeometryEvaluator> {
        self.evaluators.get(name).cloned()
    }

    /// Registered type names, sorted.
    pub fn types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.evaluators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for ModifierRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModifierRegistry")
            .field("types", &self.types())
            .finish()
    }
}
