//! Diagram model: geometry, item and modifier stores plus the evaluation cache.
//!
//! Every mutator that can change rendered output invalidates the cache entry
//! of each affected item. Creation of fresh entities and item renames are
//! cache-irrelevant: nothing cached can depend on an id that did not exist,
//! and names never reach evaluated geometry.
//!
//! Readers never fail on bad references. [`Diagram::resolve_point`]
//! substitutes the origin for a dangling or wrong-kind reference and logs a
//! warning; [`Diagram::try_resolve_point`] is the strict variant.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use tordie_core::event_bus::DiagramEvent;
use tordie_core::{DiagramError, EditorEvent, EventBus, Identifier};

use crate::geometry::{Geometry, GeometryKind, GeometryPayload, Point, PointRef};
use crate::item::{DisplayLabel, Item, ItemOptions, Transform};
use crate::modifier::{GeometryEvaluator, Modifier, ModifierParams, ModifierRegistry};

type DiagramResult<T> = Result<T, DiagramError>;

/// Owner of all geometry, items and modifiers of one document.
pub struct Diagram {
    geometries: HashMap<Identifier, Geometry>,
    geometry_order: Vec<Identifier>,
    items: HashMap<Identifier, Item>,
    item_order: Vec<Identifier>,
    modifiers: HashMap<Identifier, Modifier>,
    registry: ModifierRegistry,
    cache: RefCell<HashMap<Identifier, Geometry>>,
    version: u64,
    bus: Option<Rc<EventBus>>,
}

impl Diagram {
    /// Empty diagram with the built-in modifier evaluators registered.
    pub fn new() -> Self {
        Self {
            geometries: HashMap::new(),
            geometry_order: Vec::new(),
            items: HashMap::new(),
            item_order: Vec::new(),
            modifiers: HashMap::new(),
            registry: ModifierRegistry::with_builtins(),
            cache: RefCell::new(HashMap::new()),
            version: 0,
            bus: None,
        }
    }

    /// Routes change notifications to `bus`.
    pub fn attach_bus(&mut self, bus: Rc<EventBus>) {
        self.bus = Some(bus);
    }

    /// Monotonic counter bumped by every mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    fn changed(&mut self, event: DiagramEvent) {
        self.version += 1;
        tracing::trace!("{}", event.description());
        if let Some(bus) = &self.bus {
            bus.publish(EditorEvent::Diagram(event));
        }
    }

    // ---------------------------------------------------------------------
    // Geometry
    // ---------------------------------------------------------------------

    /// Stores a new geometry and returns its fresh id.
    pub fn create_geometry(
        &mut self,
        payload: GeometryPayload,
        meta: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Identifier {
        let id = Identifier::mint("geom");
        tracing::debug!("Created {} geometry {}", payload.kind(), id);
        self.geometries.insert(
            id.clone(),
            Geometry {
                id: id.clone(),
                payload,
                meta,
            },
        );
        self.geometry_order.push(id.clone());
        self.changed(DiagramEvent::GeometryCreated { id: id.clone() });
        id
    }

    pub fn geometry(&self, id: &Identifier) -> Option<&Geometry> {
        self.geometries.get(id)
    }

    /// Geometries in creation (draw) order.
    pub fn geometries(&self) -> impl DoubleEndedIterator<Item = &Geometry> + '_ {
        self.geometry_order
            .iter()
            .filter_map(move |id| self.geometries.get(id))
    }

    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty() && self.items.is_empty()
    }

    /// Replaces the payload of an existing geometry.
    pub fn update_geometry(
        &mut self,
        id: &Identifier,
        payload: GeometryPayload,
    ) -> DiagramResult<()> {
        let geometry = self
            .geometries
            .get_mut(id)
            .ok_or_else(|| DiagramError::GeometryNotFound { id: id.clone() })?;
        geometry.payload = payload;
        self.invalidate_dependents(id);
        self.changed(DiagramEvent::GeometryChanged { id: id.clone() });
        Ok(())
    }

    /// Moves a point geometry to `position`.
    pub fn update_point(&mut self, id: &Identifier, position: Point) -> DiagramResult<()> {
        let geometry = self
            .geometries
            .get(id)
            .ok_or_else(|| DiagramError::GeometryNotFound { id: id.clone() })?;
        if geometry.kind() != GeometryKind::Point {
            return Err(DiagramError::WrongGeometryKind {
                id: id.clone(),
                expected: GeometryKind::Point.to_string(),
                actual: geometry.kind().to_string(),
            });
        }
        self.update_geometry(id, GeometryPayload::Point(position))
    }

    /// Moves a point geometry by `(dx, dy)`.
    pub fn translate_point(&mut self, id: &Identifier, dx: f64, dy: f64) -> DiagramResult<()> {
        let current = self.try_resolve_point(&PointRef::Reference(id.clone()))?;
        self.update_point(id, current.translated(dx, dy))
    }

    /// Removes a geometry. References to it are left dangling.
    pub fn remove_geometry(&mut self, id: &Identifier) -> Option<Geometry> {
        if !self.geometries.contains_key(id) {
            return None;
        }
        self.invalidate_dependents(id);
        let removed = self.geometries.remove(id);
        self.geometry_order.retain(|g| g != id);
        self.changed(DiagramEvent::GeometryRemoved { id: id.clone() });
        removed
    }

    /// Resolves an endpoint, substituting the origin for bad references.
    pub fn resolve_point(&self, point: &PointRef) -> Point {
        match self.try_resolve_point(point) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("{}; using origin", e);
                Point::ORIGIN
            }
        }
    }

    /// Resolves an endpoint one level deep.
    pub fn try_resolve_point(&self, point: &PointRef) -> DiagramResult<Point> {
        match point {
            PointRef::Resolved(p) => Ok(*p),
            PointRef::Reference(id) => {
                let geometry = self
                    .geometries
                    .get(id)
                    .ok_or_else(|| DiagramError::DanglingReference { id: id.clone() })?;
                geometry.as_point().ok_or_else(|| DiagramError::WrongGeometryKind {
                    id: id.clone(),
                    expected: GeometryKind::Point.to_string(),
                    actual: geometry.kind().to_string(),
                })
            }
        }
    }

    /// Resolved endpoints of a line geometry.
    pub fn line_endpoints(&self, id: &Identifier) -> Option<(Point, Point)> {
        match &self.geometries.get(id)?.payload {
            GeometryPayload::Line { p0, p1 } => {
                Some((self.resolve_point(p0), self.resolve_point(p1)))
            }
            _ => None,
        }
    }

    /// Copy of `geometry` with its point references replaced by coordinates.
    pub fn resolved(&self, geometry: &Geometry) -> Geometry {
        let resolve = |r: &PointRef| PointRef::Resolved(self.resolve_point(r));
        let payload = match &geometry.payload {
            GeometryPayload::Line { p0, p1 } => GeometryPayload::Line {
                p0: resolve(p0),
                p1: resolve(p1),
            },
            GeometryPayload::Circle { center, radius } => GeometryPayload::Circle {
                center: resolve(center),
                radius: *radius,
            },
            other => other.clone(),
        };
        Geometry {
            id: geometry.id.clone(),
            payload,
            meta: geometry.meta.clone(),
        }
    }

    /// Every point/line/circle/group reference that does not hold up.
    pub fn validate_references(&self) -> Vec<DiagramError> {
        let mut problems = Vec::new();
        for geometry in self.geometries() {
            for reference in geometry.payload.point_references() {
                if let Err(e) = self.try_resolve_point(&PointRef::Reference(reference.clone())) {
                    problems.push(e);
                }
            }
            if let GeometryPayload::Group { children } = &geometry.payload {
                for child in children {
                    if !self.geometries.contains_key(child) {
                        problems.push(DiagramError::DanglingReference { id: child.clone() });
                    }
                }
            }
        }
        problems
    }

    // ---------------------------------------------------------------------
    // Items
    // ---------------------------------------------------------------------

    /// Creates an item. An unknown parent is dropped and the item becomes a root.
    pub fn create_item(&mut self, opts: ItemOptions) -> Identifier {
        let id = Identifier::mint("item");
        let parent = match opts.parent {
            Some(parent) if self.items.contains_key(&parent) => Some(parent),
            Some(parent) => {
                tracing::warn!("Parent {} of new item {} not found; creating as root", parent, id);
                None
            }
            None => None,
        };
        if let Some(parent_id) = &parent {
            if let Some(parent_item) = self.items.get_mut(parent_id) {
                parent_item.children.push(id.clone());
            }
        }
        self.items.insert(
            id.clone(),
            Item {
                id: id.clone(),
                name: opts.name,
                parent,
                children: Vec::new(),
                transform: Transform::identity(),
                tags: opts.tags,
                geometry: opts.geometry,
                modifiers: Vec::new(),
                visible: !opts.hidden,
            },
        );
        self.item_order.push(id.clone());
        self.changed(DiagramEvent::ItemCreated { id: id.clone() });
        id
    }

    pub fn item(&self, id: &Identifier) -> Option<&Item> {
        self.items.get(id)
    }

    /// Items in creation order.
    pub fn items(&self) -> impl Iterator<Item = &Item> + '_ {
        self.item_order.iter().filter_map(move |id| self.items.get(id))
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    fn item_mut(&mut self, id: &Identifier) -> DiagramResult<&mut Item> {
        self.items
            .get_mut(id)
            .ok_or_else(|| DiagramError::ItemNotFound { id: id.clone() })
    }

    /// Renames an item. Cache-irrelevant.
    pub fn rename_item(&mut self, id: &Identifier, name: Option<String>) -> DiagramResult<()> {
        self.item_mut(id)?.name = name;
        self.changed(DiagramEvent::ItemChanged { id: id.clone() });
        Ok(())
    }

    pub fn set_item_transform(
        &mut self,
        id: &Identifier,
        transform: Transform,
    ) -> DiagramResult<()> {
        self.item_mut(id)?.transform = transform;
        self.invalidate(Some(id));
        self.changed(DiagramEvent::ItemChanged { id: id.clone() });
        Ok(())
    }

    pub fn set_item_visible(&mut self, id: &Identifier, visible: bool) -> DiagramResult<()> {
        self.item_mut(id)?.visible = visible;
        self.changed(DiagramEvent::ItemChanged { id: id.clone() });
        Ok(())
    }

    pub fn set_item_geometry(
        &mut self,
        id: &Identifier,
        geometry: Option<Identifier>,
    ) -> DiagramResult<()> {
        if let Some(g) = &geometry {
            if !self.geometries.contains_key(g) {
                return Err(DiagramError::GeometryNotFound { id: g.clone() });
            }
        }
        self.item_mut(id)?.geometry = geometry;
        self.invalidate(Some(id));
        self.invalidate_input_users(id);
        self.changed(DiagramEvent::ItemChanged { id: id.clone() });
        Ok(())
    }

    fn is_descendant(&self, candidate: &Identifier, ancestor: &Identifier) -> bool {
        let mut current = self.items.get(candidate).and_then(|i| i.parent.clone());
        let mut guard = self.items.len();
        while let Some(id) = current {
            if &id == ancestor {
                return true;
            }
            if guard == 0 {
                break;
            }
            guard -= 1;
            current = self.items.get(&id).and_then(|i| i.parent.clone());
        }
        false
    }

    /// Moves `child` under `parent`, or to the root level for `None`.
    pub fn set_parent(
        &mut self,
        child: &Identifier,
        parent: Option<&Identifier>,
    ) -> DiagramResult<()> {
        if !self.items.contains_key(child) {
            return Err(DiagramError::ItemNotFound { id: child.clone() });
        }
        if let Some(parent) = parent {
            if !self.items.contains_key(parent) {
                return Err(DiagramError::ItemNotFound { id: parent.clone() });
            }
            if parent == child || self.is_descendant(parent, child) {
                return Err(DiagramError::CyclicParent {
                    child: child.clone(),
                    parent: parent.clone(),
                });
            }
        }

        let old_parent = self.items.get(child).and_then(|i| i.parent.clone());
        if let Some(old) = &old_parent {
            if let Some(old_item) = self.items.get_mut(old) {
                old_item.children.retain(|c| c != child);
            }
        }
        if let Some(parent) = parent {
            self.item_mut(parent)?.children.push(child.clone());
        }
        self.item_mut(child)?.parent = parent.cloned();
        self.changed(DiagramEvent::ItemChanged { id: child.clone() });
        Ok(())
    }

    /// Removes an item, detaching it from its parent and promoting its
    /// children to that parent.
    pub fn remove_item(&mut self, id: &Identifier) -> DiagramResult<Item> {
        let item = self
            .items
            .remove(id)
            .ok_or_else(|| DiagramError::ItemNotFound { id: id.clone() })?;
        self.item_order.retain(|i| i != id);

        if let Some(parent) = &item.parent {
            if let Some(parent_item) = self.items.get_mut(parent) {
                parent_item.children.retain(|c| c != id);
                parent_item.children.extend(item.children.iter().cloned());
            }
        }
        for child in &item.children {
            if let Some(child_item) = self.items.get_mut(child) {
                child_item.parent = item.parent.clone();
            }
        }

        self.invalidate(Some(id));
        self.invalidate_input_users(id);
        self.changed(DiagramEvent::ItemRemoved { id: id.clone() });
        Ok(item)
    }

    /// Outliner rows for the item tree, roots in creation order.
    pub fn display_list(&self) -> Vec<DisplayLabel> {
        self.items()
            .filter(|item| item.parent.is_none())
            .map(|item| self.label_for(item, 0))
            .collect()
    }

    fn label_for(&self, item: &Item, depth: usize) -> DisplayLabel {
        let kind = item
            .geometry
            .as_ref()
            .and_then(|g| self.geometries.get(g))
            .map(Geometry::kind);
        let name = item.name.clone().unwrap_or_else(|| match kind {
            Some(kind) => kind.to_string(),
            None => "item".to_string(),
        });
        let children = if depth > self.items.len() {
            Vec::new()
        } else {
            item.children
                .iter()
                .filter_map(|c| self.items.get(c))
                .map(|c| self.label_for(c, depth + 1))
                .collect()
        };
        DisplayLabel {
            id: item.id.clone(),
            kind,
            name,
            visible: item.visible,
            children,
        }
    }

    // ---------------------------------------------------------------------
    // Modifiers
    // ---------------------------------------------------------------------

    /// Registers an evaluator. Cached results may depend on the old one, so
    /// the whole cache is cleared.
    pub fn register_modifier(
        &mut self,
        modifier_type: &str,
        evaluator: GeometryEvaluator,
    ) -> DiagramResult<()> {
        self.registry.register(modifier_type, evaluator)?;
        self.invalidate(None);
        Ok(())
    }

    pub fn registry(&self) -> &ModifierRegistry {
        &self.registry
    }

    /// Creates a modifier of a registered type.
    pub fn create_modifier(
        &mut self,
        modifier_type: &str,
        params: ModifierParams,
        inputs: Vec<Identifier>,
    ) -> DiagramResult<Identifier> {
        if !self.registry.contains(modifier_type) {
            return Err(DiagramError::UnknownModifierType {
                modifier_type: modifier_type.to_string(),
            });
        }
        let id = Identifier::mint("mod");
        self.modifiers.insert(
            id.clone(),
            Modifier {
                id: id.clone(),
                modifier_type: modifier_type.to_string(),
                params,
                inputs,
            },
        );
        tracing::debug!("Created {} modifier {}", modifier_type, id);
        self.changed(DiagramEvent::ModifierCreated { id: id.clone() });
        Ok(id)
    }

    pub fn modifier(&self, id: &Identifier) -> Option<&Modifier> {
        self.modifiers.get(id)
    }

    fn items_using_modifier(&self, modifier: &Identifier) -> Vec<Identifier> {
        self.items()
            .filter(|item| item.modifiers.contains(modifier))
            .map(|item| item.id.clone())
            .collect()
    }

    pub fn set_modifier_params(
        &mut self,
        id: &Identifier,
        params: ModifierParams,
    ) -> DiagramResult<()> {
        self.modifiers
            .get_mut(id)
            .ok_or_else(|| DiagramError::ModifierNotFound { id: id.clone() })?
            .params = params;
        for item in self.items_using_modifier(id) {
            self.invalidate(Some(&item));
        }
        self.changed(DiagramEvent::ModifierChanged { id: id.clone() });
        Ok(())
    }

    /// Appends a modifier to the end of an item's stack.
    pub fn attach_modifier(
        &mut self,
        item: &Identifier,
        modifier: &Identifier,
    ) -> DiagramResult<()> {
        if !self.modifiers.contains_key(modifier) {
            return Err(DiagramError::ModifierNotFound { id: modifier.clone() });
        }
        self.item_mut(item)?.modifiers.push(modifier.clone());
        self.invalidate(Some(item));
        self.changed(DiagramEvent::ItemChanged { id: item.clone() });
        Ok(())
    }

    /// Removes a modifier from an item's stack. Returns whether it was attached.
    pub fn detach_modifier(
        &mut self,
        item: &Identifier,
        modifier: &Identifier,
    ) -> DiagramResult<bool> {
        let stack = &mut self.item_mut(item)?.modifiers;
        let before = stack.len();
        stack.retain(|m| m != modifier);
        let removed = stack.len() != before;
        if removed {
            self.invalidate(Some(item));
            self.changed(DiagramEvent::ItemChanged { id: item.clone() });
        }
        Ok(removed)
    }

    /// Moves the stack entry at `from` to position `to` (clamped to the stack).
    pub fn move_modifier(
        &mut self,
        item: &Identifier,
        from: usize,
        to: usize,
    ) -> DiagramResult<()> {
        let stack = &mut self.item_mut(item)?.modifiers;
        if from >= stack.len() {
            tracing::warn!("Modifier index {} out of range for item {}", from, item);
            return Ok(());
        }
        let to = to.min(stack.len() - 1);
        if from == to {
            return Ok(());
        }
        let entry = stack.remove(from);
        stack.insert(to, entry);
        self.invalidate(Some(item));
        self.changed(DiagramEvent::ItemChanged { id: item.clone() });
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Evaluation cache
    // ---------------------------------------------------------------------

    /// Clears the cached evaluation of one item, or of every item for `None`.
    pub fn invalidate(&mut self, id: Option<&Identifier>) {
        match id {
            Some(id) => {
                self.cache.borrow_mut().remove(id);
            }
            None => self.cache.borrow_mut().clear(),
        }
        if let Some(bus) = &self.bus {
            bus.publish(EditorEvent::Diagram(DiagramEvent::Invalidated { id: id.cloned() }));
        }
    }

    /// Whether an evaluation of `item` is currently cached.
    pub fn is_cached(&self, item: &Identifier) -> bool {
        self.cache.borrow().contains_key(item)
    }

    /// Items whose evaluated output can change when geometry `id` changes.
    pub fn dependents_of_geometry(&self, id: &Identifier) -> Vec<Identifier> {
        let mut affected: HashSet<&Identifier> = HashSet::new();
        affected.insert(id);
        for geometry in self.geometries() {
            if geometry.payload.depends_on(id) {
                affected.insert(&geometry.id);
            }
        }
        // groups holding a line that moved with its point
        let direct: Vec<&Identifier> = affected.iter().copied().collect();
        for geometry in self.geometries() {
            if let GeometryPayload::Group { children } = &geometry.payload {
                if children.iter().any(|c| direct.contains(&c)) {
                    affected.insert(&geometry.id);
                }
            }
        }

        // items bound to affected geometry can stand in as modifier inputs
        let bound: Vec<&Identifier> = self
            .items
            .values()
            .filter(|item| item.geometry.as_ref().is_some_and(|g| affected.contains(g)))
            .map(|item| &item.id)
            .collect();
        let inputs: HashSet<&Identifier> = affected.iter().copied().chain(bound).collect();

        self.items()
            .filter(|item| {
                item.geometry.as_ref().is_some_and(|g| affected.contains(g))
                    || self.uses_input(item, |i| inputs.contains(i))
            })
            .map(|item| item.id.clone())
            .collect()
    }

    /// Items with a modifier that takes item `id` as an input.
    pub fn items_using_input(&self, id: &Identifier) -> Vec<Identifier> {
        self.items()
            .filter(|item| self.uses_input(item, |i| i == id))
            .map(|item| item.id.clone())
            .collect()
    }

    fn uses_input(&self, item: &Item, matches: impl Fn(&Identifier) -> bool) -> bool {
        item.modifiers.iter().any(|m| {
            self.modifiers
                .get(m)
                .is_some_and(|m| m.inputs.iter().any(&matches))
        })
    }

    fn invalidate_dependents(&mut self, geometry: &Identifier) {
        for item in self.dependents_of_geometry(geometry) {
            self.invalidate(Some(&item));
        }
    }

    fn invalidate_input_users(&mut self, item: &Identifier) {
        for user in self.items_using_input(item) {
            self.invalidate(Some(&user));
        }
    }

    /// Evaluated geometry of an item: references resolved, modifier stack
    /// applied in order, then the item transform. Results are cached until
    /// invalidated.
    pub fn evaluate(&self, item_id: &Identifier) -> Option<Geometry> {
        if let Some(cached) = self.cache.borrow().get(item_id) {
            return Some(cached.clone());
        }

        let item = self.items.get(item_id)?;
        let source = self.geometries.get(item.geometry.as_ref()?)?;
        let mut geometry = self.resolved(source);

        for modifier_id in &item.modifiers {
            let Some(modifier) = self.modifiers.get(modifier_id) else {
                tracing::warn!("Item {} references missing modifier {}", item_id, modifier_id);
                continue;
            };
            let Some(evaluator) = self.registry.get(&modifier.modifier_type) else {
                tracing::warn!("No evaluator for modifier type {}", modifier.modifier_type);
                continue;
            };
            let inputs: Vec<Geometry> = modifier
                .inputs
                .iter()
                .filter_map(|input| self.input_geometry(input))
                .collect();
            geometry = evaluator(&geometry, &modifier.params, &inputs, self);
        }

        if !item.transform.is_identity() {
            let transform = item.transform;
            geometry = geometry.map_points(|p| transform.apply(p));
            if let GeometryPayload::Circle { radius, .. } = &mut geometry.payload {
                *radius *= transform.radius_scale();
            }
        }

        self.cache
            .borrow_mut()
            .insert(item_id.clone(), geometry.clone());
        Some(geometry)
    }

    /// Resolves a modifier input: a geometry id, or an item id standing for
    /// its geometry.
    fn input_geometry(&self, id: &Identifier) -> Option<Geometry> {
        if let Some(geometry) = self.geometries.get(id) {
            return Some(self.resolved(geometry));
        }
        let geometry_id = self.items.get(id)?.geometry.as_ref()?;
        self.geometries.get(geometry_id).map(|g| self.resolved(g))
    }

    // ---------------------------------------------------------------------
    // Seeding
    // ---------------------------------------------------------------------

    /// Populates an empty diagram with two points, a line between them and
    /// one item per geometry. Returns whether anything was created.
    pub fn seed_if_empty(&mut self) -> bool {
        if !self.geometries.is_empty() {
            return false;
        }
        let p0 = self.create_geometry(GeometryPayload::point(140.0, 160.0), None);
        let p1 = self.create_geometry(GeometryPayload::point(320.0, 240.0), None);
        let line = self.create_geometry(GeometryPayload::line(p0.clone(), p1.clone()), None);

        self.create_item(ItemOptions::new().named("P0").with_geometry(p0));
        self.create_item(ItemOptions::new().named("P1").with_geometry(p1));
        self.create_item(ItemOptions::new().named("L").with_geometry(line));

        self.invalidate(None);
        tracing::info!("Seeded empty diagram with demo geometry");
        true
    }
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Diagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagram")
            .field("geometries", &self.geometries.len())
            .field("items", &self.items.len())
            .field("modifiers", &self.modifiers.len())
            .field("cached", &self.cache.borrow().len())
            .field("version", &self.version)
            .finish()
    }
}
