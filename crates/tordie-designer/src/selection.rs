use std::collections::HashSet;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tordie_core::event_bus::SelectionEvent;
use tordie_core::{EditorEvent, EventBus, Identifier};

use crate::diagram::Diagram;
use crate::geometry::{GeometryPayload, PointRef};

/// Modifier keys held during a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModifierKeys {
    pub shift: bool,
    pub ctrl: bool,
    /// Command on macOS.
    pub meta: bool,
    pub alt: bool,
}

impl ModifierKeys {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::default()
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::default()
        }
    }

    /// How a candidate set combines with the current selection.
    ///
    /// Ctrl/Cmd toggles and takes precedence over Shift, which unions.
    pub fn combine_mode(&self) -> CombineMode {
        if self.ctrl || self.meta {
            CombineMode::Toggle
        } else if self.shift {
            CombineMode::Union
        } else {
            CombineMode::Replace
        }
    }
}

/// Set operation applied when merging candidates into the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineMode {
    /// Discard the previous selection.
    Replace,
    /// Symmetric difference.
    Toggle,
    /// Add every candidate, remove nothing.
    Union,
}

/// Grows a raw candidate set with structurally linked entities.
///
/// A line pulls in its referenced endpoints. A point pulls in every line
/// referencing it together with that line's other endpoint. This is a single
/// pass over the raw candidates; entities added here are not re-expanded.
pub fn expand<I>(candidates: I, diagram: &Diagram) -> HashSet<Identifier>
where
    I: IntoIterator<Item = Identifier>,
{
    let raw: Vec<Identifier> = candidates.into_iter().collect();
    let mut expanded: HashSet<Identifier> = raw.iter().cloned().collect();

    // dangling endpoint references never enter the selection
    let live = |r: &PointRef| {
        r.reference()
            .filter(|id| diagram.geometry(id).is_some())
            .cloned()
    };

    for id in &raw {
        let Some(geometry) = diagram.geometry(id) else {
            continue;
        };
        match &geometry.payload {
            GeometryPayload::Line { p0, p1 } => {
                expanded.extend(live(p0));
                expanded.extend(live(p1));
            }
            GeometryPayload::Point(_) => {
                for line in diagram.geometries() {
                    if let GeometryPayload::Line { p0, p1 } = &line.payload {
                        let other = if p0.references(id) {
                            p1
                        } else if p1.references(id) {
                            p0
                        } else {
                            continue;
                        };
                        expanded.insert(line.id.clone());
                        expanded.extend(live(other));
                    }
                }
            }
            _ => {}
        }
    }
    expanded
}

/// Applies a combination rule to `current`. Pure set arithmetic, no expansion.
pub fn combine(
    current: &HashSet<Identifier>,
    candidates: &HashSet<Identifier>,
    mode: CombineMode,
) -> HashSet<Identifier> {
    match mode {
        CombineMode::Replace => candidates.clone(),
        CombineMode::Toggle => current.symmetric_difference(candidates).cloned().collect(),
        CombineMode::Union => current.union(candidates).cloned().collect(),
    }
}

/// The set of selected entity ids.
///
/// Only mutated through [`Selection::apply_selection`],
/// [`Selection::clear_selection`] and [`Selection::select_all`].
#[derive(Debug, Clone, Default)]
pub struct Selection {
    ids: HashSet<Identifier>,
    version: u64,
    bus: Option<Rc<EventBus>>,
}

impl Selection {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes change notifications to `bus`.
    pub fn attach_bus(&mut self, bus: Rc<EventBus>) {
        self.bus = Some(bus);
    }

    /// Monotonic counter bumped whenever the set changes.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Identifier> + '_ {
        self.ids.iter()
    }

    pub fn ids(&self) -> &HashSet<Identifier> {
        &self.ids
    }

    fn replace(&mut self, next: HashSet<Identifier>) {
        if next == self.ids {
            return;
        }
        self.ids = next;
        self.version += 1;
        tracing::debug!("Selection changed: {} selected", self.ids.len());
        if let Some(bus) = &self.bus {
            bus.publish(EditorEvent::Selection(SelectionEvent::Changed {
                count: self.ids.len(),
            }));
        }
    }

    /// Expands `candidates` and merges them into the selection.
    ///
    /// # Arguments
    ///
    /// * `candidates` - Raw hit-test result or clicked entity
    /// * `modifiers` - Keys held by the originating pointer event
    /// * `diagram` - Source of line/point links for expansion
    pub fn apply_selection<I>(&mut self, candidates: I, modifiers: ModifierKeys, diagram: &Diagram)
    where
        I: IntoIterator<Item = Identifier>,
    {
        let expanded = expand(candidates, diagram);
        let next = combine(&self.ids, &expanded, modifiers.combine_mode());
        self.replace(next);
    }

    /// Empties the selection.
    pub fn clear_selection(&mut self) {
        self.replace(HashSet::new());
    }

    /// Selects every selectable geometry of the diagram.
    pub fn select_all(&mut self, diagram: &Diagram) {
        let all = diagram
            .geometries()
            .filter(|g| g.kind().is_selectable())
            .map(|g| g.id.clone())
            .collect();
        self.replace(all);
    }

    /// Whether the renderer should draw `id` as selected: directly selected,
    /// or a point referenced by a selected line.
    pub fn is_visually_selected(&self, id: &Identifier, diagram: &Diagram) -> bool {
        if self.ids.contains(id) {
            return true;
        }
        self.ids.iter().any(|selected| {
            matches!(
                diagram.geometry(selected).map(|g| &g.payload),
                Some(GeometryPayload::Line { p0, p1 }) if p0.references(id) || p1.references(id)
            )
        })
    }

    /// Every id the renderer should draw as selected.
    pub fn visual_set(&self, diagram: &Diagram) -> HashSet<Identifier> {
        let mut visual = self.ids.clone();
        for id in &self.ids {
            let payload = diagram.geometry(id).map(|g| &g.payload);
            if let Some(GeometryPayload::Line { p0, p1 }) = payload {
                visual.extend(p0.reference().cloned());
                visual.extend(p1.reference().cloned());
            }
        }
        visual
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{GeometryPayload, Point};

    fn set<const N: usize>(ids: [&Identifier; N]) -> HashSet<Identifier> {
        ids.into_iter().cloned().collect()
    }

    #[test]
    fn test_combine_mode_precedence() {
        assert_eq!(ModifierKeys::none().combine_mode(), CombineMode::Replace);
        assert_eq!(ModifierKeys::shift().combine_mode(), CombineMode::Union);
        assert_eq!(ModifierKeys::ctrl().combine_mode(), CombineMode::Toggle);
        let both = ModifierKeys {
            shift: true,
            meta: true,
            ..ModifierKeys::default()
        };
        assert_eq!(both.combine_mode(), CombineMode::Toggle);
    }

    #[test]
    fn test_expand_line_and_point() {
        let mut d = Diagram::new();
        let p0 = d.create_geometry(GeometryPayload::point(0.0, 0.0), None);
        let p1 = d.create_geometry(GeometryPayload::point(1.0, 1.0), None);
        let l = d.create_geometry(GeometryPayload::line(p0.clone(), p1.clone()), None);

        assert_eq!(expand([l.clone()], &d), set([&l, &p0, &p1]));
        assert_eq!(expand([p0.clone()], &d), set([&p0, &l, &p1]));
    }

    #[test]
    fn test_expand_skips_dangling_endpoints() {
        let mut d = Diagram::new();
        let p0 = d.create_geometry(GeometryPayload::point(0.0, 0.0), None);
        let p1 = d.create_geometry(GeometryPayload::point(1.0, 1.0), None);
        let l = d.create_geometry(GeometryPayload::line(p0.clone(), p1.clone()), None);
        d.remove_geometry(&p0);

        assert_eq!(expand([l.clone()], &d), set([&l, &p1]));
        // the far endpoint of a line reached through a point is checked too
        assert_eq!(expand([p1.clone()], &d), set([&p1, &l]));
    }

    #[test]
    fn test_expand_skips_inline_endpoints() {
        let mut d = Diagram::new();
        let p0 = d.create_geometry(GeometryPayload::point(0.0, 0.0), None);
        let l = d.create_geometry(GeometryPayload::line(p0.clone(), Point::new(5.0, 5.0)), None);
        assert_eq!(expand([l.clone()], &d), set([&l, &p0]));
        assert_eq!(expand([p0.clone()], &d), set([&p0, &l]));
    }

    #[test]
    fn test_expand_is_single_pass() {
        // a - L1 - b - L2 - c: selecting a does not reach L2 or c
        let mut d = Diagram::new();
        let a = d.create_geometry(GeometryPayload::point(0.0, 0.0), None);
        let b = d.create_geometry(GeometryPayload::point(1.0, 0.0), None);
        let c = d.create_geometry(GeometryPayload::point(2.0, 0.0), None);
        let l1 = d.create_geometry(GeometryPayload::line(a.clone(), b.clone()), None);
        let l2 = d.create_geometry(GeometryPayload::line(b.clone(), c.clone()), None);

        let expanded = expand([a.clone()], &d);
        assert_eq!(expanded, set([&a, &l1, &b]));
        assert!(!expanded.contains(&l2));
    }

    #[test]
    fn test_toggle_twice_restores() {
        let mut d = Diagram::new();
        let p = d.create_geometry(GeometryPayload::point(0.0, 0.0), None);
        let q = d.create_geometry(GeometryPayload::point(9.0, 0.0), None);
        let mut sel = Selection::new();
        sel.apply_selection([q.clone()], ModifierKeys::none(), &d);
        let before = sel.ids().clone();

        sel.apply_selection([p.clone()], ModifierKeys::ctrl(), &d);
        assert!(sel.contains(&p));
        sel.apply_selection([p.clone()], ModifierKeys::ctrl(), &d);
        assert_eq!(sel.ids(), &before);
    }

    #[test]
    fn test_union_and_replace() {
        let mut d = Diagram::new();
        let p = d.create_geometry(GeometryPayload::point(0.0, 0.0), None);
        let q = d.create_geometry(GeometryPayload::point(9.0, 0.0), None);
        let mut sel = Selection::new();

        sel.apply_selection([p.clone()], ModifierKeys::shift(), &d);
        sel.apply_selection([q.clone()], ModifierKeys::shift(), &d);
        assert_eq!(sel.len(), 2);

        sel.apply_selection([q.clone()], ModifierKeys::none(), &d);
        assert_eq!(sel.ids(), &set([&q]));

        sel.clear_selection();
        assert!(sel.is_empty());
    }

    #[test]
    fn test_version_only_moves_on_change() {
        let mut d = Diagram::new();
        let p = d.create_geometry(GeometryPayload::point(0.0, 0.0), None);
        let mut sel = Selection::new();
        sel.apply_selection([p.clone()], ModifierKeys::none(), &d);
        let v = sel.version();
        sel.apply_selection([p.clone()], ModifierKeys::shift(), &d);
        assert_eq!(sel.version(), v);
    }

    #[test]
    fn test_visual_selection_is_one_directional() {
        let mut d = Diagram::new();
        let p0 = d.create_geometry(GeometryPayload::point(0.0, 0.0), None);
        let p1 = d.create_geometry(GeometryPayload::point(1.0, 1.0), None);
        let l = d.create_geometry(GeometryPayload::line(p0.clone(), p1.clone()), None);

        let mut sel = Selection::new();
        sel.ids.insert(l.clone());
        assert!(sel.is_visually_selected(&p0, &d));
        assert_eq!(sel.visual_set(&d), set([&l, &p0, &p1]));

        sel.ids.clear();
        sel.ids.insert(p0.clone());
        assert!(!sel.is_visually_selected(&l, &d));
    }

    #[test]
    fn test_select_all() {
        let mut d = Diagram::new();
        d.seed_if_empty();
        d.create_geometry(
            GeometryPayload::ImportedPath {
                raw: "M0 0".to_string(),
            },
            None,
        );
        let mut sel = Selection::new();
        sel.select_all(&d);
        assert_eq!(sel.len(), 3);
    }
}
