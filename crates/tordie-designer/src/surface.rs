//! Rendering-surface seam.
//!
//! A [`Surface`] is whatever the host toolkit draws on: it owns pointer
//! listeners, a cursor and a lasso overlay. Listeners never touch the surface
//! directly; they return a [`ToolFeedback`] that the surface applies once the
//! listener returns, so dispatch never re-enters the surface.

use serde::{Deserialize, Serialize};
use tordie_core::types::{DisposeFn, Shared};

use crate::geometry::{Point, Rect};
use crate::selection::ModifierKeys;
use crate::session::EditSession;

/// Pointer button that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PointerButton {
    #[default]
    Primary,
    Middle,
    Secondary,
}

/// A pointer event in surface (screen) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerEvent {
    pub position: Point,
    pub button: PointerButton,
    pub modifiers: ModifierKeys,
    /// Vertical wheel delta; negative scrolls up.
    pub wheel_delta_y: f64,
}

impl PointerEvent {
    pub fn primary(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            ..Self::default()
        }
    }

    pub fn middle(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            button: PointerButton::Middle,
            ..Self::default()
        }
    }

    pub fn wheel(x: f64, y: f64, delta_y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            wheel_delta_y: delta_y,
            ..Self::default()
        }
    }

    pub fn with_modifiers(mut self, modifiers: ModifierKeys) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Event channels a listener can be installed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListenerKind {
    PointerDown,
    PointerMove,
    PointerUp,
    Click,
    /// Button release anywhere in the window, including outside the surface.
    WindowPointerUp,
    PointerLeave,
    Wheel,
}

/// Handle returned by [`Surface::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cursor {
    #[default]
    Default,
    Crosshair,
    Move,
    Grabbing,
}

/// Requested change to the lasso overlay.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LassoVisual {
    #[default]
    Unchanged,
    Hidden,
    /// Show the overlay spanning this screen-space rectangle.
    Show(Rect),
}

/// What a listener wants the surface to do after it returns.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ToolFeedback {
    pub lasso: LassoVisual,
    pub cursor: Option<Cursor>,
    pub redraw: bool,
}

impl ToolFeedback {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn redraw() -> Self {
        Self {
            redraw: true,
            ..Self::default()
        }
    }

    pub fn with_lasso(mut self, lasso: LassoVisual) -> Self {
        self.lasso = lasso;
        self
    }

    pub fn with_cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = Some(cursor);
        self
    }

    pub fn with_redraw(mut self) -> Self {
        self.redraw = true;
        self
    }
}

pub type Listener = Box<dyn FnMut(&PointerEvent) -> ToolFeedback>;

/// Listener storage a [`Surface`] implementation embeds.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: u64,
    entries: Vec<(ListenerId, ListenerKind, Listener)>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: ListenerKind, listener: Listener) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.entries.push((id, kind, listener));
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _, _)| *entry != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, kind: ListenerKind) -> usize {
        self.entries.iter().filter(|(_, k, _)| *k == kind).count()
    }

    /// Runs every listener of `kind` in installation order.
    pub fn dispatch(&mut self, kind: ListenerKind, event: &PointerEvent) -> Vec<ToolFeedback> {
        self.entries
            .iter_mut()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, listener)| listener(event))
            .collect()
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.entries.len())
            .finish()
    }
}

/// A drawing surface driven by pointer events.
pub trait Surface {
    fn listeners_mut(&mut self) -> &mut ListenerRegistry;

    fn set_cursor(&mut self, cursor: Cursor);

    /// Shows the lasso overlay over `rect` (screen space), or hides it.
    fn set_lasso(&mut self, rect: Option<Rect>);

    fn request_redraw(&mut self) {}

    fn add_listener(&mut self, kind: ListenerKind, listener: Listener) -> ListenerId {
        self.listeners_mut().add(kind, listener)
    }

    fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners_mut().remove(id)
    }

    fn apply_feedback(&mut self, feedback: &ToolFeedback) {
        match feedback.lasso {
            LassoVisual::Unchanged => {}
            LassoVisual::Hidden => self.set_lasso(None),
            LassoVisual::Show(rect) => self.set_lasso(Some(rect)),
        }
        if let Some(cursor) = feedback.cursor {
            self.set_cursor(cursor);
        }
        if feedback.redraw {
            self.request_redraw();
        }
    }

    /// Delivers an event from the host toolkit to the installed listeners.
    ///
    /// Returns the number of listeners that ran.
    fn dispatch(&mut self, kind: ListenerKind, event: &PointerEvent) -> usize {
        let feedback = self.listeners_mut().dispatch(kind, event);
        for fb in &feedback {
            self.apply_feedback(fb);
        }
        feedback.len()
    }
}

const SELECT_KINDS: [ListenerKind; 6] = [
    ListenerKind::PointerDown,
    ListenerKind::PointerMove,
    ListenerKind::PointerUp,
    ListenerKind::Click,
    ListenerKind::WindowPointerUp,
    ListenerKind::PointerLeave,
];

const NAVIGATION_KINDS: [ListenerKind; 6] = [
    ListenerKind::PointerDown,
    ListenerKind::PointerMove,
    ListenerKind::PointerUp,
    ListenerKind::WindowPointerUp,
    ListenerKind::PointerLeave,
    ListenerKind::Wheel,
];

fn install<S, F>(
    surface: &Shared<S>,
    session: &Shared<EditSession>,
    kinds: &[ListenerKind],
    handler: F,
) -> Vec<ListenerId>
where
    S: Surface + 'static,
    F: Fn(&mut EditSession, ListenerKind, &PointerEvent) -> ToolFeedback + Copy + 'static,
{
    let mut surface = surface.borrow_mut();
    kinds
        .iter()
        .map(|&kind| {
            let session = session.clone();
            surface.add_listener(
                kind,
                Box::new(move |event: &PointerEvent| match session.try_borrow_mut() {
                    Ok(mut session) => handler(&mut session, kind, event),
                    Err(_) => {
                        tracing::warn!("Session busy; dropping {:?} event", kind);
                        ToolFeedback::none()
                    }
                }),
            )
        })
        .collect()
}

/// Installs the selection tool listeners on `surface`.
///
/// The returned closure removes every installed listener, cancels any
/// gesture in progress and hides the lasso.
pub fn enable_select_mode<S>(surface: &Shared<S>, session: &Shared<EditSession>) -> DisposeFn
where
    S: Surface + 'static,
{
    let ids = install(surface, session, &SELECT_KINDS, |s, kind, event| {
        s.handle_select(kind, event)
    });
    surface.borrow_mut().set_cursor(Cursor::Crosshair);
    tracing::debug!("Select mode enabled ({} listeners)", ids.len());

    let surface = surface.clone();
    let session = session.clone();
    Box::new(move || {
        let mut surface = surface.borrow_mut();
        for id in ids {
            surface.remove_listener(id);
        }
        match session.try_borrow_mut() {
            Ok(mut session) => session.cancel_tool(),
            Err(_) => tracing::warn!("Session busy; gesture not cancelled on dispose"),
        }
        surface.set_lasso(None);
        surface.set_cursor(Cursor::Default);
        surface.request_redraw();
        tracing::debug!("Select mode disabled");
    })
}

/// Installs pan, wheel-zoom and cursor-readout listeners on `surface`.
pub fn enable_navigation<S>(surface: &Shared<S>, session: &Shared<EditSession>) -> DisposeFn
where
    S: Surface + 'static,
{
    let ids = install(surface, session, &NAVIGATION_KINDS, |s, kind, event| {
        s.handle_navigation(kind, event)
    });
    tracing::debug!("Navigation enabled ({} listeners)", ids.len());

    let surface = surface.clone();
    let session = session.clone();
    Box::new(move || {
        let mut surface = surface.borrow_mut();
        for id in ids {
            surface.remove_listener(id);
        }
        if let Ok(mut session) = session.try_borrow_mut() {
            session.navigation.cancel();
        }
    })
}
