//! Surface without a window.
//!
//! Records the visual state the tools ask for and reports it through `tracing`,
//! so scripted sessions can run without a toolkit.

use tordie_designer::{Cursor, ListenerKind, ListenerRegistry, PointerEvent, Rect, Surface};

#[derive(Debug, Default)]
pub struct HeadlessSurface {
    listeners: ListenerRegistry,
    cursor: Cursor,
    lasso: Option<Rect>,
    redraws: u64,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn lasso(&self) -> Option<Rect> {
        self.lasso
    }

    pub fn redraws(&self) -> u64 {
        self.redraws
    }

    /// Dispatch a press, a series of moves, a release and the trailing click.
    pub fn replay_drag(&mut self, from: PointerEvent, path: &[PointerEvent]) {
        self.dispatch(ListenerKind::PointerDown, &from);
        for step in path {
            self.dispatch(ListenerKind::PointerMove, step);
        }
        let last = path.last().copied().unwrap_or(from);
        self.dispatch(ListenerKind::PointerUp, &last);
        self.dispatch(ListenerKind::Click, &last);
    }
}

impl Surface for HeadlessSurface {
    fn listeners_mut(&mut self) -> &mut ListenerRegistry {
        &mut self.listeners
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        if self.cursor != cursor {
            tracing::trace!("cursor -> {:?}", cursor);
        }
        self.cursor = cursor;
    }

    fn set_lasso(&mut self, rect: Option<Rect>) {
        match (&self.lasso, &rect) {
            (None, Some(r)) => tracing::debug!("lasso shown at {:?}", r),
            (Some(_), None) => tracing::debug!("lasso hidden"),
            _ => {}
        }
        self.lasso = rect;
    }

    fn request_redraw(&mut self) {
        self.redraws += 1;
    }
}
