//! The UI tick: deliver finished tasks, then lay out and paint on demand.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rice_core::{LayoutError, Surface};
use rice_devtools::Hud;
use rice_ui::{ViewId, ViewTree};

use crate::task::TaskPool;

/// A repaint request that any thread may raise.
#[derive(Clone, Debug, Default)]
pub struct RepaintSignal(Arc<AtomicBool>);

impl RepaintSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Clears the request, returning whether one was pending.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

/// Everything a screen owns on the UI thread. Task callbacks receive it.
pub struct Screen<S> {
    pub tree: ViewTree,
    pub root: ViewId,
    pub state: S,
}

pub struct Runner<S> {
    screen: Screen<S>,
    pool: TaskPool<Screen<S>>,
    signal: RepaintSignal,
    hud: Hud,
}

impl<S> Runner<S> {
    pub fn new(tree: ViewTree, root: ViewId, state: S, workers: usize) -> Self {
        let signal = RepaintSignal::new();
        signal.request();
        Self {
            screen: Screen { tree, root, state },
            pool: TaskPool::new(workers).with_signal(signal.clone()),
            signal,
            hud: Hud::new(),
        }
    }

    pub fn screen(&self) -> &Screen<S> {
        &self.screen
    }

    /// Mutates the screen and schedules a repaint.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut Screen<S>) -> R) -> R {
        let out = f(&mut self.screen);
        self.signal.request();
        out
    }

    pub fn pool_mut(&mut self) -> &mut TaskPool<Screen<S>> {
        &mut self.pool
    }

    pub fn signal(&self) -> RepaintSignal {
        self.signal.clone()
    }

    pub fn hud_mut(&mut self) -> &mut Hud {
        &mut self.hud
    }

    /// Moves the inspector highlight to the view under `(x, y)`.
    pub fn hover(&mut self, x: i32, y: i32) {
        let before = self.hud.hovered();
        self.hud.set_pointer(&self.screen.tree, self.screen.root, x, y);
        if self.hud.inspector_enabled && self.hud.hovered() != before {
            self.signal.request();
        }
    }

    /// Runs one UI tick. Returns whether a frame was painted.
    pub fn tick(&mut self, surface: &mut dyn Surface) -> Result<bool, LayoutError> {
        if self.pool.drain(&mut self.screen) > 0 {
            self.signal.request();
        }
        if !self.signal.take() {
            return Ok(false);
        }
        let Screen { tree, root, .. } = &mut self.screen;
        tree.layout(*root)?;
        tree.paint(*root, surface);
        self.hud.overlay(tree, surface);
        surface.request_redraw();
        Ok(true)
    }
}
