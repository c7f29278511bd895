// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Assigning panels to pages, and navigating between pages.
//!
//! The engine walks a [`CursorSpace`] and asks a [`PanelSource`] for the
//! panel at each position. Pages can be revisited; the position at the start
//! of every page is recorded, so going back and then forward again reproduces
//! exactly the same panels.

mod cursor;
mod error;

pub use cursor::{
    AmpPhase, CursorSpace, OverlayMode, PanelCursor, PanelKey, SubplotGrid, YAxis,
};
pub use error::LayoutError;

use log::{debug, trace};
use serde::Serialize;

/// What a [`PanelSource`] made of a position.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelOutcome<P> {
    Panel(P),

    /// There's nothing worth drawing here (e.g. everything is flagged). The
    /// position doesn't use up a slot on the page.
    Skip,
}

/// Something that can turn a [`PanelKey`] into a panel.
pub trait PanelSource {
    type Panel;

    fn panel(&mut self, key: &PanelKey) -> PanelOutcome<Self::Panel>;
}

/// Navigation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Back,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Browsing,

    /// Every position has been visited. Going back is still possible.
    Exhausted,

    /// Nothing is possible.
    Quit,
}

/// All of the mutable state of a [`PageLayoutEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    /// The cursor at the start of each page.
    pub history: Vec<PanelCursor>,

    pub page_index: usize,

    /// The number of panels drawn on the current page.
    pub frame: usize,

    pub cursor: PanelCursor,

    pub phase: Phase,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<P> {
    pub index: usize,
    pub panels: Vec<P>,
}

pub struct PageLayoutEngine {
    space: CursorSpace,
    grid: SubplotGrid,
    state: PageState,
}

impl PageLayoutEngine {
    pub fn new(space: CursorSpace, grid: SubplotGrid) -> Result<PageLayoutEngine, LayoutError> {
        let first = space
            .first()
            .ok_or(LayoutError::EmptyDimension { dimension: "times" })?;
        Ok(PageLayoutEngine {
            space,
            grid,
            state: PageState {
                history: vec![first],
                page_index: 0,
                frame: 0,
                cursor: first,
                phase: Phase::Browsing,
            },
        })
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn space(&self) -> &CursorSpace {
        &self.space
    }

    pub fn grid(&self) -> SubplotGrid {
        self.grid
    }

    pub fn is_exhausted(&self) -> bool {
        self.state.phase == Phase::Exhausted
    }

    /// The key of the panel at the current position.
    pub fn current_key(&self) -> PanelKey {
        self.space.key(self.state.cursor)
    }

    fn check_not_quit(&self) -> Result<(), LayoutError> {
        if self.state.phase == Phase::Quit {
            Err(LayoutError::Quit)
        } else {
            Ok(())
        }
    }

    /// Move to the next position. Running off the end exhausts the engine
    /// rather than being an error.
    pub fn advance(&mut self) -> Result<(), LayoutError> {
        self.check_not_quit()?;
        if self.state.phase == Phase::Exhausted {
            return Ok(());
        }
        match self.space.next(self.state.cursor) {
            Some(c) => self.state.cursor = c,
            None => {
                debug!("All panels have been visited");
                self.state.phase = Phase::Exhausted;
            }
        }
        Ok(())
    }

    /// Account for a drawn panel. If the current page is already full, a new
    /// page is started at the current position; `true` is returned when this
    /// happens.
    pub fn new_panel(&mut self) -> Result<bool, LayoutError> {
        self.check_not_quit()?;
        let s = &mut self.state;
        s.frame += 1;
        if s.frame > self.grid.capacity() {
            s.history.push(s.cursor);
            s.frame = 1;
            s.page_index += 1;
            trace!("Starting page {} at {:?}", s.page_index, s.cursor);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Return to the start of the previous page.
    pub fn back(&mut self) -> Result<(), LayoutError> {
        self.check_not_quit()?;
        let s = &mut self.state;
        if s.page_index == 0 {
            return Err(LayoutError::NoHistory);
        }
        s.page_index -= 1;
        s.history.truncate(s.page_index + 1);
        s.cursor = s.history[s.page_index];
        s.frame = 0;
        s.phase = Phase::Browsing;
        trace!("Back to page {} at {:?}", s.page_index, s.cursor);
        Ok(())
    }

    pub fn quit(&mut self) {
        self.state.phase = Phase::Quit;
    }

    /// Gather the panels of the next page. `None` means there are no more
    /// panels.
    pub fn next_page<S: PanelSource>(
        &mut self,
        source: &mut S,
    ) -> Result<Option<Page<S::Panel>>, LayoutError> {
        self.check_not_quit()?;

        let capacity = self.grid.capacity();
        let mut panels = Vec::with_capacity(capacity);
        while self.state.phase == Phase::Browsing && panels.len() < capacity {
            let key = self.space.key(self.state.cursor);
            match source.panel(&key) {
                PanelOutcome::Panel(p) => {
                    self.new_panel()?;
                    panels.push(p);
                }
                PanelOutcome::Skip => {
                    trace!("Skipping panel {key:?}");
                }
            }
            self.advance()?;
        }

        if panels.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Page {
                index: self.state.page_index,
                panels,
            }))
        }
    }

    /// Carry out a navigation command. `Back` then produces the previous page
    /// again; `Quit` produces nothing.
    pub fn handle<S: PanelSource>(
        &mut self,
        command: Command,
        source: &mut S,
    ) -> Result<Option<Page<S::Panel>>, LayoutError> {
        match command {
            Command::Next => self.next_page(source),
            Command::Back => {
                self.back()?;
                self.next_page(source)
            }
            Command::Quit => {
                self.check_not_quit()?;
                self.quit();
                Ok(None)
            }
        }
    }
}
