// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Plotting parameters, and the drivers that page through panels.

use std::{
    fs::File,
    io::{BufRead, BufWriter, Write},
    path::{Path, PathBuf},
};

use is_terminal::IsTerminal;
use log::{debug, info, trace, warn};
use serde::Serialize;
use thiserror::Error;

use crate::{
    layout::{
        Command, CursorSpace, LayoutError, OverlayMode, Page, PageLayoutEngine, SubplotGrid,
        YAxis,
    },
    math::{median_across_antennas, MadStats},
    panel::{PanelBuilder, PanelDescriptor, PlotOptions},
    selection::Selection,
    solutions::CalTable,
    timestamps::UniqueTimeSet,
};

const PROMPT: &str = "[n]ext page, [b]ack, [q]uit: ";

pub(crate) struct PlotParams {
    pub(crate) table: CalTable,

    /// Polynomial amplitudes are centred on this table's amplitudes.
    pub(crate) reference: Option<CalTable>,

    pub(crate) antennas: Selection,
    pub(crate) spws: Selection,

    /// Indices into the table's unique times. `None` means everything.
    pub(crate) time_selection: Option<Selection>,

    pub(crate) unique_times: UniqueTimeSet,
    pub(crate) grid: SubplotGrid,
    pub(crate) y_axis: YAxis,
    pub(crate) overlay: OverlayMode,

    /// The field and pol selections live in here.
    pub(crate) options: PlotOptions,

    pub(crate) interactive: bool,
    pub(crate) output: PathBuf,
}

/// The median MAD over all antennas of a spw, time and pol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct MedianMad {
    pub(crate) spw: usize,
    /// \[MJD seconds\]
    pub(crate) time: f64,
    pub(crate) pol: String,
    pub(crate) median_mad: f64,
}

/// Everything produced by a plotting session.
#[derive(Debug, Serialize)]
pub(crate) struct PlotOutput {
    pub(crate) caltable: String,
    pub(crate) grid: String,
    pub(crate) overlay: String,

    /// In the order they were produced. Going back produces a page again.
    pub(crate) pages: Vec<Page<PanelDescriptor>>,

    pub(crate) median_mad: Vec<MedianMad>,
}

impl PlotOutput {
    pub(crate) fn num_panels(&self) -> usize {
        self.pages.iter().map(|p| p.panels.len()).sum()
    }

    pub(crate) fn write(&self, file: &Path) -> Result<(), PlotError> {
        let mut f = BufWriter::new(File::create(file)?);
        serde_json::to_writer_pretty(&mut f, self)?;
        writeln!(f)?;
        f.flush()?;
        Ok(())
    }
}

/// Turn a line of user input into a navigation command. An empty line means
/// "next".
pub(crate) fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_lowercase().as_str() {
        "" | "n" | "next" => Some(Command::Next),
        "b" | "back" => Some(Command::Back),
        "q" | "quit" => Some(Command::Quit),
        _ => None,
    }
}

fn describe_page<W: Write>(out: &mut W, page: &Page<PanelDescriptor>) -> std::io::Result<()> {
    writeln!(out, "Page {}", page.index + 1)?;
    for panel in &page.panels {
        writeln!(out, "  {}", panel.title)?;
    }
    Ok(())
}

impl PlotParams {
    fn engine(&self) -> Result<PageLayoutEngine, LayoutError> {
        let space = CursorSpace::from_times(
            &self.antennas,
            &self.spws,
            &self.options.fields,
            &self.unique_times,
            self.time_selection.as_ref(),
            self.y_axis,
            self.overlay,
        )?;
        debug!("{} panel positions", space.num_positions());
        PageLayoutEngine::new(space, self.grid)
    }

    fn builder(&self) -> PanelBuilder<'_> {
        let builder = PanelBuilder::new(&self.table, &self.options);
        match self.reference.as_ref() {
            Some(r) => builder.with_reference(r),
            None => builder,
        }
    }

    fn finish(&self, pages: Vec<Page<PanelDescriptor>>, stats: MadStats) -> PlotOutput {
        let all_times = self.unique_times.all_times();
        let median_mad = median_across_antennas(&stats)
            .into_iter()
            .map(|((spw, time, pol), median_mad)| MedianMad {
                spw,
                time: all_times.get(time).copied().unwrap_or(f64::NAN),
                pol: self.table.pol_name(pol),
                median_mad,
            })
            .collect();
        PlotOutput {
            caltable: self.table.name.clone(),
            grid: self.grid.to_string(),
            overlay: self.overlay.to_string(),
            pages,
            median_mad,
        }
    }

    /// Page through the panels, either non-interactively or with commands read
    /// from stdin.
    pub(crate) fn run(&self) -> Result<PlotOutput, PlotError> {
        if self.interactive {
            let stdin = std::io::stdin();
            if !stdin.is_terminal() {
                debug!("stdin is not a terminal; reading navigation commands from it anyway");
            }
            self.run_interactive(stdin.lock(), std::io::stdout().lock())
        } else {
            self.run_batch()
        }
    }

    /// Produce every page, in order.
    pub(crate) fn run_batch(&self) -> Result<PlotOutput, PlotError> {
        let mut engine = self.engine()?;
        let mut builder = self.builder();
        let mut pages = vec![];
        while let Some(page) = engine.handle(Command::Next, &mut builder)? {
            trace!("Page {} has {} panels", page.index + 1, page.panels.len());
            pages.push(page);
        }
        if pages.is_empty() {
            warn!("Every selected panel was empty; nothing to plot");
        }
        Ok(self.finish(pages, builder.into_mad_stats()))
    }

    /// Produce pages as requested by commands in `input`. Prompts and page
    /// summaries are written to `out`. The end of `input` counts as quitting.
    pub(crate) fn run_interactive<R: BufRead, W: Write>(
        &self,
        mut input: R,
        mut out: W,
    ) -> Result<PlotOutput, PlotError> {
        let mut engine = self.engine()?;
        let mut builder = self.builder();
        let mut pages = vec![];

        let mut command = Command::Next;
        loop {
            match engine.handle(command, &mut builder) {
                Ok(Some(page)) => {
                    describe_page(&mut out, &page)?;
                    pages.push(page);
                }
                Ok(None) if command == Command::Quit => break,
                Ok(None) => writeln!(out, "No more panels")?,
                Err(e @ LayoutError::NoHistory) => warn!("{e}"),
                Err(e) => return Err(e.into()),
            }

            command = loop {
                write!(out, "{PROMPT}")?;
                out.flush()?;
                let mut line = String::new();
                if input.read_line(&mut line)? == 0 {
                    break Command::Quit;
                }
                match parse_command(&line) {
                    Some(c) => break c,
                    None => writeln!(out, "Unrecognised command '{}'", line.trim())?,
                }
            };
        }

        info!("Quit after {} pages", pages.len());
        Ok(self.finish(pages, builder.into_mad_stats()))
    }
}

#[derive(Error, Debug)]
pub(crate) enum PlotError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("Couldn't write panels as json: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
