// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parse plotting arguments into parameters.

mod error;

pub(crate) use error::PlotArgsError;

use std::{borrow::Cow, path::PathBuf, str::FromStr};

use clap::Parser;
use itertools::Itertools;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use super::common::{display_warnings, InfoPrinter, Warn, ARG_FILE_HELP};
use crate::{
    constants::{DEFAULT_EDGE_CHANNELS, DEFAULT_MAD_SIGMA, DEFAULT_TIME_TOLERANCE_S},
    layout::{OverlayMode, SubplotGrid, YAxis},
    panel::{MadOptions, PlotOptions, XAxis},
    params::{PlotOutput, PlotParams},
    selection::{
        Dimension, EmptyMeans, NameTable, Selection, SelectionError, SelectionResolver,
        SelectionSpec,
    },
    solutions::{CalTable, CAL_TABLE_EXTENSIONS},
    timestamps::{format_mjd_seconds, UniqueTimeSet},
    unit_parsing::parse_seconds,
    CalviewError,
};

const DEFAULT_OUTPUT_PANELS_FILENAME: &str = "calview_panels.json";

lazy_static::lazy_static! {
    static ref CALTABLE_HELP: String =
        format!("The calibration table to plot. Supported formats: {}", *CAL_TABLE_EXTENSIONS);

    static ref CALTABLE2_HELP: String =
        format!("A table of per-channel solutions. Polynomial amplitudes are centred on the mean of this table's matching amplitudes rather than 1. Supported formats: {}", *CAL_TABLE_EXTENSIONS);

    static ref TIME_TOLERANCE_HELP: String =
        format!("Solution times closer together than this are considered the same. Also supports a unit (e.g. 30s, 500ms); without one, seconds are assumed. Default: {DEFAULT_TIME_TOLERANCE_S}s");

    static ref MAD_SIGMA_HELP: String =
        format!("Report channels further than this many MADs (median absolute deviations) from zero. Also enabled by --edge, in which case the default is used. Default: {DEFAULT_MAD_SIGMA}");

    static ref EDGE_HELP: String =
        format!("The number of channels at each end of a spw to ignore when looking for MAD outliers. Default: {DEFAULT_EDGE_CHANNELS}");

    static ref OUTPUT_HELP: String =
        format!("The json file that panel descriptors are written to. Default: {DEFAULT_OUTPUT_PANELS_FILENAME}");
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
struct PlotDataArgs {
    #[clap(short, long, help = CALTABLE_HELP.as_str(), help_heading = "INPUT DATA")]
    caltable: Option<PathBuf>,

    #[clap(long, help = CALTABLE2_HELP.as_str(), help_heading = "INPUT DATA")]
    caltable2: Option<PathBuf>,

    /// The antennas to plot, as comma-separated IDs, names, name globs (e.g.
    /// DV*), ranges (e.g. 0~4) or '*'. Prefix any of these with '!' to
    /// exclude it. Default: all antennas.
    #[clap(short, long, parse(from_str), help_heading = "SELECTION")]
    antenna: Option<SelectionSpec>,

    /// The spectral windows to plot, as comma-separated IDs or ranges.
    /// Default: all spws.
    #[clap(short, long, parse(from_str), help_heading = "SELECTION")]
    spw: Option<SelectionSpec>,

    /// The fields whose solutions are plotted, as comma-separated IDs or
    /// names. Default: all fields.
    #[clap(short, long, parse(from_str), help_heading = "SELECTION")]
    field: Option<SelectionSpec>,

    /// The polarisations to plot, as comma-separated indices or names (e.g.
    /// X,Y). Default: all polarisations.
    #[clap(short, long, parse(from_str), help_heading = "SELECTION")]
    poln: Option<SelectionSpec>,

    /// The solution times to plot, as comma-separated indices or ranges into
    /// the table's unique times (see `calview inspect`). Default: all times.
    #[clap(short, long, parse(from_str), help_heading = "SELECTION")]
    timeranges: Option<SelectionSpec>,

    #[clap(long, help = TIME_TOLERANCE_HELP.as_str(), help_heading = "SELECTION")]
    time_tolerance: Option<String>,
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
struct PlotCliArgs {
    /// Draw these dimensions as multiple curves in a single panel rather than
    /// across panels: none, antenna, time or antenna,time. Default: none.
    #[clap(long, help_heading = "LAYOUT")]
    overlay: Option<String>,

    /// The grid of panels on each page: 1x1, 2x2, 3x2 or 4x2. Two-digit codes
    /// like 22 are also accepted. Default: 2x2.
    #[clap(long, help_heading = "LAYOUT")]
    subplot: Option<String>,

    /// The x axis: chan or freq. Default: chan.
    #[clap(long, help_heading = "LAYOUT")]
    xaxis: Option<String>,

    /// The quantity on the y axis: amp, phase or both. With both, amplitude
    /// and phase get separate panels. Default: amp.
    #[clap(long, help_heading = "LAYOUT")]
    yaxis: Option<String>,

    /// Also draw flagged channels.
    #[clap(long, help_heading = "LAYOUT")]
    #[serde(default)]
    show_flagged: bool,

    /// Plot the differences between adjacent channels rather than the
    /// solutions themselves.
    #[clap(long, help_heading = "LAYOUT")]
    #[serde(default)]
    channel_diff: bool,

    #[clap(long, help = MAD_SIGMA_HELP.as_str(), help_heading = "OUTLIERS")]
    mad_sigma: Option<f64>,

    #[clap(long, help = EDGE_HELP.as_str(), help_heading = "OUTLIERS")]
    edge: Option<usize>,

    /// The y range of amplitude panels. Default: the range of the data.
    #[clap(long, number_of_values = 2, allow_hyphen_values = true, value_names = &["MIN", "MAX"], help_heading = "LAYOUT")]
    amp_range: Option<Vec<f64>>,

    /// The y range of phase panels [degrees]. Default: the range of the data.
    #[clap(long, number_of_values = 2, allow_hyphen_values = true, value_names = &["MIN", "MAX"], help_heading = "LAYOUT")]
    phase_range: Option<Vec<f64>>,

    /// Page through panels with commands read from stdin ([n]ext, [b]ack,
    /// [q]uit) rather than producing every page.
    #[clap(short, long, help_heading = "OUTPUT")]
    #[serde(default)]
    interactive: bool,

    #[clap(short, long, help = OUTPUT_HELP.as_str(), help_heading = "OUTPUT")]
    output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct PlotArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    args_file: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(rename = "data")]
    #[serde(default)]
    data_args: PlotDataArgs,

    #[clap(flatten)]
    #[serde(rename = "plot")]
    #[serde(default)]
    plot_args: PlotCliArgs,
}

impl PlotArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified into
    /// a single struct. Where applicable, it will prefer CLI parameters over
    /// those in the file.
    ///
    /// This function should only ever merge arguments, and not try to make
    /// sense of them.
    pub(super) fn merge(self) -> Result<PlotArgs, CalviewError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            // Read in the file arguments. Ensure all of the file args are
            // accounted for by pattern matching.
            let PlotArgs {
                args_file: _,
                data_args,
                plot_args,
            } = unpack_arg_file!(arg_file);

            // Merge all the arguments, preferring the CLI args when available.
            Ok(PlotArgs {
                args_file: None,
                data_args: cli_args.data_args.merge(data_args),
                plot_args: cli_args.plot_args.merge(plot_args),
            })
        } else {
            Ok(cli_args)
        }
    }

    /// Parse the arguments into parameters ready for plotting.
    fn parse(self) -> Result<PlotParams, PlotArgsError> {
        debug!("{:#?}", self);

        let PlotArgs {
            args_file: _,
            data_args:
                PlotDataArgs {
                    caltable,
                    caltable2,
                    antenna,
                    spw,
                    field,
                    poln,
                    timeranges,
                    time_tolerance,
                },
            plot_args:
                PlotCliArgs {
                    overlay,
                    subplot,
                    xaxis,
                    yaxis,
                    show_flagged,
                    channel_diff,
                    mad_sigma,
                    edge,
                    amp_range,
                    phase_range,
                    interactive,
                    output,
                },
        } = self;

        let caltable = caltable.ok_or(PlotArgsError::NoCalTable)?;
        let table = CalTable::read_from_ext(&caltable)?;
        let reference = caltable2.map(CalTable::read_from_ext).transpose()?;
        if let Some(r) = reference.as_ref() {
            if !table.is_polynomial() {
                format!(
                    "'{}' has no polynomial solutions, so the second table '{}' isn't used",
                    table.name, r.name
                )
                .warn();
            }
        }

        let time_tolerance = match time_tolerance {
            Some(s) => parse_seconds(&s).map_err(PlotArgsError::BadTolerance)?,
            None => DEFAULT_TIME_TOLERANCE_S,
        };

        let antennas = resolve(
            Dimension::Antenna,
            antenna,
            &table.antennas_with_solutions(),
            Some(&table.antenna_name_table()),
        )?;
        let spws = resolve(Dimension::Spw, spw, &table.spws_with_solutions(), None)?;
        let fields = resolve(
            Dimension::Field,
            field,
            &table.fields_with_solutions(),
            Some(&table.field_name_table()),
        )?;
        let all_pols = (0..table.num_pols()).collect::<Vec<_>>();
        let pols = resolve(
            Dimension::Polarisation,
            poln,
            &all_pols,
            Some(&table.pol_name_table()),
        )?;
        for (dimension, selection) in [
            (Dimension::Antenna, &antennas),
            (Dimension::Spw, &spws),
            (Dimension::Field, &fields),
            (Dimension::Polarisation, &pols),
        ] {
            if selection.is_empty() {
                return Err(PlotArgsError::NothingSelected { dimension });
            }
        }

        let unique_times = UniqueTimeSet::from_rows(&table.rows, time_tolerance);
        let time_selection = match timeranges {
            Some(spec) => {
                let time_indices = (0..unique_times.all_times().len()).collect::<Vec<_>>();
                Some(resolve(
                    Dimension::TimeRange,
                    Some(spec),
                    &time_indices,
                    None,
                )?)
            }
            None => None,
        };

        let grid = match subplot {
            Some(s) => SubplotGrid::from_str(&s)?,
            None => SubplotGrid::default(),
        };
        let overlay = match overlay {
            Some(s) => OverlayMode::from_str(&s)?,
            None => OverlayMode::None,
        };
        let y_axis = match yaxis {
            Some(s) => YAxis::from_str(&s)?,
            None => YAxis::Amp,
        };
        let x_axis = match xaxis {
            Some(s) => XAxis::from_str(&s).map_err(|_| PlotArgsError::BadXAxis(s.clone()))?,
            None => XAxis::Channel,
        };

        let mad = match (mad_sigma, edge) {
            (None, None) => None,
            (sigma, edge) => {
                let sigma = sigma.unwrap_or(DEFAULT_MAD_SIGMA);
                if !(sigma.is_finite() && sigma > 0.0) {
                    return Err(PlotArgsError::BadMadSigma(sigma));
                }
                Some(MadOptions {
                    sigma,
                    edge: edge.unwrap_or(DEFAULT_EDGE_CHANNELS),
                })
            }
        };
        if mad.is_some() && y_axis == YAxis::Phase {
            "Median MADs across antennas are only gathered from amplitude panels".warn();
        }

        let amp_range = parse_range("amplitude", amp_range)?;
        let phase_range = parse_range("phase", phase_range)?;
        let output = output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PANELS_FILENAME));

        let mut printer = InfoPrinter::new(format!("Plotting {}", caltable.display()).into());
        printer.push_block(vec![
            format!(
                "'{}': {} antennas, {} spws, {} fields, {} pols, {} solutions",
                table.name,
                table.num_antennas(),
                table.num_spws(),
                table.field_names.len(),
                table.num_pols(),
                table.rows.len()
            )
            .into(),
            format!(
                "{} unique times (tolerance {time_tolerance}s)",
                unique_times.all_times().len()
            )
            .into(),
        ]);
        printer.push_block(vec![
            format!(
                "Antennas: {}",
                antennas.iter().map(|&a| table.antenna_name(a)).join(", ")
            )
            .into(),
            format!("Spws: {}", spws.iter().join(", ")).into(),
            format!(
                "Fields: {}",
                fields.iter().map(|&f| table.field_name(f)).join(", ")
            )
            .into(),
            format!(
                "Pols: {}",
                pols.iter().map(|&p| table.pol_name(p)).join(", ")
            )
            .into(),
        ]);
        if let Some(selection) = time_selection.as_ref() {
            let all_times = unique_times.all_times();
            printer.push_line(
                format!(
                    "Times: {}",
                    selection
                        .iter()
                        .map(|&i| format_mjd_seconds(all_times[i]))
                        .join(", ")
                )
                .into(),
            );
        }
        printer.push_line(
            format!("{grid} panels per page; overlay: {overlay}; x axis: {x_axis}; y axis: {y_axis}")
                .into(),
        );
        if let Some(MadOptions { sigma, edge }) = mad {
            printer.push_line(
                format!("Reporting channels beyond {sigma} MADs, ignoring {edge} edge channels")
                    .into(),
            );
        }
        printer.display();
        display_warnings();

        Ok(PlotParams {
            table,
            reference,
            antennas,
            spws,
            time_selection,
            unique_times,
            grid,
            y_axis,
            overlay,
            options: PlotOptions {
                x_axis,
                pols,
                fields,
                show_flagged,
                channel_diff,
                mad,
                amp_range,
                phase_range,
                time_tolerance,
                atmosphere: None,
            },
            interactive,
            output,
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), CalviewError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let params = self.parse()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        let output = params.run()?;
        display_median_mads(&output);
        output.write(&params.output)?;
        info!(
            "Wrote {} panels on {} pages to {}",
            output.num_panels(),
            output.pages.len(),
            params.output.display()
        );

        Ok(())
    }
}

impl PlotDataArgs {
    fn merge(self, other: Self) -> Self {
        Self {
            caltable: self.caltable.or(other.caltable),
            caltable2: self.caltable2.or(other.caltable2),
            antenna: self.antenna.or(other.antenna),
            spw: self.spw.or(other.spw),
            field: self.field.or(other.field),
            poln: self.poln.or(other.poln),
            timeranges: self.timeranges.or(other.timeranges),
            time_tolerance: self.time_tolerance.or(other.time_tolerance),
        }
    }
}

impl PlotCliArgs {
    fn merge(self, other: Self) -> Self {
        Self {
            overlay: self.overlay.or(other.overlay),
            subplot: self.subplot.or(other.subplot),
            xaxis: self.xaxis.or(other.xaxis),
            yaxis: self.yaxis.or(other.yaxis),
            show_flagged: self.show_flagged || other.show_flagged,
            channel_diff: self.channel_diff || other.channel_diff,
            mad_sigma: self.mad_sigma.or(other.mad_sigma),
            edge: self.edge.or(other.edge),
            amp_range: self.amp_range.or(other.amp_range),
            phase_range: self.phase_range.or(other.phase_range),
            interactive: self.interactive || other.interactive,
            output: self.output.or(other.output),
        }
    }
}

/// Resolve a selection that may not have been given; nothing means
/// everything.
fn resolve(
    dimension: Dimension,
    spec: Option<SelectionSpec>,
    universe: &[usize],
    names: Option<&NameTable>,
) -> Result<Selection, SelectionError> {
    let spec = spec.unwrap_or_else(|| SelectionSpec::Text(String::new()));
    let resolver = SelectionResolver::new(dimension, universe).empty_means(EmptyMeans::All);
    match names {
        Some(names) => resolver.with_names(names).resolve(&spec),
        None => resolver.resolve(&spec),
    }
}

fn parse_range(
    what: &'static str,
    range: Option<Vec<f64>>,
) -> Result<Option<(f64, f64)>, PlotArgsError> {
    match range.as_deref() {
        None => Ok(None),
        Some(&[lo, hi]) if lo.is_finite() && hi.is_finite() && lo < hi => Ok(Some((lo, hi))),
        Some(got) => Err(PlotArgsError::BadRange {
            what,
            got: got.to_vec(),
        }),
    }
}

fn display_median_mads(output: &PlotOutput) {
    if output.median_mad.is_empty() {
        return;
    }
    let mut printer = InfoPrinter::new("Median MAD across antennas".into());
    printer.push_block(
        output
            .median_mad
            .iter()
            .map(|m| {
                Cow::from(format!(
                    "spw {} {} {}: {:.4}",
                    m.spw,
                    format_mjd_seconds(m.time),
                    m.pol,
                    m.median_mad
                ))
            })
            .collect(),
    );
    printer.display();
}
