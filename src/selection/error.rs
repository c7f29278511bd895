// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with resolving selections.

use thiserror::Error;

use super::Dimension;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Could not parse the {dimension} selection token '{token}'")]
    Parse { dimension: Dimension, token: String },

    #[error("Could not parse the {dimension} range '{token}'; ranges must look like 'a~b', where a and b are integers and a <= b")]
    RangeParse { dimension: Dimension, token: String },

    #[error("'{name}' is not a known {dimension} name")]
    UnknownName { dimension: Dimension, name: String },

    #[error("The {dimension} selection '{token}' doesn't match anything available; valid values are {universe:?}")]
    NoMatch {
        dimension: Dimension,
        token: String,
        universe: Vec<usize>,
    },

    #[error("The {dimension} selection '{spec}' leaves nothing selected after negation")]
    Empty { dimension: Dimension, spec: String },
}
