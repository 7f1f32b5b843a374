// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: Apache-2.0, MIT
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::GenesisError;

/// Parameters of the module.
///
/// The set is empty for now; new parameters get a field here, a default in
/// [`Params::default`] and a rule in [`Params::validate`].
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Params {}

impl Params {
    /// Check that every parameter is within its allowed range.
    pub fn validate(&self) -> Result<(), GenesisError> {
        Ok(())
    }
}

impl Display for Params {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string_pretty(self).map_err(|_| std::fmt::Error)?;
        write!(f, "{json}")
    }
}

#[cfg(feature = "arb")]
mod arb {
    use quickcheck::{Arbitrary, Gen};

    use super::Params;

    impl Arbitrary for Params {
        fn arbitrary(_g: &mut Gen) -> Self {
            Params {}
        }
    }
}
