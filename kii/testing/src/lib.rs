// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: Apache-2.0, MIT
#[cfg(feature = "golden")]
pub mod golden;
#[cfg(feature = "keeper")]
pub mod keeper;
pub mod nullify;
