// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host-side services: bundle/configuration discovery and the headless
// platform layer the bridge talks to.

pub mod bundle;
pub mod headless;
