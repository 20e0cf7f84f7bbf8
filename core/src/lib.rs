// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Caroline Alpha neural core.
//!
//! Background feed services, the autonomous decision engine, and the status
//! API that exposes them. All state is process-lifetime and in-memory;
//! restart loses history by design.

pub mod application;
pub mod config;
pub mod domain;
pub mod presentation;

pub use domain::*;
