// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod advice;
pub mod business;
pub mod cashflow;
pub mod config;
pub mod dashboard;
pub mod doctor;
pub mod employees;
pub mod exporter;
pub mod importer;
pub mod payroll;
pub mod rules;
pub mod tax;
pub mod transactions;
