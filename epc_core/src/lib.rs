//! # epc_core - Energy-Performance Contract Engine
//!
//! `epc_core` is the computational heart of the EPC backend: the typed
//! tables a renovation contract is made of, the calculation engine that
//! derives energy baselines, fees and the loan schedule from them, the
//! indoor-climate model, and the renderer that turns a contract into a
//! localized PDF.
//!
//! ## Design Philosophy
//!
//! - **JSON-First**: contracts, tables and errors all serialize with serde
//! - **Fixed-point money**: every value written back into a table is a `Decimal`
//! - **Rich Errors**: one structured [`EpcError`], not strings
//! - **Cancellable rendering**: external programs die with the request
//!
//! ## Quick Start
//!
//! ```rust
//! use epc_core::contract::Contract;
//! use epc_core::project::ProjectSnapshot;
//! use rust_decimal::Decimal;
//!
//! let project = ProjectSnapshot::new("Latvia").with_heated_area(Decimal::from(2400));
//! let mut contract = Contract::new(project.id);
//!
//! let calculation = contract.calculate(&project).unwrap();
//! assert!(calculation.etmfg.is_zero());
//! ```
//!
//! ## Modules
//!
//! - [`cell`], [`table`] - cells, kinds and the table engine
//! - [`catalog`] - the named tables every contract starts with
//! - [`contract`], [`project`] - the contract model and the project facts it needs
//! - [`calculations`] - baseline, fee and amortization calculations
//! - [`indoor_clima`] - heat balance of the building envelope and pipes
//! - [`render`] - template sets, helpers and the PDF pipeline
//! - [`file_io`], [`entity`] - the JSON contract store
//! - [`rates`] - VAT and EUROBOR lookup
//! - [`config`], [`telemetry`] - environment configuration and logging
//! - [`errors`] - structured error types

pub mod calculations;
pub mod catalog;
pub mod cell;
pub mod config;
pub mod contract;
pub mod cursor;
pub mod entity;
pub mod errors;
pub mod file_io;
pub mod indoor_clima;
pub mod l10n;
pub mod project;
pub mod rates;
pub mod render;
pub mod table;
pub mod telemetry;

// Re-export commonly used types at crate root for convenience
pub use cell::{Cell, Kind};
pub use contract::Contract;
pub use errors::{EpcError, EpcResult};
pub use file_io::{ContractStore, FileContractStore};
pub use project::ProjectSnapshot;
pub use render::{Document, RenderOptions, Renderer};
pub use table::{Column, Row, Table};
