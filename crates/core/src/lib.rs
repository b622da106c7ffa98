//! Core library for kardex
//!
//! This crate implements the **Functional Core** of the kardex tool,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The project uses a three-crate architecture:
//!
//! - **`kardex_core`** (this crate): Pure heuristic parsing with zero I/O
//! - **`kardex_pdf`**: Text and table-grid extraction from PDF files
//! - **`kardex`**: CLI orchestration, file access and JSON output (the Imperative Shell)
//!
//! Every function here takes extracted text and raw table grids and returns
//! new structures. Nothing reads files, nothing fails: a field or row that
//! does not validate is simply left out.
//!
//! # Module Organization
//!
//! - [`text`], [`code`]: Unicode folding, whitespace and number normalization
//! - [`origin`]: Which generator family produced a document
//! - [`header`], [`summary`], [`subjects`]: Transcript extraction
//! - [`assembler`]: Fragmented-row state machine for student-portal plans
//! - [`table`]: Column-mapped parser and track segmentation for official plans
//! - [`dedup`], [`sanitize`]: Post-processing of course lists
//! - [`plan_info`], [`search`]: Plan version and credit requirement
//! - [`report`]: Pipeline assembly into serializable reports
//!
//! # Example Usage
//!
//! ```rust
//! use kardex_core::report::{parse_plan, PlanOptions};
//! use kardex_core::types::Document;
//!
//! let grid = vec![
//!     vec!["Clave".to_string(), "Materia".to_string()],
//!     vec!["04110 PROGRAMACION OBL 6".to_string()],
//! ];
//! let doc = Document::new("Créditos aprobados: 30 de 393", vec![grid]);
//!
//! let report = parse_plan(&doc, "columns", &PlanOptions::default());
//! assert!(report.ok);
//! assert_eq!(report.materias[0].code, "04110");
//! ```

pub mod assembler;
pub mod code;
pub mod dedup;
pub mod header;
pub mod origin;
pub mod plan_info;
pub mod report;
pub mod sanitize;
pub mod search;
pub mod subjects;
pub mod summary;
pub mod table;
pub mod text;
pub mod types;
