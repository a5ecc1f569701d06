//! Conversion services.
//!
//! The catalog decides which service accepts which kind of input; the
//! dispatcher validates a request against it and drives the provider calls.

pub mod catalog;
pub mod dispatcher;

pub use catalog::{
    capability, Capability, CatalogEntry, InputKind, Pipeline, ResultKind, ServiceCatalog,
    ServiceName, UnknownService,
};
pub use dispatcher::{ConversionRequest, ConversionResult, DispatchPlan, Dispatcher};
