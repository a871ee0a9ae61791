//! Typed views over the patched resource tables.
//!
//! Each module wraps a [`TableBlob`](crate::blob::TableBlob) with the
//! category's addressing arithmetic. Addresses are pure functions of the
//! identifying fields; anything out of range is rejected here, before a
//! single byte is touched.

pub mod eqdp;
pub mod eqp;
pub mod est;
pub mod gmp;
pub mod imc;
pub mod rsp;

pub use eqdp::EqdpTable;
pub use eqp::EqpTable;
pub use est::EstTable;
pub use gmp::GmpTable;
pub use imc::ImcTable;
pub use rsp::RspTable;
