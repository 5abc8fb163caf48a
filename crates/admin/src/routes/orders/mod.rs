//! Orders management route handlers.
//!
//! This module contains handlers for the order list, detail view, order
//! editing and shipment creation.

mod detail;
mod edit;
mod list;
mod ship;
pub mod types;

// Re-export types needed by templates and router
pub use types::{ItemRow, OrderEdit, OrderEditForm, OrderTotals, ShipForm};

// Re-export list handlers
pub use list::{OrdersIndexTemplate, OrdersTableTemplate, index};

// Re-export detail handlers
pub use detail::{OrderShowTemplate, show};

// Re-export edit handlers
pub use edit::{OrderEditTemplate, OrderTotalsTemplate, edit, recalculate, update};

// Re-export ship handlers
pub use ship::{OrderShipTemplate, ship, ship_form};
