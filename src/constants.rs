//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

use std::time::Duration;

/// Path prefix every resource URL is derived from
pub const RESOURCE_PATH_PREFIX: &str = "/api/resource";

/// Body text a fresh draft starts with
pub const DEFAULT_BODY: &str = "{}";

/// Shown when neither the server nor the transport supplied an error text
pub const FALLBACK_ERROR_MESSAGE: &str = "An error occurred";

/// Transport timeout for a single request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Directory under the home directory holding the settings file
pub const SETTINGS_DIR: &str = ".resource-console";

/// Settings file name inside [`SETTINGS_DIR`]
pub const SETTINGS_FILE: &str = "settings.yaml";

/// Log file written next to the working directory
pub const LOG_FILE: &str = "resource-console.log";

/// Application name
pub const APP_NAME: &str = "Resource Console";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Resource types offered when the settings file lists none
pub const COMMON_RESOURCE_TYPES: &[&str] = &[
    "Customer",
    "Supplier",
    "Item",
    "Item Group",
    "Sales Order",
    "Sales Invoice",
    "Purchase Order",
    "Purchase Invoice",
    "Quotation",
    "Delivery Note",
    "Purchase Receipt",
    "Payment Entry",
    "Journal Entry",
    "Stock Entry",
    "Warehouse",
    "Employee",
    "Lead",
    "Opportunity",
    "Contact",
    "Address",
    "Project",
    "Task",
    "User",
    "Company",
];
