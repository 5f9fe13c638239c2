/// Item creation, editing, packing, and ordering
pub mod item;

/// Place search with superseded-query handling
pub mod location;

/// One-time upgrade of data written by older releases
pub mod migration;

/// Shared `sort_order` rules for lists and items
pub mod ordering;

/// Packing list creation, ownership, and cascade deletion
pub mod packing_list;

/// Progress aggregation over a loaded trip
pub mod progress;

/// Item suggestions and categorization
pub mod recommend;

/// Template materialization and save-as-template
pub mod template;

/// Trip creation, location, and cascade deletion
pub mod trip;

/// Packers and the plus gate on adding more
pub mod user;
