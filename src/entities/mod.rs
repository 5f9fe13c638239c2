//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod item;
pub mod packing_list;
pub mod system_state;
pub mod trip;
pub mod user;

// Re-export specific types to avoid conflicts
pub use item::{Column as ItemColumn, Entity as Item, Model as ItemModel};
pub use packing_list::{
    Column as PackingListColumn, Entity as PackingList, ListType, Model as PackingListModel,
};
pub use system_state::{
    Column as SystemStateColumn, Entity as SystemState, Model as SystemStateModel,
};
pub use trip::{Column as TripColumn, Entity as Trip, Model as TripModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
