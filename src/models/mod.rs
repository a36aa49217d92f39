// Models module for data structures
pub mod change_set;
pub mod local_state;
pub mod proposal;
pub mod release;
pub mod version;
