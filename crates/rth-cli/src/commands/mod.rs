pub mod expand;
pub mod scaffold;
pub mod verify;
