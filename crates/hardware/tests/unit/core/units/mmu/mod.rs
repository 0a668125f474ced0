/// Page-table walker state machine.
pub mod ptw;


/// Permission checks and port translation.
pub mod translation;
